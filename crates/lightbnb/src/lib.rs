//! # lightbnb
//!
//! PostgreSQL data access for the LightBnB property rental app.
//!
//! ## Features
//!
//! - **Parameterized SQL only**: every value is a bind parameter; only fixed
//!   column names and keywords are written into statement text
//! - **Property search**: [`search::build`] turns a sparse [`PropertyFilter`] into one
//!   `SELECT` with contiguous `$1..$n` placeholders
//! - **Explicit handles**: operations take any [`GenericClient`]; [`Database`] owns the pool
//! - **Errors are returned, not logged away**: "no row" is `Ok(None)`, failures are [`DbError`]
//! - **Query logging**: statements and failures are emitted through `tracing`
//!
//! ## Example
//!
//! ```ignore
//! use lightbnb::{Database, DbConfig, PropertyFilter, properties};
//!
//! let db = Database::connect(&DbConfig::from_env()?)?;
//! let conn = db.acquire().await?;
//!
//! let filter = PropertyFilter {
//!     city: Some("Vancouver".into()),
//!     minimum_rating: Some(4.into()),
//!     ..Default::default()
//! };
//! let listings = properties::get_all_properties(&conn, &filter, 10).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod param;
pub mod pool;
pub mod properties;
pub mod reservations;
pub mod row;
pub mod search;
pub mod sql;
pub mod trace;
pub mod users;

#[cfg(test)]
mod testing;

pub use client::GenericClient;
pub use config::DbConfig;
pub use error::{DbError, DbResult};
pub use models::{NewProperty, NewUser, Property, PropertyListing, Reservation, User};
pub use param::Param;
pub use pool::{Connection, Database};
pub use row::{FromRow, RowExt};
pub use search::{DEFAULT_LIMIT, PropertyFilter};
pub use sql::{BuiltQuery, Sql, query, sql};
pub use trace::TracingClient;
