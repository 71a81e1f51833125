//! Property search.
//!
//! Turns a sparse [`PropertyFilter`] into a single parameterized `SELECT` over
//! `properties` joined with their reviews. Predicates are appended in a fixed
//! column order; the first one present opens the `WHERE` clause and the rest
//! are joined with `AND`. The row limit is always the last bind value.
//!
//! ```ignore
//! let filter = PropertyFilter {
//!     city: Some("Vancouver".into()),
//!     ..Default::default()
//! };
//! let q = lightbnb::search::build(&filter, 5);
//! assert_eq!(q.params(), &[Param::from("%Vancouver%"), Param::Int(5)]);
//! ```

use crate::param::Param;
use crate::sql::{BuiltQuery, Sql, sql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Row limit used when the caller does not pick one.
pub const DEFAULT_LIMIT: i64 = 10;

/// Price filters are whole currency units; `cost_per_night` is stored in cents.
const CENTS_PER_UNIT: i64 = 100;

const BASE_SELECT: &str = "SELECT properties.*, avg(property_reviews.rating) AS average_rating \
     FROM properties \
     JOIN property_reviews ON properties.id = property_reviews.property_id";

/// Optional search criteria for a property listing query.
///
/// A field contributes a predicate when it is `Some`, whatever its value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyFilter {
    /// Partial, case-sensitive match on `city`.
    pub city: Option<String>,
    pub owner_id: Option<i64>,
    /// Lower price bound per night, in currency units.
    pub minimum_price_per_night: Option<Decimal>,
    /// Upper price bound per night, in currency units.
    pub maximum_price_per_night: Option<Decimal>,
    pub minimum_rating: Option<Decimal>,
}

impl PropertyFilter {
    /// Number of predicates this filter contributes.
    pub fn len(&self) -> usize {
        [
            self.city.is_some(),
            self.owner_id.is_some(),
            self.minimum_price_per_night.is_some(),
            self.maximum_price_per_night.is_some(),
            self.minimum_rating.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn to_cents(price: Decimal) -> Decimal {
    price * Decimal::from(CENTS_PER_UNIT)
}

/// Append `<WHERE|AND> <column> <op> $n`.
///
/// The keyword depends only on whether anything is bound yet, so the first
/// present filter anchors the `WHERE` clause.
fn push_predicate(q: &mut Sql, column: &str, op: &str, value: impl Into<Param>) {
    let keyword = if q.param_count() == 0 { "WHERE" } else { "AND" };
    q.push(" ")
        .push(keyword)
        .push(" ")
        .push(column)
        .push(" ")
        .push(op)
        .push(" ")
        .push_bind(value);
}

/// Build the property search statement for `filter`, returning at most `limit` rows.
///
/// Neither the filter values nor `limit` are validated; out-of-range values
/// are left for the database to reject.
pub fn build(filter: &PropertyFilter, limit: i64) -> BuiltQuery {
    let mut q = sql(BASE_SELECT);

    if let Some(city) = &filter.city {
        push_predicate(&mut q, "city", "LIKE", format!("%{}%", city));
    }
    if let Some(owner_id) = filter.owner_id {
        push_predicate(&mut q, "owner_id", "=", owner_id);
    }
    if let Some(min) = filter.minimum_price_per_night {
        push_predicate(&mut q, "cost_per_night", ">=", to_cents(min));
    }
    if let Some(max) = filter.maximum_price_per_night {
        push_predicate(&mut q, "cost_per_night", "<=", to_cents(max));
    }
    if let Some(rating) = filter.minimum_rating {
        push_predicate(&mut q, "rating", ">=", rating);
    }

    q.push(" GROUP BY properties.id ORDER BY cost_per_night");
    q.limit(limit);
    q.build()
}

/// [`build`] with [`DEFAULT_LIMIT`].
pub fn build_default(filter: &PropertyFilter) -> BuiltQuery {
    build(filter, DEFAULT_LIMIT)
}
