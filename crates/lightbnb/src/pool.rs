//! Connection pool handle.

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::trace::TracingClient;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use std::time::Duration;
use tokio_postgres::NoTls;

/// A pooled connection, instrumented with [`TracingClient`].
///
/// The connection goes back to the pool when this value is dropped.
pub type Connection = TracingClient<deadpool_postgres::Client>;

/// Shared handle to the connection pool.
///
/// Cloning is cheap; every clone refers to the same pool. Pass it (or a
/// [`Connection`] acquired from it) to the repository functions explicitly.
///
/// # Example
///
/// ```ignore
/// let db = lightbnb::Database::connect(&DbConfig::from_env()?)?;
/// let conn = db.acquire().await?;
/// let user = lightbnb::users::get_user_with_id(&conn, 1).await?;
/// ```
#[derive(Clone)]
pub struct Database {
    pool: Pool,
    acquire_timeout: Option<Duration>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("Database")
            .field("max_size", &status.max_size)
            .field("size", &status.size)
            .field("available", &status.available)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

impl Database {
    /// Build a pool from settings. No connection is opened until the first
    /// [`Database::acquire`].
    pub fn connect(config: &DbConfig) -> DbResult<Self> {
        config.validate()?;
        let pg_config = config.to_pg_config()?;

        let mgr = Manager::from_config(pg_config, NoTls, default_manager_config());
        let pool = Pool::builder(mgr)
            .max_size(config.pool_max_size)
            .build()
            .map_err(|e| DbError::Pool(e.to_string()))?;

        tracing::debug!(
            target: "lightbnb.pool",
            max_size = config.pool_max_size,
            "connection pool created"
        );

        Ok(Self {
            pool,
            acquire_timeout: config.acquire_timeout(),
        })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: Pool) -> Self {
        Self {
            pool,
            acquire_timeout: None,
        }
    }

    /// Bound how long [`Database::acquire`] waits for a free connection.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    /// Check out a connection.
    ///
    /// Fails with [`DbError::Timeout`] if the configured acquire timeout
    /// elapses first.
    pub async fn acquire(&self) -> DbResult<Connection> {
        let client = match self.acquire_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.pool.get()).await {
                Ok(client) => client,
                Err(_) => {
                    tracing::warn!(
                        target: "lightbnb.pool",
                        timeout_ms = limit.as_millis() as u64,
                        "timed out waiting for a pooled connection"
                    );
                    return Err(DbError::Timeout(limit));
                }
            },
            None => self.pool.get().await,
        };

        let client = client.inspect_err(|e| {
            tracing::warn!(target: "lightbnb.pool", error = %e, "connection checkout failed");
        })?;
        Ok(TracingClient::new(client))
    }

    /// The underlying pool.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_builds_pool_without_io() {
        let config = DbConfig {
            pool_max_size: 3,
            acquire_timeout_ms: Some(50),
            ..DbConfig::default()
        };
        let db = Database::connect(&config).unwrap();
        assert_eq!(db.pool().status().max_size, 3);
        assert_eq!(db.pool().status().size, 0);
        assert_eq!(db.acquire_timeout, Some(Duration::from_millis(50)));
    }

    #[test]
    fn connect_rejects_invalid_config() {
        let config = DbConfig {
            pool_max_size: 0,
            ..DbConfig::default()
        };
        assert!(matches!(Database::connect(&config), Err(DbError::Config(_))));
    }

    #[test]
    fn connect_rejects_malformed_url() {
        let config = DbConfig {
            url: Some("this is not a connection string".to_string()),
            ..DbConfig::default()
        };
        assert!(matches!(Database::connect(&config), Err(DbError::Connection(_))));
    }
}
