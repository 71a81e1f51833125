//! Connection and pool settings.
//!
//! Settings come from a `[database]` table in a TOML file or from the
//! environment. Missing values fall back to the local development database.
//!
//! ```toml
//! [database]
//! host = "db.internal"
//! user = "lightbnb"
//! password = "..."
//! dbname = "lightbnb"
//! pool_max_size = 32
//! acquire_timeout_ms = 2000
//! ```

use crate::error::{DbError, DbResult};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Database connection settings.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbConfig {
    /// Full connection string; when set, the individual fields are ignored.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    /// Maximum number of pooled connections.
    pub pool_max_size: usize,
    /// How long `Database::acquire` waits for a free connection.
    pub acquire_timeout_ms: Option<u64>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "labber".to_string(),
            password: "labber".to_string(),
            dbname: "lightbnb".to_string(),
            pool_max_size: 16,
            acquire_timeout_ms: None,
        }
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dbname", &self.dbname)
            .field("pool_max_size", &self.pool_max_size)
            .field("acquire_timeout_ms", &self.acquire_timeout_ms)
            .finish()
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    database: DbConfig,
}

impl DbConfig {
    /// Parse settings from the `[database]` table of a TOML document.
    pub fn from_toml_str(raw: &str) -> DbResult<Self> {
        let file: ConfigFile =
            toml::from_str(raw).map_err(|e| DbError::Config(format!("invalid config: {e}")))?;
        file.database.validate()?;
        Ok(file.database)
    }

    /// Read and parse a TOML config file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DbError::Config(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Build settings from process environment variables.
    ///
    /// `DATABASE_URL` sets [`DbConfig::url`]; `LIGHTBNB_DB_HOST`, `_PORT`, `_USER`,
    /// `_PASSWORD`, `_NAME`, `_POOL_SIZE` and `_ACQUIRE_TIMEOUT_MS` override the
    /// individual defaults.
    pub fn from_env() -> DbResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`DbConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DbResult<Self> {
        let mut config = Self::default();

        config.url = lookup("DATABASE_URL").filter(|url| !url.is_empty());
        if let Some(host) = lookup("LIGHTBNB_DB_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("LIGHTBNB_DB_PORT") {
            config.port = parse_var("LIGHTBNB_DB_PORT", &port)?;
        }
        if let Some(user) = lookup("LIGHTBNB_DB_USER") {
            config.user = user;
        }
        if let Some(password) = lookup("LIGHTBNB_DB_PASSWORD") {
            config.password = password;
        }
        if let Some(dbname) = lookup("LIGHTBNB_DB_NAME") {
            config.dbname = dbname;
        }
        if let Some(size) = lookup("LIGHTBNB_DB_POOL_SIZE") {
            config.pool_max_size = parse_var("LIGHTBNB_DB_POOL_SIZE", &size)?;
        }
        if let Some(ms) = lookup("LIGHTBNB_DB_ACQUIRE_TIMEOUT_MS") {
            config.acquire_timeout_ms = Some(parse_var("LIGHTBNB_DB_ACQUIRE_TIMEOUT_MS", &ms)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that can never produce a working pool.
    pub fn validate(&self) -> DbResult<()> {
        if self.pool_max_size == 0 {
            return Err(DbError::Config(
                "pool_max_size must be at least 1".to_string(),
            ));
        }
        if self.url.is_none() && self.host.is_empty() {
            return Err(DbError::Config("host must not be empty".to_string()));
        }
        Ok(())
    }

    /// Checkout timeout, if configured.
    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout_ms.map(Duration::from_millis)
    }

    /// Driver-level connection config.
    pub fn to_pg_config(&self) -> DbResult<tokio_postgres::Config> {
        if let Some(url) = &self.url {
            return url
                .parse()
                .map_err(|e: tokio_postgres::Error| DbError::Connection(e.to_string()));
        }

        let mut pg = tokio_postgres::Config::new();
        pg.host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.dbname);
        Ok(pg)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> DbResult<T>
where
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| DbError::Config(format!("{key}={value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_local_dev_database() {
        let config = DbConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DbConfig::default());
        assert_eq!(config.user, "labber");
        assert_eq!(config.dbname, "lightbnb");
        assert_eq!(config.acquire_timeout(), None);
    }

    #[test]
    fn env_overrides_fields() {
        let config = DbConfig::from_lookup(lookup(&[
            ("LIGHTBNB_DB_HOST", "db.internal"),
            ("LIGHTBNB_DB_PORT", "6543"),
            ("LIGHTBNB_DB_POOL_SIZE", "4"),
            ("LIGHTBNB_DB_ACQUIRE_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 6543);
        assert_eq!(config.pool_max_size, 4);
        assert_eq!(config.acquire_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn bad_port_is_config_error() {
        let err = DbConfig::from_lookup(lookup(&[("LIGHTBNB_DB_PORT", "five")])).unwrap_err();
        assert!(matches!(err, DbError::Config(msg) if msg.contains("LIGHTBNB_DB_PORT")));
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        assert!(DbConfig::from_lookup(lookup(&[("LIGHTBNB_DB_POOL_SIZE", "0")])).is_err());
    }

    #[test]
    fn url_takes_precedence() {
        let config = DbConfig::from_lookup(lookup(&[(
            "DATABASE_URL",
            "postgres://alice:pw@example.com:5433/bnb",
        )]))
        .unwrap();
        let pg = config.to_pg_config().unwrap();
        assert_eq!(pg.get_user(), Some("alice"));
        assert_eq!(pg.get_dbname(), Some("bnb"));
        assert_eq!(pg.get_ports(), &[5433]);
    }

    #[test]
    fn fields_build_pg_config() {
        let pg = DbConfig::default().to_pg_config().unwrap();
        assert_eq!(pg.get_user(), Some("labber"));
        assert_eq!(pg.get_password(), Some(&b"labber"[..]));
        assert_eq!(pg.get_ports(), &[5432]);
    }

    #[test]
    fn toml_database_table() {
        let config = DbConfig::from_toml_str(
            r#"
            [database]
            host = "db.internal"
            dbname = "bnb"
            pool_max_size = 8
            acquire_timeout_ms = 1500
            "#,
        )
        .unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.dbname, "bnb");
        assert_eq!(config.user, "labber");
        assert_eq!(config.pool_max_size, 8);
        assert_eq!(config.acquire_timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn toml_unknown_keys_are_rejected() {
        let err = DbConfig::from_toml_str("[database]\nhots = \"typo\"\n").unwrap_err();
        assert!(matches!(err, DbError::Config(_)));
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = DbConfig {
            url: Some("postgres://u:hunter2@h/d".to_string()),
            password: "hunter2".to_string(),
            ..DbConfig::default()
        };
        let shown = format!("{config:?}");
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("<redacted>"));
    }
}
