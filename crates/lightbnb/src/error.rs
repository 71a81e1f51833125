//! Error types for lightbnb

use thiserror::Error;

/// Result type alias for data-access operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum DbError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement failed on the server or in the driver; carries the driver message
    #[error("Query execution error: {0}")]
    QueryExecution(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Statement/parameter mismatch detected before execution
    #[error("Validation error: {0}")]
    Validation(String),

    /// Pool error
    #[error("Pool error: {0}")]
    Pool(String),

    /// Connection checkout timed out
    #[error("Timed out after {0:?} waiting for a pooled connection")]
    Timeout(std::time::Duration),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),
}

impl DbError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Classify a tokio_postgres error by SQLSTATE.
    ///
    /// Constraint violations get their own variants; everything else becomes
    /// [`DbError::QueryExecution`] with the server message when there is one.
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            return match db_err.code().code() {
                "23505" => Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => Self::ForeignKeyViolation(format!("{}: {}", constraint, message)),
                "23514" => Self::CheckViolation(format!("{}: {}", constraint, message)),
                code => Self::QueryExecution(format!("{} (SQLSTATE {})", message, code)),
            };
        }
        Self::QueryExecution(err.to_string())
    }
}

impl From<tokio_postgres::Error> for DbError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::from_db_error(err)
    }
}

impl From<deadpool_postgres::PoolError> for DbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_driver_message() {
        let err = DbError::QueryExecution("relation \"users\" does not exist".to_string());
        assert_eq!(
            err.to_string(),
            "Query execution error: relation \"users\" does not exist"
        );
    }

    #[test]
    fn predicates_match_variants() {
        assert!(DbError::not_found("user 7").is_not_found());
        assert!(DbError::UniqueViolation("users_email_key: dup".into()).is_unique_violation());
        assert!(DbError::Timeout(std::time::Duration::from_millis(5)).is_timeout());
        assert!(!DbError::validation("x").is_not_found());
    }

    #[test]
    fn decode_names_column() {
        let err = DbError::decode("cost_per_night", "unexpected null");
        assert_eq!(
            err.to_string(),
            "Decode error on column 'cost_per_night': unexpected null"
        );
    }
}
