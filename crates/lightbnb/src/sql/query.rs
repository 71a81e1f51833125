use super::max_placeholder;
use crate::client::GenericClient;
use crate::error::{DbError, DbResult};
use crate::param::Param;
use crate::row::FromRow;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A finished statement: SQL text plus positional bind values.
///
/// `params()[i]` binds placeholder `$(i + 1)`. The value is immutable once
/// built and can be executed any number of times.
///
/// # Example
///
/// ```ignore
/// use lightbnb::query;
///
/// let user: Option<User> = query("SELECT * FROM users WHERE id = $1")
///     .bind(user_id)
///     .fetch_opt_as(&conn)
///     .await?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    text: String,
    params: Vec<Param>,
}

impl BuiltQuery {
    /// Create a statement with no bound values.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    pub(crate) fn from_parts(text: String, params: Vec<Param>) -> Self {
        Self { text, params }
    }

    /// Bind the value for the next placeholder.
    pub fn bind(mut self, value: impl Into<Param>) -> Self {
        self.params.push(value.into());
        self
    }

    /// The statement text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Bind values in placeholder order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Split into text and bind values.
    pub fn into_parts(self) -> (String, Vec<Param>) {
        (self.text, self.params)
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
    }

    /// Check that the highest placeholder index matches the number of bound values.
    ///
    /// Not run before execution; the server rejects a bind count mismatch on
    /// its own. Useful for asserting on statements built ahead of time.
    pub fn validate(&self) -> DbResult<()> {
        let highest = max_placeholder(&self.text);
        if highest != self.params.len() {
            return Err(DbError::validation(format!(
                "statement references ${} but {} value(s) are bound",
                highest,
                self.params.len()
            )));
        }
        Ok(())
    }

    /// Execute the statement and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> DbResult<Vec<Row>> {
        conn.query(&self.text, &self.params_ref()).await
    }

    /// Execute the statement and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> DbResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the statement and return the first row; no row is [`DbError::NotFound`].
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> DbResult<Row> {
        conn.query_one(&self.text, &self.params_ref()).await
    }

    /// Execute the statement and return the first row mapped to `T`.
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> DbResult<T> {
        let row = self.fetch_one(conn).await?;
        T::from_row(&row)
    }

    /// Execute the statement and return at most one row.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> DbResult<Option<Row>> {
        conn.query_opt(&self.text, &self.params_ref()).await
    }

    /// Execute the statement and return at most one row mapped to `T`.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> DbResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the statement and return the number of affected rows.
    pub async fn execute(&self, conn: &impl GenericClient) -> DbResult<u64> {
        conn.execute(&self.text, &self.params_ref()).await
    }
}
