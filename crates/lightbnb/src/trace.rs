//! `tracing` instrumentation for SQL execution.

use crate::client::GenericClient;
use crate::error::DbResult;
use std::time::Instant;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Default cap on logged SQL, in bytes.
pub const DEFAULT_MAX_SQL_LENGTH: usize = 200;

/// Wraps a [`GenericClient`] and emits a `tracing` event per statement.
///
/// Successful statements are logged at `DEBUG` under the `lightbnb.sql` target
/// with the parameter count and elapsed time. Failures are logged at `WARN`
/// and then returned to the caller unchanged.
#[derive(Debug, Clone)]
pub struct TracingClient<C> {
    inner: C,
    max_sql_length: Option<usize>,
}

impl<C: GenericClient> TracingClient<C> {
    /// Wrap `inner` with the default truncation.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            max_sql_length: Some(DEFAULT_MAX_SQL_LENGTH),
        }
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// The wrapped client.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwrap the client.
    pub fn into_inner(self) -> C {
        self.inner
    }

    fn display_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }

    fn record<T>(
        &self,
        op: &'static str,
        sql: &str,
        param_count: usize,
        started: Instant,
        result: &DbResult<T>,
        row_count: impl FnOnce(&T) -> u64,
    ) {
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        let sql = self.display_sql(sql);
        match result {
            Ok(value) => {
                let rows = row_count(value);
                tracing::debug!(
                    target: "lightbnb.sql",
                    op,
                    param_count,
                    rows,
                    elapsed_ms,
                    sql = %sql,
                );
            }
            Err(err) => tracing::warn!(
                target: "lightbnb.sql",
                op,
                param_count,
                elapsed_ms,
                sql = %sql,
                error = %err,
                "statement failed"
            ),
        }
    }
}

/// Truncate at or below `max_bytes`, never splitting a UTF-8 character.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

impl<C: GenericClient> GenericClient for TracingClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
        let started = Instant::now();
        let result = self.inner.query(sql, params).await;
        self.record("query", sql, params.len(), started, &result, |rows| {
            rows.len() as u64
        });
        result
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<u64> {
        let started = Instant::now();
        let result = self.inner.execute(sql, params).await;
        self.record("execute", sql, params.len(), started, &result, |n| *n);
        result
    }
}
