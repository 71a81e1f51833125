use super::query::BuiltQuery;
use crate::error::{DbError, DbResult};
use crate::param::Param;
use std::fmt::Write;

#[derive(Debug, Clone)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A parameter-safe dynamic SQL builder.
///
/// `Sql` stores SQL pieces and parameters separately and generates `$1, $2, ...`
/// placeholders automatically in the final SQL string. Placeholders are numbered
/// in the order values were bound, so the n-th `push_bind` always renders `$n`.
#[must_use]
#[derive(Debug, Clone)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<Param>,
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
        }
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self {
            parts: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<Param>) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value.into());
        self
    }

    /// Number of values bound so far.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Append `LIMIT $n` to the query with a bound parameter.
    pub fn limit(&mut self, n: i64) -> &mut Self {
        self.push(" LIMIT ").push_bind(n)
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    let _ = write!(&mut out, "${}", idx);
                }
            }
        }
        out
    }

    /// Check that every placeholder has a bound value.
    pub fn validate(&self) -> DbResult<()> {
        let placeholder_count = self
            .parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count();

        if placeholder_count != self.params.len() {
            return Err(DbError::validation(format!(
                "Sql: placeholders({placeholder_count}) != params({})",
                self.params.len()
            )));
        }
        Ok(())
    }

    /// Finish the statement.
    pub fn build(&self) -> BuiltQuery {
        BuiltQuery::from_parts(self.to_sql(), self.params.clone())
    }
}
