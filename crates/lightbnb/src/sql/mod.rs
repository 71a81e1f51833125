//! Parameterized SQL statements.
//!
//! - [`query()`] wraps a SQL string that already contains `$1, $2...` and binds
//!   values in order.
//! - [`sql()`] composes SQL dynamically without manually tracking placeholder
//!   indices.
//!
//! Both end in a [`BuiltQuery`]: the statement text plus its ordered bind
//! values, ready to hand to a [`GenericClient`](crate::GenericClient).
//!
//! # Example
//!
//! ```ignore
//! use lightbnb::sql;
//!
//! let mut q = sql("SELECT * FROM properties");
//! if let Some(city) = city {
//!     q.push(" WHERE city = ").push_bind(city);
//! }
//! q.limit(10);
//!
//! let rows = q.build().fetch_all(&conn).await?;
//! ```

mod builder;
mod query;

#[cfg(test)]
mod tests;

pub use builder::Sql;
pub use query::BuiltQuery;

/// Build a statement from a pre-numbered SQL string (`$1, $2, ...`).
pub fn query(text: impl Into<String>) -> BuiltQuery {
    BuiltQuery::new(text)
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

/// Highest `$n` placeholder index referenced in `text`.
///
/// Skips string literals (including `E'...'` with backslash escapes), quoted
/// identifiers, `--` and `/* */` comments, dollar-quoted bodies, and `$` that
/// is part of an identifier.
pub(crate) fn max_placeholder(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut max = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\'' => {
                let escapes = i > 0
                    && matches!(bytes[i - 1], b'E' | b'e')
                    && (i < 2 || !is_ident_byte(bytes[i - 2]));
                i = skip_string(bytes, i + 1, escapes);
            }
            b'"' => i = skip_past(bytes, i + 1, b"\""),
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_past(bytes, i + 2, b"\n"),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i + 2),
            b'$' if i > 0 && is_ident_byte(bytes[i - 1]) => i += 1,
            b'$' => {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                if end > start {
                    // Digits only, so the slice is valid UTF-8.
                    if let Ok(n) = text[start..end].parse::<usize>() {
                        max = max.max(n);
                    }
                    i = end;
                } else if let Some(tag_end) = dollar_tag_end(bytes, i) {
                    let tag = &bytes[i..=tag_end];
                    i = skip_past(bytes, tag_end + 1, tag);
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    max
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

/// Index just past the first `needle` at or after `from`, or the end of input.
fn skip_past(bytes: &[u8], from: usize, needle: &[u8]) -> usize {
    bytes
        .get(from..)
        .and_then(|rest| rest.windows(needle.len()).position(|w| w == needle))
        .map_or(bytes.len(), |at| from + at + needle.len())
}

fn skip_string(bytes: &[u8], mut i: usize, escapes: bool) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if escapes => i += 2,
            b'\'' if bytes.get(i + 1) == Some(&b'\'') => i += 2,
            b'\'' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_block_comment(bytes: &[u8], mut i: usize) -> usize {
    let mut depth = 1;
    while i < bytes.len() {
        if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
            depth += 1;
            i += 2;
        } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return i;
            }
        } else {
            i += 1;
        }
    }
    bytes.len()
}

/// Closing `$` of a `$tag$` opener starting at `start`, if there is one.
fn dollar_tag_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if bytes.get(i).is_some_and(|b| b.is_ascii_digit()) {
        return None;
    }
    while let Some(&b) = bytes.get(i) {
        match b {
            b'$' => return Some(i),
            b if b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80 => i += 1,
            _ => return None,
        }
    }
    None
}
