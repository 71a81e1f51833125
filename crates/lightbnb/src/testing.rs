//! Test doubles: an in-memory `GenericClient` and a `tracing` event capture.

use crate::client::GenericClient;
use crate::error::{DbError, DbResult};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Records every statement it receives and returns no rows.
///
/// `tokio_postgres::Row` cannot be built outside the driver, so this client
/// only exercises the "no rows" and "failed" paths.
#[derive(Debug, Default)]
pub(crate) struct RecordingClient {
    seen: Mutex<Vec<(String, usize)>>,
    fail_with: Option<String>,
    affected: u64,
}

impl RecordingClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    pub(crate) fn statements(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub(crate) fn param_counts(&self) -> Vec<usize> {
        self.seen.lock().unwrap().iter().map(|(_, n)| *n).collect()
    }

    fn record(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<()> {
        self.seen.lock().unwrap().push((sql.to_string(), params.len()));
        match &self.fail_with {
            Some(message) => Err(DbError::QueryExecution(message.clone())),
            None => Ok(()),
        }
    }
}

impl GenericClient for RecordingClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
        self.record(sql, params)?;
        Ok(Vec::new())
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<u64> {
        self.record(sql, params)?;
        Ok(self.affected)
    }
}

/// One event seen by [`CapturedEvents`], fields rendered as strings.
#[derive(Debug, Clone)]
pub(crate) struct CapturedEvent {
    pub(crate) level: Level,
    pub(crate) target: String,
    pub(crate) fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub(crate) fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// A `tracing_subscriber` layer that keeps every event it sees.
#[derive(Debug, Clone, Default)]
pub(crate) struct CapturedEvents(Arc<Mutex<Vec<CapturedEvent>>>);

impl CapturedEvents {
    pub(crate) fn events(&self) -> Vec<CapturedEvent> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct FieldMap(BTreeMap<String, String>);

impl Visit for FieldMap {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

impl<S: Subscriber> Layer<S> for CapturedEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldMap::default();
        event.record(&mut fields);
        self.0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: fields.0,
        });
    }
}
