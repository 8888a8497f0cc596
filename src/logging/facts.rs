use log::Level;
use serde_json::Value;

use super::record::AuditRecord;
use crate::types::errors::Result;

/// Receives structured per-stage facts (gate decisions, per-entity results).
pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

/// Receives human-oriented log lines.
pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

/// Durable destination for the one-per-run summary record.
pub trait AuditRecorder {
    /// Verify the destination accepts appends without writing a record.
    /// # Errors
    /// Returns an error when the destination cannot be opened for appending.
    fn probe(&self) -> Result<()>;

    /// Append one complete record.
    /// # Errors
    /// Returns an error when the record could not be durably written.
    fn record(&self, rec: &AuditRecord) -> Result<()>;
}

/// Discards everything; the default when no audit destination is configured.
#[derive(Default, Clone, Copy, Debug)]
pub struct NullSink;

impl FactsEmitter for NullSink {
    fn emit(&self, _subsystem: &str, _event: &str, _decision: &str, _fields: Value) {}
}

impl AuditSink for NullSink {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Forwards to the `log` facade; facts are rendered as one JSON line at debug level.
#[derive(Default, Clone, Copy, Debug)]
pub struct LogSink;

impl FactsEmitter for LogSink {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        log::debug!(target: "bulkprop::facts", "{subsystem} {event} {decision} {fields}");
    }
}

impl AuditSink for LogSink {
    fn log(&self, level: Level, msg: &str) {
        log::log!(level, "{msg}");
    }
}
