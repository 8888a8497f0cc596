//! Append-only JSONL audit destination.
//!
//! Each record is serialized in full, then written with a single `write_all`
//! on an `O_APPEND` handle while an exclusive `flock` is held, so concurrent
//! invocations never interleave partial lines. Existing lines are never
//! touched.
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use log::Level;
use serde::Serialize;
use serde_json::{json, Value};

use super::facts::{AuditRecorder, AuditSink, FactsEmitter};
use super::record::AuditRecord;
use super::redact::now_iso;
use crate::constants::AUDIT_FILE_MODE;
use crate::types::errors::{Error, ErrorKind, Result};

#[derive(Debug, Clone)]
pub struct FileAuditLog {
    path: PathBuf,
    /// Persist per-stage facts and log lines too, not only run summaries.
    verbose: bool,
}

impl FileAuditLog {
    #[must_use]
    pub const fn new(path: PathBuf, verbose: bool) -> Self {
        Self { path, verbose }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(Error::new(
                    ErrorKind::Io,
                    format!("audit directory {} does not exist", parent.display()),
                ));
            }
        }
        let existed = self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .mode(AUDIT_FILE_MODE)
            .open(&self.path)
            .map_err(|e| self.io_err(&e))?;
        if !existed {
            // Exact mode, independent of the process umask.
            file.set_permissions(std::fs::Permissions::from_mode(AUDIT_FILE_MODE))
                .map_err(|e| self.io_err(&e))?;
        }
        Ok(file)
    }

    fn io_err(&self, e: &std::io::Error) -> Error {
        Error::new(ErrorKind::Io, format!("{}: {e}", self.path.display()))
    }

    fn append<T: Serialize>(&self, value: &T) -> Result<()> {
        let mut line = serde_json::to_vec(value)
            .map_err(|e| Error::new(ErrorKind::Io, format!("serialize audit record: {e}")))?;
        line.push(b'\n');
        let mut file = self.open()?;
        file.lock_exclusive().map_err(|e| self.io_err(&e))?;
        let res = file
            .write_all(&line)
            .and_then(|()| file.sync_data())
            .map_err(|e| self.io_err(&e));
        let _ = file.unlock();
        res
    }
}

impl AuditRecorder for FileAuditLog {
    fn probe(&self) -> Result<()> {
        self.open().map(drop)
    }

    fn record(&self, rec: &AuditRecord) -> Result<()> {
        self.append(&json!({ "kind": "run", "record": rec }))
    }
}

impl FactsEmitter for FileAuditLog {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        log::debug!(target: "bulkprop::facts", "{subsystem} {event} {decision} {fields}");
        if !self.verbose {
            return;
        }
        let line = json!({ "kind": "fact", "subsystem": subsystem, "event": event, "decision": decision, "fields": fields });
        if let Err(e) = self.append(&line) {
            log::error!("audit: fact not persisted: {e}");
        }
    }
}

impl AuditSink for FileAuditLog {
    fn log(&self, level: Level, msg: &str) {
        log::log!(level, "{msg}");
        if !self.verbose {
            return;
        }
        let line = json!({ "kind": "log", "ts": now_iso(), "level": level.as_str(), "msg": msg });
        if let Err(e) = self.append(&line) {
            log::error!("audit: log line not persisted: {e}");
        }
    }
}
