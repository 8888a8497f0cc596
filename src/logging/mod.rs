pub mod audit;
pub mod facts;
pub mod file;
pub mod record;
pub mod redact;

pub use audit::{Decision, EventBuilder, Stage, StageLogger};
pub use facts::{AuditRecorder, AuditSink, FactsEmitter, LogSink, NullSink};
pub use file::FileAuditLog;
pub use record::AuditRecord;
pub use redact::{now_iso, redact_event, redact_invocation, TS_ZERO};
