use serde::Serialize;

use crate::types::{EntityName, MatchMode};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailedEntity {
    pub entity: EntityName,
    pub reason: String,
}

/// One-per-run summary appended to the audit destination.
#[derive(Clone, Debug, Serialize)]
pub struct AuditRecord {
    pub ts: String,
    pub run_id: String,
    pub actor: String,
    pub uid: u32,
    pub pid: u32,
    pub invocation: Vec<String>,
    pub property: String,
    pub value: String,
    pub pattern: String,
    pub match_mode: MatchMode,
    pub sensitive: bool,
    /// `dry_run` or `live`.
    pub mode: &'static str,
    pub count: usize,
    pub targets: Vec<EntityName>,
    pub applied: Vec<EntityName>,
    pub failed: Vec<FailedEntity>,
    /// Previewed only; the run stopped at the dry-run gate.
    pub dry_run_skipped: Vec<EntityName>,
    /// Never attempted: the run was interrupted or timed out first.
    pub skipped: Vec<EntityName>,
    pub exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Operator identity: the invoking user behind sudo when present.
#[must_use]
pub fn current_actor() -> String {
    ["SUDO_USER", "USER", "LOGNAME"]
        .iter()
        .find_map(|k| std::env::var(k).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

#[must_use]
pub fn current_uid() -> u32 {
    rustix::process::getuid().as_raw()
}
