//! Run summary: one `run.summary` fact and one durable record per run.
use log::Level;
use serde_json::json;

use crate::api::errors::{id_str, ApiError, ErrorId};
use crate::api::Controller;
use crate::logging::record::{current_actor, current_uid, FailedEntity};
use crate::logging::{now_iso, AuditRecord, AuditSink, FactsEmitter, StageLogger};
use crate::policy::Sensitivity;
use crate::types::{EntityName, EntityOutcome, MutationRequest, RunOptions, RunOutcome};

pub(crate) struct RunSummary<'r> {
    pub run_id: &'r str,
    pub request: &'r MutationRequest,
    pub opts: &'r RunOptions,
    pub sensitivity: Option<Sensitivity>,
    pub live: bool,
    pub targets: &'r [EntityName],
    pub result: &'r Result<RunOutcome, ApiError>,
    pub exit_code: i32,
    pub failure: Option<(ErrorId, String)>,
}

impl RunSummary<'_> {
    pub(crate) fn record(&self) -> AuditRecord {
        let mut applied = Vec::new();
        let mut failed = Vec::new();
        let mut dry_run_skipped = Vec::new();
        let mut skipped = Vec::new();
        if let Ok(RunOutcome::Executed(report) | RunOutcome::Preview(report)) = self.result {
            for r in &report.results {
                match &r.outcome {
                    EntityOutcome::Applied => applied.push(r.entity.clone()),
                    EntityOutcome::Failed { reason } => failed.push(FailedEntity {
                        entity: r.entity.clone(),
                        reason: reason.clone(),
                    }),
                    EntityOutcome::DryRunSkipped => dry_run_skipped.push(r.entity.clone()),
                    EntityOutcome::NotAttempted => skipped.push(r.entity.clone()),
                }
            }
        }
        AuditRecord {
            ts: now_iso(),
            run_id: self.run_id.to_string(),
            actor: current_actor(),
            uid: current_uid(),
            pid: std::process::id(),
            invocation: self.opts.invocation.clone(),
            property: self.request.assignment.property.clone(),
            value: self.request.assignment.value.clone(),
            pattern: self.request.pattern.clone(),
            match_mode: self.request.match_mode,
            sensitive: self.sensitivity.is_some_and(Sensitivity::is_sensitive),
            mode: if self.live { "live" } else { "dry_run" },
            count: self.targets.len(),
            targets: self.targets.to_vec(),
            applied,
            failed,
            dry_run_skipped,
            skipped,
            exit_code: self.exit_code,
            error_id: self.failure.as_ref().map(|(id, _)| id_str(*id)),
            error: self.failure.as_ref().map(|(_, msg)| msg.clone()),
        }
    }
}

/// Emit `run.summary` and append the record. Returns the write failure, if any;
/// nothing already applied is undone.
pub(crate) fn finalize<E: FactsEmitter, A: AuditSink>(
    api: &Controller<E, A>,
    slog: &StageLogger<'_>,
    summary: &RunSummary<'_>,
) -> Option<ApiError> {
    let rec = summary.record();
    let fields = json!({
        "count": rec.count,
        "applied": rec.applied.len(),
        "failed": rec.failed.len(),
        "dry_run_skipped": rec.dry_run_skipped.len(),
        "skipped": rec.skipped.len(),
        "sensitive": rec.sensitive,
        "mode": rec.mode,
        "exit_code": rec.exit_code,
        "error_id": rec.error_id,
    });
    let ev = slog.run_summary().merge(&fields);
    if summary.failure.is_some() {
        ev.emit_failure();
    } else if rec.failed.is_empty() {
        ev.emit_success();
    } else {
        ev.emit_warn();
    }

    let recorder = api.recorder.as_ref()?;
    match recorder.record(&rec) {
        Ok(()) => None,
        Err(e) => {
            api.audit
                .log(Level::Error, &format!("audit: summary record not written: {}", e.msg));
            Some(ApiError::Audit(e.msg))
        }
    }
}
