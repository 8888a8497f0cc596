//! Pipeline orchestration: select, classify, validate, gate, apply, record.
//!
//! Every terminal condition before the apply phase leaves the datasets
//! untouched. The summary record is written on every path once the audit
//! destination has been probed.
use log::Level;
use serde_json::json;

use super::audit::{self, RunSummary};
use super::control::ApplyPhase;
use super::errors::{ApiError, ErrorId, EXIT_DRY_RUN, EXIT_OK};
use super::gate::{self, ConfirmationState, GateVerdict};
use super::{execute, lock, select};
use crate::api::Controller;
use crate::logging::audit::{AuditCtx, AuditMode};
use crate::logging::{now_iso, AuditSink, FactsEmitter, StageLogger};
use crate::policy::{classify, Sensitivity};
use crate::types::{
    ids, EntityName, ExecutionReport, MutationRequest, PropertyAssignment, RunOptions, RunOutcome,
};

/// Everything an operator or caller needs to know about one invocation.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: String,
    /// `None` when the run stopped before classification.
    pub sensitivity: Option<Sensitivity>,
    /// Selection result; empty when selection failed.
    pub targets: Vec<EntityName>,
    /// Set once every gate stage passed.
    pub confirmation: Option<ConfirmationState>,
    pub result: Result<RunOutcome, ApiError>,
    /// The summary record could not be appended after the run.
    pub audit_error: Option<ApiError>,
}

impl RunReport {
    fn base_exit_code(&self) -> i32 {
        match &self.result {
            Ok(RunOutcome::Preview(_)) => EXIT_DRY_RUN,
            Ok(RunOutcome::Executed(r)) => {
                r.halted.map_or(EXIT_OK, |h| ApiError::from(h).exit_code())
            }
            Err(e) => e.exit_code(),
        }
    }

    /// Process exit code. A late audit failure only replaces a success code.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        let base = self.base_exit_code();
        match &self.audit_error {
            Some(e) if base == EXIT_OK || base == EXIT_DRY_RUN => e.exit_code(),
            _ => base,
        }
    }

    /// Terminal condition of the pipeline itself, audit write failures excluded.
    #[must_use]
    pub fn failure(&self) -> Option<(ErrorId, String)> {
        match &self.result {
            Err(e) => Some((e.id(), e.to_string())),
            Ok(RunOutcome::Executed(ExecutionReport {
                halted: Some(h), ..
            })) => {
                let e = ApiError::from(*h);
                Some((e.id(), e.to_string()))
            }
            Ok(_) => None,
        }
    }

    #[must_use]
    pub fn error_id(&self) -> Option<ErrorId> {
        self.failure()
            .map(|(id, _)| id)
            .or_else(|| self.audit_error.as_ref().map(ApiError::id))
    }

    /// One operator-facing line describing the outcome.
    #[must_use]
    pub fn summary_line(&self) -> String {
        match &self.result {
            Ok(RunOutcome::Preview(r)) => format!(
                "dry run: {} dataset(s) would change; nothing applied (pass --im-sure to apply)",
                r.dry_run_skipped()
            ),
            Ok(RunOutcome::Executed(r)) => {
                let mut line = format!(
                    "applied {}/{} dataset(s), {} failed",
                    r.applied(),
                    r.total(),
                    r.failed()
                );
                if let Some(h) = r.halted {
                    line.push_str(&format!(
                        ", {} not attempted ({})",
                        r.not_attempted(),
                        ApiError::from(h)
                    ));
                }
                line
            }
            Err(e) => e.to_string(),
        }
    }
}

fn emit_selection(slog: &StageLogger<'_>, request: &MutationRequest, res: &Result<Vec<EntityName>, ApiError>) {
    let base = json!({
        "pattern": request.pattern,
        "match_mode": request.match_mode,
    });
    match res {
        Ok(targets) => slog
            .select()
            .merge(&base)
            .field("count", json!(targets.len()))
            .emit_success(),
        Err(e) => slog.select().merge(&base).error_id(e.id()).emit_failure(),
    }
}

pub(crate) fn select_targets<E: FactsEmitter, A: AuditSink>(
    api: &Controller<E, A>,
    request: &MutationRequest,
) -> Result<Vec<EntityName>, ApiError> {
    if request.pattern.is_empty() {
        return Err(ApiError::PatternMissing);
    }
    let inventory = api
        .inventory
        .list()
        .map_err(|e| ApiError::NoEntities(e.msg))?;
    select::select_entities(&inventory, &request.pattern, request.match_mode)
}

/// Lock, execute and release. Refuses unless the gate is fully satisfied.
/// The caller holds the apply phase.
pub(crate) fn apply<E: FactsEmitter, A: AuditSink>(
    api: &Controller<E, A>,
    assignment: &PropertyAssignment,
    targets: &[EntityName],
    state: &ConfirmationState,
    slog: &StageLogger<'_>,
) -> Result<ExecutionReport, ApiError> {
    if !state.permits_execution() {
        api.audit
            .log(Level::Error, "apply: refused, confirmation gate not satisfied");
        return Err(ApiError::GateIncomplete);
    }
    if let Some(h) = api.control.halt() {
        return Err(h.into());
    }
    let lock = lock::acquire(api, slog)?;
    api.audit.log(
        Level::Info,
        &format!(
            "apply: lock backend={} wait_ms={:?} attempts={}",
            lock.lock_backend, lock.lock_wait_ms, lock.approx_attempts
        ),
    );

    let report = {
        let mut console = api.console();
        execute::run(
            api.applier.as_ref(),
            assignment,
            targets,
            &api.control,
            slog,
            &mut **console,
        )
    };
    drop(lock.guard);

    if let Some(h) = report.halted {
        api.audit.log(
            Level::Warn,
            &format!(
                "apply: stopped early ({}); {} dataset(s) not attempted, {} already applied stay applied",
                ApiError::from(h),
                report.not_attempted(),
                report.applied()
            ),
        );
    }
    Ok(report)
}

/// What the stages learned, kept past their return for the summary.
#[derive(Default)]
struct RunState<'a> {
    sensitivity: Option<Sensitivity>,
    confirmation: Option<ConfirmationState>,
    /// Held from the first change until the summary record is written, so an
    /// interrupt in between cannot exit without a record.
    phase: Option<ApplyPhase<'a>>,
}

fn stages<'a, E: FactsEmitter, A: AuditSink>(
    api: &'a Controller<E, A>,
    request: &MutationRequest,
    opts: &RunOptions,
    targets: &[EntityName],
    slog: &StageLogger<'_>,
    state: &mut RunState<'a>,
) -> Result<RunOutcome, ApiError> {
    let sensitivity = classify(&request.assignment.property);
    state.sensitivity = Some(sensitivity);
    slog.classify()
        .merge(&json!({
            "property": request.assignment.property,
            "sensitivity": sensitivity,
        }))
        .emit_success();

    if api.policy.validate_property {
        if let (Some(v), Some(sample)) = (api.validator.as_ref(), targets.first()) {
            if let Err(e) = v.validate(&request.assignment, sample) {
                slog.validate()
                    .entity(sample.as_str())
                    .field("error", json!(e.msg))
                    .error_id(ErrorId::E_PROPERTY)
                    .emit_failure();
                return Err(ApiError::PropertyInvalid(e.msg));
            }
            slog.validate().entity(sample.as_str()).emit_success();
        }
    }

    let confirmation = match gate::evaluate(api, request, opts, targets, sensitivity, slog)? {
        GateVerdict::Preview => {
            return Ok(RunOutcome::Preview(ExecutionReport::dry_run(targets)))
        }
        GateVerdict::Proceed(c) => c,
    };
    state.confirmation = Some(confirmation);

    state.phase = Some(api.control.apply_phase());
    apply(api, &request.assignment, targets, &confirmation, slog).map(RunOutcome::Executed)
}

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Controller<E, A>,
    request: &MutationRequest,
    opts: &RunOptions,
) -> RunReport {
    // Nothing is selected or touched unless the record can be kept.
    if let Some(rec) = api.recorder.as_ref() {
        if let Err(e) = rec.probe() {
            api.audit
                .log(Level::Error, &format!("audit: destination unusable: {}", e.msg));
            return RunReport {
                run_id: ids::run_id(request, &[]).to_string(),
                sensitivity: None,
                targets: Vec::new(),
                confirmation: None,
                result: Err(ApiError::Audit(e.msg)),
                audit_error: None,
            };
        }
    }

    let selection = select_targets(api, request);
    let targets = selection.as_ref().map_or_else(|_| Vec::new(), Clone::clone);
    let run_id = ids::run_id(request, &targets).to_string();
    let live = !gate::dry_run::stays_preview(opts);
    let ctx = AuditCtx::new(
        &api.facts,
        run_id.clone(),
        now_iso(),
        AuditMode { dry_run: !live },
    );
    let slog = StageLogger::new(&ctx);
    emit_selection(&slog, request, &selection);

    let mut state = RunState::default();
    let result = match selection {
        Ok(_) => stages(api, request, opts, &targets, &slog, &mut state),
        Err(e) => Err(e),
    };

    let mut report = RunReport {
        run_id,
        sensitivity: state.sensitivity,
        targets,
        confirmation: state.confirmation,
        result,
        audit_error: None,
    };
    let summary = RunSummary {
        run_id: &report.run_id,
        request,
        opts,
        sensitivity: report.sensitivity,
        live,
        targets: &report.targets,
        result: &report.result,
        exit_code: report.base_exit_code(),
        failure: report.failure(),
    };
    let audit_error = audit::finalize(api, &slog, &summary);
    drop(state.phase);
    report.audit_error = audit_error;
    report
}
