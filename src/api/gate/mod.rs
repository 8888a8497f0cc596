//! Confirmation gate: dry-run gate, then token gate, then typed-count gate.
//!
//! Each stage can only tighten the previous decision. The executor consults
//! [`ConfirmationState::permits_execution`] and refuses to run otherwise.
use log::Level;
use serde::Serialize;
use serde_json::json;

use crate::api::errors::ApiError;
use crate::api::Controller;
use crate::logging::{AuditSink, FactsEmitter, StageLogger};
use crate::policy::Sensitivity;
use crate::types::{EntityName, MutationRequest, RunOptions};

pub mod confirm;
pub mod dry_run;
pub mod token;

/// Outcome of the sensitive-token stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCheck {
    /// Not evaluated yet.
    #[default]
    Pending,
    /// Property is ordinary; the stage is never entered.
    NotRequired,
    Verified,
}

/// Outcome of the typed-count stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountCheck {
    #[default]
    Pending,
    /// Operator typed the exact count.
    Typed,
    /// `--yes`: unattended mode, operator accepted the batch scope up front.
    AssumeYes,
}

/// Which gate stages have been satisfied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfirmationState {
    /// Stage 1 passed: live application requested and not forced to dry-run.
    pub live: bool,
    pub token: TokenCheck,
    pub count: CountCheck,
}

impl ConfirmationState {
    /// The executor may run if and only if this holds.
    #[must_use]
    pub fn permits_execution(&self) -> bool {
        self.live
            && matches!(self.token, TokenCheck::NotRequired | TokenCheck::Verified)
            && matches!(self.count, CountCheck::Typed | CountCheck::AssumeYes)
    }
}

/// What the gate decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateVerdict {
    /// Stage 1 stopped the run after rendering the preview.
    Preview,
    /// Every stage passed.
    Proceed(ConfirmationState),
}

/// Run the three stages in order. Stage 2 is entered only for sensitive properties.
pub(crate) fn evaluate<E: FactsEmitter, A: AuditSink>(
    api: &Controller<E, A>,
    request: &MutationRequest,
    opts: &RunOptions,
    targets: &[EntityName],
    sensitivity: Sensitivity,
    slog: &StageLogger<'_>,
) -> Result<GateVerdict, ApiError> {
    let mut state = ConfirmationState::default();

    // Stage 1
    if dry_run::stays_preview(opts) {
        let mut console = api.console();
        if let Err(e) = dry_run::render_preview(&mut **console, request, targets, sensitivity) {
            api.audit.log(Level::Warn, &format!("preview: write failed: {e}"));
        }
        slog.gate_dry_run()
            .merge(&json!({
                "live": false,
                "im_sure": opts.im_sure,
                "forced_dry_run": opts.force_dry_run,
            }))
            .emit_success();
        return Ok(GateVerdict::Preview);
    }
    state.live = true;
    slog.gate_dry_run().field("live", json!(true)).emit_success();

    // Stage 2
    if sensitivity.is_sensitive() {
        match token::verify(&opts.tokens, api.prompter.as_ref()) {
            Ok(origin) => {
                state.token = TokenCheck::Verified;
                slog.gate_token()
                    .field("origin", json!(origin))
                    .emit_success();
            }
            Err(e) => {
                slog.gate_token().error_id(e.id()).emit_failure();
                api.audit.log(Level::Error, &format!("gate: token stage refused: {e}"));
                return Err(e);
            }
        }
    } else {
        state.token = TokenCheck::NotRequired;
    }

    // Stage 3
    let count = {
        let mut console = api.console();
        confirm::confirm_count(
            targets.len(),
            opts,
            &api.policy.abort_keyword,
            api.prompter.as_ref(),
            &mut **console,
        )
    };
    match count {
        Ok(c) => {
            state.count = c;
            slog.gate_confirm()
                .merge(&json!({ "count": targets.len(), "check": c }))
                .emit_success();
        }
        Err(e) => {
            slog.gate_confirm()
                .field("count", json!(targets.len()))
                .error_id(e.id())
                .emit_failure();
            api.audit.log(Level::Error, &format!("gate: confirmation refused: {e}"));
            return Err(e);
        }
    }

    Ok(GateVerdict::Proceed(state))
}
