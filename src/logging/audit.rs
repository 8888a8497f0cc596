//! Typed fact emission for the bulkprop pipeline stages.
//!
//! Every fact carries a minimal envelope: `schema_version`, `ts`, `run_id`,
//! `stage`, `decision` and `dry_run`. Secrets never enter a fact; callers pass
//! only names, counts and decisions.
use serde_json::{json, Value};

use crate::api::errors::{exit_code_for, id_str, ErrorId};
use crate::logging::FactsEmitter;

pub(crate) const SCHEMA_VERSION: i64 = 1;

#[derive(Clone, Debug, Default)]
pub(crate) struct AuditMode {
    pub dry_run: bool,
}

pub(crate) struct AuditCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub run_id: String,
    pub ts: String,
    pub mode: AuditMode,
}

impl<'a> AuditCtx<'a> {
    pub(crate) fn new(
        facts: &'a dyn FactsEmitter,
        run_id: String,
        ts: String,
        mode: AuditMode,
    ) -> Self {
        Self {
            facts,
            run_id,
            ts,
            mode,
        }
    }
}

/// Stage for typed audit emission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Select,
    Classify,
    Validate,
    GateDryRun,
    GateToken,
    GateConfirm,
    ApplyAttempt,
    ApplyResult,
    RunSummary,
}

impl Stage {
    #[must_use]
    pub const fn as_event(&self) -> &'static str {
        match self {
            Stage::Select => "select",
            Stage::Classify => "classify",
            Stage::Validate => "validate",
            Stage::GateDryRun => "gate.dry_run",
            Stage::GateToken => "gate.token",
            Stage::GateConfirm => "gate.confirm",
            Stage::ApplyAttempt => "apply.attempt",
            Stage::ApplyResult => "apply.result",
            Stage::RunSummary => "run.summary",
        }
    }
}

/// Decision severity for audit events.
#[derive(Clone, Copy, Debug)]
pub enum Decision {
    Success,
    Failure,
    Warn,
}

impl Decision {
    const fn as_str(self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
            Decision::Warn => "warn",
        }
    }
}

/// Builder facade over audit emission with a centralized envelope.
pub struct StageLogger<'a> {
    ctx: &'a AuditCtx<'a>,
}

impl<'a> StageLogger<'a> {
    pub(crate) fn new(ctx: &'a AuditCtx<'a>) -> Self {
        Self { ctx }
    }

    pub(crate) fn run_id(&self) -> &str {
        &self.ctx.run_id
    }

    pub fn stage(&self, stage: Stage) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, stage)
    }

    pub fn select(&self) -> EventBuilder<'a> { self.stage(Stage::Select) }
    pub fn classify(&self) -> EventBuilder<'a> { self.stage(Stage::Classify) }
    pub fn validate(&self) -> EventBuilder<'a> { self.stage(Stage::Validate) }
    pub fn gate_dry_run(&self) -> EventBuilder<'a> { self.stage(Stage::GateDryRun) }
    pub fn gate_token(&self) -> EventBuilder<'a> { self.stage(Stage::GateToken) }
    pub fn gate_confirm(&self) -> EventBuilder<'a> { self.stage(Stage::GateConfirm) }
    pub fn apply_attempt(&self) -> EventBuilder<'a> { self.stage(Stage::ApplyAttempt) }
    pub fn apply_result(&self) -> EventBuilder<'a> { self.stage(Stage::ApplyResult) }
    pub fn run_summary(&self) -> EventBuilder<'a> { self.stage(Stage::RunSummary) }
}

pub struct EventBuilder<'a> {
    ctx: &'a AuditCtx<'a>,
    stage: Stage,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a AuditCtx<'a>, stage: Stage) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stage".to_string(), json!(stage.as_event()));
        Self { ctx, stage, fields }
    }

    pub fn entity(mut self, name: impl Into<String>) -> Self {
        self.fields.insert("entity".into(), json!(name.into()));
        self
    }

    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn merge(mut self, extra: &Value) -> Self {
        if let Some(obj) = extra.as_object() {
            for (k, v) in obj {
                self.fields.insert(k.clone(), v.clone());
            }
        }
        self
    }

    pub fn error_id(mut self, id: ErrorId) -> Self {
        self.fields.insert("error_id".into(), json!(id_str(id)));
        self.fields.insert("exit_code".into(), json!(exit_code_for(id)));
        self
    }

    pub fn emit(self, decision: Decision) {
        let mut fields = self.fields;
        fields.entry("decision").or_insert(json!(decision.as_str()));
        fields.entry("schema_version").or_insert(json!(SCHEMA_VERSION));
        fields.entry("ts").or_insert(json!(self.ctx.ts));
        fields.entry("run_id").or_insert(json!(self.ctx.run_id));
        fields.entry("dry_run").or_insert(json!(self.ctx.mode.dry_run));
        self.ctx.facts.emit(
            "bulkprop",
            self.stage.as_event(),
            decision.as_str(),
            Value::Object(fields),
        );
    }

    pub fn emit_success(self) { self.emit(Decision::Success) }
    pub fn emit_failure(self) { self.emit(Decision::Failure) }
    pub fn emit_warn(self) { self.emit(Decision::Warn) }
}
