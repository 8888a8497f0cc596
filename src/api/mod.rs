// Facade for API module; delegates to submodules under src/api/

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::adapters::{
    DatasetInventory, LockManager, PropertyApplier, PropertyValidator, Prompter, TerminalPrompter,
};
use crate::logging::audit::{AuditCtx, AuditMode};
use crate::logging::{now_iso, AuditRecorder, AuditSink, FactsEmitter, StageLogger};
use crate::policy::{classify, Policy, Sensitivity};
use crate::types::{ids, EntityName, ExecutionReport, MutationRequest, PropertyAssignment, RunOptions};

mod audit;
pub mod control;
pub mod errors;
mod execute;
pub mod gate;
mod lock;
mod run;
pub mod select;

pub use control::RunControl;
pub use errors::ApiError;
pub use gate::{ConfirmationState, CountCheck, GateVerdict, TokenCheck};
pub use run::RunReport;

type Console = Box<dyn Write + Send>;

pub struct Controller<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    policy: Policy,
    inventory: Box<dyn DatasetInventory>,
    applier: Box<dyn PropertyApplier>,
    validator: Option<Box<dyn PropertyValidator>>, // optional pre-flight advisor
    prompter: Box<dyn Prompter>,
    recorder: Option<Box<dyn AuditRecorder>>, // None: no audit destination configured
    lock: Option<Box<dyn LockManager>>,       // None unless --lock or a strict policy
    control: RunControl,
    console: Mutex<Console>,
}

impl<E: FactsEmitter, A: AuditSink> Controller<E, A> {
    /// Operator output (preview, prompts context, progress) goes to stderr by default.
    pub fn new(
        facts: E,
        audit: A,
        policy: Policy,
        inventory: Box<dyn DatasetInventory>,
        applier: Box<dyn PropertyApplier>,
    ) -> Self {
        Self {
            facts,
            audit,
            policy,
            inventory,
            applier,
            validator: None,
            prompter: Box::new(TerminalPrompter),
            recorder: None,
            lock: None,
            control: RunControl::default(),
            console: Mutex::new(Box::new(io::stderr())),
        }
    }

    pub fn with_validator(mut self, validator: Box<dyn PropertyValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_prompter(mut self, prompter: Box<dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    pub fn with_recorder(mut self, recorder: Box<dyn AuditRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn with_lock_manager(mut self, lock: Box<dyn LockManager>) -> Self {
        self.lock = Some(lock);
        self
    }

    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = control;
        self
    }

    pub fn with_console(mut self, console: Box<dyn Write + Send>) -> Self {
        self.console = Mutex::new(console);
        self
    }

    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    #[must_use]
    pub fn control(&self) -> &RunControl {
        &self.control
    }

    pub(crate) fn console(&self) -> MutexGuard<'_, Console> {
        self.console.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Query the inventory once and filter it.
    ///
    /// # Errors
    /// `PatternMissing`, `NoEntities`, `Pattern` or `NoMatch`.
    pub fn select(&self, request: &MutationRequest) -> Result<Vec<EntityName>, ApiError> {
        run::select_targets(self, request)
    }

    #[must_use]
    pub fn classify(&self, property: &str) -> Sensitivity {
        classify(property)
    }

    /// Apply `assignment` to `targets` in order, isolating per-dataset failures.
    ///
    /// # Errors
    /// `GateIncomplete` unless `state` permits execution; `Locking`, `Interrupted`
    /// or `TimedOut` when the apply phase cannot start.
    pub fn execute(
        &self,
        assignment: &PropertyAssignment,
        targets: &[EntityName],
        state: &ConfirmationState,
    ) -> Result<ExecutionReport, ApiError> {
        let request = MutationRequest {
            assignment: assignment.clone(),
            pattern: String::new(),
            match_mode: Default::default(),
        };
        let ctx = AuditCtx::new(
            &self.facts as &dyn FactsEmitter,
            ids::run_id(&request, targets).to_string(),
            now_iso(),
            AuditMode { dry_run: false },
        );
        let _phase = self.control.apply_phase();
        run::apply(self, assignment, targets, state, &StageLogger::new(&ctx))
    }

    /// Full pipeline: select, classify, validate, gate, apply, record.
    pub fn run(&self, request: &MutationRequest, opts: &RunOptions) -> RunReport {
        run::run(self, request, opts)
    }
}
