use serde::Serialize;

use super::entity::EntityName;

/// Per-entity result of the executor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EntityOutcome {
    Applied,
    DryRunSkipped,
    Failed { reason: String },
    /// Never attempted because the run was interrupted or timed out first.
    NotAttempted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntityResult {
    pub entity: EntityName,
    #[serde(flatten)]
    pub outcome: EntityOutcome,
}

/// Why the executor stopped before reaching the end of the selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Halt {
    Interrupted,
    TimedOut,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub results: Vec<EntityResult>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted: Option<Halt>,
}

impl ExecutionReport {
    /// Preview outcome: every target recorded as skipped, nothing applied.
    #[must_use]
    pub fn dry_run(targets: &[EntityName]) -> Self {
        Self {
            results: targets
                .iter()
                .map(|t| EntityResult {
                    entity: t.clone(),
                    outcome: EntityOutcome::DryRunSkipped,
                })
                .collect(),
            duration_ms: 0,
            halted: None,
        }
    }

    fn count(&self, f: impl Fn(&EntityOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| f(&r.outcome)).count()
    }

    #[must_use]
    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::Applied))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::Failed { .. }))
    }

    #[must_use]
    pub fn not_attempted(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::NotAttempted))
    }

    #[must_use]
    pub fn dry_run_skipped(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::DryRunSkipped))
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }
}

/// Terminal result of a pipeline that got past every gate (or stopped at the preview).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Stage 1 stopped the run; every target is `DryRunSkipped`.
    Preview(ExecutionReport),
    /// The executor ran; per-entity failures are inside the report.
    Executed(ExecutionReport),
}
