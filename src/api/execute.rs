//! Mutation executor: best-effort, independent application per dataset.
//!
//! A failing dataset is recorded and the batch moves on. There is no rollback:
//! datasets changed before a later failure stay changed.
use std::io::Write;
use std::time::Instant;

use serde_json::json;

use super::control::RunControl;
use crate::adapters::PropertyApplier;
use crate::logging::StageLogger;
use crate::types::{EntityName, EntityOutcome, EntityResult, ExecutionReport, PropertyAssignment};

fn percent(done: usize, total: usize) -> usize {
    if total == 0 {
        100
    } else {
        done * 100 / total
    }
}

pub(crate) fn run(
    applier: &dyn PropertyApplier,
    assignment: &PropertyAssignment,
    targets: &[EntityName],
    control: &RunControl,
    slog: &StageLogger<'_>,
    console: &mut dyn Write,
) -> ExecutionReport {
    let t0 = Instant::now();
    let total = targets.len();
    let mut results = Vec::with_capacity(total);
    let mut halted = None;

    for (idx, entity) in targets.iter().enumerate() {
        if halted.is_none() {
            halted = control.halt();
        }
        if halted.is_some() {
            results.push(EntityResult {
                entity: entity.clone(),
                outcome: EntityOutcome::NotAttempted,
            });
            continue;
        }

        let n = idx + 1;
        let outcome = match applier.apply(assignment, entity) {
            Ok(()) => {
                let _ = writeln!(console, "[{n}/{total} {:>3}%] applied {entity}", percent(n, total));
                slog.apply_result()
                    .entity(entity.as_str())
                    .field("index", json!(n))
                    .emit_success();
                EntityOutcome::Applied
            }
            Err(e) => {
                let _ = writeln!(
                    console,
                    "[{n}/{total} {:>3}%] FAILED  {entity}: {}",
                    percent(n, total),
                    e.msg
                );
                slog.apply_result()
                    .entity(entity.as_str())
                    .field("index", json!(n))
                    .field("error", json!(e.msg))
                    .emit_failure();
                EntityOutcome::Failed { reason: e.msg }
            }
        };
        results.push(EntityResult {
            entity: entity.clone(),
            outcome,
        });
    }

    ExecutionReport {
        results,
        duration_ms: u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX),
        halted,
    }
}
