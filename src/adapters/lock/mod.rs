pub mod file;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::errors::Result;

/// Identity of the invocation holding the apply-phase lock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockHolder {
    pub pid: u32,
    pub run_id: String,
}

impl LockHolder {
    #[must_use]
    pub fn current(run_id: impl Into<String>) -> Self {
        Self {
            pid: std::process::id(),
            run_id: run_id.into(),
        }
    }
}

pub trait LockGuard: Send {}

pub trait LockManager: Send + Sync {
    /// Wait at most `timeout` for the lock and register `holder` as its owner.
    /// # Errors
    /// Returns an error if the lock cannot be acquired within `timeout`.
    fn acquire_process_lock(&self, timeout: Duration, holder: &LockHolder) -> Result<Box<dyn LockGuard>>;

    /// Short backend label recorded in `apply.attempt` facts.
    fn backend(&self) -> &'static str {
        "custom"
    }
}
