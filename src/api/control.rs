//! Run-wide cancellation: wall-clock deadline and operator interrupt.
//!
//! Outside the apply phase nothing needs undoing, so an interrupt or expired
//! deadline ends the process at once. Inside the apply phase the executor polls
//! [`RunControl::halt`] between entities and stops cleanly; scoped guards
//! (lock, apply phase) release on the way out.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::errors::{exit_code_for, ErrorId};
use crate::types::Halt;

#[derive(Debug)]
struct Inner {
    started: Instant,
    budget: Option<Duration>,
    interrupted: AtomicBool,
    in_apply: AtomicBool,
}

#[derive(Clone, Debug)]
pub struct RunControl {
    inner: Arc<Inner>,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl RunControl {
    #[must_use]
    pub fn with_budget(budget: Duration) -> Self {
        Self::build(Some(budget))
    }

    #[must_use]
    pub fn unbounded() -> Self {
        Self::build(None)
    }

    fn build(budget: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(Inner {
                started: Instant::now(),
                budget,
                interrupted: AtomicBool::new(false),
                in_apply: AtomicBool::new(false),
            }),
        }
    }

    pub fn interrupt(&self) {
        self.inner.interrupted.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn interrupted(&self) -> bool {
        self.inner.interrupted.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .budget
            .map(|b| b.saturating_sub(self.inner.started.elapsed()))
    }

    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.remaining().is_some_and(|r| r.is_zero())
    }

    /// Reason to stop now, if any. An interrupt wins over an expired deadline.
    #[must_use]
    pub fn halt(&self) -> Option<Halt> {
        if self.interrupted() {
            Some(Halt::Interrupted)
        } else if self.timed_out() {
            Some(Halt::TimedOut)
        } else {
            None
        }
    }

    #[must_use]
    pub fn in_apply(&self) -> bool {
        self.inner.in_apply.load(Ordering::SeqCst)
    }

    /// Mark the apply phase for the lifetime of the returned guard.
    #[must_use]
    pub fn apply_phase(&self) -> ApplyPhase<'_> {
        self.inner.in_apply.store(true, Ordering::SeqCst);
        ApplyPhase { control: self }
    }

    /// Install the SIGINT/SIGTERM handler and the deadline watchdog.
    ///
    /// # Errors
    /// Returns an error if a signal handler is already installed.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let c = self.clone();
        ctrlc::set_handler(move || {
            c.interrupt();
            if !c.in_apply() {
                eprintln!("bulkprop: interrupted before any change was applied");
                std::process::exit(exit_code_for(ErrorId::E_INTERRUPTED));
            }
            eprintln!("bulkprop: interrupt received, stopping after the current dataset");
        })?;
        if let Some(remaining) = self.remaining() {
            let c = self.clone();
            std::thread::spawn(move || {
                std::thread::sleep(remaining);
                if !c.in_apply() {
                    eprintln!("bulkprop: time budget exhausted before any change was applied");
                    std::process::exit(exit_code_for(ErrorId::E_TIMEOUT));
                }
                eprintln!("bulkprop: time budget exhausted, stopping after the current dataset");
            });
        }
        Ok(())
    }
}

pub struct ApplyPhase<'a> {
    control: &'a RunControl,
}

impl Drop for ApplyPhase<'_> {
    fn drop(&mut self) {
        self.control.inner.in_apply.store(false, Ordering::SeqCst);
    }
}
