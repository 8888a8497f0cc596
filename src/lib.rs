#![forbid(unsafe_code)]
//! bulkprop: safety-gated bulk property changes across storage datasets.
//!
//! Safety model highlights:
//! - Nothing is applied unless live application is requested and not overridden by `--dry-run`.
//! - Sensitive properties (quota, recordsize, sync, ...) additionally require an operator-held token.
//! - Every live run asks for the exact number of matched datasets unless unattended mode is chosen.
//! - Per-dataset failures never abort the batch, and there is no rollback.
//! - One summary record per run is appended to the audit log.

pub mod constants;
pub mod adapters;
pub mod api;
pub mod cli;
pub mod logging;
pub mod policy;
pub mod types;

pub use api::*;
