//! Shared crate-wide constants for bulkprop.
//!
//! Centralizes magic values and default labels used across modules.
//! Adjusting these here will propagate through the crate.

/// Literal an operator types at the count confirmation to cancel cleanly.
pub const ABORT_KEYWORD: &str = "abort";

/// Environment variable consulted for the supplied confirmation token when `--confirm` is absent.
pub const TOKEN_ENV: &str = "BULKPROP_CONFIRM_TOKEN";

/// Operator-managed credential file holding the expected token on its first line.
pub const DEFAULT_TOKEN_FILE: &str = "/etc/bulkprop/token";

/// Environment variable that may name the audit destination.
pub const LOG_ENV: &str = "BULKPROP_LOG";

/// Fixed lock identity used by the file-backed lock manager.
pub const DEFAULT_LOCK_PATH: &str = "/run/lock/bulkprop.lock";

/// Poll interval in milliseconds for the file-backed lock manager (see `adapters/lock/file.rs`).
pub const LOCK_POLL_MS: u64 = 25;

/// Default lock timeout used by `Controller::new()` unless overridden by policy.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

/// Default wall-clock budget for a whole run, prompts included.
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 3_600;

/// Default storage-management command used by the `ZfsCli` adapter.
pub const DEFAULT_ZFS_BIN: &str = "zfs";

/// Permission bits applied to a freshly created audit log (owner rw, group r).
pub const AUDIT_FILE_MODE: u32 = 0o640;

/// UUIDv5 namespace tag for deterministic run IDs.
pub const NS_TAG: &str = "https://bulkprop/run";

/// Properties whose misapplication risks data loss, capacity exhaustion or
/// durability regression. Compiled in and never read from the environment.
pub const SENSITIVE_PROPERTIES: &[&str] = &[
    "quota",
    "refquota",
    "reservation",
    "refreservation",
    "volsize",
    "recordsize",
    "volblocksize",
    "special_small_blocks",
    "primarycache",
    "secondarycache",
    "logbias",
    "sync",
    "copies",
    "checksum",
    "dedup",
    "mountpoint",
    "canmount",
    "readonly",
];
