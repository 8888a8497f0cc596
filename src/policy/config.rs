use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    ABORT_KEYWORD, DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_RUN_TIMEOUT_SECS, DEFAULT_TOKEN_FILE,
    TOKEN_ENV,
};

use super::types::LockingPolicy;

/// Policy governs gate behaviour, locking and time budgets for a bulkprop run.
///
/// The sensitive-property table is not a field here: it is compiled in
/// (`constants::SENSITIVE_PROPERTIES`) and consulted by [`classify`](super::classify).
#[derive(Clone, Debug)]
pub struct Policy {
    pub locking: LockingPolicy,
    pub lock_timeout_ms: u64,
    /// Wall-clock budget for the whole run, operator prompts included.
    pub run_timeout: Duration,
    /// Literal accepted at the count confirmation to cancel.
    pub abort_keyword: String,
    /// Environment variable consulted for the supplied token.
    pub token_env: String,
    /// Credential file used when the run options do not name one.
    pub default_token_file: PathBuf,
    /// Consult the property validator (when one is attached) before the gate.
    pub validate_property: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            locking: LockingPolicy::Optional,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            run_timeout: Duration::from_secs(DEFAULT_RUN_TIMEOUT_SECS),
            abort_keyword: ABORT_KEYWORD.to_string(),
            token_env: TOKEN_ENV.to_string(),
            default_token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            validate_property: true,
        }
    }
}

impl Policy {
    /// Construct a Policy with hardened defaults for shared hosts.
    ///
    /// Enables:
    /// - `locking = Required` (a live run without a lock manager fails with `E_LOCKING`, exit 40)
    ///
    /// # Example
    /// ```rust
    /// use bulkprop::policy::Policy;
    /// use bulkprop::policy::types::LockingPolicy;
    ///
    /// let policy = Policy::strict_preset();
    /// assert_eq!(policy.locking, LockingPolicy::Required);
    /// ```
    #[must_use]
    pub fn strict_preset() -> Self {
        let mut p = Self::default();
        p.apply_strict_preset();
        p
    }

    /// Mutate this Policy to apply the hardened defaults; see `strict_preset()`.
    pub fn apply_strict_preset(&mut self) -> &mut Self {
        self.locking = LockingPolicy::Required;
        self
    }
}
