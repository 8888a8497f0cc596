use thiserror::Error;

/// Exit code of a live run that reached the end of the batch, per-entity failures included.
pub const EXIT_OK: i32 = 0;
/// Exit code of a completed dry-run preview.
pub const EXIT_DRY_RUN: i32 = 10;

/// Broad class of a terminal condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed invocation; nothing was looked at.
    Input,
    /// No entities, or nothing matched.
    Selection,
    /// A confirmation stage refused; nothing was applied.
    Gate,
    /// Lock, timeout or interrupt around the apply phase.
    Control,
    /// The audit destination could not be written.
    Audit,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid invocation: {0}")]
    Usage(String),
    #[error("no selection pattern given")]
    PatternMissing,
    #[error("invalid pattern: {0}")]
    Pattern(String),
    #[error("no datasets found: {0}")]
    NoEntities(String),
    #[error("{mode} pattern '{pattern}' matched no datasets")]
    NoMatch { pattern: String, mode: String },
    #[error("property rejected by storage layer: {0}")]
    PropertyInvalid(String),
    #[error("sensitive property requires a confirmation token and none was supplied")]
    TokenMissing,
    #[error("confirmation token source unusable: {0}")]
    TokenSource(String),
    #[error("confirmation token does not match")]
    TokenMismatch,
    #[error("confirmation mismatch: expected {expected}, got '{got}'")]
    ConfirmMismatch { expected: usize, got: String },
    #[error("aborted by operator")]
    ConfirmAborted,
    #[error("typed confirmation required but unavailable: {0}")]
    ConfirmUnavailable(String),
    #[error("executor refused: confirmation gate not satisfied")]
    GateIncomplete,
    #[error("locking failed: {0}")]
    Locking(String),
    #[error("audit log unwritable: {0}")]
    Audit(String),
    #[error("run exceeded its time budget")]
    TimedOut,
    #[error("interrupted")]
    Interrupted,
}

impl ApiError {
    #[must_use]
    pub const fn id(&self) -> ErrorId {
        match self {
            ApiError::Usage(_) => ErrorId::E_USAGE,
            ApiError::PatternMissing => ErrorId::E_PATTERN_MISSING,
            ApiError::Pattern(_) => ErrorId::E_PATTERN,
            ApiError::NoEntities(_) => ErrorId::E_NO_ENTITIES,
            ApiError::NoMatch { .. } => ErrorId::E_NO_MATCH,
            ApiError::PropertyInvalid(_) => ErrorId::E_PROPERTY,
            ApiError::TokenMissing => ErrorId::E_TOKEN_MISSING,
            ApiError::TokenSource(_) => ErrorId::E_TOKEN_SOURCE,
            ApiError::TokenMismatch => ErrorId::E_TOKEN_MISMATCH,
            ApiError::ConfirmMismatch { .. } => ErrorId::E_CONFIRM_MISMATCH,
            ApiError::ConfirmAborted => ErrorId::E_CONFIRM_ABORT,
            ApiError::ConfirmUnavailable(_) => ErrorId::E_CONFIRM_UNAVAILABLE,
            ApiError::GateIncomplete => ErrorId::E_GENERIC,
            ApiError::Locking(_) => ErrorId::E_LOCKING,
            ApiError::Audit(_) => ErrorId::E_AUDIT,
            ApiError::TimedOut => ErrorId::E_TIMEOUT,
            ApiError::Interrupted => ErrorId::E_INTERRUPTED,
        }
    }

    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        exit_code_for(self.id())
    }

    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            ApiError::Usage(_) | ApiError::PatternMissing | ApiError::Pattern(_) => {
                ErrorCategory::Input
            }
            ApiError::NoEntities(_) | ApiError::NoMatch { .. } => ErrorCategory::Selection,
            ApiError::PropertyInvalid(_)
            | ApiError::TokenMissing
            | ApiError::TokenSource(_)
            | ApiError::TokenMismatch
            | ApiError::ConfirmMismatch { .. }
            | ApiError::ConfirmAborted
            | ApiError::ConfirmUnavailable(_)
            | ApiError::GateIncomplete => ErrorCategory::Gate,
            ApiError::Locking(_) | ApiError::TimedOut | ApiError::Interrupted => {
                ErrorCategory::Control
            }
            ApiError::Audit(_) => ErrorCategory::Audit,
        }
    }
}

impl From<crate::types::Halt> for ApiError {
    fn from(h: crate::types::Halt) -> Self {
        match h {
            crate::types::Halt::Interrupted => ApiError::Interrupted,
            crate::types::Halt::TimedOut => ApiError::TimedOut,
        }
    }
}

// Stable identifiers; automation may match on these as well as on exit codes.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorId {
    E_USAGE,
    E_PATTERN_MISSING,
    E_PATTERN,
    E_NO_ENTITIES,
    E_NO_MATCH,
    E_PROPERTY,
    E_TOKEN_MISSING,
    E_TOKEN_SOURCE,
    E_TOKEN_MISMATCH,
    E_CONFIRM_MISMATCH,
    E_CONFIRM_ABORT,
    E_CONFIRM_UNAVAILABLE,
    E_LOCKING,
    E_AUDIT,
    E_TIMEOUT,
    E_INTERRUPTED,
    E_GENERIC,
}

#[must_use]
pub const fn id_str(id: ErrorId) -> &'static str {
    match id {
        ErrorId::E_USAGE => "E_USAGE",
        ErrorId::E_PATTERN_MISSING => "E_PATTERN_MISSING",
        ErrorId::E_PATTERN => "E_PATTERN",
        ErrorId::E_NO_ENTITIES => "E_NO_ENTITIES",
        ErrorId::E_NO_MATCH => "E_NO_MATCH",
        ErrorId::E_PROPERTY => "E_PROPERTY",
        ErrorId::E_TOKEN_MISSING => "E_TOKEN_MISSING",
        ErrorId::E_TOKEN_SOURCE => "E_TOKEN_SOURCE",
        ErrorId::E_TOKEN_MISMATCH => "E_TOKEN_MISMATCH",
        ErrorId::E_CONFIRM_MISMATCH => "E_CONFIRM_MISMATCH",
        ErrorId::E_CONFIRM_ABORT => "E_CONFIRM_ABORT",
        ErrorId::E_CONFIRM_UNAVAILABLE => "E_CONFIRM_UNAVAILABLE",
        ErrorId::E_LOCKING => "E_LOCKING",
        ErrorId::E_AUDIT => "E_AUDIT",
        ErrorId::E_TIMEOUT => "E_TIMEOUT",
        ErrorId::E_INTERRUPTED => "E_INTERRUPTED",
        ErrorId::E_GENERIC => "E_GENERIC",
    }
}

/// Canonical exit-code table. Automation callers depend on it; never renumber.
#[must_use]
pub const fn exit_code_for(id: ErrorId) -> i32 {
    match id {
        ErrorId::E_GENERIC => 1,
        ErrorId::E_USAGE => 2,
        ErrorId::E_PATTERN_MISSING => 3,
        ErrorId::E_PATTERN => 4,
        ErrorId::E_NO_ENTITIES => 5,
        ErrorId::E_NO_MATCH => 6,
        ErrorId::E_PROPERTY => 7,
        ErrorId::E_TOKEN_MISSING => 20,
        ErrorId::E_TOKEN_SOURCE => 21,
        ErrorId::E_TOKEN_MISMATCH => 22,
        ErrorId::E_CONFIRM_MISMATCH => 30,
        ErrorId::E_CONFIRM_ABORT => 31,
        ErrorId::E_CONFIRM_UNAVAILABLE => 32,
        ErrorId::E_LOCKING => 40,
        ErrorId::E_AUDIT => 50,
        ErrorId::E_TIMEOUT => 60,
        ErrorId::E_INTERRUPTED => 130,
    }
}
