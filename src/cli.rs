//! Declarative argument schema. Parsed once into an immutable request, run
//! options and policy.
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgGroup, Parser};

use crate::api::ApiError;
use crate::constants::{DEFAULT_LOCK_PATH, DEFAULT_ZFS_BIN, LOG_ENV};
use crate::logging::redact_invocation;
use crate::policy::{LockingPolicy, Policy};
use crate::types::{MatchMode, MutationRequest, PropertyAssignment, RunOptions, TokenSources};

#[derive(Parser, Debug)]
#[command(
    name = "bulkprop",
    version,
    about = "Set one dataset property across every dataset matching a pattern",
    long_about = "Set one dataset property across every dataset matching a pattern.\n\n\
                  Without --im-sure nothing is changed: the matching datasets are previewed \
                  and the run exits 10. Sensitive properties additionally require the \
                  confirmation token, and every live run asks for the exact dataset count \
                  unless --yes is given."
)]
#[command(group(ArgGroup::new("match_mode").args(["grep", "regex"])))]
pub struct Cli {
    /// Property assignment, `property=value`.
    #[arg(value_name = "PROPERTY=VALUE")]
    pub assignment: Option<String>,

    /// Selection pattern (shell glob unless --grep or --regex).
    #[arg(value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// Treat the pattern as a plain substring.
    #[arg(long)]
    pub grep: bool,

    /// Treat the pattern as an extended regular expression.
    #[arg(long)]
    pub regex: bool,

    /// Preview only, even when --im-sure is given.
    #[arg(long)]
    pub dry_run: bool,

    /// Apply for real.
    #[arg(long)]
    pub im_sure: bool,

    /// Skip the typed-count confirmation (unattended mode).
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Confirmation token for sensitive properties.
    #[arg(long, value_name = "TOKEN")]
    pub confirm: Option<String>,

    /// Credential file holding the expected token on its first line.
    #[arg(long, value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    /// Append the audit trail (JSON lines) to this file.
    #[arg(long, value_name = "PATH", env = LOG_ENV)]
    pub log: Option<PathBuf>,

    /// Verbose diagnostics; also persists every gate decision to the audit log.
    #[arg(long)]
    pub debug: bool,

    /// Hold an advisory lock for the apply phase.
    #[arg(long)]
    pub lock: bool,

    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOCK_PATH)]
    pub lock_path: PathBuf,

    #[arg(long, value_name = "MS")]
    pub lock_timeout_ms: Option<u64>,

    /// Wall-clock budget for the whole run, prompts included.
    #[arg(long, value_name = "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Storage-management command.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_ZFS_BIN)]
    pub zfs_bin: PathBuf,

    /// Do not ask the storage layer whether the property is valid before the gate.
    #[arg(long)]
    pub no_validate: bool,
}

impl Cli {
    #[must_use]
    pub fn match_mode(&self) -> MatchMode {
        if self.regex {
            MatchMode::Regex
        } else if self.grep {
            MatchMode::Substring
        } else {
            MatchMode::Glob
        }
    }

    /// # Errors
    /// `Usage` for a missing or malformed assignment, `PatternMissing` for a
    /// missing or empty pattern.
    pub fn request(&self) -> Result<MutationRequest, ApiError> {
        let raw = self
            .assignment
            .as_deref()
            .ok_or_else(|| ApiError::Usage("missing PROPERTY=VALUE".to_string()))?;
        let assignment = PropertyAssignment::parse(raw).map_err(|e| ApiError::Usage(e.msg))?;
        let pattern = self
            .pattern
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or(ApiError::PatternMissing)?;
        Ok(MutationRequest {
            assignment,
            pattern,
            match_mode: self.match_mode(),
        })
    }

    #[must_use]
    pub fn policy(&self) -> Policy {
        let mut policy = Policy::default();
        if self.lock {
            policy.locking = LockingPolicy::Required;
        }
        if let Some(ms) = self.lock_timeout_ms {
            policy.lock_timeout_ms = ms;
        }
        if let Some(s) = self.timeout_secs {
            policy.run_timeout = Duration::from_secs(s);
        }
        policy.validate_property = !self.no_validate;
        policy
    }

    /// `env_token` is the token environment variable as read at startup.
    #[must_use]
    pub fn options<S: AsRef<str>>(
        &self,
        argv: &[S],
        env_token: Option<String>,
        policy: &Policy,
    ) -> RunOptions {
        RunOptions {
            force_dry_run: self.dry_run,
            im_sure: self.im_sure,
            assume_yes: self.yes,
            debug: self.debug,
            tokens: TokenSources {
                inline: self.confirm.clone(),
                env: env_token,
                file: self
                    .token_file
                    .clone()
                    .unwrap_or_else(|| policy.default_token_file.clone()),
            },
            invocation: redact_invocation(argv),
        }
    }
}
