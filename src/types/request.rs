use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::errors::{Error, ErrorKind, Result};

/// Strategy used to compare the selection pattern against dataset names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Shell-style wildcard over the full name.
    #[default]
    Glob,
    /// Plain containment.
    Substring,
    /// Extended regular expression.
    Regex,
}

impl MatchMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MatchMode::Glob => "glob",
            MatchMode::Substring => "substring",
            MatchMode::Regex => "regex",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable `(property, value)` pair parsed from `property=value`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PropertyAssignment {
    pub property: String,
    pub value: String,
}

impl PropertyAssignment {
    /// Parse `property=value`. The value may itself contain `=`; the property may not be empty
    /// and the value may not be empty.
    pub fn parse(raw: &str) -> Result<Self> {
        let Some((property, value)) = raw.split_once('=') else {
            return Err(Error::new(
                ErrorKind::InvalidName,
                format!("expected property=value, got '{raw}'"),
            ));
        };
        let property = property.trim();
        if property.is_empty() {
            return Err(Error::new(ErrorKind::InvalidName, "empty property name"));
        }
        if value.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidName,
                format!("empty value for property '{property}'"),
            ));
        }
        if !property
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-'))
        {
            return Err(Error::new(
                ErrorKind::InvalidName,
                format!("invalid property name '{property}'"),
            ));
        }
        Ok(Self {
            property: property.to_string(),
            value: value.to_string(),
        })
    }
}

impl fmt::Display for PropertyAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.property, self.value)
    }
}

/// Mutation request: what to set and which datasets to select.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MutationRequest {
    pub assignment: PropertyAssignment,
    pub pattern: String,
    pub match_mode: MatchMode,
}

/// Sources consulted by the token gate.
#[derive(Clone, Debug, Default)]
pub struct TokenSources {
    /// Explicit `--confirm <token>`.
    pub inline: Option<String>,
    /// Value read from the token environment variable at startup.
    pub env: Option<String>,
    /// Credential file whose first line is the expected token.
    pub file: PathBuf,
}

/// Operator intent, fixed once from parsed arguments and passed by reference everywhere.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// `--dry-run`: forces preview even when `im_sure` is set.
    pub force_dry_run: bool,
    /// `--im-sure`: request live application.
    pub im_sure: bool,
    /// `--yes`: skip the typed-count confirmation.
    pub assume_yes: bool,
    /// `--debug`: the audit log also receives every stage fact, not only the summary.
    pub debug: bool,
    pub tokens: TokenSources,
    /// Redacted argv recorded in the audit log.
    pub invocation: Vec<String>,
}

impl RunOptions {
    /// Live application happens only when requested and not overridden by `--dry-run`.
    #[must_use]
    pub const fn wants_live(&self) -> bool {
        self.im_sure && !self.force_dry_run
    }
}
