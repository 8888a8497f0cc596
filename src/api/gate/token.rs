//! Stage 2: sensitive-token verification.
//!
//! The expected secret is the first line of an operator-managed credential
//! file. The supplied token resolves `--confirm` > environment > hidden prompt.
//! Only trailing line endings are stripped; every other byte must match.
use std::path::Path;

use serde::Serialize;

use crate::adapters::prompt::{strip_line_ending, Prompter};
use crate::api::errors::ApiError;
use crate::types::TokenSources;

/// Where the supplied token came from. Recorded in facts; the token itself never is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenOrigin {
    Inline,
    Env,
    Prompt,
}

/// Read the expected token from the first line of `path`.
///
/// # Errors
/// `TokenSource` when the file is missing, unreadable, or its first line is empty.
pub fn read_expected(path: &Path) -> Result<String, ApiError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ApiError::TokenSource(format!("credential file {}: {e}", path.display()))
    })?;
    let first = raw.split_inclusive('\n').next().unwrap_or("");
    let token = strip_line_ending(first);
    if token.is_empty() {
        return Err(ApiError::TokenSource(format!(
            "credential file {} is empty",
            path.display()
        )));
    }
    Ok(token.to_string())
}

/// Resolve the operator-supplied token.
///
/// # Errors
/// `TokenMissing` when no source yields a token and the session cannot prompt.
pub fn resolve_supplied(
    sources: &TokenSources,
    prompter: &dyn Prompter,
) -> Result<(String, TokenOrigin), ApiError> {
    if let Some(t) = &sources.inline {
        return Ok((strip_line_ending(t).to_string(), TokenOrigin::Inline));
    }
    if let Some(t) = sources.env.as_deref().filter(|t| !t.is_empty()) {
        return Ok((strip_line_ending(t).to_string(), TokenOrigin::Env));
    }
    if !prompter.is_interactive() {
        return Err(ApiError::TokenMissing);
    }
    let t = prompter
        .read_secret("Confirmation token")
        .map_err(|_| ApiError::TokenMissing)?;
    Ok((strip_line_ending(&t).to_string(), TokenOrigin::Prompt))
}

fn same_bytes(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Run stage 2 against the configured sources. One attempt only.
///
/// # Errors
/// `TokenSource`, `TokenMissing`, or `TokenMismatch`.
pub fn verify(sources: &TokenSources, prompter: &dyn Prompter) -> Result<TokenOrigin, ApiError> {
    let expected = read_expected(&sources.file)?;
    let (supplied, origin) = resolve_supplied(sources, prompter)?;
    if same_bytes(expected.as_bytes(), supplied.as_bytes()) {
        Ok(origin)
    } else {
        Err(ApiError::TokenMismatch)
    }
}
