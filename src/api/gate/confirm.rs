//! Stage 3: the operator types the exact number of selected datasets.
use std::io::{self, Write};

use super::CountCheck;
use crate::adapters::prompt::Prompter;
use crate::api::errors::ApiError;
use crate::types::RunOptions;

/// Run stage 3 for a selection of `count` datasets.
///
/// Notices go to `console`. Non-interactive sessions without `--yes` fail closed.
///
/// # Errors
/// `ConfirmAborted`, `ConfirmMismatch` or `ConfirmUnavailable`.
pub fn confirm_count(
    count: usize,
    opts: &RunOptions,
    abort_keyword: &str,
    prompter: &dyn Prompter,
    console: &mut dyn Write,
) -> Result<CountCheck, ApiError> {
    if opts.assume_yes {
        let _ = writeln!(
            console,
            "NOTICE: --yes given, skipping typed confirmation for {count} dataset(s)."
        );
        return Ok(CountCheck::AssumeYes);
    }
    if !prompter.is_interactive() {
        return Err(ApiError::ConfirmUnavailable(
            "no terminal attached; pass --yes to run unattended".to_string(),
        ));
    }
    let prompt = format!(
        "Type the number of datasets to modify ({count}) to proceed, or '{abort_keyword}' to cancel: "
    );
    let answer = match prompter.read_line(&prompt) {
        Ok(a) => a,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(ApiError::ConfirmUnavailable("input closed".to_string()))
        }
        Err(e) => return Err(ApiError::ConfirmUnavailable(e.to_string())),
    };
    if answer == abort_keyword {
        return Err(ApiError::ConfirmAborted);
    }
    if answer == count.to_string() {
        Ok(CountCheck::Typed)
    } else {
        Err(ApiError::ConfirmMismatch {
            expected: count,
            got: answer,
        })
    }
}
