use std::io::{self, Write};

use crate::policy::Sensitivity;
use crate::types::{EntityName, MutationRequest, RunOptions};

/// Stage 1: true when the run stays a preview. `--dry-run` beats `--im-sure`.
#[must_use]
pub fn stays_preview(opts: &RunOptions) -> bool {
    !opts.wants_live()
}

/// Render the preview: target list, assignment and a risk banner.
///
/// # Errors
/// Returns an error when the writer fails.
pub fn render_preview(
    w: &mut dyn Write,
    request: &MutationRequest,
    targets: &[EntityName],
    sensitivity: Sensitivity,
) -> io::Result<()> {
    writeln!(w, "DRY RUN: nothing will be changed.")?;
    writeln!(
        w,
        "Would set {} on {} dataset(s) selected by {} pattern '{}':",
        request.assignment,
        targets.len(),
        request.match_mode,
        request.pattern
    )?;
    let width = targets.len().to_string().len();
    for (i, t) in targets.iter().enumerate() {
        writeln!(w, "  {:>width$}. {t}", i + 1)?;
    }
    writeln!(w)?;
    if sensitivity.is_sensitive() {
        writeln!(
            w,
            "!!! WARNING: '{}' is a SENSITIVE property. A wrong value can exhaust capacity, \
             lose data or degrade durability on every dataset above.",
            request.assignment.property
        )?;
        writeln!(w, "!!! Applying it requires a confirmation token.")?;
    } else {
        writeln!(
            w,
            "WARNING: this changes {} dataset(s) at once. Review the list above.",
            targets.len()
        )?;
    }
    writeln!(w, "Re-run with --im-sure to apply.")?;
    Ok(())
}
