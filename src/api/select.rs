//! Entity selector: a pure filter over one inventory snapshot.
use regex::Regex;

use super::errors::ApiError;
use crate::types::{EntityName, MatchMode};

enum Matcher<'p> {
    Glob(glob::Pattern),
    Substring(&'p str),
    Regex(Regex),
}

impl<'p> Matcher<'p> {
    fn compile(pattern: &'p str, mode: MatchMode) -> Result<Self, ApiError> {
        match mode {
            MatchMode::Glob => glob::Pattern::new(pattern)
                .map(Matcher::Glob)
                .map_err(|e| ApiError::Pattern(format!("glob '{pattern}': {e}"))),
            MatchMode::Substring => Ok(Matcher::Substring(pattern)),
            MatchMode::Regex => Regex::new(pattern)
                .map(Matcher::Regex)
                .map_err(|e| ApiError::Pattern(format!("regex '{pattern}': {e}"))),
        }
    }

    fn is_match(&self, name: &str) -> bool {
        match self {
            // `*` crosses `/`, as in a shell `case` pattern
            Matcher::Glob(p) => p.matches(name),
            Matcher::Substring(s) => name.contains(s),
            Matcher::Regex(r) => r.is_match(name),
        }
    }
}

/// Filter `inventory` down to the names matching `pattern`, preserving inventory order.
///
/// # Errors
/// - `PatternMissing` for an empty pattern
/// - `NoEntities` for an empty inventory (checked before the pattern is compiled)
/// - `Pattern` for a pattern that does not compile
/// - `NoMatch` when nothing matched
pub fn select_entities(
    inventory: &[EntityName],
    pattern: &str,
    mode: MatchMode,
) -> Result<Vec<EntityName>, ApiError> {
    if pattern.is_empty() {
        return Err(ApiError::PatternMissing);
    }
    if inventory.is_empty() {
        return Err(ApiError::NoEntities("inventory is empty".to_string()));
    }
    let matcher = Matcher::compile(pattern, mode)?;
    let selected: Vec<EntityName> = inventory
        .iter()
        .filter(|n| matcher.is_match(n.as_str()))
        .cloned()
        .collect();
    if selected.is_empty() {
        return Err(ApiError::NoMatch {
            pattern: pattern.to_string(),
            mode: mode.to_string(),
        });
    }
    Ok(selected)
}
