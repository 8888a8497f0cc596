//! Mutation classifier.
//!
//! Classification is a pure function of the property name: it never looks at the
//! value, the number of targets, or the process environment.
use super::types::Sensitivity;
use crate::constants::SENSITIVE_PROPERTIES;

/// Classify a property name against the compiled-in sensitive table.
///
/// Matching is ASCII case-insensitive so `Quota` cannot slip past the token gate.
#[must_use]
pub fn classify(property: &str) -> Sensitivity {
    if SENSITIVE_PROPERTIES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(property))
    {
        Sensitivity::Sensitive
    } else {
        Sensitivity::Ordinary
    }
}
