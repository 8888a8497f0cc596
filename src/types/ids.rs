//! Deterministic UUIDv5 identifiers for runs.
//!
//! The namespace is derived from a stable tag (`NS_TAG`), so two runs with the
//! same request against the same selection share a `run_id`. That makes
//! repeated (idempotent) applications easy to correlate in the audit log.
use uuid::Uuid;

use super::{entity::EntityName, request::MutationRequest};
use crate::constants::NS_TAG;

fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, NS_TAG.as_bytes())
}

/// Compute a deterministic run identifier from the request and the ordered selection.
#[must_use]
pub fn run_id(request: &MutationRequest, targets: &[EntityName]) -> Uuid {
    let mut s = format!(
        "{}|{}|{}\n",
        request.assignment, request.match_mode, request.pattern
    );
    for t in targets {
        s.push_str(t.as_str());
        s.push('\n');
    }
    Uuid::new_v5(&namespace(), s.as_bytes())
}
