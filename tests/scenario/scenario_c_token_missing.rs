//! Sensitive property, `--im-sure --yes`, no token anywhere, no terminal.

use bulkprop::api::errors::{ErrorCategory, ErrorId};

use crate::helpers::{request, unattended_opts, write_token_file, Harness};

#[test]
fn no_credential_file_stops_at_the_token_stage() {
    let h = Harness::default();
    let api = h.controller(&["tank/app1", "tank/app2"]);

    let report = api.run(&request("quota=10G", "tank/app*"), &unattended_opts());

    let err = report.result.as_ref().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Gate);
    assert_eq!(report.error_id(), Some(ErrorId::E_TOKEN_SOURCE));
    assert_eq!(report.exit_code(), 21);
    assert!(h.applier.calls().is_empty());

    let (decision, fields) = h.facts.last("gate.token").unwrap();
    assert_eq!(decision, "failure");
    assert_eq!(fields["error_id"], "E_TOKEN_SOURCE");
    assert!(h.facts.last("gate.confirm").is_none());
    assert!(h.facts.last("apply.attempt").is_none());
}

#[test]
fn nothing_supplied_and_no_terminal_is_token_missing() {
    let td = tempfile::tempdir().unwrap();
    let mut opts = unattended_opts();
    opts.tokens.file = write_token_file(td.path(), "secret123\n");
    let h = Harness::default();
    let api = h.controller(&["tank/app1", "tank/app2"]);

    let report = api.run(&request("quota=10G", "tank/app*"), &opts);

    assert_eq!(report.error_id(), Some(ErrorId::E_TOKEN_MISSING));
    assert_eq!(report.exit_code(), 20);
    assert!(h.applier.calls().is_empty());
    assert!(h.prompter.prompts().is_empty());
}
