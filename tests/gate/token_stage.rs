use bulkprop::api::errors::{ErrorId, EXIT_OK};
use bulkprop::types::RunOptions;
use bulkprop::TokenCheck;

use crate::helpers::{request, unattended_opts, write_token_file, Harness, ScriptedPrompter};

fn opts_with(file_contents: &str, dir: &std::path::Path) -> RunOptions {
    let mut o = unattended_opts();
    o.tokens.file = write_token_file(dir, file_contents);
    o
}

fn run_quota(h: &Harness, opts: &RunOptions) -> bulkprop::RunReport {
    h.controller(&["tank/a", "tank/b"])
        .run(&request("quota=10G", "tank/*"), opts)
}

#[test]
fn inline_token_matching_first_line_proceeds() {
    let td = tempfile::tempdir().unwrap();
    let mut opts = opts_with("secret123\nsecond line ignored\n", td.path());
    opts.tokens.inline = Some("secret123".into());
    let h = Harness::default();

    let report = run_quota(&h, &opts);

    assert_eq!(report.exit_code(), EXIT_OK);
    assert_eq!(report.confirmation.unwrap().token, TokenCheck::Verified);
    assert_eq!(h.applier.calls().len(), 2);
    let (decision, fields) = h.facts.last("gate.token").unwrap();
    assert_eq!(decision, "success");
    assert_eq!(fields["origin"], "inline");
    assert!(!fields.to_string().contains("secret123"));
}

#[test]
fn comparison_is_exact_after_stripping_line_endings() {
    let td = tempfile::tempdir().unwrap();
    for (file, supplied, ok) in [
        ("secret123\n", "secret123", true),
        ("secret123\r\n", "secret123", true),
        ("secret123", "secret123\n", true),
        ("secret123\n", "secret123 ", false),
        ("secret123\n", "Secret123", false),
        ("secret123\n", "secret12", false),
        ("secret123 \n", "secret123", false),
    ] {
        let mut opts = opts_with(file, td.path());
        opts.tokens.inline = Some(supplied.into());
        let h = Harness::default();

        let report = run_quota(&h, &opts);

        if ok {
            assert_eq!(report.exit_code(), EXIT_OK, "{file:?} vs {supplied:?}");
            assert_eq!(h.applier.calls().len(), 2);
        } else {
            assert_eq!(report.error_id(), Some(ErrorId::E_TOKEN_MISMATCH), "{file:?} vs {supplied:?}");
            assert_eq!(report.exit_code(), 22);
            assert!(h.applier.calls().is_empty());
        }
    }
}

#[test]
fn inline_wins_over_environment() {
    let td = tempfile::tempdir().unwrap();
    let mut opts = opts_with("secret123\n", td.path());
    opts.tokens.inline = Some("wrong".into());
    opts.tokens.env = Some("secret123".into());
    let h = Harness::default();

    assert_eq!(run_quota(&h, &opts).error_id(), Some(ErrorId::E_TOKEN_MISMATCH));
}

#[test]
fn environment_token_is_used_when_no_inline_token() {
    let td = tempfile::tempdir().unwrap();
    let mut opts = opts_with("secret123\n", td.path());
    opts.tokens.env = Some("secret123".into());
    let h = Harness::default();

    let report = run_quota(&h, &opts);

    assert_eq!(report.exit_code(), EXIT_OK);
    assert_eq!(h.facts.last("gate.token").unwrap().1["origin"], "env");
}

#[test]
fn interactive_session_prompts_for_the_token_once() {
    let td = tempfile::tempdir().unwrap();
    let opts = opts_with("secret123\n", td.path());
    let h = Harness::with_prompter(ScriptedPrompter::answering(&[], &["secret123"]));

    let report = run_quota(&h, &opts);

    assert_eq!(report.exit_code(), EXIT_OK);
    assert_eq!(h.prompter.prompts().len(), 1);
    assert_eq!(h.facts.last("gate.token").unwrap().1["origin"], "prompt");
}

#[test]
fn a_wrong_prompted_token_is_not_retried() {
    let td = tempfile::tempdir().unwrap();
    let opts = opts_with("secret123\n", td.path());
    let h = Harness::with_prompter(ScriptedPrompter::answering(&[], &["nope", "secret123"]));

    let report = run_quota(&h, &opts);

    assert_eq!(report.exit_code(), 22);
    assert_eq!(h.prompter.prompts().len(), 1);
    assert!(h.applier.calls().is_empty());
}

#[test]
fn empty_credential_file_is_a_hard_failure() {
    let td = tempfile::tempdir().unwrap();
    for contents in ["", "\n", "\nsecret123\n"] {
        let mut opts = opts_with(contents, td.path());
        opts.tokens.inline = Some(String::new());
        let h = Harness::default();

        let report = run_quota(&h, &opts);

        assert_eq!(report.error_id(), Some(ErrorId::E_TOKEN_SOURCE), "{contents:?}");
        assert!(h.applier.calls().is_empty());
    }
}
