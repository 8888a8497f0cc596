use bulkprop::api::errors::EXIT_OK;
use bulkprop::TokenCheck;

use crate::helpers::{request, unattended_opts, Harness, ScriptedPrompter};

#[test]
fn ordinary_properties_never_enter_the_token_stage() {
    for property in ["compression=lz4", "atime=off", "com.example:backup=true", "QUOTA_NOTE=x"] {
        let h = Harness::default();
        let api = h.controller(&["tank/a"]);
        let mut opts = unattended_opts();
        // A wrong inline token must not matter for an ordinary property.
        opts.tokens.inline = Some("definitely-wrong".into());

        let report = api.run(&request(property, "tank/*"), &opts);

        assert_eq!(report.exit_code(), EXIT_OK, "{property}");
        assert_eq!(report.confirmation.unwrap().token, TokenCheck::NotRequired);
        assert!(h.facts.last("gate.token").is_none(), "{property}");
        assert_eq!(h.applier.calls().len(), 1);
    }
}

#[test]
fn ordinary_interactive_run_only_asks_for_the_count() {
    let h = Harness::with_prompter(ScriptedPrompter::answering(&["1"], &[]));
    let api = h.controller(&["tank/a"]);
    let mut opts = unattended_opts();
    opts.assume_yes = false;

    let report = api.run(&request("compression=lz4", "tank/*"), &opts);

    assert_eq!(report.exit_code(), EXIT_OK);
    let prompts = h.prompter.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("(1)"));
}
