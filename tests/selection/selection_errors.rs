use bulkprop::api::errors::{ErrorCategory, ErrorId, EXIT_DRY_RUN};
use bulkprop::policy::{Policy, Sensitivity};
use bulkprop::types::{MatchMode, RunOutcome};

use crate::helpers::{preview_opts, request, unattended_opts, BrokenInventory, Harness};

#[test]
fn zero_matches_stop_before_classification() {
    let h = Harness::default();
    let api = h.controller(&["tank/a", "tank/b"]);

    let report = api.run(&request("quota=1T", "backup/*"), &unattended_opts());

    assert_eq!(report.error_id(), Some(ErrorId::E_NO_MATCH));
    assert_eq!(report.exit_code(), 6);
    assert_eq!(h.facts.stages(), vec!["select", "run.summary"]);
    assert_eq!(report.sensitivity, None);
    assert!(report.targets.is_empty());
    assert!(h.applier.calls().is_empty());
    let (_, summary) = h.facts.last("run.summary").unwrap();
    assert_eq!(summary["sensitive"], false);
}

#[test]
fn classification_follows_a_successful_selection() {
    let h = Harness::default();
    let api = h.controller(&["tank/a"]);

    let report = api.run(&request("quota=1T", "tank/*"), &preview_opts());

    assert_eq!(report.sensitivity, Some(Sensitivity::Sensitive));
    assert_eq!(&h.facts.stages()[..2], ["select", "classify"]);
}

#[test]
fn no_entities_is_distinct_from_no_match() {
    let empty = Harness::default();
    let report = empty
        .controller(&[])
        .run(&request("compression=lz4", "tank/*"), &unattended_opts());
    assert_eq!(report.error_id(), Some(ErrorId::E_NO_ENTITIES));
    assert_eq!(report.exit_code(), 5);
    assert_eq!(
        report.result.as_ref().unwrap_err().category(),
        ErrorCategory::Selection
    );

    let broken = Harness::default();
    let report = broken
        .controller_with(Box::new(BrokenInventory), Policy::default())
        .run(&request("compression=lz4", "tank/*"), &unattended_opts());
    assert_eq!(report.error_id(), Some(ErrorId::E_NO_ENTITIES));
    assert!(report.summary_line().contains("zfs list"));
}

#[test]
fn empty_pattern_is_pattern_missing() {
    let h = Harness::default();
    let report = h
        .controller(&["tank/a"])
        .run(&request("compression=lz4", ""), &unattended_opts());
    assert_eq!(report.exit_code(), 3);
}

#[test]
fn invalid_regex_is_a_pattern_error_not_an_empty_match() {
    let h = Harness::default();
    let mut req = request("compression=lz4", "tank/(app");
    req.match_mode = MatchMode::Regex;
    let report = h.controller(&["tank/app"]).run(&req, &unattended_opts());
    assert_eq!(report.error_id(), Some(ErrorId::E_PATTERN));
    assert_eq!(report.exit_code(), 4);
}

#[test]
fn each_match_mode_selects_in_inventory_order() {
    let inventory = ["pool/db", "tank/app1", "tank/db", "tank/app2/logs"];
    for (mode, pattern, expect) in [
        (MatchMode::Glob, "tank/app*", vec!["tank/app1", "tank/app2/logs"]),
        (MatchMode::Substring, "db", vec!["pool/db", "tank/db"]),
        (MatchMode::Regex, "^tank/app[0-9]$", vec!["tank/app1"]),
    ] {
        let h = Harness::default();
        let mut req = request("compression=lz4", pattern);
        req.match_mode = mode;
        let report = h.controller(&inventory).run(&req, &preview_opts());
        assert_eq!(report.exit_code(), EXIT_DRY_RUN);
        match &report.result {
            Ok(RunOutcome::Preview(r)) => {
                let got: Vec<&str> = r.results.iter().map(|t| t.entity.as_str()).collect();
                assert_eq!(got, expect, "{mode}");
            }
            other => panic!("expected preview, got {other:?}"),
        }
    }
}
