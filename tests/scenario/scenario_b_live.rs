//! Scenario A plus `--im-sure --yes` on an ordinary property.

use serde_json::Value;

use bulkprop::api::errors::EXIT_OK;
use bulkprop::logging::FileAuditLog;
use bulkprop::types::RunOutcome;
use bulkprop::{CountCheck, TokenCheck};

use crate::helpers::{request, unattended_opts, Harness};

#[test]
fn live_unattended_run_applies_every_match_and_records_it() {
    let td = tempfile::tempdir().unwrap();
    let log = td.path().join("audit.jsonl");
    let h = Harness::default();
    let api = h
        .controller(&["tank/app1", "tank/app2", "tank/db"])
        .with_recorder(Box::new(FileAuditLog::new(log.clone(), false)));

    let report = api.run(&request("compression=lz4", "tank/app*"), &unattended_opts());

    assert_eq!(report.exit_code(), EXIT_OK);
    assert_eq!(
        h.applier.calls(),
        vec!["tank/app1:compression=lz4", "tank/app2:compression=lz4"]
    );
    let state = report.confirmation.expect("gate passed");
    assert_eq!(state.token, TokenCheck::NotRequired);
    assert_eq!(state.count, CountCheck::AssumeYes);
    match &report.result {
        Ok(RunOutcome::Executed(r)) => {
            assert_eq!(r.applied(), 2);
            assert_eq!(r.failed(), 0);
        }
        other => panic!("expected execution, got {other:?}"),
    }
    assert!(h.console.text().contains("NOTICE: --yes"));
    assert!(h.console.text().contains("[2/2 100%] applied tank/app2"));

    let text = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(lines.len(), 1, "exactly one summary record per run");
    let rec = &lines[0]["record"];
    assert_eq!(lines[0]["kind"], "run");
    assert_eq!(rec["count"], 2);
    assert_eq!(rec["mode"], "live");
    assert_eq!(rec["sensitive"], false);
    assert_eq!(rec["applied"].as_array().unwrap().len(), 2);
    assert_eq!(rec["exit_code"], 0);
    assert_eq!(rec["run_id"], report.run_id);
    assert!(rec.get("error_id").is_none());
}
