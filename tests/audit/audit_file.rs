use std::os::unix::fs::PermissionsExt;

use serde_json::Value;

use bulkprop::logging::{redact_invocation, FileAuditLog};

use crate::helpers::{preview_opts, request, unattended_opts, write_token_file, Harness};

fn lines(path: &std::path::Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn summary_record_masks_the_inline_token() {
    let td = tempfile::tempdir().unwrap();
    let log = td.path().join("audit.jsonl");
    let mut opts = unattended_opts();
    opts.tokens.file = write_token_file(td.path(), "hunter2\n");
    opts.tokens.inline = Some("hunter2".into());
    opts.invocation = redact_invocation(&[
        "bulkprop", "quota=10G", "tank/*", "--im-sure", "--yes", "--confirm", "hunter2",
    ]);
    let h = Harness::default();
    let api = h
        .controller(&["tank/a"])
        .with_recorder(Box::new(FileAuditLog::new(log.clone(), false)));

    let report = api.run(&request("quota=10G", "tank/*"), &opts);
    assert_eq!(report.exit_code(), 0);

    let text = std::fs::read_to_string(&log).unwrap();
    assert!(!text.contains("hunter2"));
    let rec = &lines(&log)[0]["record"];
    assert_eq!(rec["sensitive"], true);
    assert_eq!(rec["property"], "quota");
    assert_eq!(rec["value"], "10G");
    assert_eq!(rec["match_mode"], "glob");
    assert_eq!(rec["invocation"][6], "***");
    assert!(rec["pid"].as_u64().unwrap() > 0);
    assert!(!rec["actor"].as_str().unwrap().is_empty());

    let mode = std::fs::metadata(&log).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
}

#[test]
fn preview_is_recorded_as_a_dry_run() {
    let td = tempfile::tempdir().unwrap();
    let log = td.path().join("audit.jsonl");
    let h = Harness::default();
    let api = h
        .controller(&["tank/a", "tank/b"])
        .with_recorder(Box::new(FileAuditLog::new(log.clone(), false)));

    api.run(&request("compression=lz4", "tank/*"), &preview_opts());
    api.run(&request("compression=lz4", "tank/*"), &preview_opts());

    let recs = lines(&log);
    assert_eq!(recs.len(), 2, "appended, never rewritten");
    for r in &recs {
        assert_eq!(r["record"]["mode"], "dry_run");
        assert_eq!(r["record"]["exit_code"], 10);
        assert_eq!(r["record"]["count"], 2);
        assert!(r["record"]["applied"].as_array().unwrap().is_empty());
    }
}

#[test]
fn gate_refusals_are_recorded_with_their_error_id() {
    let td = tempfile::tempdir().unwrap();
    let log = td.path().join("audit.jsonl");
    let h = Harness::default();
    let api = h
        .controller(&["tank/a"])
        .with_recorder(Box::new(FileAuditLog::new(log.clone(), false)));

    let report = api.run(&request("recordsize=1M", "tank/*"), &unattended_opts());
    assert_eq!(report.exit_code(), 21);

    let rec = &lines(&log)[0]["record"];
    assert_eq!(rec["error_id"], "E_TOKEN_SOURCE");
    assert_eq!(rec["exit_code"], 21);
    assert_eq!(rec["mode"], "live");
    assert!(rec["applied"].as_array().unwrap().is_empty());
}

#[test]
fn debug_mode_persists_every_stage_decision() {
    let td = tempfile::tempdir().unwrap();
    let log = td.path().join("audit.jsonl");
    let sink = FileAuditLog::new(log.clone(), true);
    let h = Harness::default();
    let api = bulkprop::Controller::new(
        sink.clone(),
        sink.clone(),
        bulkprop::policy::Policy::default(),
        Box::new(crate::helpers::FakeInventory::of(&["tank/a"])),
        Box::new(h.applier.clone()),
    )
    .with_prompter(Box::new(h.prompter.clone()))
    .with_console(Box::new(h.console.clone()))
    .with_recorder(Box::new(sink));

    let report = api.run(&request("compression=lz4", "tank/*"), &unattended_opts());
    assert_eq!(report.exit_code(), 0);

    let recs = lines(&log);
    let events: Vec<&str> = recs
        .iter()
        .filter(|r| r["kind"] == "fact")
        .map(|r| r["event"].as_str().unwrap())
        .collect();
    for stage in [
        "select",
        "classify",
        "gate.dry_run",
        "gate.confirm",
        "apply.attempt",
        "apply.result",
        "run.summary",
    ] {
        assert!(events.contains(&stage), "missing {stage} in {events:?}");
    }
    assert_eq!(recs.iter().filter(|r| r["kind"] == "run").count(), 1);
    let facts = recs.iter().filter(|r| r["kind"] == "fact");
    for f in facts {
        assert_eq!(f["fields"]["run_id"], report.run_id);
        assert_eq!(f["fields"]["schema_version"], 1);
    }
}
