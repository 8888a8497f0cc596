use std::time::Duration;

use bulkprop::api::errors::ErrorId;
use bulkprop::{ConfirmationState, RunControl};

use crate::helpers::{request, unattended_opts, Harness};

#[test]
fn interrupt_before_apply_touches_nothing() {
    let h = Harness::default();
    let control = RunControl::unbounded();
    control.interrupt();
    let api = h.controller(&["tank/a", "tank/b"]).with_control(control);

    let report = api.run(&request("compression=lz4", "tank/*"), &unattended_opts());

    assert_eq!(report.error_id(), Some(ErrorId::E_INTERRUPTED));
    assert_eq!(report.exit_code(), 130);
    assert!(h.applier.calls().is_empty());
}

#[test]
fn exhausted_budget_is_a_timeout() {
    let h = Harness::default();
    let api = h
        .controller(&["tank/a", "tank/b"])
        .with_control(RunControl::with_budget(Duration::ZERO));

    let report = api.run(&request("compression=lz4", "tank/*"), &unattended_opts());

    assert_eq!(report.error_id(), Some(ErrorId::E_TIMEOUT));
    assert_eq!(report.exit_code(), 60);
    assert!(h.applier.calls().is_empty());
}

#[test]
fn executor_refuses_without_a_satisfied_gate() {
    let h = Harness::default();
    let api = h.controller(&["tank/a"]);
    let targets = api.select(&request("compression=lz4", "tank/*")).unwrap();
    let assignment = request("compression=lz4", "tank/*").assignment;

    let err = api
        .execute(&assignment, &targets, &ConfirmationState::default())
        .unwrap_err();

    assert_eq!(err.id(), ErrorId::E_GENERIC);
    assert!(h.applier.calls().is_empty());
}
