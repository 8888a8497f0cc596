use bulkprop::adapters::FileLockManager;
use bulkprop::api::errors::{ErrorId, EXIT_DRY_RUN, EXIT_OK};
use bulkprop::policy::Policy;

use crate::helpers::{preview_opts, request, unattended_opts, FakeInventory, Harness};

#[test]
fn required_lock_without_manager_fails_before_any_change() {
    let h = Harness::default();
    let api = h.controller_with(Box::new(FakeInventory::of(&["tank/a"])), Policy::strict_preset());

    let report = api.run(&request("compression=lz4", "tank/*"), &unattended_opts());

    assert_eq!(report.error_id(), Some(ErrorId::E_LOCKING));
    assert_eq!(report.exit_code(), 40);
    assert!(h.applier.calls().is_empty());
    let (decision, fields) = h.facts.last("apply.attempt").unwrap();
    assert_eq!(decision, "failure");
    assert_eq!(fields["error_id"], "E_LOCKING");
    assert_eq!(fields["exit_code"], 40);
}

#[test]
fn preview_never_needs_the_lock() {
    let h = Harness::default();
    let api = h.controller_with(Box::new(FakeInventory::of(&["tank/a"])), Policy::strict_preset());

    let report = api.run(&request("compression=lz4", "tank/*"), &preview_opts());

    assert_eq!(report.exit_code(), EXIT_DRY_RUN);
}

#[test]
fn optional_lock_without_manager_warns_and_proceeds() {
    let h = Harness::default();
    let api = h.controller(&["tank/a"]);

    let report = api.run(&request("compression=lz4", "tank/*"), &unattended_opts());

    assert_eq!(report.exit_code(), EXIT_OK);
    let (decision, fields) = h.facts.last("apply.attempt").unwrap();
    assert_eq!(decision, "warn");
    assert_eq!(fields["no_lock_manager"], true);
}

#[test]
fn file_lock_is_taken_and_released() {
    let td = tempfile::tempdir().unwrap();
    let lock_path = td.path().join("run/bulkprop.lock");
    let h = Harness::default();
    let api = h
        .controller_with(Box::new(FakeInventory::of(&["tank/a"])), Policy::strict_preset())
        .with_lock_manager(Box::new(FileLockManager::new(lock_path.clone())));

    let first = api.run(&request("compression=lz4", "tank/*"), &unattended_opts());
    let second = api.run(&request("compression=lz4", "tank/*"), &unattended_opts());

    assert_eq!(first.exit_code(), EXIT_OK);
    assert_eq!(second.exit_code(), EXIT_OK, "guard released after the first run");
    assert!(lock_path.exists());
    assert!(FileLockManager::new(lock_path).holder().is_none(), "holder cleared on release");
    let (decision, fields) = h.facts.last("apply.attempt").unwrap();
    assert_eq!(decision, "success");
    assert_eq!(fields["lock_backend"], "file");
}
