use std::time::{Duration, Instant};

use bulkprop::adapters::{FileLockManager, LockHolder, LockManager};
use bulkprop::api::errors::ErrorId;
use bulkprop::policy::Policy;
use bulkprop::RunControl;

use crate::helpers::{request, unattended_opts, FakeInventory, Harness};

#[test]
fn held_lock_times_out_with_locking_error_naming_the_holder() {
    let td = tempfile::tempdir().unwrap();
    let lock_path = td.path().join("bulkprop.lock");
    let other = FileLockManager::new(lock_path.clone());
    let _held = other
        .acquire_process_lock(Duration::from_secs(1), &LockHolder::current("nightly-batch"))
        .unwrap();

    let h = Harness::default();
    let policy = Policy {
        lock_timeout_ms: 60,
        ..Policy::strict_preset()
    };
    let api = h
        .controller_with(Box::new(FakeInventory::of(&["tank/a", "tank/b"])), policy)
        .with_lock_manager(Box::new(FileLockManager::new(lock_path)));

    let report = api.run(&request("compression=lz4", "tank/*"), &unattended_opts());

    assert_eq!(report.error_id(), Some(ErrorId::E_LOCKING));
    assert_eq!(report.exit_code(), 40);
    assert!(report.summary_line().contains("nightly-batch"), "{}", report.summary_line());
    assert!(h.applier.calls().is_empty());
    let (_, fields) = h.facts.last("apply.attempt").unwrap();
    assert!(fields["lock_attempts"].as_u64().unwrap() >= 1);
}

#[test]
fn lock_wait_is_capped_by_the_run_deadline() {
    let td = tempfile::tempdir().unwrap();
    let lock_path = td.path().join("bulkprop.lock");
    let other = FileLockManager::new(lock_path.clone());
    let _held = other
        .acquire_process_lock(Duration::from_secs(1), &LockHolder::current("nightly-batch"))
        .unwrap();

    let h = Harness::default();
    let policy = Policy {
        lock_timeout_ms: 30_000,
        ..Policy::strict_preset()
    };
    let api = h
        .controller_with(Box::new(FakeInventory::of(&["tank/a"])), policy)
        .with_lock_manager(Box::new(FileLockManager::new(lock_path)))
        .with_control(RunControl::with_budget(Duration::from_millis(300)));

    let t0 = Instant::now();
    let report = api.run(&request("compression=lz4", "tank/*"), &unattended_opts());

    assert!(t0.elapsed() < Duration::from_secs(10));
    assert_eq!(report.error_id(), Some(ErrorId::E_TIMEOUT));
    assert_eq!(report.exit_code(), 60);
    assert!(h.applier.calls().is_empty());
}
