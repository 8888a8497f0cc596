use std::time::{Duration, Instant};

use log::Level;
use serde_json::json;

use crate::adapters::lock::{LockGuard, LockHolder};
use crate::api::errors::{ApiError, ErrorId};
use crate::api::Controller;
use crate::constants::LOCK_POLL_MS;
use crate::logging::{AuditSink, FactsEmitter, StageLogger};
use crate::policy::LockingPolicy;

pub(crate) struct LockInfo {
    pub lock_backend: &'static str,
    pub lock_wait_ms: Option<u64>,
    pub approx_attempts: u64,
    pub guard: Option<Box<dyn LockGuard>>,
}

/// Acquire the advisory lock for the apply phase and emit `apply.attempt`.
///
/// No lock manager and `LockingPolicy::Optional`: proceed with a WARN attempt fact.
/// No lock manager and `LockingPolicy::Required`: `E_LOCKING`.
///
/// The wait never outlasts the run deadline; running out of run budget while
/// waiting is a timeout, not a locking failure.
pub(crate) fn acquire<E: FactsEmitter, A: AuditSink>(
    api: &Controller<E, A>,
    slog: &StageLogger<'_>,
) -> Result<LockInfo, ApiError> {
    let Some(mgr) = &api.lock else {
        if api.policy.locking == LockingPolicy::Required {
            slog.apply_attempt()
                .merge(&json!({ "lock_backend": "none", "lock_attempts": 0u64 }))
                .error_id(ErrorId::E_LOCKING)
                .emit_failure();
            api.audit
                .log(Level::Error, "apply: lock manager required by policy (E_LOCKING)");
            return Err(ApiError::Locking(
                "lock manager required by policy but none configured".to_string(),
            ));
        }
        slog.apply_attempt()
            .merge(&json!({
                "lock_backend": "none",
                "no_lock_manager": true,
                "lock_attempts": 0u64,
            }))
            .emit_warn();
        return Ok(LockInfo {
            lock_backend: "none",
            lock_wait_ms: None,
            approx_attempts: 0,
            guard: None,
        });
    };

    let backend = mgr.backend();
    let lt0 = Instant::now();
    let mut timeout = Duration::from_millis(api.policy.lock_timeout_ms);
    if let Some(remaining) = api.control.remaining() {
        timeout = timeout.min(remaining);
    }
    let res = mgr.acquire_process_lock(timeout, &LockHolder::current(slog.run_id()));
    let lock_wait_ms = u64::try_from(lt0.elapsed().as_millis()).unwrap_or(u64::MAX);
    let approx_attempts = 1 + lock_wait_ms / LOCK_POLL_MS;
    let fields = json!({
        "lock_backend": backend,
        "lock_wait_ms": lock_wait_ms,
        "lock_attempts": approx_attempts,
    });
    match res {
        Ok(guard) => {
            slog.apply_attempt().merge(&fields).emit_success();
            Ok(LockInfo {
                lock_backend: backend,
                lock_wait_ms: Some(lock_wait_ms),
                approx_attempts,
                guard: Some(guard),
            })
        }
        Err(e) if api.control.timed_out() => {
            slog.apply_attempt()
                .merge(&fields)
                .error_id(ErrorId::E_TIMEOUT)
                .emit_failure();
            api.audit.log(
                Level::Error,
                &format!("apply: run budget spent waiting for the lock: {}", e.msg),
            );
            Err(ApiError::TimedOut)
        }
        Err(e) => {
            slog.apply_attempt()
                .merge(&fields)
                .error_id(ErrorId::E_LOCKING)
                .emit_failure();
            api.audit
                .log(Level::Error, "apply: lock acquisition failed (E_LOCKING)");
            Err(ApiError::Locking(e.msg))
        }
    }
}
