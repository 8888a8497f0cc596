use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const TS_ZERO: &str = "1970-01-01T00:00:00Z";

const MASK: &str = "***";

/// Flags whose value is a secret and must never reach the audit log.
const SECRET_FLAGS: &[&str] = &["--confirm"];

pub fn now_iso() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| TS_ZERO.to_string())
}

/// Mask secret flag values in an argv, covering both `--flag value` and `--flag=value`.
#[must_use]
pub fn redact_invocation<S: AsRef<str>>(argv: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(argv.len());
    let mut mask_next = false;
    for arg in argv {
        let arg = arg.as_ref();
        if mask_next {
            out.push(MASK.to_string());
            mask_next = false;
            continue;
        }
        if SECRET_FLAGS.contains(&arg) {
            mask_next = true;
            out.push(arg.to_string());
            continue;
        }
        match SECRET_FLAGS
            .iter()
            .find(|f| arg.strip_prefix(**f).is_some_and(|rest| rest.starts_with('=')))
        {
            Some(flag) => out.push(format!("{flag}={MASK}")),
            None => out.push(arg.to_string()),
        }
    }
    out
}

/// Apply redactions to a fact event for comparison and safe logging.
/// Zeroes timestamps, removes volatile timings and masks any `token` field.
pub fn redact_event(mut v: Value) -> Value {
    if let Some(obj) = v.as_object_mut() {
        obj.insert("ts".into(), Value::String(TS_ZERO.to_string()));
        obj.remove("duration_ms");
        obj.remove("lock_wait_ms");
        obj.remove("pid");
        if obj.contains_key("token") {
            obj.insert("token".into(), Value::String(MASK.into()));
        }
    }
    v
}
