use serde_json::Value;
use sha2::{Digest, Sha256};

const FINGERPRINT_HEX_LEN: usize = 12;
const REDACTED_PROPERTY_SETS: [&str; 2] = ["ResourceProperties", "OldResourceProperties"];

/// Short, stable digest of a secret so that revisions can be told apart in
/// logs without exposing the value.
pub fn value_fingerprint(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..FINGERPRINT_HEX_LEN].to_string()
}

pub fn redaction_marker(value: &str) -> String {
    format!(
        "<redacted len={} sha256={}>",
        value.len(),
        value_fingerprint(value)
    )
}

/// Copy of a custom-resource event that is safe to log: every `Value` under
/// the current and previous resource properties is replaced by a marker.
pub fn redact_event(event: &Value) -> Value {
    let mut redacted = event.clone();
    for key in REDACTED_PROPERTY_SETS {
        let Some(properties) = redacted.get_mut(key).and_then(Value::as_object_mut) else {
            continue;
        };
        if let Some(secret) = properties.get_mut("Value") {
            let marker = match secret {
                Value::String(text) => redaction_marker(text),
                _ => "<redacted>".to_string(),
            };
            *secret = Value::String(marker);
        }
    }
    redacted
}
