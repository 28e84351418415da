//! Tolerant field decoding
//!
//! The firmware is inconsistent about types: `vol` arrives as `"33"` on one
//! model and `33` on another. Raw response fields are therefore decoded as
//! optional strings here and coerced later, where a bad value can be
//! reported per field instead of failing the whole response.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// Reject the bodies the firmware sends instead of a result
pub(crate) fn reject_error_body(body: &str) -> crate::Result<&str> {
    let trimmed = body.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if matches!(lowered.as_str(), "unknown command" | "failed" | "fail" | "error") {
        return Err(crate::ApiError::DeviceRejected(trimmed.to_string()));
    }
    Ok(trimmed)
}
