//! Human-readable messages carried by action endpoint responses.

use serde_json::Value;

/// Pulls a display message out of an action response body.
///
/// Checked in order: a JSON string body, `message`, a string `detail`, then
/// `detail.message`. Bodies that are not JSON carry no message.
pub fn extract_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    message_from_value(&value)
}

pub fn message_from_value(value: &Value) -> Option<String> {
    let candidate = match value {
        Value::String(text) => Some(text.as_str()),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| fields.get("detail").and_then(Value::as_str))
            .or_else(|| {
                fields
                    .get("detail")
                    .and_then(|detail| detail.get("message"))
                    .and_then(Value::as_str)
            }),
        _ => None,
    };

    candidate
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
