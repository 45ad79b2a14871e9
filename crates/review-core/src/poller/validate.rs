use serde_json::Value;

use crate::error::ReviewError;

/// Checks the payload shape and returns the `homeworks` sequence, most recent
/// first. An empty sequence is valid.
pub fn validate_response(raw: &Value) -> Result<&[Value], ReviewError> {
    let object = raw
        .as_object()
        .ok_or_else(|| ReviewError::schema("unexpected response type"))?;

    match object.get("homeworks") {
        None | Some(Value::Null) => Err(ReviewError::schema("missing homeworks key")),
        Some(Value::Array(homeworks)) => Ok(homeworks.as_slice()),
        Some(_) => Err(ReviewError::schema("homeworks not a list")),
    }
}

/// Unwraps an older `[{"homeworks": [...]}]` payload to its first object.
/// Anything else is returned as-is and left for `validate_response` to judge.
pub fn unwrap_list_wrapped(raw: &Value) -> &Value {
    match raw.as_array().and_then(|items| items.first()) {
        Some(first) if first.is_object() => first,
        _ => raw,
    }
}
