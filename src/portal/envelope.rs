//! Response envelope normalization
//!
//! The portal backend wraps payloads at varying depths depending on the
//! endpoint (`{"data": {"result": {"data": ..}}}`, `{"data": ..}`,
//! `{"result": ..}` or the bare record). Every read goes through
//! [`unwrap_envelope`] instead of chaining optional lookups per call site.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Extraction rules, tried in order. The first path that exists and is not
/// null wins; the empty path is the bare body.
const ENVELOPE_RULES: &[&[&str]] = &[
    &["data", "result", "data"],
    &["data", "data"],
    &["result", "data"],
    &["data"],
    &["result"],
    &[],
];

/// Strip the backend envelope and return the inner payload
pub fn unwrap_envelope(body: Value) -> Value {
    for rule in ENVELOPE_RULES {
        if let Some(found) = lookup(&body, rule) {
            if !found.is_null() {
                return found.clone();
            }
        }
    }
    body
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// Detect an error reported inside a 2xx body.
///
/// Returns the backend's message for `{"success": false, ..}` bodies and for
/// bodies carrying an `error` member (JSON-RPC style, possibly nested under
/// `data`).
pub fn embedded_error(body: &Value) -> Option<String> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request was not successful");
        return Some(message.to_string());
    }

    let error = body
        .get("error")
        .or_else(|| body.get("data").and_then(|d| d.get("error")))?;
    if error.is_null() {
        return None;
    }
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| error.as_str().map(str::to_string))
        .unwrap_or_else(|| error.to_string());
    Some(message)
}

/// Deserialize a many-to-one reference.
///
/// Accepts `42`, `[42, "Display name"]`, `false` and `null`.
pub fn many2one<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(reference_id(&value))
}

fn reference_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::Array(items) => items.first().and_then(Value::as_i64),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Deserialize an optional text field where the backend sends `false` for unset
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Deserialize an amount that may arrive as a number, a numeric string or `false`
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}
