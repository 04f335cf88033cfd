//! Renders loosely structured webhook payloads into display text.
//!
//! Webhooks behind the relay are not under our control, so the payload can be
//! any JSON value. Common wrapper shapes (`{"output": ..}`, `{"result": ..}`,
//! `{"message": ..}`) are unwrapped first, everything else falls back to a
//! `key: value` dump. Rendering never fails.

use serde_json::{Map, Number, Value};

/// Rendered for `null` or a missing payload.
pub const NO_OUTPUT: &str = "No output received.";

/// Rendered for payloads that cannot be interpreted at all.
pub const UNFORMATTABLE: &str = "Unable to format response.";

/// Formats a JSON value for display. `None` stands for an absent payload.
///
/// Lookup order for objects is `output`, then `result`, then a lone `message`
/// key. The first match wins and the remaining keys are ignored.
pub fn format_response(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NO_OUTPUT.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| format_response(Some(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::Object(map)) => format_object(map),
        Some(scalar) => plain_text(scalar),
    }
}

/// Formats a raw response body.
///
/// JSON bodies go through [`format_response`], other UTF-8 bodies are shown
/// as they are.
pub fn format_raw(bytes: &[u8]) -> String {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return UNFORMATTABLE.to_string();
    };

    if text.trim().is_empty() {
        return NO_OUTPUT.to_string();
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) => format_response(Some(&value)),
        Err(_) => text.to_string(),
    }
}

fn format_object(map: &Map<String, Value>) -> String {
    if let Some(output) = map.get("output") {
        return format_response(Some(output));
    }
    if let Some(result) = map.get("result") {
        return format_response(Some(result));
    }
    if map.len() == 1 {
        if let Some(message) = map.get("message") {
            // Passed through as is, even when the message is structured.
            return plain_text(message);
        }
    }

    map.iter()
        .map(|(key, value)| format!("{key}: {}", line_value(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

// Values inside a `key: value` line are rendered one level deep only.
fn line_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Array(items) => join_items(items, ", "),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{key}: {}", plain_text(value)))
            .collect::<Vec<_>>()
            .join(", "),
        scalar => plain_text(scalar),
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => join_items(items, ","),
        // Objects have no readable flat form
        Value::Object(_) => value.to_string(),
    }
}

// List join semantics: nulls become empty, nested lists flatten with ","
fn join_items(items: &[Value], separator: &str) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Null => String::new(),
            other => plain_text(other),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

fn number_text(n: &Number) -> String {
    if !n.is_f64() {
        return n.to_string();
    }

    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
