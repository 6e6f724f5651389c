//! JSON object extraction from free-form model output.
//!
//! Models wrap their JSON in prose or markdown fences. We take everything
//! from the first `{` to the last `}` and parse exactly that; malformed JSON
//! is an error, never repaired.

use serde_json::{Map, Value};

use crate::error::ExtractError;

/// Extract the outermost JSON object from `text`.
pub fn extract_json_object(text: &str) -> Result<Map<String, Value>, ExtractError> {
    let region = object_region(text).ok_or(ExtractError::NoObject)?;
    match serde_json::from_str::<Value>(region)? {
        Value::Object(map) => Ok(map),
        // Unreachable for a `{...}` span that parses.
        _ => Err(ExtractError::NoObject),
    }
}

/// Greedy `{ ... }` span: first opening brace through last closing brace.
fn object_region(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
