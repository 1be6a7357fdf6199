//! Validation of the generative service's structured answer.
//!
//! The contract is a flat JSON object with string fields `before`, `after` and
//! `why`. Models occasionally wrap a field in the wrong container, so values
//! are coerced to text before the non-empty check.

use super::types::PromptRewrite;
use crate::error::AppError;
use serde_json::{Map, Value};

/// Parses `raw` into a rewrite triple, replacing `before` with the text that was
/// actually submitted.
pub fn parse_rewrite(raw: &str, submitted: &str) -> Result<PromptRewrite, AppError> {
    let value: Value = serde_json::from_str(raw.trim())?;
    let object = value
        .as_object()
        .ok_or_else(|| AppError::UpstreamFormat("Response is not a JSON object".to_string()))?;

    // `before` is contractual even though the submitted text replaces it.
    required_text(object, "before")?;
    let after = required_text(object, "after")?;
    let why = required_text(object, "why")?;

    Ok(PromptRewrite {
        before: submitted.trim().to_string(),
        after,
        why,
    })
}

fn required_text(object: &Map<String, Value>, key: &str) -> Result<String, AppError> {
    let value = object
        .get(key)
        .ok_or_else(|| AppError::UpstreamFormat(format!("Missing field '{}'", key)))?;
    let text = coerce_text(value)
        .ok_or_else(|| AppError::UpstreamFormat(format!("Field '{}' is not text", key)))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::UpstreamFormat(format!("Field '{}' is empty", key)));
    }
    Ok(text.to_string())
}

/// Objects become JSON text, arrays are joined with spaces, scalars use their
/// textual form. `null` has no text.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => Some(value.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" "),
        ),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
    }
}
