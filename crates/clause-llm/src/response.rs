//! Parse model output into extractions
//!
//! Models wrap JSON in markdown fences, prepend prose, or return a bare
//! array instead of the requested object. All of these are accepted.

use crate::LlmError;
use clause_domain::Extraction;
use serde_json::{Map, Value};
use tracing::debug;

/// Keys accepted for the label, in preference order
const LABEL_KEYS: [&str; 3] = ["clause_label", "feature_name", "extraction_class"];

/// Parse model output into extractions with raw labels
pub fn parse_hits(response: &str) -> Result<Vec<Extraction>, LlmError> {
    let value = parse_json_loose(response)?;

    let items = match &value {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => match obj.get("hits") {
            Some(Value::Array(items)) => items.as_slice(),
            Some(other) => {
                return Err(LlmError::InvalidResponse(format!(
                    "'hits' is not an array: {}",
                    other
                )))
            }
            None => &[],
        },
        other => {
            return Err(LlmError::InvalidResponse(format!(
                "Expected a JSON object or array, got {}",
                other
            )))
        }
    };

    let mut hits = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match item.as_object().and_then(parse_hit) {
            Some(hit) => hits.push(hit),
            None => debug!("Skipping unusable hit {}: {}", idx, item),
        }
    }

    Ok(hits)
}

/// Parse JSON, tolerating code fences and surrounding prose
pub fn parse_json_loose(response: &str) -> Result<Value, LlmError> {
    let text = strip_fences(response.trim());
    if text.is_empty() {
        return Err(LlmError::InvalidResponse("Empty model response text".to_string()));
    }

    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(e) => {
            let inner = outermost_json(text)
                .ok_or_else(|| LlmError::InvalidResponse(format!("JSON parse error: {}", e)))?;
            serde_json::from_str(inner)
                .map_err(|e| LlmError::InvalidResponse(format!("JSON parse error: {}", e)))
        }
    }
}

fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_end();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Widest `{...}` or `[...]` substring, whichever opens first
fn outermost_json(text: &str) -> Option<&str> {
    let open = text.find(['{', '['])?;
    let close = if text[open..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(close)?;
    (end > open).then(|| &text[open..=end])
}

fn parse_hit(obj: &Map<String, Value>) -> Option<Extraction> {
    let text = obj
        .get("extraction_text")
        .or_else(|| obj.get("text"))
        .and_then(Value::as_str)?;
    if text.trim().is_empty() {
        return None;
    }

    let label = LABEL_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .unwrap_or_default();

    let offset = |key: &str| {
        obj.get(key)
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
    };

    let mut hit = Extraction::new(label, text);
    if let (Some(start), Some(end)) = (offset("start_pos"), offset("end_pos")) {
        hit = hit.with_span(Some((start, end)));
    }
    Some(hit)
}
