//! Raw generator output handling: fence stripping and JSON parsing.

use crate::structured::error::ValidationError;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

// ``` optionally followed by a language tag such as json
fn is_opening_fence(line: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    match RE.get_or_init(|| Regex::new(r"^```[A-Za-z0-9_+-]*\s*$").ok()) {
        Some(re) => re.is_match(line),
        None => line.trim() == "```",
    }
}

/// Remove a surrounding Markdown code fence if the generator echoed one.
///
/// Only a leading delimiter line and a trailing delimiter line are removed;
/// anything else is returned trimmed but untouched.
pub fn strip_fences(raw: &str) -> &str {
    let text = raw.trim();
    if !text.starts_with("```") {
        return text;
    }

    let mut body = text;
    match body.find('\n') {
        Some(idx) if is_opening_fence(&body[..idx]) => body = &body[idx + 1..],
        Some(_) => {}
        // The whole payload is a single fence line.
        None => return "",
    }

    let trimmed_end = body.trim_end();
    if let Some(idx) = trimmed_end.rfind('\n') {
        if trimmed_end[idx + 1..].trim() == "```" {
            return trimmed_end[..idx].trim();
        }
    } else if trimmed_end.trim() == "```" {
        return "";
    }
    if let Some(stripped) = trimmed_end.strip_suffix("```") {
        return stripped.trim();
    }
    trimmed_end.trim()
}

/// Strip fences and parse the remainder as JSON.
pub fn parse_json_payload(raw: &str) -> Result<Value, ValidationError> {
    let text = strip_fences(raw);
    if text.is_empty() {
        return Err(ValidationError::malformed("Empty response, expected a JSON object"));
    }
    serde_json::from_str(text)
        .map_err(|e| ValidationError::malformed(format!("Invalid JSON: {}", e)))
}
