use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid AI response format: {source}")]
pub struct ExtractError {
    #[source]
    pub source: serde_json::Error,
}

/// Strips Markdown fences and any prose around the outermost `{ ... }`.
pub fn json_slice(text: &str) -> &str {
    let trimmed = text.trim();
    let start = trimmed.find('{');
    let end = trimmed.rfind('}');

    match (start, end) {
        (Some(start), Some(end)) if start <= end => &trimmed[start..=end],
        _ => trimmed,
    }
}

fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "")
}

/// Parses model output as a JSON object payload.
pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    let cleaned = strip_fences(text);
    let json_str = json_slice(&cleaned);
    serde_json::from_str(json_str).map_err(|source| ExtractError { source })
}
