use serde::de::DeserializeOwned;

/// Parse a raw completion into the expected output type.
///
/// Models tend to wrap JSON in markdown fences or add a sentence around it, so
/// fences are stripped first and, failing a direct parse, the outermost `{...}`
/// span is tried.
pub fn parse_output<O: DeserializeOwned>(raw: &str) -> Result<O, String> {
    let cleaned = strip_code_fence(raw);

    let direct_err = match serde_json::from_str::<O>(cleaned) {
        Ok(parsed) => return Ok(parsed),
        Err(e) => e,
    };

    if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
        if start < end && (start > 0 || end < cleaned.len() - 1) {
            if let Ok(parsed) = serde_json::from_str::<O>(&cleaned[start..=end]) {
                return Ok(parsed);
            }
        }
    }

    Err(direct_err.to_string())
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
