/// Lenient structured-output parsing for model responses.
///
/// Models are asked to answer with bare JSON but routinely wrap it in
/// prose or code fences. The contract is an explicit ladder: try a
/// strict parse of the whole text, then extract the first delimited
/// substring, then fail closed with `None`. Callers treat `None` the
/// same as a capability failure.
use regex::Regex;
use serde_json::Value;

/// Extract a JSON array of objects from free text.
pub fn extract_array(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_array() {
            return Some(value);
        }
    }

    let re = Regex::new(r"(?s)\[\s*\{.*?\}\s*\]").expect("valid regex");
    let found = re.find(text)?;
    let value = serde_json::from_str::<Value>(found.as_str()).ok()?;
    value.is_array().then_some(value)
}

/// Extract a single JSON object from free text.
pub fn extract_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Some(value);
        }
    }

    let re = Regex::new(r"(?s)\{.*\}").expect("valid regex");
    let found = re.find(text)?;
    let value = serde_json::from_str::<Value>(found.as_str()).ok()?;
    value.is_object().then_some(value)
}
