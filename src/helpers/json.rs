use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Display;

/// `{"error": "<message>"}` as returned to rejected callers
pub type ErrorMap = BTreeMap<String, String>;

pub fn error_map(err: impl Display) -> ErrorMap {
    let mut map = ErrorMap::new();
    map.insert("error".to_string(), err.to_string());
    map
}

/// Body of a 401 answer: the lone error object for a single failed check,
/// otherwise every check's error in the order the checks ran.
pub fn rejection_body(mut errors: Vec<ErrorMap>) -> Value {
    if errors.len() == 1 {
        if let Some(only) = errors.pop() {
            return serde_json::json!(only);
        }
    }
    serde_json::json!(errors)
}
