//! Presence checks applied by reads.

use serde_json::Value;

use crate::LookupMode;

/// Reports whether `value` counts as truthy.
///
/// `null`, `false`, zero and the empty string are falsy. Arrays and objects are truthy even
/// when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl LookupMode {
    /// Returns true when a stored `value` should be reported to the caller.
    pub fn admits(self, value: &Value) -> bool {
        match self {
            LookupMode::Presence => true,
            LookupMode::Truthy => is_truthy(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_falsy_values() {
        for value in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&value), "expected {} to be falsy", value);
        }
    }

    #[test]
    fn test_truthy_values() {
        for value in [json!(true), json!(1), json!(-0.5), json!("0"), json!([]), json!({})] {
            assert!(is_truthy(&value), "expected {} to be truthy", value);
        }
    }

    #[test]
    fn test_presence_mode_admits_everything() {
        assert!(LookupMode::Presence.admits(&json!(null)));
        assert!(LookupMode::Presence.admits(&json!(0)));
        assert!(!LookupMode::Truthy.admits(&json!(0)));
        assert!(LookupMode::Truthy.admits(&json!("John")));
    }
}
