//! Form field value objects

use crate::validation::Measurable;
use serde::{Deserialize, Serialize};

/// Type-safe field values for forms whose fields differ in type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl FieldValue {
    /// Create a new text value
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Get the text value (returns empty string for non-text values)
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s,
            _ => "",
        }
    }

    /// Get the integer value (returns 0 for non-integer values)
    pub fn as_integer(&self) -> i64 {
        match self {
            FieldValue::Integer(n) => *n,
            _ => 0,
        }
    }

    pub fn as_bool(&self) -> bool {
        matches!(self, FieldValue::Boolean(true))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Boolean(b) => if *b { "Yes" } else { "No" }.to_string(),
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }

    /// Convert a JSON scalar; arrays, objects and non-integral numbers are rejected
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(FieldValue::Null),
            serde_json::Value::Bool(b) => Some(FieldValue::Boolean(b)),
            serde_json::Value::Number(n) => n.as_i64().map(FieldValue::Integer),
            serde_json::Value::String(s) => Some(FieldValue::Text(s)),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

/// Null and empty text are blank; text length is in chars, integers count digits
impl Measurable for FieldValue {
    fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Boolean(_) | FieldValue::Integer(_) => false,
        }
    }

    fn length(&self) -> usize {
        match self {
            FieldValue::Null => 0,
            FieldValue::Text(s) => s.chars().count(),
            FieldValue::Boolean(_) | FieldValue::Integer(_) => self.display_value().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{min_length, required};
    use serde_json::json;

    #[test]
    fn test_default_is_null() {
        assert!(FieldValue::default().is_null());
    }

    #[test]
    fn test_accessors_fall_back_for_other_variants() {
        assert_eq!(FieldValue::Integer(3).as_text(), "");
        assert_eq!(FieldValue::text("x").as_integer(), 0);
        assert!(!FieldValue::Null.as_bool());
        assert!(FieldValue::Boolean(true).as_bool());
    }

    #[test]
    fn test_display_value() {
        assert_eq!(FieldValue::Null.display_value(), "");
        assert_eq!(FieldValue::Boolean(false).display_value(), "No");
        assert_eq!(FieldValue::Integer(42).display_value(), "42");
        assert_eq!(FieldValue::text("hi").display_value(), "hi");
    }

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(FieldValue::from_json(json!(null)), Some(FieldValue::Null));
        assert_eq!(FieldValue::from_json(json!(7)), Some(FieldValue::Integer(7)));
        assert_eq!(FieldValue::from_json(json!("a")), Some(FieldValue::text("a")));
        assert_eq!(FieldValue::from_json(json!(1.5)), None);
        assert_eq!(FieldValue::from_json(json!([1])), None);
    }

    #[test]
    fn test_serializes_untagged() {
        let values = vec![
            FieldValue::Null,
            FieldValue::Boolean(true),
            FieldValue::Integer(2),
            FieldValue::text("x"),
        ];
        assert_eq!(serde_json::to_value(&values).unwrap(), json!([null, true, 2, "x"]));
    }

    #[test]
    fn test_builtin_validators_accept_field_values() {
        assert!(required(&FieldValue::Null).is_some());
        assert!(required(&FieldValue::text("")).is_some());
        assert!(required(&FieldValue::Integer(0)).is_none());
        assert!(min_length(&FieldValue::text("abc"), 4).is_some());
    }
}
