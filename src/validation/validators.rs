//! Builtin validators

use super::error::ValidationError;
use super::validator::Validator;
use serde_json::json;

/// Values that have an emptiness and a length
pub trait Measurable {
    fn is_blank(&self) -> bool;
    fn length(&self) -> usize;
}

impl Measurable for str {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }

    fn length(&self) -> usize {
        self.chars().count()
    }
}

impl Measurable for String {
    fn is_blank(&self) -> bool {
        self.as_str().is_blank()
    }

    fn length(&self) -> usize {
        self.as_str().length()
    }
}

impl<M: Measurable + ?Sized> Measurable for &M {
    fn is_blank(&self) -> bool {
        (**self).is_blank()
    }

    fn length(&self) -> usize {
        (**self).length()
    }
}

impl<M: Measurable> Measurable for Option<M> {
    fn is_blank(&self) -> bool {
        self.as_ref().map_or(true, Measurable::is_blank)
    }

    fn length(&self) -> usize {
        self.as_ref().map_or(0, Measurable::length)
    }
}

impl<T> Measurable for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }

    fn length(&self) -> usize {
        self.len()
    }
}

/// `{ "required": true }` when the value is blank
pub fn required<M: Measurable + ?Sized>(value: &M) -> Option<ValidationError> {
    if value.is_blank() {
        return Some(ValidationError::new("required", true));
    }
    None
}

/// `{ "minLength": { "requiredLength", "actualLength" } }` when too short
pub fn min_length<M: Measurable + ?Sized>(value: &M, min: usize) -> Option<ValidationError> {
    let actual = value.length();
    if actual < min {
        return Some(ValidationError::new(
            "minLength",
            json!({ "requiredLength": min, "actualLength": actual }),
        ));
    }
    None
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl<M: Measurable> Validator<M> for Required {
    fn validate(&self, value: &M) -> Option<ValidationError> {
        required(value)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MinLength {
    min: usize,
}

impl MinLength {
    pub fn new(min: usize) -> Self {
        Self { min }
    }
}

impl<M: Measurable> Validator<M> for MinLength {
    fn validate(&self, value: &M) -> Option<ValidationError> {
        min_length(value, self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_required_rejects_empty_string() {
        assert_eq!(required(""), Some(ValidationError::new("required", true)));
        assert!(required("x").is_none());
    }

    #[test]
    fn test_required_rejects_none() {
        let value: Option<String> = None;
        assert!(required(&value).is_some());
        assert!(required(&Some("a".to_string())).is_none());
    }

    #[test]
    fn test_min_length_reports_lengths() {
        let error = min_length("test", 5).unwrap();
        assert_eq!(
            error.get("minLength"),
            Some(&json!({ "requiredLength": 5, "actualLength": 4 }))
        );
        assert!(min_length("valid value", 5).is_none());
    }

    #[test]
    fn test_min_length_counts_chars_not_bytes() {
        assert!(min_length("héllo", 5).is_none());
    }

    #[test]
    fn test_validator_objects_match_functions() {
        let value = "abc".to_string();
        assert_eq!(Required.validate(&value), required(&value));
        assert_eq!(MinLength::new(4).validate(&value), min_length(&value, 4));
    }
}
