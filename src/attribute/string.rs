//! String attribute descriptor.
//!
//! This module provides [`StringAttribute`] for fields stored as JSON
//! strings, with an optional maximum length.

use serde_json::Value;

use crate::error::{ErrorKind, ValidationError};

use super::traits::Descriptor;
use super::AttributeOptions;

/// A descriptor for string fields.
///
/// Values must already be JSON strings; nothing is converted implicitly.
/// Length is counted in characters (Unicode scalar values), not bytes.
///
/// # Example
///
/// ```rust
/// use eav_schema::{Attribute, Descriptor};
/// use serde_json::json;
///
/// let attr = Attribute::string()
///     .max_length(5)
///     .choices(["draft", "live"]);
///
/// assert!(attr.validate(Some(&json!("live"))).is_success());
/// assert!(attr.validate(Some(&json!("archived"))).is_failure());
/// assert!(attr.validate(Some(&json!(42))).is_failure());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StringAttribute {
    /// Options shared by every descriptor kind.
    pub options: AttributeOptions<String>,
    /// Maximum length in characters.
    pub max_length: Option<usize>,
}

impl StringAttribute {
    /// Creates a required string descriptor with no constraints.
    pub fn new() -> Self {
        Self {
            options: AttributeOptions::default(),
            max_length: None,
        }
    }

    /// Adds a maximum length constraint (inclusive).
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    common_builders!(String);
}

impl Descriptor for StringAttribute {
    type Native = String;

    const TYPE_NAME: &'static str = "string";

    fn options(&self) -> &AttributeOptions<String> {
        &self.options
    }

    fn coerce(&self, value: &Value) -> Result<String, ValidationError> {
        match value.as_str() {
            Some(s) => Ok(s.to_string()),
            None => Err(self.type_error(value)),
        }
    }

    fn check_constraints(&self, value: &String) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(max) = self.max_length {
            let len = value.chars().count();
            if len > max {
                errors.push(
                    ValidationError::new(
                        self.key(),
                        ErrorKind::ConstraintViolation,
                        format!("{} must be at most {} characters.", self.options.name, max),
                    )
                    .with_code("max_length")
                    .with_expected(format!("at most {} characters", max))
                    .with_got(format!("{} characters", len)),
                );
            }
        }
        errors
    }

    fn to_json(&self, value: &String) -> Value {
        Value::String(value.clone())
    }

    /// Quotes with `'` unless the text contains `'` but no `"`, escaping
    /// backslashes, the chosen quote and control characters.
    fn repr(value: &String) -> String {
        let quote = if value.contains('\'') && !value.contains('"') {
            '"'
        } else {
            '\''
        };

        let mut out = String::with_capacity(value.len() + 2);
        out.push(quote);
        for c in value.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c == quote => {
                    out.push('\\');
                    out.push(c);
                }
                c if c.is_control() => out.push_str(&format!("\\x{:02x}", u32::from(c))),
                c => out.push(c),
            }
        }
        out.push(quote);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stillwater::Validation;

    fn named(attr: StringAttribute, name: &str) -> StringAttribute {
        let mut attr = attr;
        attr.options.name = name.to_string();
        attr
    }

    fn unwrap_success<T, E: std::fmt::Debug>(v: Validation<T, E>) -> T {
        v.into_result().unwrap()
    }

    fn unwrap_failure<T: std::fmt::Debug, E>(v: Validation<T, E>) -> E {
        v.into_result().unwrap_err()
    }

    #[test]
    fn test_accepts_string() {
        let attr = named(StringAttribute::new(), "name");
        assert_eq!(
            unwrap_success(attr.validate(Some(&json!("hello")))),
            Some("hello".to_string())
        );
    }

    #[test]
    fn test_rejects_non_string() {
        let attr = named(StringAttribute::new(), "name");

        for value in [json!(42), json!(true), json!([1, 2]), json!({"a": 1})] {
            let errors = unwrap_failure(attr.validate(Some(&value)));
            assert_eq!(errors.first().kind, ErrorKind::TypeMismatch);
            assert_eq!(errors.first().message, "name must be a string.");
        }
    }

    #[test]
    fn test_max_length() {
        let attr = named(StringAttribute::new().max_length(5), "code");

        assert!(attr.validate(Some(&json!("abcde"))).is_success());
        let errors = unwrap_failure(attr.validate(Some(&json!("abcdef"))));
        assert_eq!(errors.first().code, "max_length");
        assert!(errors.first().message.contains("at most 5"));
    }

    #[test]
    fn test_max_length_counts_characters() {
        let attr = named(StringAttribute::new().max_length(3), "code");
        assert!(attr.validate(Some(&json!("日本語"))).is_success());
        assert!(attr.validate(Some(&json!("日本語!"))).is_failure());
    }

    #[test]
    fn test_choices() {
        let attr = named(StringAttribute::new().choices(["a", "b", "c"]), "option");

        assert!(attr.validate(Some(&json!("a"))).is_success());
        let errors = unwrap_failure(attr.validate(Some(&json!("d"))));
        assert_eq!(errors.first().code, "choices");
        assert_eq!(errors.first().message, "option must be one of: 'a', 'b', 'c'.");
    }

    #[test]
    fn test_repr_quotes_and_escapes() {
        assert_eq!(StringAttribute::repr(&"plain".to_string()), "'plain'");
        assert_eq!(StringAttribute::repr(&"it's".to_string()), "\"it's\"");
        assert_eq!(
            StringAttribute::repr(&"it's \"x\"".to_string()),
            "'it\\'s \"x\"'"
        );
        assert_eq!(StringAttribute::repr(&"a\\b".to_string()), "'a\\\\b'");
        assert_eq!(StringAttribute::repr(&"line\nnext\t".to_string()), "'line\\nnext\\t'");
        assert_eq!(StringAttribute::repr(&"bell\u{7}".to_string()), "'bell\\x07'");
        assert_eq!(StringAttribute::repr(&"café".to_string()), "'café'");
    }

    #[test]
    fn test_required_absent() {
        let attr = named(StringAttribute::new(), "name");

        let errors = unwrap_failure(attr.validate(None));
        assert_eq!(errors.first().kind, ErrorKind::MissingRequired);
        assert_eq!(errors.first().message, "name is required.");

        // JSON null counts as absent
        assert!(attr.validate(Some(&Value::Null)).is_failure());
    }

    #[test]
    fn test_optional_absent_returns_default() {
        let attr = named(StringAttribute::new().optional().default("fallback"), "name");
        assert_eq!(
            unwrap_success(attr.validate(None)),
            Some("fallback".to_string())
        );
    }

    #[test]
    fn test_optional_absent_without_default() {
        let attr = named(StringAttribute::new().optional(), "name");
        assert_eq!(unwrap_success(attr.validate(None)), None);
    }

    #[test]
    fn test_required_with_default_uses_default() {
        let attr = named(StringAttribute::new().default("x"), "name");
        assert_eq!(unwrap_success(attr.validate(None)), Some("x".to_string()));
    }

    #[test]
    fn test_max_length_and_choices_reported_together() {
        let attr = named(
            StringAttribute::new().max_length(2).choices(["ab"]),
            "code",
        );
        let errors = unwrap_failure(attr.validate(Some(&json!("abc"))));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.with_code("max_length").len(), 1);
        assert_eq!(errors.with_code("choices").len(), 1);
    }

    #[test]
    fn test_from_json() {
        let attr = named(StringAttribute::new().optional().default("d"), "name");
        assert_eq!(attr.from_json(&json!("x")).unwrap(), Some("x".to_string()));
        assert_eq!(attr.from_json(&Value::Null).unwrap(), Some("d".to_string()));
        assert!(attr.from_json(&json!(1)).is_err());
    }
}
