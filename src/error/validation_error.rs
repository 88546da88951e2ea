//! Validation error types.
//!
//! This module provides [`ValidationError`] for single failed checks and
//! [`ValidationErrors`] for accumulating every failure of a validation pass.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use stillwater::prelude::*;

use crate::key::ErrorKey;

/// The category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required attribute had no value and no default.
    MissingRequired,
    /// The raw value could not be coerced to the attribute's type.
    TypeMismatch,
    /// The coerced value broke a length, range, digit or choice constraint.
    ConstraintViolation,
    /// The input carried a key the schema does not declare.
    UnknownField,
    /// The input was not a mapping.
    StructuralError,
    /// A schema-specific rule spanning several fields failed.
    CrossFieldError,
}

impl ErrorKind {
    /// Machine-readable code used when none is set explicitly.
    pub fn default_code(self) -> &'static str {
        match self {
            ErrorKind::MissingRequired => "required",
            ErrorKind::TypeMismatch => "invalid_type",
            ErrorKind::ConstraintViolation => "constraint",
            ErrorKind::UnknownField => "unknown_field",
            ErrorKind::StructuralError => "not_a_mapping",
            ErrorKind::CrossFieldError => "cross_field",
        }
    }
}

/// A single validation failure with its context.
///
/// `ValidationError` records:
/// - **key**: the field the error belongs to, or the non-field key
/// - **kind**: which part of the pass produced it
/// - **message**: human-readable text, as it appears in the report
/// - **code**: machine-readable code for programmatic handling
/// - **got** / **expected**: optional detail about the offending value
///
/// # Example
///
/// ```rust
/// use eav_schema::{ErrorKey, ErrorKind, ValidationError};
///
/// let error = ValidationError::new(
///     ErrorKey::field("rate"),
///     ErrorKind::ConstraintViolation,
///     "rate must be <= 1.",
/// )
/// .with_code("max_value")
/// .with_got("1.01")
/// .with_expected("at most 1");
///
/// assert_eq!(error.code, "max_value");
/// assert_eq!(error.key.to_string(), "rate");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The field (or non-field key) the error applies to.
    pub key: ErrorKey,
    /// The failure category.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable error code (e.g. `max_digits`).
    pub code: String,
    /// The value that was received (formatted as string).
    pub got: Option<String>,
    /// Description of what was expected.
    pub expected: Option<String>,
}

impl ValidationError {
    /// Creates a new error; the code defaults to the kind's default code.
    pub fn new(key: ErrorKey, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            key,
            kind,
            message: message.into(),
            code: kind.default_code().to_string(),
            got: None,
            expected: None,
        }
    }

    /// Creates a cross-field error under the given field.
    ///
    /// This is the usual way for a cross-field hook to report a failure.
    pub fn cross_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorKey::field(field),
            ErrorKind::CrossFieldError,
            message,
        )
    }

    /// Sets the error code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the "got" (actual value) field and returns self for chaining.
    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }

    /// Sets the "expected" field and returns self for chaining.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)?;

        if let Some(ref expected) = self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        if let Some(ref got) = self.got {
            write!(f, " (got: {})", got)?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationError>();
    assert_sync::<ValidationError>();
};

/// A non-empty, ordered collection of validation errors.
///
/// `ValidationErrors` wraps a `NonEmptyVec<ValidationError>` so that a
/// `Validation::Failure` always carries at least one error. Errors from
/// several fields combine through `Semigroup`, and [`message_dict`] folds
/// them into the field-keyed report external callers consume.
///
/// [`message_dict`]: ValidationErrors::message_dict
///
/// # Example
///
/// ```rust
/// use eav_schema::{ErrorKey, ErrorKind, ValidationError, ValidationErrors};
/// use stillwater::prelude::*;
///
/// let name = ValidationErrors::single(ValidationError::new(
///     ErrorKey::field("name"),
///     ErrorKind::TypeMismatch,
///     "name must be a string.",
/// ));
/// let count = ValidationErrors::single(ValidationError::new(
///     ErrorKey::field("count"),
///     ErrorKind::TypeMismatch,
///     "count must be an integer.",
/// ));
///
/// let report = name.combine(count);
/// assert_eq!(report.len(), 2);
/// assert!(report.has_key("name"));
/// assert!(report.has_key("count"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(NonEmptyVec<ValidationError>);

impl ValidationErrors {
    /// Creates a collection containing a single error.
    pub fn single(error: ValidationError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a collection from a `NonEmptyVec` of errors.
    pub fn from_non_empty(errors: NonEmptyVec<ValidationError>) -> Self {
        Self(errors)
    }

    /// Creates a collection from a `Vec`, or None if it is empty.
    pub fn try_from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self::from_vec(errors))
        }
    }

    /// Creates a collection from a `Vec<ValidationError>`.
    ///
    /// # Panics
    ///
    /// Panics if the provided vec is empty.
    pub fn from_vec(errors: Vec<ValidationError>) -> Self {
        Self(NonEmptyVec::from_vec(errors).expect("ValidationErrors requires at least one error"))
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Returns the first error in the collection.
    pub fn first(&self) -> &ValidationError {
        self.0.head()
    }

    /// Returns all errors recorded under the given report key.
    pub fn for_key(&self, key: &str) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| e.key.as_str() == key).collect()
    }

    /// Returns the messages recorded under the given report key, in order.
    pub fn messages_for(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|e| e.key.as_str() == key)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// Returns true if at least one error is recorded under the key.
    pub fn has_key(&self, key: &str) -> bool {
        self.0.iter().any(|e| e.key.as_str() == key)
    }

    /// Returns all errors with the specified error code.
    pub fn with_code(&self, code: &str) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Returns all errors of the specified kind.
    pub fn of_kind(&self, kind: ErrorKind) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| e.kind == kind).collect()
    }

    /// Folds the errors into a field-keyed report.
    ///
    /// Keys appear in the order they were first reported; messages for the
    /// same key accumulate in order.
    pub fn message_dict(&self) -> IndexMap<String, Vec<String>> {
        let mut dict: IndexMap<String, Vec<String>> = IndexMap::new();
        for error in self.0.iter() {
            dict.entry(error.key.as_str().to_string())
                .or_default()
                .push(error.message.clone());
        }
        dict
    }

    /// Converts this collection into a `Vec<ValidationError>`.
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0.into_vec()
    }

    /// Returns a reference to the underlying `NonEmptyVec`.
    pub fn as_non_empty_vec(&self) -> &NonEmptyVec<ValidationError> {
        &self.0
    }
}

impl Semigroup for ValidationErrors {
    fn combine(self, other: Self) -> Self {
        ValidationErrors(self.0.combine(other.0))
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self::single(error)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = Box<dyn Iterator<Item = &'a ValidationError> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationErrors>();
    assert_sync::<ValidationErrors>();
};

#[cfg(test)]
mod tests {
    use super::*;

    fn field_error(field: &str, message: &str) -> ValidationError {
        ValidationError::new(ErrorKey::field(field), ErrorKind::TypeMismatch, message)
    }

    #[test]
    fn test_error_defaults_code_from_kind() {
        let error = ValidationError::new(
            ErrorKey::field("name"),
            ErrorKind::MissingRequired,
            "name is required.",
        );

        assert_eq!(error.code, "required");
        assert!(error.got.is_none());
        assert!(error.expected.is_none());
    }

    #[test]
    fn test_error_builder() {
        let error = field_error("count", "count must be an integer.")
            .with_code("invalid_type")
            .with_got("boolean")
            .with_expected("integer");

        assert_eq!(error.got, Some("boolean".to_string()));
        assert_eq!(error.expected, Some("integer".to_string()));
    }

    #[test]
    fn test_error_display() {
        let error = field_error("count", "count must be an integer.")
            .with_expected("integer")
            .with_got("string");

        let display = error.to_string();
        assert!(display.contains("count: count must be an integer."));
        assert!(display.contains("expected: integer"));
        assert!(display.contains("got: string"));
    }

    #[test]
    fn test_non_field_error_display() {
        let error = ValidationError::new(
            ErrorKey::NonField,
            ErrorKind::StructuralError,
            "Config must be a dict.",
        );
        assert_eq!(error.to_string(), "__all__: Config must be a dict.");
        assert_eq!(error.code, "not_a_mapping");
    }

    #[test]
    fn test_cross_field_constructor() {
        let error = ValidationError::cross_field("max_val", "max_val must be > min_val.");
        assert_eq!(error.kind, ErrorKind::CrossFieldError);
        assert_eq!(error.key, ErrorKey::field("max_val"));
    }

    #[test]
    fn test_try_from_vec() {
        assert!(ValidationErrors::try_from_vec(Vec::new()).is_none());
        let errors = ValidationErrors::try_from_vec(vec![field_error("a", "bad")]).unwrap();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_combine_preserves_order() {
        let combined = ValidationErrors::single(field_error("a", "1"))
            .combine(ValidationErrors::single(field_error("b", "2")))
            .combine(ValidationErrors::single(field_error("a", "3")));

        let messages: Vec<_> = combined.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_message_dict_accumulates_per_key() {
        let errors = ValidationErrors::from_vec(vec![
            ValidationError::new(
                ErrorKey::field("extra"),
                ErrorKind::UnknownField,
                "Unknown config key: extra.",
            ),
            field_error("name", "name must be a string."),
            field_error("extra", "second message"),
        ]);

        let dict = errors.message_dict();
        let keys: Vec<_> = dict.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["extra", "name"]);
        assert_eq!(
            dict["extra"],
            vec!["Unknown config key: extra.".to_string(), "second message".to_string()]
        );
    }

    #[test]
    fn test_for_key_and_messages_for() {
        let errors = ValidationErrors::from_vec(vec![
            field_error("a", "first"),
            field_error("b", "other"),
            field_error("a", "second"),
        ]);

        assert_eq!(errors.for_key("a").len(), 2);
        assert_eq!(errors.messages_for("a"), vec!["first", "second"]);
        assert!(!errors.has_key("c"));
    }

    #[test]
    fn test_with_code_and_of_kind() {
        let errors = ValidationErrors::from_vec(vec![
            field_error("a", "x").with_code("max_length"),
            ValidationError::new(
                ErrorKey::field("b"),
                ErrorKind::ConstraintViolation,
                "y",
            )
            .with_code("max_length"),
        ]);

        assert_eq!(errors.with_code("max_length").len(), 2);
        assert_eq!(errors.of_kind(ErrorKind::ConstraintViolation).len(), 1);
    }

    #[test]
    fn test_errors_display() {
        let errors = ValidationErrors::single(field_error("name", "required"))
            .combine(ValidationErrors::single(field_error("email", "invalid")));
        let display = errors.to_string();

        assert!(display.contains("2 error(s)"));
        assert!(display.contains("name: required"));
        assert!(display.contains("email: invalid"));
    }
}
