//! The shared validation algorithm for attribute descriptors.
//!
//! Every descriptor kind implements [`Descriptor`] by supplying its coercion
//! and constraint rules; the absent/default handling, choice check and error
//! accumulation live here once.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{ErrorKind, ValidationError, ValidationErrors};
use crate::key::ErrorKey;

use super::AttributeOptions;

/// A typed validation and coercion rule for one schema field.
///
/// Implementors provide type coercion, constraint checks and the JSON
/// mapping for their native type; [`validate`](Descriptor::validate) runs
/// them in order:
///
/// 1. absent (`None` or JSON `null`): the default, or a `required` error
/// 2. coercion to the native type
/// 3. constraint checks, all reported together
/// 4. the `choices` allow-list
///
/// The `Send + Sync` bounds let schemas holding descriptors be shared
/// across threads.
pub trait Descriptor: Send + Sync {
    /// The canonical in-memory type produced by coercion.
    type Native: Clone + PartialEq + Send + Sync;

    /// Name used in error messages (`"string"`, `"integer"`, ...).
    const TYPE_NAME: &'static str;

    /// Returns the options shared by every descriptor kind.
    fn options(&self) -> &AttributeOptions<Self::Native>;

    /// Converts a raw, non-null JSON value into the native type.
    fn coerce(&self, value: &Value) -> Result<Self::Native, ValidationError>;

    /// Returns every constraint the coerced value violates.
    fn check_constraints(&self, value: &Self::Native) -> Vec<ValidationError>;

    /// Converts a native value to its JSON storage form.
    fn to_json(&self, value: &Self::Native) -> Value;

    /// Converts a stored JSON value back to the native type.
    ///
    /// `null` yields the default. Other values go through coercion, so a
    /// stored value of the wrong type is reported rather than guessed at.
    fn from_json(&self, value: &Value) -> Result<Option<Self::Native>, ValidationError> {
        if value.is_null() {
            return Ok(self.options().default.clone());
        }
        self.coerce(value).map(Some)
    }

    /// Formats a native value for the `choices` error message.
    fn repr(value: &Self::Native) -> String;

    /// Returns the error key for this descriptor's field.
    fn key(&self) -> ErrorKey {
        ErrorKey::field(self.options().name.clone())
    }

    /// Builds the type-mismatch error for a value that failed coercion.
    fn type_error(&self, value: &Value) -> ValidationError {
        let name = &self.options().name;
        let article = match Self::TYPE_NAME.as_bytes().first() {
            Some(b'a' | b'e' | b'i' | b'o' | b'u') => "an",
            _ => "a",
        };
        ValidationError::new(
            self.key(),
            ErrorKind::TypeMismatch,
            format!("{} must be {} {}.", name, article, Self::TYPE_NAME),
        )
        .with_got(value_type_name(value))
        .with_expected(Self::TYPE_NAME)
    }

    /// Validates a raw value, returning the cleaned native value.
    ///
    /// `Success(None)` means the value is absent and there is no default.
    fn validate(&self, value: Option<&Value>) -> Validation<Option<Self::Native>, ValidationErrors> {
        let options = self.options();
        let value = match value {
            None | Some(Value::Null) => {
                return match &options.default {
                    Some(default) => Validation::Success(Some(default.clone())),
                    None if options.required => Validation::Failure(ValidationErrors::single(
                        ValidationError::new(
                            self.key(),
                            ErrorKind::MissingRequired,
                            format!("{} is required.", options.name),
                        )
                        .with_expected(Self::TYPE_NAME),
                    )),
                    None => Validation::Success(None),
                };
            }
            Some(value) => value,
        };

        match self.coerce(value) {
            Ok(native) => self.clean(native).map(Some),
            Err(error) => Validation::Failure(ValidationErrors::single(error)),
        }
    }

    /// Checks constraints and choices on an already-coerced value.
    fn clean(&self, value: Self::Native) -> Validation<Self::Native, ValidationErrors> {
        let options = self.options();
        let mut errors = self.check_constraints(&value);

        if let Some(choices) = &options.choices {
            if !choices.contains(&value) {
                let allowed = choices
                    .iter()
                    .map(Self::repr)
                    .collect::<Vec<_>>()
                    .join(", ");
                errors.push(
                    ValidationError::new(
                        self.key(),
                        ErrorKind::ConstraintViolation,
                        format!("{} must be one of: {}.", options.name, allowed),
                    )
                    .with_code("choices")
                    .with_got(Self::repr(&value))
                    .with_expected(format!("one of: {}", allowed)),
                );
            }
        }

        match ValidationErrors::try_from_vec(errors) {
            None => Validation::Success(value),
            Some(errors) => Validation::Failure(errors),
        }
    }
}

/// Returns the JSON type name for a value.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
