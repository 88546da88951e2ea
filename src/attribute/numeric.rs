//! Numeric attribute descriptors.
//!
//! This module provides [`IntegerAttribute`] and [`FloatAttribute`], both
//! with inclusive minimum/maximum bounds.

use serde_json::Value;

use crate::error::{ErrorKind, ValidationError};

use super::traits::Descriptor;
use super::{float_to_json, AttributeOptions};

/// A descriptor for integer fields.
///
/// Values must be JSON integers that fit in an `i64`. Floats (even `3.0`)
/// and booleans are rejected.
///
/// # Example
///
/// ```rust
/// use eav_schema::{Attribute, Descriptor};
/// use serde_json::json;
///
/// let attr = Attribute::integer().min_value(0).max_value(100);
///
/// assert!(attr.validate(Some(&json!(100))).is_success());
/// assert!(attr.validate(Some(&json!(101))).is_failure());
/// assert!(attr.validate(Some(&json!(true))).is_failure());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerAttribute {
    /// Options shared by every descriptor kind.
    pub options: AttributeOptions<i64>,
    /// Inclusive lower bound.
    pub min_value: Option<i64>,
    /// Inclusive upper bound.
    pub max_value: Option<i64>,
}

impl IntegerAttribute {
    /// Creates a required integer descriptor with no bounds.
    pub fn new() -> Self {
        Self {
            options: AttributeOptions::default(),
            min_value: None,
            max_value: None,
        }
    }

    /// Adds an inclusive minimum.
    pub fn min_value(mut self, min: i64) -> Self {
        self.min_value = Some(min);
        self
    }

    /// Adds an inclusive maximum.
    pub fn max_value(mut self, max: i64) -> Self {
        self.max_value = Some(max);
        self
    }

    common_builders!(i64);
}

impl Descriptor for IntegerAttribute {
    type Native = i64;

    const TYPE_NAME: &'static str = "integer";

    fn options(&self) -> &AttributeOptions<i64> {
        &self.options
    }

    fn coerce(&self, value: &Value) -> Result<i64, ValidationError> {
        match value {
            Value::Number(num) if num.is_i64() => num.as_i64().ok_or_else(|| self.type_error(value)),
            Value::Number(num) if num.is_u64() => Err(self
                .type_error(value)
                .with_code("overflow")
                .with_got(num.to_string())
                .with_expected("integer in i64 range")),
            _ => Err(self.type_error(value)),
        }
    }

    fn check_constraints(&self, value: &i64) -> Vec<ValidationError> {
        bound_errors(
            self,
            *value,
            self.min_value,
            self.max_value,
            |n| n.to_string(),
        )
    }

    fn to_json(&self, value: &i64) -> Value {
        Value::Number((*value).into())
    }

    fn repr(value: &i64) -> String {
        value.to_string()
    }
}

/// A descriptor for float fields.
///
/// JSON integers are widened to `f64`. Booleans and strings are rejected;
/// numeric text is not parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatAttribute {
    /// Options shared by every descriptor kind.
    pub options: AttributeOptions<f64>,
    /// Inclusive lower bound.
    pub min_value: Option<f64>,
    /// Inclusive upper bound.
    pub max_value: Option<f64>,
}

impl FloatAttribute {
    /// Creates a required float descriptor with no bounds.
    pub fn new() -> Self {
        Self {
            options: AttributeOptions::default(),
            min_value: None,
            max_value: None,
        }
    }

    /// Adds an inclusive minimum.
    ///
    /// # Panics
    ///
    /// Panics if `min` is NaN or infinite.
    pub fn min_value(mut self, min: f64) -> Self {
        assert_finite(&min);
        self.min_value = Some(min);
        self
    }

    /// Adds an inclusive maximum.
    ///
    /// # Panics
    ///
    /// Panics if `max` is NaN or infinite.
    pub fn max_value(mut self, max: f64) -> Self {
        assert_finite(&max);
        self.max_value = Some(max);
        self
    }

    // Defaults and choices must be representable in JSON.
    common_builders!(f64, check = assert_finite);
}

impl Descriptor for FloatAttribute {
    type Native = f64;

    const TYPE_NAME: &'static str = "number";

    fn options(&self) -> &AttributeOptions<f64> {
        &self.options
    }

    fn coerce(&self, value: &Value) -> Result<f64, ValidationError> {
        match value {
            Value::Number(num) => num.as_f64().ok_or_else(|| self.type_error(value)),
            _ => Err(self.type_error(value)),
        }
    }

    fn check_constraints(&self, value: &f64) -> Vec<ValidationError> {
        bound_errors(
            self,
            *value,
            self.min_value,
            self.max_value,
            |f| format!("{:?}", f),
        )
    }

    fn to_json(&self, value: &f64) -> Value {
        float_to_json(*value)
    }

    fn repr(value: &f64) -> String {
        format!("{:?}", value)
    }
}

fn assert_finite(value: &f64) {
    assert!(
        value.is_finite(),
        "float attribute values must be finite, got {}",
        value
    );
}

/// Checks inclusive bounds, reporting each one that fails.
pub(super) fn bound_errors<D, T>(
    descriptor: &D,
    value: T,
    min: Option<T>,
    max: Option<T>,
    show: impl Fn(&T) -> String,
) -> Vec<ValidationError>
where
    D: Descriptor,
    T: PartialOrd,
{
    let name = &descriptor.options().name;
    let mut errors = Vec::new();

    if let Some(min) = min {
        if value < min {
            errors.push(
                ValidationError::new(
                    descriptor.key(),
                    ErrorKind::ConstraintViolation,
                    format!("{} must be >= {}.", name, show(&min)),
                )
                .with_code("min_value")
                .with_expected(format!("at least {}", show(&min)))
                .with_got(show(&value)),
            );
        }
    }
    if let Some(max) = max {
        if value > max {
            errors.push(
                ValidationError::new(
                    descriptor.key(),
                    ErrorKind::ConstraintViolation,
                    format!("{} must be <= {}.", name, show(&max)),
                )
                .with_code("max_value")
                .with_expected(format!("at most {}", show(&max)))
                .with_got(show(&value)),
            );
        }
    }

    errors
}
