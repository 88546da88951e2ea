//! Decimal attribute descriptor.
//!
//! Decimals are stored in JSON as exact strings so no precision is lost to
//! binary floating point. [`DecimalAttribute`] accepts strings, integers and
//! floats on input and checks digit-count constraints on the exact value.

use serde_json::Value;

use crate::decimal::Decimal;
use crate::error::{ErrorKind, ValidationError, ValidationErrors};
use stillwater::Validation;

use super::numeric::bound_errors;
use super::traits::Descriptor;
use super::AttributeOptions;

/// A descriptor for exact decimal fields.
///
/// - `max_digits`: the whole part may have at most
///   `max_digits - decimal_places` digits (`decimal_places` counts as 0
///   when unset)
/// - `decimal_places`: at most this many digits after the point
/// - `min_value` / `max_value`: inclusive numeric bounds
///
/// Floats are converted through their shortest text form, so `0.1` becomes
/// exactly `0.1` rather than its binary expansion.
///
/// # Example
///
/// ```rust
/// use eav_schema::{Attribute, Descriptor};
/// use serde_json::json;
///
/// let attr = Attribute::decimal().max_digits(5).decimal_places(2);
///
/// assert!(attr.validate(Some(&json!("123.45"))).is_success());
/// assert!(attr.validate(Some(&json!("1.234"))).is_failure());
/// assert!(attr.validate(Some(&json!("1234.5"))).is_failure());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DecimalAttribute {
    /// Options shared by every descriptor kind.
    pub options: AttributeOptions<Decimal>,
    /// Total digit budget, shared with `decimal_places`.
    pub max_digits: Option<u32>,
    /// Maximum digits after the decimal point.
    pub decimal_places: Option<u32>,
    /// Inclusive lower bound.
    pub min_value: Option<Decimal>,
    /// Inclusive upper bound.
    pub max_value: Option<Decimal>,
}

impl DecimalAttribute {
    /// Creates a required decimal descriptor with no constraints.
    pub fn new() -> Self {
        Self {
            options: AttributeOptions::default(),
            max_digits: None,
            decimal_places: None,
            min_value: None,
            max_value: None,
        }
    }

    pub fn max_digits(mut self, digits: u32) -> Self {
        self.max_digits = Some(digits);
        self
    }

    pub fn decimal_places(mut self, places: u32) -> Self {
        self.decimal_places = Some(places);
        self
    }

    /// Adds an inclusive minimum.
    pub fn min_value(mut self, min: impl Into<Decimal>) -> Self {
        self.min_value = Some(min.into());
        self
    }

    /// Adds an inclusive maximum.
    pub fn max_value(mut self, max: impl Into<Decimal>) -> Self {
        self.max_value = Some(max.into());
        self
    }

    common_builders!(Decimal);

    /// Validates a value that is already a [`Decimal`].
    ///
    /// Skips coercion; constraints and choices still apply.
    pub fn validate_decimal(&self, value: Decimal) -> Validation<Decimal, ValidationErrors> {
        self.clean(value)
    }

    fn invalid_literal(&self, text: &str) -> ValidationError {
        ValidationError::new(
            self.key(),
            ErrorKind::TypeMismatch,
            format!("{} must be a valid decimal.", self.options.name),
        )
        .with_code("invalid_decimal")
        .with_got(text)
        .with_expected("decimal")
    }
}

impl Descriptor for DecimalAttribute {
    type Native = Decimal;

    const TYPE_NAME: &'static str = "decimal";

    fn options(&self) -> &AttributeOptions<Decimal> {
        &self.options
    }

    fn coerce(&self, value: &Value) -> Result<Decimal, ValidationError> {
        match value {
            Value::Number(num) => {
                if let Some(n) = num.as_i64() {
                    Ok(Decimal::from_i64(n))
                } else if let Some(n) = num.as_u64() {
                    Ok(Decimal::from_u64(n))
                } else {
                    num.as_f64()
                        .ok_or_else(|| self.type_error(value))
                        .and_then(|f| {
                            Decimal::from_f64(f).map_err(|_| self.invalid_literal(&num.to_string()))
                        })
                }
            }
            Value::String(text) => text.parse().map_err(|_| self.invalid_literal(text)),
            _ => Err(self.type_error(value)),
        }
    }

    fn check_constraints(&self, value: &Decimal) -> Vec<ValidationError> {
        let name = &self.options.name;
        let mut errors = bound_errors(
            self,
            value.clone(),
            self.min_value.clone(),
            self.max_value.clone(),
            |d| d.to_string(),
        );

        if let Some(places) = self.decimal_places {
            let decimals = value.fractional_digits();
            if decimals > u64::from(places) {
                errors.push(
                    ValidationError::new(
                        self.key(),
                        ErrorKind::ConstraintViolation,
                        format!("{} must have at most {} decimal places.", name, places),
                    )
                    .with_code("decimal_places")
                    .with_expected(format!("at most {} decimal places", places))
                    .with_got(format!("{} decimal places", decimals)),
                );
            }
        }

        if let Some(max_digits) = self.max_digits {
            let max_whole = i64::from(max_digits) - i64::from(self.decimal_places.unwrap_or(0));
            let whole = value.whole_digits();
            if whole > max_whole {
                errors.push(
                    ValidationError::new(
                        self.key(),
                        ErrorKind::ConstraintViolation,
                        format!("{} has too many digits (max {}).", name, max_digits),
                    )
                    .with_code("max_digits")
                    .with_expected(format!("at most {} whole digits", max_whole.max(0)))
                    .with_got(format!("{} whole digits", whole)),
                );
            }
        }

        errors
    }

    fn to_json(&self, value: &Decimal) -> Value {
        Value::String(value.to_string())
    }

    /// Stored decimals that no longer parse fall back to the default.
    fn from_json(&self, value: &Value) -> Result<Option<Decimal>, ValidationError> {
        let parsed = match value {
            Value::Null => None,
            Value::String(text) => text.parse().ok(),
            Value::Number(_) => self.coerce(value).ok(),
            _ => None,
        };
        Ok(parsed.or_else(|| self.options.default.clone()))
    }

    fn repr(value: &Decimal) -> String {
        value.to_string()
    }
}
