//! Boolean attribute descriptor.

use serde_json::Value;

use crate::error::ValidationError;

use super::traits::Descriptor;
use super::AttributeOptions;

/// A descriptor for boolean fields.
///
/// Only JSON `true`/`false` are accepted. Numbers are rejected, so `1` is
/// never mistaken for `true`.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanAttribute {
    /// Options shared by every descriptor kind.
    pub options: AttributeOptions<bool>,
}

impl BooleanAttribute {
    /// Creates a required boolean descriptor.
    pub fn new() -> Self {
        Self {
            options: AttributeOptions::default(),
        }
    }

    common_builders!(bool);
}

impl Descriptor for BooleanAttribute {
    type Native = bool;

    const TYPE_NAME: &'static str = "boolean";

    fn options(&self) -> &AttributeOptions<bool> {
        &self.options
    }

    fn coerce(&self, value: &Value) -> Result<bool, ValidationError> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err(self.type_error(value)),
        }
    }

    fn check_constraints(&self, _value: &bool) -> Vec<ValidationError> {
        Vec::new()
    }

    fn to_json(&self, value: &bool) -> Value {
        Value::Bool(*value)
    }

    fn repr(value: &bool) -> String {
        let text = if *value { "True" } else { "False" };
        text.to_string()
    }
}
