//! Whole-mapping validation.
//!
//! This module implements the validation pass of a [`Schema`]: unknown-key
//! rejection, per-attribute validation with error accumulation, defaulting,
//! and the cross-field hook. It also provides [`Schema::apply_defaults`] and
//! parallel batch validation.

use rayon::prelude::*;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::{ErrorKind, ValidationError, ValidationErrors};
use crate::key::ErrorKey;
use crate::schema::Schema;
use crate::ValidationResult;

impl Schema {
    /// Validates a raw mapping, returning the cleaned mapping.
    ///
    /// `None` and JSON `null` are treated as an empty mapping. Any other
    /// non-object input fails with a single `__all__` error. Otherwise every
    /// unknown key and every attribute error is reported together; the
    /// cross-field hook runs only when the per-attribute pass is clean.
    ///
    /// The cleaned mapping holds the JSON storage form of each value
    /// (decimals as exact strings) and omits attributes whose value is
    /// absent with no default.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eav_schema::{Attribute, Schema};
    /// use serde_json::json;
    ///
    /// let schema = Schema::builder("item")
    ///     .attribute("name", Attribute::string())
    ///     .attribute("count", Attribute::integer())
    ///     .build();
    ///
    /// let errors = schema
    ///     .validate(Some(&json!({"name": 123, "count": "bad", "extra": 1})))
    ///     .into_result()
    ///     .unwrap_err();
    ///
    /// let report = errors.message_dict();
    /// assert_eq!(report["extra"], vec!["Unknown config key: extra."]);
    /// assert_eq!(report["name"], vec!["name must be a string."]);
    /// assert_eq!(report["count"], vec!["count must be an integer."]);
    /// ```
    pub fn validate(&self, raw: Option<&Value>) -> ValidationResult<Map<String, Value>> {
        let empty = Map::new();
        let data = match raw {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(obj)) => obj,
            Some(_) => {
                return Validation::Failure(ValidationErrors::single(
                    ValidationError::new(
                        ErrorKey::NonField,
                        ErrorKind::StructuralError,
                        "Config must be a dict.",
                    )
                    .with_expected("object"),
                ));
            }
        };

        let mut errors = Vec::new();
        let mut cleaned = Map::new();

        let mut unknown: Vec<&String> = data
            .keys()
            .filter(|key| !self.def.attributes.contains_key(key.as_str()))
            .collect();
        unknown.sort();
        for key in unknown {
            tracing::trace!(schema = %self.name(), key = %key, "unknown key");
            errors.push(ValidationError::new(
                ErrorKey::field(key.clone()),
                ErrorKind::UnknownField,
                format!("Unknown config key: {}.", key),
            ));
        }

        for (name, attribute) in &self.def.attributes {
            match attribute.validate(data.get(name)) {
                Validation::Success(Some(value)) => {
                    cleaned.insert(name.clone(), value.to_json());
                }
                Validation::Success(None) => {}
                Validation::Failure(e) => errors.extend(e),
            }
        }

        if let Some(errors) = ValidationErrors::try_from_vec(errors) {
            tracing::debug!(
                schema = %self.name(),
                errors = errors.len(),
                "validation failed"
            );
            return Validation::Failure(errors);
        }

        if let Some(hook) = &self.def.cross_field {
            if let Validation::Failure(errors) = hook(&cleaned) {
                tracing::debug!(
                    schema = %self.name(),
                    errors = errors.len(),
                    "cross-field validation failed"
                );
                return Validation::Failure(errors);
            }
        }

        Validation::Success(cleaned)
    }

    /// Fills missing attributes from their defaults without validating.
    ///
    /// Keys already present (including those the schema does not declare)
    /// are copied unchanged. A non-object input is treated as empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eav_schema::{Attribute, Schema};
    /// use serde_json::json;
    ///
    /// let schema = Schema::builder("flags")
    ///     .attribute("enabled", Attribute::boolean().optional().default(false))
    ///     .attribute("label", Attribute::string().optional())
    ///     .build();
    ///
    /// let filled = schema.apply_defaults(Some(&json!({"label": 7})));
    /// assert_eq!(filled["enabled"], json!(false));
    /// assert_eq!(filled["label"], json!(7));
    /// ```
    pub fn apply_defaults(&self, raw: Option<&Value>) -> Map<String, Value> {
        let mut result = match raw {
            Some(Value::Object(obj)) => obj.clone(),
            _ => Map::new(),
        };

        for (name, attribute) in &self.def.attributes {
            if result.contains_key(name) {
                continue;
            }
            if let Some(default) = attribute.default_json() {
                result.insert(name.clone(), default);
            }
        }

        result
    }

    /// Validates many independent inputs in parallel.
    ///
    /// Results are returned in input order.
    pub fn validate_batch(&self, inputs: &[Value]) -> Vec<ValidationResult<Map<String, Value>>> {
        inputs
            .par_iter()
            .map(|input| self.validate(Some(input)))
            .collect()
    }
}
