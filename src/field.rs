//! Binding a schema to a stored JSON field.
//!
//! A storage layer keeps attribute mappings as plain JSON and uses a
//! [`FieldBinding`] to decide which schema checks them: one fixed schema, or
//! a schema chosen per record by the value of a sibling "selector" field.
//!
//! # Example
//!
//! ```rust
//! use eav_schema::{Attribute, FieldBinding, Schema, SchemaRegistry};
//! use indexmap::IndexMap;
//! use serde_json::json;
//!
//! let registry = SchemaRegistry::new();
//! registry
//!     .register(Schema::builder("plans.Fixed").attribute("rate", Attribute::decimal()).build())
//!     .unwrap();
//!
//! let mut map = IndexMap::new();
//! map.insert("fixed".to_string(), "plans.Fixed".into());
//! let binding = FieldBinding::new(None, Some(map), Some("plan_type".to_string())).unwrap();
//!
//! let outcome = binding
//!     .validate(&json!({"rate": "x"}), Some("fixed"), &registry)
//!     .unwrap();
//! assert!(outcome.unwrap().is_failure());
//!
//! // Unknown selector: nothing to validate against
//! let outcome = binding.validate(&json!({"rate": "x"}), Some("other"), &registry).unwrap();
//! assert!(outcome.is_none());
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::registry::{ResolveError, SchemaRef, SchemaResolver};
use crate::schema::Schema;
use crate::ValidationResult;

/// How a stored field chooses its schema.
#[derive(Debug, Clone)]
pub enum FieldBinding {
    /// Every record uses the same schema.
    Static(SchemaRef),
    /// The schema is picked by the record's `key_field` value.
    Polymorphic {
        schema_map: IndexMap<String, SchemaRef>,
        key_field: String,
    },
    /// No schema is attached; stored values are never checked.
    Unbound,
}

impl FieldBinding {
    /// Creates a binding from the optional parts a field declaration carries.
    ///
    /// An empty `schema_map` or `key_field` counts as unset. With neither a
    /// schema nor a map the binding is [`FieldBinding::Unbound`].
    ///
    /// # Errors
    ///
    /// - `BindingError::Conflicting` if both `schema` and `schema_map` are set
    /// - `BindingError::MissingKeyField` if `schema_map` is set without `key_field`
    pub fn new(
        schema: Option<SchemaRef>,
        schema_map: Option<IndexMap<String, SchemaRef>>,
        key_field: Option<String>,
    ) -> Result<Self, BindingError> {
        let schema_map = schema_map.filter(|map| !map.is_empty());
        let key_field = key_field.filter(|key| !key.is_empty());

        match (schema, schema_map) {
            (Some(_), Some(_)) => Err(BindingError::Conflicting),
            (Some(schema), None) => Ok(FieldBinding::Static(schema)),
            (None, Some(schema_map)) => match key_field {
                Some(key_field) => Ok(FieldBinding::Polymorphic {
                    schema_map,
                    key_field,
                }),
                None => Err(BindingError::MissingKeyField),
            },
            (None, None) => Ok(FieldBinding::Unbound),
        }
    }

    /// Shorthand for a static binding.
    pub fn fixed(schema: impl Into<SchemaRef>) -> Self {
        FieldBinding::Static(schema.into())
    }

    /// Returns the selector field name for a polymorphic binding.
    pub fn key_field(&self) -> Option<&str> {
        match self {
            FieldBinding::Static(_) | FieldBinding::Unbound => None,
            FieldBinding::Polymorphic { key_field, .. } => Some(key_field),
        }
    }

    /// Picks the schema for a record.
    ///
    /// An unbound field, or a polymorphic binding with no selector or a
    /// selector missing from the map, yields `Ok(None)`.
    pub fn resolve(
        &self,
        selector: Option<&str>,
        resolver: &dyn SchemaResolver,
    ) -> Result<Option<Schema>, ResolveError> {
        match self {
            FieldBinding::Static(schema) => schema.resolve(resolver).map(Some),
            FieldBinding::Unbound => Ok(None),
            FieldBinding::Polymorphic {
                schema_map,
                key_field,
            } => {
                let Some(selector) = selector else {
                    tracing::debug!(key_field = %key_field, "no selector value; skipping schema");
                    return Ok(None);
                };
                match schema_map.get(selector) {
                    Some(schema) => schema.resolve(resolver).map(Some),
                    None => {
                        tracing::warn!(
                            key_field = %key_field,
                            selector = %selector,
                            "selector has no mapped schema; skipping validation"
                        );
                        Ok(None)
                    }
                }
            }
        }
    }

    /// Validates a stored value.
    ///
    /// Returns `Ok(None)` when there is nothing to check: the value is not a
    /// JSON object (shape is the storage layer's concern), or no schema
    /// applies for the selector.
    ///
    /// # Errors
    ///
    /// Returns a `ResolveError` if the applicable schema reference cannot be
    /// resolved.
    pub fn validate(
        &self,
        value: &Value,
        selector: Option<&str>,
        resolver: &dyn SchemaResolver,
    ) -> Result<Option<ValidationResult<Map<String, Value>>>, ResolveError> {
        if !value.is_object() {
            return Ok(None);
        }
        let schema = self.resolve(selector, resolver)?;
        Ok(schema.map(|schema| schema.validate(Some(value))))
    }

    /// Returns a serializable form with every schema as its identifier.
    pub fn descriptor(&self) -> BindingDescriptor {
        match self {
            FieldBinding::Static(schema) => BindingDescriptor {
                schema: Some(schema.identifier().to_string()),
                schema_map: None,
                schema_key_field: None,
            },
            FieldBinding::Polymorphic {
                schema_map,
                key_field,
            } => BindingDescriptor {
                schema: None,
                schema_map: Some(
                    schema_map
                        .iter()
                        .map(|(k, v)| (k.clone(), v.identifier().to_string()))
                        .collect(),
                ),
                schema_key_field: Some(key_field.clone()),
            },
            FieldBinding::Unbound => BindingDescriptor::default(),
        }
    }

    /// Restores a binding from its descriptor, with deferred references.
    ///
    /// # Errors
    ///
    /// Same as [`FieldBinding::new`].
    pub fn from_descriptor(descriptor: BindingDescriptor) -> Result<Self, BindingError> {
        FieldBinding::new(
            descriptor.schema.map(SchemaRef::Deferred),
            descriptor.schema_map.map(|map| {
                map.into_iter()
                    .map(|(k, id)| (k, SchemaRef::Deferred(id)))
                    .collect()
            }),
            descriptor.schema_key_field,
        )
    }
}

/// The serializable form of a [`FieldBinding`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_map: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_key_field: Option<String>,
}

/// Errors from an inconsistent binding declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("Specify either 'schema' or 'schema_map', not both.")]
    Conflicting,

    #[error("'schema_key_field' is required when using 'schema_map'.")]
    MissingKeyField,
}
