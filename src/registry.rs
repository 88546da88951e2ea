//! Named schema storage and deferred reference resolution.
//!
//! This module provides [`SchemaRegistry`], which stores schemas under
//! dotted identifiers, and [`SchemaRef`], a schema given either directly or
//! by identifier. Deferred references are resolved only through an injected
//! [`SchemaResolver`], so callers control where identifiers are looked up.

use parking_lot::RwLock;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::schema::Schema;
use crate::ValidationResult;

type SchemaMap = Arc<RwLock<HashMap<String, Schema>>>;

/// Dotted identifier: one or more `[A-Za-z_][A-Za-z0-9_]*` segments.
fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
            .expect("identifier pattern is a valid regex")
    })
}

/// Returns true if `id` is a valid dotted schema identifier.
pub fn is_valid_identifier(id: &str) -> bool {
    identifier_pattern().is_match(id)
}

/// Looks up schemas by identifier.
///
/// Implemented by [`SchemaRegistry`]; implement it yourself to resolve
/// identifiers from another source.
pub trait SchemaResolver: Send + Sync {
    /// Returns the schema registered under `id`, if any.
    fn resolve_schema(&self, id: &str) -> Option<Schema>;
}

/// A thread-safe registry of named schemas.
///
/// Schemas are registered under their own [`name`](Schema::name), which
/// must be a dotted identifier such as `billing.InstallmentConfig`.
///
/// # Thread Safety
///
/// The registry uses `Arc<RwLock<...>>`:
/// - Multiple threads can look up and validate concurrently
/// - Registration operations are serialized
///
/// Clones share the same storage.
///
/// # Example
///
/// ```rust
/// use eav_schema::{Attribute, Schema, SchemaRegistry};
/// use serde_json::json;
///
/// let registry = SchemaRegistry::new();
/// registry
///     .register(
///         Schema::builder("billing.Plan")
///             .attribute("name", Attribute::string())
///             .build(),
///     )
///     .unwrap();
///
/// let result = registry.validate("billing.Plan", &json!({"name": "Pro"})).unwrap();
/// assert!(result.is_success());
///
/// assert!(registry.validate("billing.Missing", &json!({})).is_err());
/// ```
pub struct SchemaRegistry {
    schemas: SchemaMap,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            schemas: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers a schema under its name.
    ///
    /// # Errors
    ///
    /// - `RegistryError::InvalidIdentifier` if the name is not a dotted identifier
    /// - `RegistryError::DuplicateName` if the name is already registered
    pub fn register(&self, schema: Schema) -> Result<(), RegistryError> {
        let id = schema.name().to_string();
        if !is_valid_identifier(&id) {
            return Err(RegistryError::InvalidIdentifier(id));
        }

        let mut schemas = self.schemas.write();
        if schemas.contains_key(&id) {
            return Err(RegistryError::DuplicateName(id));
        }

        tracing::debug!(schema = %id, attributes = schema.len(), "registered schema");
        schemas.insert(id, schema);
        Ok(())
    }

    /// Retrieves a schema by identifier.
    pub fn get(&self, id: &str) -> Option<Schema> {
        self.schemas.read().get(id).cloned()
    }

    /// Returns true if a schema is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.schemas.read().contains_key(id)
    }

    /// Returns all registered identifiers, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.schemas.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns the number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }

    /// Validates a value against the schema registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::SchemaNotFound` if `id` is not registered.
    pub fn validate(
        &self,
        id: &str,
        value: &Value,
    ) -> Result<ValidationResult<Map<String, Value>>, RegistryError> {
        let schema = self
            .get(id)
            .ok_or_else(|| RegistryError::SchemaNotFound(id.to_string()))?;
        Ok(schema.validate(Some(value)))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SchemaRegistry {
    fn clone(&self) -> Self {
        Self {
            schemas: Arc::clone(&self.schemas),
        }
    }
}

impl SchemaResolver for SchemaRegistry {
    fn resolve_schema(&self, id: &str) -> Option<Schema> {
        self.get(id)
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a schema with a name that already exists.
    #[error("schema '{0}' already registered")]
    DuplicateName(String),

    /// Attempted to validate with an identifier that doesn't exist.
    #[error("schema '{0}' not found")]
    SchemaNotFound(String),

    /// The schema name is not a dotted identifier.
    #[error("'{0}' is not a valid schema identifier")]
    InvalidIdentifier(String),
}

/// A schema given directly or by identifier.
#[derive(Debug, Clone)]
pub enum SchemaRef {
    /// A built schema.
    Direct(Schema),
    /// An identifier resolved later through a [`SchemaResolver`].
    Deferred(String),
}

impl SchemaRef {
    /// Creates a deferred reference.
    pub fn deferred(id: impl Into<String>) -> Self {
        SchemaRef::Deferred(id.into())
    }

    /// Returns the identifier: the deferred id, or the direct schema's name.
    pub fn identifier(&self) -> &str {
        match self {
            SchemaRef::Direct(schema) => schema.name(),
            SchemaRef::Deferred(id) => id,
        }
    }

    /// Returns the schema, resolving a deferred identifier through `resolver`.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::Unresolved` if the resolver has no schema for
    /// the identifier.
    pub fn resolve(&self, resolver: &dyn SchemaResolver) -> Result<Schema, ResolveError> {
        match self {
            SchemaRef::Direct(schema) => Ok(schema.clone()),
            SchemaRef::Deferred(id) => resolver
                .resolve_schema(id)
                .ok_or_else(|| ResolveError::Unresolved(id.clone())),
        }
    }
}

impl From<Schema> for SchemaRef {
    fn from(schema: Schema) -> Self {
        SchemaRef::Direct(schema)
    }
}

impl From<&Schema> for SchemaRef {
    fn from(schema: &Schema) -> Self {
        SchemaRef::Direct(schema.clone())
    }
}

impl From<&str> for SchemaRef {
    fn from(id: &str) -> Self {
        SchemaRef::Deferred(id.to_string())
    }
}

impl From<String> for SchemaRef {
    fn from(id: String) -> Self {
        SchemaRef::Deferred(id)
    }
}

/// Errors that can occur while resolving a [`SchemaRef`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No schema is known under the identifier.
    #[error("schema reference '{0}' could not be resolved")]
    Unresolved(String),
}
