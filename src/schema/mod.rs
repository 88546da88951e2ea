//! Schema definitions.
//!
//! A [`Schema`] is a named, ordered set of attribute descriptors plus an
//! optional cross-field hook. Schemas are assembled with [`SchemaBuilder`],
//! which merges inherited attributes from parent schemas with the schema's
//! own declarations. The merged set is computed once in
//! [`build`](SchemaBuilder::build); a built schema is immutable and cheap to
//! clone.
//!
//! # Example
//!
//! ```rust
//! use eav_schema::{Attribute, Schema};
//! use serde_json::json;
//!
//! let base = Schema::builder("base")
//!     .attribute("enabled", Attribute::boolean().optional().default(false))
//!     .build();
//!
//! let config = Schema::builder("installment")
//!     .extends(&base)
//!     .attribute("rate_floor", Attribute::decimal().optional().max_digits(7).decimal_places(5))
//!     .build();
//!
//! let names: Vec<_> = config.get_attributes().keys().cloned().collect();
//! assert_eq!(names, vec!["enabled", "rate_floor"]);
//!
//! let cleaned = config.validate(Some(&json!({"rate_floor": "0.06500"}))).into_result().unwrap();
//! assert_eq!(cleaned["rate_floor"], json!("0.06500"));
//! assert_eq!(cleaned["enabled"], json!(false));
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::attribute::Attribute;
use crate::error::ValidationErrors;

/// A cross-field validation hook.
///
/// Runs on the cleaned mapping after every attribute passed on its own.
/// Errors it returns are reported as-is, typically built with
/// [`ValidationError::cross_field`](crate::ValidationError::cross_field).
pub type CrossFieldFn =
    Arc<dyn Fn(&Map<String, Value>) -> Validation<(), ValidationErrors> + Send + Sync>;

pub(crate) struct SchemaDef {
    pub(crate) name: String,
    pub(crate) attributes: IndexMap<String, Attribute>,
    pub(crate) cross_field: Option<CrossFieldFn>,
}

/// A built schema: a shared handle over an immutable definition.
///
/// Cloning a `Schema` is a reference-count bump; clones share the same
/// definition.
#[derive(Clone)]
pub struct Schema {
    pub(crate) def: Arc<SchemaDef>,
}

impl Schema {
    /// Starts building a schema with the given name.
    ///
    /// The name is the schema's identifier in a
    /// [`SchemaRegistry`](crate::SchemaRegistry), so dotted names such as
    /// `billing.InstallmentConfig` are conventional.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// Returns the schema name.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Returns an owned copy of the merged attribute set.
    ///
    /// Mutating the copy has no effect on the schema.
    pub fn get_attributes(&self) -> IndexMap<String, Attribute> {
        self.def.attributes.clone()
    }

    /// Returns the attribute declared under `name`, if any.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.def.attributes.get(name)
    }

    /// Iterates over attribute names in merged order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.def.attributes.keys().map(String::as_str)
    }

    /// Returns the number of attributes in the merged set.
    pub fn len(&self) -> usize {
        self.def.attributes.len()
    }

    /// Returns true if the schema declares no attributes.
    pub fn is_empty(&self) -> bool {
        self.def.attributes.is_empty()
    }

    /// Returns true if the schema (or an ancestor) has a cross-field hook.
    pub fn has_cross_field(&self) -> bool {
        self.def.cross_field.is_some()
    }

    /// Returns true if both handles point at the same definition.
    pub fn ptr_eq(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.def, &other.def)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.def.name)
            .field("attributes", &self.def.attributes.keys().collect::<Vec<_>>())
            .field("cross_field", &self.def.cross_field.is_some())
            .finish()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Schema>();
    assert_sync::<Schema>();
};

/// Builder for [`Schema`].
///
/// Parents are folded in the order they are added, later parents overriding
/// earlier ones on a name collision. The schema's own attributes are folded
/// in last and override anything inherited. An override keeps the inherited
/// attribute's position; new names are appended.
///
/// The cross-field hook is the builder's own if one is set, otherwise the
/// first parent's (in `extends` order) that has one.
pub struct SchemaBuilder {
    name: String,
    parents: Vec<Schema>,
    attributes: IndexMap<String, Attribute>,
    cross_field: Option<CrossFieldFn>,
}

impl SchemaBuilder {
    /// Creates an empty builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            attributes: IndexMap::new(),
            cross_field: None,
        }
    }

    /// Inherits the merged attributes (and hook) of `parent`.
    pub fn extends(mut self, parent: &Schema) -> Self {
        self.parents.push(parent.clone());
        self
    }

    /// Declares an attribute.
    ///
    /// Declaring the same name twice keeps the later descriptor.
    pub fn attribute(mut self, name: impl Into<String>, attribute: impl Into<Attribute>) -> Self {
        self.attributes.insert(name.into(), attribute.into());
        self
    }

    /// Sets the cross-field hook.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eav_schema::{Attribute, Schema, ValidationError};
    /// use serde_json::json;
    /// use stillwater::Validation;
    ///
    /// let range = Schema::builder("range")
    ///     .attribute("min_val", Attribute::integer())
    ///     .attribute("max_val", Attribute::integer())
    ///     .cross_field(|data| {
    ///         if data["min_val"].as_i64() >= data["max_val"].as_i64() {
    ///             Validation::Failure(
    ///                 ValidationError::cross_field("max_val", "max_val must be > min_val.").into(),
    ///             )
    ///         } else {
    ///             Validation::Success(())
    ///         }
    ///     })
    ///     .build();
    ///
    /// assert!(range.validate(Some(&json!({"min_val": 1, "max_val": 10}))).is_success());
    /// assert!(range.validate(Some(&json!({"min_val": 10, "max_val": 5}))).is_failure());
    /// ```
    pub fn cross_field<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Validation<(), ValidationErrors> + Send + Sync + 'static,
    {
        self.cross_field = Some(Arc::new(hook));
        self
    }

    /// Merges inherited and own attributes and freezes the schema.
    pub fn build(self) -> Schema {
        let mut attributes: IndexMap<String, Attribute> = IndexMap::new();

        for parent in &self.parents {
            for (name, attribute) in &parent.def.attributes {
                attributes.insert(name.clone(), attribute.clone());
            }
        }
        for (name, attribute) in self.attributes {
            attributes.insert(name, attribute);
        }
        for (name, attribute) in attributes.iter_mut() {
            attribute.bind(name.clone());
        }

        let cross_field = self.cross_field.or_else(|| {
            self.parents
                .iter()
                .find_map(|parent| parent.def.cross_field.clone())
        });

        tracing::debug!(
            schema = %self.name,
            attributes = attributes.len(),
            parents = self.parents.len(),
            cross_field = cross_field.is_some(),
            "built schema"
        );

        Schema {
            def: Arc::new(SchemaDef {
                name: self.name,
                attributes,
                cross_field,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeKind;

    fn base() -> Schema {
        Schema::builder("base")
            .attribute("name", Attribute::string().max_length(10))
            .attribute("count", Attribute::integer().optional())
            .build()
    }

    #[test]
    fn test_build_binds_names() {
        let schema = base();
        for (key, attr) in schema.get_attributes() {
            assert_eq!(attr.name(), key);
        }
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let names: Vec<_> = base().attribute_names().map(String::from).collect();
        assert_eq!(names, vec!["name", "count"]);
    }

    #[test]
    fn test_child_appends_new_names() {
        let child = Schema::builder("child")
            .extends(&base())
            .attribute("flag", Attribute::boolean())
            .build();

        let names: Vec<_> = child.attribute_names().collect();
        assert_eq!(names, vec!["name", "count", "flag"]);
    }

    #[test]
    fn test_override_keeps_inherited_position() {
        let parent = base();
        let child = Schema::builder("child")
            .extends(&parent)
            .attribute("name", Attribute::string().max_length(3))
            .build();

        let names: Vec<_> = child.attribute_names().collect();
        assert_eq!(names, vec!["name", "count"]);

        match child.attribute("name") {
            Some(Attribute::String(attr)) => assert_eq!(attr.max_length, Some(3)),
            other => panic!("unexpected attribute: {:?}", other),
        }
        match parent.attribute("name") {
            Some(Attribute::String(attr)) => assert_eq!(attr.max_length, Some(10)),
            other => panic!("unexpected attribute: {:?}", other),
        }
    }

    #[test]
    fn test_later_parent_wins() {
        let first = Schema::builder("first")
            .attribute("value", Attribute::string())
            .build();
        let second = Schema::builder("second")
            .attribute("value", Attribute::integer())
            .build();

        let merged = Schema::builder("merged")
            .extends(&first)
            .extends(&second)
            .build();

        assert_eq!(merged.attribute("value").map(Attribute::kind), Some(AttributeKind::Integer));
    }

    #[test]
    fn test_get_attributes_returns_copy() {
        let schema = base();
        let mut copy = schema.get_attributes();
        copy.shift_remove("name");

        assert_eq!(copy.len(), 1);
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn test_cross_field_inherited_from_first_parent_with_hook() {
        let plain = base();
        let hooked = Schema::builder("hooked")
            .cross_field(|_| Validation::Success(()))
            .build();

        let child = Schema::builder("child")
            .extends(&plain)
            .extends(&hooked)
            .build();

        assert!(!plain.has_cross_field());
        assert!(child.has_cross_field());
    }

    #[test]
    fn test_clone_shares_definition() {
        let schema = base();
        let clone = schema.clone();
        assert!(schema.ptr_eq(&clone));
        assert!(!schema.ptr_eq(&base()));
    }

    #[test]
    fn test_debug_lists_attribute_names() {
        let debug = format!("{:?}", base());
        assert!(debug.contains("\"name\""));
        assert!(debug.contains("\"count\""));
    }
}
