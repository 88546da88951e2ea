//! # eav-schema
//!
//! Declarative attribute schemas for dictionary-shaped JSON data. A schema
//! validates, coerces and normalizes an input mapping, and reports ALL
//! field errors in one pass rather than stopping at the first.
//!
//! ## Overview
//!
//! Attribute values live in a free-form JSON object (an
//! entity-attribute-value store). A [`Schema`] declares which keys may
//! appear, their types and constraints; [`Schema::validate`] turns raw input
//! into a cleaned mapping or a field-keyed error report. Errors accumulate
//! through stillwater's `Validation` type.
//!
//! ## Core Types
//!
//! - [`Attribute`]: a typed descriptor for one field (string, boolean,
//!   integer, float, decimal)
//! - [`Schema`] / [`SchemaBuilder`]: a named, ordered attribute set with
//!   inheritance and an optional cross-field hook
//! - [`ValidationError`] / [`ValidationErrors`]: single and accumulated
//!   failures, keyed by [`ErrorKey`]
//! - [`Decimal`]: an exact decimal stored in JSON as a string
//! - [`SchemaRegistry`], [`SchemaRef`], [`FieldBinding`]: lookup by
//!   identifier and per-record schema selection
//!
//! ## Example
//!
//! ```rust
//! use eav_schema::{Attribute, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::builder("billing.InstallmentConfig")
//!     .attribute("supports_variable_rate", Attribute::boolean().optional().default(false))
//!     .attribute("variable_rate_index", Attribute::string().optional())
//!     .attribute(
//!         "rate_floor",
//!         Attribute::decimal().optional().max_digits(7).decimal_places(5),
//!     )
//!     .build();
//!
//! let cleaned = schema
//!     .validate(Some(&json!({"rate_floor": "0.06500"})))
//!     .into_result()
//!     .unwrap();
//! assert_eq!(cleaned["rate_floor"], json!("0.06500"));
//! assert_eq!(cleaned["supports_variable_rate"], json!(false));
//!
//! let errors = schema
//!     .validate(Some(&json!({"rate_floor": "1.123456", "extra": 1})))
//!     .into_result()
//!     .unwrap_err();
//! assert!(errors.has_key("rate_floor"));
//! assert!(errors.has_key("extra"));
//! ```

pub mod attribute;
pub mod decimal;
pub mod error;
pub mod field;
pub mod introspect;
pub mod key;
pub mod registry;
pub mod schema;
pub mod validation;

pub use attribute::{
    Attribute, AttributeKind, AttributeOptions, AttributeValue, BooleanAttribute,
    DecimalAttribute, Descriptor, FloatAttribute, IntegerAttribute, StringAttribute,
};
pub use decimal::{Decimal, DecimalParseError, MAX_EXPONENT};
pub use error::{ErrorKind, ValidationError, ValidationErrors};
pub use field::{BindingDescriptor, BindingError, FieldBinding};
pub use introspect::{AttributeDescription, InputHint, SchemaDescription};
pub use key::{ErrorKey, NON_FIELD_KEY};
pub use registry::{RegistryError, ResolveError, SchemaRef, SchemaRegistry, SchemaResolver};
pub use schema::{CrossFieldFn, Schema, SchemaBuilder};

/// Type alias for validation results using ValidationErrors
pub type ValidationResult<T> = stillwater::Validation<T, ValidationErrors>;
