//! Attribute descriptors.
//!
//! A descriptor is the typed validation and coercion rule for one schema
//! field. There is one descriptor struct per scalar kind, each carrying its
//! own constraint payload, and [`Attribute`] is the tagged union over them
//! that schemas store.
//!
//! # Example
//!
//! ```rust
//! use eav_schema::Attribute;
//! use serde_json::json;
//!
//! let attr = Attribute::from(Attribute::string().max_length(5)).with_name("code");
//!
//! assert!(attr.validate(Some(&json!("abcde"))).is_success());
//! assert!(attr.validate(Some(&json!("abcdef"))).is_failure());
//! ```

use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::{ValidationError, ValidationErrors};

/// Generates the builder methods every descriptor kind shares.
///
/// The optional `check` function sees every default and choice before it is
/// stored, and panics on values the kind cannot represent.
macro_rules! common_builders {
    ($native:ty) => {
        common_builders!($native, check = |_: &$native| {});
    };
    ($native:ty, check = $check:expr) => {
        /// Sets whether a value (or a default) must be present.
        pub fn required(mut self, required: bool) -> Self {
            self.options.required = required;
            self
        }

        /// Shorthand for `required(false)`.
        pub fn optional(self) -> Self {
            self.required(false)
        }

        /// Sets the value used when the field is absent.
        pub fn default(mut self, value: impl Into<$native>) -> Self {
            let value = value.into();
            ($check)(&value);
            self.options.default = Some(value);
            self
        }

        /// Sets the descriptive help text shown by renderers.
        pub fn help_text(mut self, text: impl Into<String>) -> Self {
            self.options.help_text = text.into();
            self
        }

        /// Restricts valid values to the given allow-list.
        pub fn choices<I, V>(mut self, choices: I) -> Self
        where
            I: IntoIterator<Item = V>,
            V: Into<$native>,
        {
            let choices: Vec<$native> = choices.into_iter().map(Into::into).collect();
            choices.iter().for_each(|choice| ($check)(choice));
            self.options.choices = Some(choices);
            self
        }
    };
}

mod boolean;
mod decimal;
mod numeric;
mod string;
mod traits;

pub use boolean::BooleanAttribute;
pub use decimal::DecimalAttribute;
pub use numeric::{FloatAttribute, IntegerAttribute};
pub use string::StringAttribute;
pub use traits::Descriptor;

pub(crate) use traits::value_type_name;

use crate::decimal::Decimal;

/// Options shared by every descriptor kind.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeOptions<T> {
    /// The field name, assigned when the owning schema is built.
    pub name: String,
    /// Whether a value (or default) must be present.
    pub required: bool,
    /// Value used when the field is absent.
    pub default: Option<T>,
    /// Descriptive text for renderers; never used in validation.
    pub help_text: String,
    /// Allow-list of valid coerced values.
    pub choices: Option<Vec<T>>,
}

impl<T> Default for AttributeOptions<T> {
    fn default() -> Self {
        Self {
            name: String::new(),
            required: true,
            default: None,
            help_text: String::new(),
            choices: None,
        }
    }
}

/// The kind tag of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    String,
    Boolean,
    Integer,
    Float,
    Decimal,
}

impl AttributeKind {
    /// Returns the lowercase kind name.
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeKind::String => "string",
            AttributeKind::Boolean => "boolean",
            AttributeKind::Integer => "integer",
            AttributeKind::Float => "float",
            AttributeKind::Decimal => "decimal",
        }
    }
}

/// A cleaned value in its canonical in-memory type.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
}

impl AttributeValue {
    /// Converts the value to its JSON storage form.
    ///
    /// Decimals become their exact string; everything else maps directly.
    pub fn to_json(&self) -> Value {
        match self {
            AttributeValue::String(s) => Value::String(s.clone()),
            AttributeValue::Boolean(b) => Value::Bool(*b),
            AttributeValue::Integer(n) => Value::Number((*n).into()),
            AttributeValue::Float(f) => float_to_json(*f),
            AttributeValue::Decimal(d) => Value::String(d.to_string()),
        }
    }

    /// Returns the kind of descriptor that produces this value.
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::String(_) => AttributeKind::String,
            AttributeValue::Boolean(_) => AttributeKind::Boolean,
            AttributeValue::Integer(_) => AttributeKind::Integer,
            AttributeValue::Float(_) => AttributeKind::Float,
            AttributeValue::Decimal(_) => AttributeKind::Decimal,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            AttributeValue::Decimal(d) => Some(d),
            _ => None,
        }
    }
}

/// JSON has no NaN or infinity; those map to `null`.
pub(crate) fn float_to_json(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// A named, typed slot in a schema.
///
/// `Attribute` is the tagged union over the descriptor kinds. Schemas store
/// attributes by value, so the same descriptor declared under two names, or
/// inherited by two schemas, yields independent copies.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    String(StringAttribute),
    Boolean(BooleanAttribute),
    Integer(IntegerAttribute),
    Float(FloatAttribute),
    Decimal(DecimalAttribute),
}

macro_rules! dispatch {
    ($self:expr, $attr:ident => $body:expr) => {
        match $self {
            Attribute::String($attr) => $body,
            Attribute::Boolean($attr) => $body,
            Attribute::Integer($attr) => $body,
            Attribute::Float($attr) => $body,
            Attribute::Decimal($attr) => $body,
        }
    };
}

impl Attribute {
    /// Creates a string descriptor.
    pub fn string() -> StringAttribute {
        StringAttribute::new()
    }

    /// Creates a boolean descriptor.
    pub fn boolean() -> BooleanAttribute {
        BooleanAttribute::new()
    }

    /// Creates an integer descriptor.
    pub fn integer() -> IntegerAttribute {
        IntegerAttribute::new()
    }

    /// Creates a float descriptor.
    pub fn float() -> FloatAttribute {
        FloatAttribute::new()
    }

    /// Creates a decimal descriptor, stored in JSON as an exact string.
    pub fn decimal() -> DecimalAttribute {
        DecimalAttribute::new()
    }

    /// Returns a copy bound to the given name.
    ///
    /// Schemas assign names when they are built; this is for validating a
    /// standalone descriptor.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.bind(name.into());
        self
    }

    pub(crate) fn bind(&mut self, name: String) {
        dispatch!(self, a => a.options.name = name)
    }

    /// Returns the kind tag.
    pub fn kind(&self) -> AttributeKind {
        match self {
            Attribute::String(_) => AttributeKind::String,
            Attribute::Boolean(_) => AttributeKind::Boolean,
            Attribute::Integer(_) => AttributeKind::Integer,
            Attribute::Float(_) => AttributeKind::Float,
            Attribute::Decimal(_) => AttributeKind::Decimal,
        }
    }

    /// Returns the bound field name (empty until bound).
    pub fn name(&self) -> &str {
        dispatch!(self, a => &a.options.name)
    }

    pub fn required(&self) -> bool {
        dispatch!(self, a => a.options.required)
    }

    pub fn help_text(&self) -> &str {
        dispatch!(self, a => &a.options.help_text)
    }

    /// Returns the default as a native value.
    pub fn default_value(&self) -> Option<AttributeValue> {
        match self {
            Attribute::String(a) => a.options.default.clone().map(AttributeValue::String),
            Attribute::Boolean(a) => a.options.default.map(AttributeValue::Boolean),
            Attribute::Integer(a) => a.options.default.map(AttributeValue::Integer),
            Attribute::Float(a) => a.options.default.map(AttributeValue::Float),
            Attribute::Decimal(a) => a.options.default.clone().map(AttributeValue::Decimal),
        }
    }

    /// Returns `to_json(default)`, if there is a default.
    pub fn default_json(&self) -> Option<Value> {
        self.default_value().map(|v| v.to_json())
    }

    /// Returns the allow-list in JSON storage form.
    pub fn choices_json(&self) -> Option<Vec<Value>> {
        dispatch!(self, a => a
            .options
            .choices
            .as_ref()
            .map(|choices| choices.iter().map(|c| a.to_json(c)).collect()))
    }

    /// Returns the kind-specific constraints that are set, as JSON.
    pub fn constraints_json(&self) -> Map<String, Value> {
        let mut constraints = Map::new();
        match self {
            Attribute::String(a) => {
                if let Some(max) = a.max_length {
                    constraints.insert("max_length".into(), max.into());
                }
            }
            Attribute::Boolean(_) => {}
            Attribute::Integer(a) => {
                if let Some(min) = a.min_value {
                    constraints.insert("min_value".into(), min.into());
                }
                if let Some(max) = a.max_value {
                    constraints.insert("max_value".into(), max.into());
                }
            }
            Attribute::Float(a) => {
                if let Some(min) = a.min_value {
                    constraints.insert("min_value".into(), float_to_json(min));
                }
                if let Some(max) = a.max_value {
                    constraints.insert("max_value".into(), float_to_json(max));
                }
            }
            Attribute::Decimal(a) => {
                if let Some(digits) = a.max_digits {
                    constraints.insert("max_digits".into(), digits.into());
                }
                if let Some(places) = a.decimal_places {
                    constraints.insert("decimal_places".into(), places.into());
                }
                if let Some(min) = &a.min_value {
                    constraints.insert("min_value".into(), Value::String(min.to_string()));
                }
                if let Some(max) = &a.max_value {
                    constraints.insert("max_value".into(), Value::String(max.to_string()));
                }
            }
        }
        constraints
    }

    /// Validates and coerces a raw value.
    ///
    /// `None` and JSON `null` are both treated as absent. `Success(None)`
    /// means absent with no default, so the field is left out of the cleaned
    /// mapping.
    pub fn validate(
        &self,
        value: Option<&Value>,
    ) -> Validation<Option<AttributeValue>, ValidationErrors> {
        match self {
            Attribute::String(a) => a.validate(value).map(|v| v.map(AttributeValue::String)),
            Attribute::Boolean(a) => a.validate(value).map(|v| v.map(AttributeValue::Boolean)),
            Attribute::Integer(a) => a.validate(value).map(|v| v.map(AttributeValue::Integer)),
            Attribute::Float(a) => a.validate(value).map(|v| v.map(AttributeValue::Float)),
            Attribute::Decimal(a) => a.validate(value).map(|v| v.map(AttributeValue::Decimal)),
        }
    }

    /// Converts a native value to its JSON storage form.
    pub fn to_json(&self, value: &AttributeValue) -> Value {
        value.to_json()
    }

    /// Converts a stored JSON value back to a native value.
    ///
    /// `null` yields the default. For decimals, an unparsable value also
    /// yields the default.
    pub fn from_json(&self, value: &Value) -> Result<Option<AttributeValue>, ValidationError> {
        Ok(match self {
            Attribute::String(a) => a.from_json(value)?.map(AttributeValue::String),
            Attribute::Boolean(a) => a.from_json(value)?.map(AttributeValue::Boolean),
            Attribute::Integer(a) => a.from_json(value)?.map(AttributeValue::Integer),
            Attribute::Float(a) => a.from_json(value)?.map(AttributeValue::Float),
            Attribute::Decimal(a) => a.from_json(value)?.map(AttributeValue::Decimal),
        })
    }
}

impl From<StringAttribute> for Attribute {
    fn from(attr: StringAttribute) -> Self {
        Attribute::String(attr)
    }
}

impl From<BooleanAttribute> for Attribute {
    fn from(attr: BooleanAttribute) -> Self {
        Attribute::Boolean(attr)
    }
}

impl From<IntegerAttribute> for Attribute {
    fn from(attr: IntegerAttribute) -> Self {
        Attribute::Integer(attr)
    }
}

impl From<FloatAttribute> for Attribute {
    fn from(attr: FloatAttribute) -> Self {
        Attribute::Float(attr)
    }
}

impl From<DecimalAttribute> for Attribute {
    fn from(attr: DecimalAttribute) -> Self {
        Attribute::Decimal(attr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unwrap_success<T, E: std::fmt::Debug>(v: Validation<T, E>) -> T {
        v.into_result().unwrap()
    }

    #[test]
    fn test_with_name_binds_every_kind() {
        let attrs: Vec<Attribute> = vec![
            Attribute::string().into(),
            Attribute::boolean().into(),
            Attribute::integer().into(),
            Attribute::float().into(),
            Attribute::decimal().into(),
        ];

        for attr in attrs {
            let bound = attr.with_name("field");
            assert_eq!(bound.name(), "field");
        }
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(Attribute::from(Attribute::string()).kind(), AttributeKind::String);
        assert_eq!(Attribute::from(Attribute::decimal()).kind().as_str(), "decimal");
    }

    #[test]
    fn test_dispatch_validate_wraps_native_value() {
        let attr = Attribute::from(Attribute::float()).with_name("rate");
        let value = unwrap_success(attr.validate(Some(&json!(5))));
        assert_eq!(value, Some(AttributeValue::Float(5.0)));
    }

    #[test]
    fn test_default_json_serializes_decimal_as_string() {
        let attr = Attribute::from(
            Attribute::decimal()
                .optional()
                .default("0.05".parse::<Decimal>().unwrap()),
        );
        assert_eq!(attr.default_json(), Some(json!("0.05")));
    }

    #[test]
    fn test_choices_json() {
        let attr = Attribute::from(Attribute::integer().choices([1, 2, 3]));
        assert_eq!(attr.choices_json(), Some(vec![json!(1), json!(2), json!(3)]));

        let open = Attribute::from(Attribute::integer());
        assert_eq!(open.choices_json(), None);
    }

    #[test]
    fn test_constraints_json() {
        let attr = Attribute::from(
            Attribute::decimal()
                .max_digits(7)
                .decimal_places(5)
                .min_value(0),
        );
        let constraints = attr.constraints_json();
        assert_eq!(constraints["max_digits"], json!(7));
        assert_eq!(constraints["decimal_places"], json!(5));
        assert_eq!(constraints["min_value"], json!("0"));
        assert!(!constraints.contains_key("max_value"));
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(AttributeValue::Integer(3).as_i64(), Some(3));
        assert_eq!(AttributeValue::Integer(3).as_f64(), None);
        assert_eq!(AttributeValue::String("a".into()).as_str(), Some("a"));
        assert_eq!(AttributeValue::Boolean(true).kind(), AttributeKind::Boolean);
    }

    #[test]
    fn test_non_finite_float_to_json_is_null() {
        assert_eq!(AttributeValue::Float(f64::NAN).to_json(), Value::Null);
    }
}
