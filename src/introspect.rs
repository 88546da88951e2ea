//! Serializable schema descriptions for renderers.
//!
//! Renderers (admin forms, documentation generators) need to know each
//! attribute's kind, constraints and a suitable input control without
//! matching on descriptor internals. [`Schema::describe`] produces that as
//! plain data.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::attribute::{Attribute, AttributeKind};
use crate::schema::Schema;

/// A renderer-facing description of a schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDescription {
    pub name: String,
    pub attributes: Vec<AttributeDescription>,
}

/// A renderer-facing description of one attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeDescription {
    pub name: String,
    pub label: String,
    pub kind: AttributeKind,
    pub required: bool,
    pub help_text: String,
    pub default: Option<Value>,
    pub choices: Option<Vec<Value>>,
    pub constraints: Map<String, Value>,
    pub input: InputHint,
}

/// The input control suited to an attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputHint {
    /// A checkbox (booleans).
    Checkbox,
    /// A drop-down over the allowed values, with a blank entry when the
    /// attribute is optional.
    Select { options: Vec<Value>, allow_blank: bool },
    /// A numeric input; `step` is `"1"` for integers, `"any"` otherwise.
    Number { step: String },
    /// A free-text input.
    Text { max_length: Option<usize> },
}

impl Attribute {
    /// Returns the input control suited to this attribute.
    pub fn input_hint(&self) -> InputHint {
        match self {
            Attribute::Boolean(_) => InputHint::Checkbox,
            Attribute::String(attr) => match &attr.options.choices {
                Some(choices) if !choices.is_empty() => InputHint::Select {
                    options: choices.iter().cloned().map(Value::String).collect(),
                    allow_blank: !attr.options.required,
                },
                _ => InputHint::Text {
                    max_length: attr.max_length,
                },
            },
            Attribute::Integer(_) => InputHint::Number {
                step: "1".to_string(),
            },
            Attribute::Float(_) | Attribute::Decimal(_) => InputHint::Number {
                step: "any".to_string(),
            },
        }
    }

    /// Returns the description of this attribute.
    pub fn describe(&self) -> AttributeDescription {
        AttributeDescription {
            name: self.name().to_string(),
            label: label_for(self.name()),
            kind: self.kind(),
            required: self.required(),
            help_text: self.help_text().to_string(),
            default: self.default_json(),
            choices: self.choices_json(),
            constraints: self.constraints_json(),
            input: self.input_hint(),
        }
    }
}

impl Schema {
    /// Describes every attribute, in merged order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eav_schema::{Attribute, InputHint, Schema};
    ///
    /// let schema = Schema::builder("config")
    ///     .attribute("rate_floor", Attribute::decimal().optional())
    ///     .build();
    ///
    /// let description = schema.describe();
    /// let rate = &description.attributes[0];
    /// assert_eq!(rate.label, "Rate Floor");
    /// assert_eq!(rate.input, InputHint::Number { step: "any".to_string() });
    /// ```
    pub fn describe(&self) -> SchemaDescription {
        SchemaDescription {
            name: self.name().to_string(),
            attributes: self.def.attributes.values().map(Attribute::describe).collect(),
        }
    }
}

/// Turns a field name into a display label: `rate_floor` becomes
/// `Rate Floor`.
///
/// Every letter that follows a non-letter is upper-cased and every other
/// letter lower-cased.
pub fn label_for(name: &str) -> String {
    let mut label = String::with_capacity(name.len());
    let mut prev_is_letter = false;
    for ch in name.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if prev_is_letter {
                label.extend(ch.to_lowercase());
            } else {
                label.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            label.push(ch);
            prev_is_letter = false;
        }
    }
    label
}
