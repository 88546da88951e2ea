//! Error keys for locating failures in a validated mapping.
//!
//! Schemas validate flat mappings, so every error belongs either to one
//! attribute (by name) or to the mapping as a whole. [`ErrorKey`] captures
//! that distinction; its string form is what appears in an error report.

use std::fmt::{self, Display};

/// Reserved report key for errors that do not belong to a single field.
pub const NON_FIELD_KEY: &str = "__all__";

/// Where in a mapping a validation error applies.
///
/// # Example
///
/// ```rust
/// use eav_schema::ErrorKey;
///
/// assert_eq!(ErrorKey::field("rate").to_string(), "rate");
/// assert_eq!(ErrorKey::NonField.to_string(), "__all__");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKey {
    /// The mapping itself (e.g. the input was not a mapping at all).
    NonField,
    /// A single named field.
    Field(String),
}

impl ErrorKey {
    /// Creates a key for the named field.
    pub fn field(name: impl Into<String>) -> Self {
        ErrorKey::Field(name.into())
    }

    /// Returns true if this key addresses the whole mapping.
    pub fn is_non_field(&self) -> bool {
        matches!(self, ErrorKey::NonField)
    }

    /// Returns the field name, or None for the non-field key.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            ErrorKey::NonField => None,
            ErrorKey::Field(name) => Some(name),
        }
    }

    /// Returns the key as it appears in a report.
    pub fn as_str(&self) -> &str {
        match self {
            ErrorKey::NonField => NON_FIELD_KEY,
            ErrorKey::Field(name) => name,
        }
    }
}

impl Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ErrorKey {
    fn from(name: &str) -> Self {
        if name == NON_FIELD_KEY {
            ErrorKey::NonField
        } else {
            ErrorKey::Field(name.to_string())
        }
    }
}

impl From<String> for ErrorKey {
    fn from(name: String) -> Self {
        if name == NON_FIELD_KEY {
            ErrorKey::NonField
        } else {
            ErrorKey::Field(name)
        }
    }
}
