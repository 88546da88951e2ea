//! Error types for validation failures.
//!
//! This module provides [`ValidationError`] for a single failed check and
//! [`ValidationErrors`] for the aggregated, field-keyed report a schema
//! validation pass produces.

mod validation_error;

pub use validation_error::{ErrorKind, ValidationError, ValidationErrors};
