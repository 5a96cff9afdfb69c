//! Validation helpers shared by the entity model.
//!
//! Validation happens before any request is sent: a failure aborts the
//! pending create/update locally and leaves every cache untouched.

use crate::{EngineError, ResultEngine};

/// Trims `value` and rejects it if nothing is left.
pub fn require_non_empty<'a>(field: &str, value: &'a str) -> ResultEngine<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

/// Unwraps a required optional field.
pub fn require<T>(field: &str, value: Option<T>) -> ResultEngine<T> {
    value.ok_or_else(|| EngineError::Validation(format!("{field} is required")))
}
