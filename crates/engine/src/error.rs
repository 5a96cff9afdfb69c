//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidAmount`] thrown when a monetary value cannot be parsed.
//! - [`Validation`] thrown when a required field is missing or empty.
//! - [`Overflow`] thrown when an aggregate does not fit in minor units.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`Validation`]: EngineError::Validation
//!  [`Overflow`]: EngineError::Overflow
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Overflow: {0}")]
    Overflow(String),
}
