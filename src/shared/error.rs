//! Shared Error Types
//!
//! Error types used by both the pure data layer (`shared`) and the server
//! (`backend`).
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - Data validation failures
//! - `IntervalError` - Malformed metric interval expressions
//!
//! # Usage
//!
//! ```rust
//! use task_social::shared::error::SharedError;
//!
//! let error = SharedError::validation("interval", "must not be empty");
//! assert!(error.to_string().contains("interval"));
//! ```
use thiserror::Error;

use crate::shared::interval::IntervalError;

/// Shared error types that can occur in both the data layer and the server
#[derive(Debug, Error, Clone)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Metric interval could not be parsed
    #[error("Interval error: {0}")]
    IntervalError(#[from] IntervalError),
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
