//! Error types for the capsule data model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::Platform;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while interpreting pipeline input.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("options for {found} cannot configure a {expected} compiler")]
    PlatformMismatch { expected: Platform, found: Platform },

    #[error("invalid options: {}", format_field_errors(.0))]
    InvalidOptions(Vec<FieldError>),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A validation failure attached to one field of an input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path to the offending field, e.g. `targets[1].options.minSdk`.
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Join field errors into one line.
pub fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
