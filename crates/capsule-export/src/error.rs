//! Error types for export.

use capsule_core::{format_field_errors, FieldError};
use thiserror::Error;

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors raised by the export pipeline.
///
/// `Validation` and `ProjectNotFound` end the whole request. Everything else
/// is caught per target and becomes that target's error list.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The request failed schema validation.
    #[error("invalid export request: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// The referenced project does not exist.
    #[error("project '{0}' not found")]
    ProjectNotFound(String),

    /// A collaborator (project store, capsule registry) failed.
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        collaborator: &'static str,
        message: String,
    },

    /// Blob upload failed.
    #[error("upload of '{name}' failed: {message}")]
    Upload { name: String, message: String },

    /// Archive construction failed.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error while writing an archive.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
