//! Error types for code generation.

use capsule_core::{CoreError, Platform};
use thiserror::Error;

/// Result type alias for codegen operations.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur during code generation.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// Template rendering error.
    #[error("Template error: {0}")]
    TemplateError(#[from] handlebars::RenderError),

    /// Invalid template.
    #[error("Invalid template for capsule '{capsule}': {source}")]
    InvalidTemplate {
        capsule: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    /// Options for another platform were handed to this compiler.
    #[error("{compiler} compiler cannot use {options} options")]
    PlatformMismatch {
        compiler: Platform,
        options: Platform,
    },

    /// Two screens map to the same generated file.
    #[error("Screens '{first}' and '{second}' both generate {path}")]
    DuplicateScreenFile {
        first: String,
        second: String,
        path: String,
    },

    /// Invalid options or input.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
