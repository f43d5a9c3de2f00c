//! Core types for the capsule code-generation pipeline.
//!
//! This crate provides the data model shared by every other capsule crate:
//! - The capsule instance tree and the project composition around it
//! - Theme tokens passed through generation
//! - Per-platform build options and their validation rules
//! - Generation and export outputs
//! - Error types

pub mod errors;
pub mod instance;
pub mod options;
pub mod output;
pub mod platform;
pub mod project;
pub mod theme;

pub use errors::*;
pub use instance::*;
pub use options::*;
pub use output::*;
pub use platform::*;
pub use project::*;
pub use theme::*;
