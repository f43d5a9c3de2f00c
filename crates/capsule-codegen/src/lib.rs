//! Capsule Codegen
//!
//! Turns capsule trees into platform-native source.
//!
//! # Supported Targets
//!
//! - **SwiftUI** (iOS): XcodeGen project with one view per screen
//! - **Jetpack Compose** (Android): Gradle project with one composable per screen
//! - **React** (Web): Vite + TypeScript project with one component per screen
//!
//! # Example
//!
//! ```rust,ignore
//! use capsule_codegen::{CompilerRegistry, Compiler};
//! use capsule_core::{Platform, PlatformOptions};
//!
//! let registry = CompilerRegistry::with_defaults();
//! let result = registry.compile(&project, Platform::Ios, &PlatformOptions::default_for(Platform::Ios));
//! for file in &result.files {
//!     println!("{}", file.path);
//! }
//! ```

pub mod compiler;
pub mod error;
pub mod generators;
pub mod registry;

pub use compiler::{Compiler, PlatformCompiler, PlatformTarget};
pub use error::{CodegenError, Result};
pub use generators::{Dialect, Fragment, Generator, TemplateEngine};
pub use registry::CompilerRegistry;

#[cfg(feature = "swiftui")]
pub use generators::swiftui::SwiftUICompiler;

#[cfg(feature = "compose")]
pub use generators::compose::ComposeCompiler;

#[cfg(feature = "react")]
pub use generators::react::ReactCompiler;
