//! Capsule Export
//!
//! Validates export requests, compiles each requested platform, packages the
//! generated files into zip archives and uploads them. Every target succeeds
//! or fails on its own; the response lists each outcome.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use capsule_export::{ExportService, InMemoryBlobStorage, InMemoryProjectStore, StaticCapsuleRegistry};
//!
//! let service = ExportService::new(
//!     Arc::new(InMemoryProjectStore::new()),
//!     Arc::new(StaticCapsuleRegistry::default()),
//!     Arc::new(InMemoryBlobStorage::new("http://localhost:8080/v1/blobs")),
//! );
//! let outcome = service.export("project-id", &request_json)?;
//! ```

pub mod aggregate;
pub mod error;
pub mod packager;
pub mod service;
pub mod store;
pub mod validator;

pub use aggregate::{aggregate, ExportOutcome, ExportStatus};
pub use error::{ExportError, Result};
pub use packager::{archive_name, blob_key, package, Package, PackageOptions};
pub use service::ExportService;
pub use store::{
    BlobStorage, CapsuleRegistry, InMemoryBlobStorage, InMemoryProjectStore, ProjectStore,
    StaticCapsuleRegistry,
};
pub use validator::{validate_request, ExportRequest, ExportTarget, EXPORTABLE_PLATFORMS};
