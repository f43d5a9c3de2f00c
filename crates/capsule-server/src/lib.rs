//! Capsule Server
//!
//! HTTP front end for the export pipeline:
//!
//! - `POST /v1/projects/:id/export` packages a stored project per platform
//! - `POST /v1/generate` returns generated files for an inline project
//! - `GET /v1/blobs/:name` serves uploaded archives
//! - `GET /health` liveness

pub mod config;
pub mod http;
pub mod logging;

pub use config::{Cli, Config, LogFormat};
pub use http::{create_router, AppState};

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use capsule_core::ProjectSpec;
use capsule_export::{ExportService, InMemoryBlobStorage, InMemoryProjectStore, StaticCapsuleRegistry};
use indexmap::IndexMap;

/// Read a `{ "<id>": <project> }` JSON file.
pub fn load_projects(path: &Path) -> Result<IndexMap<String, ProjectSpec>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read projects file {}", path.display()))?;
    serde_json::from_str(&raw).context("Failed to parse projects file")
}

/// Wire the export service and in-memory collaborators for `config`.
pub fn build_state(config: &Config) -> Result<AppState> {
    let projects = match &config.projects_file {
        Some(path) => load_projects(path)?,
        None => IndexMap::new(),
    };
    tracing::info!(projects = projects.len(), "project store loaded");

    Ok(state_with_projects(config, projects))
}

/// Wire the service around an explicit set of projects.
pub fn state_with_projects(config: &Config, projects: IndexMap<String, ProjectSpec>) -> AppState {
    let blobs = Arc::new(InMemoryBlobStorage::new(config.blob_base_url()));
    let service = ExportService::new(
        Arc::new(InMemoryProjectStore::with_projects(projects)),
        Arc::new(StaticCapsuleRegistry::default()),
        blobs.clone(),
    );
    AppState {
        service: Arc::new(service),
        blobs,
    }
}
