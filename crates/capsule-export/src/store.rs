//! Collaborators consumed by the export service, with in-memory versions.

use std::sync::RwLock;

use capsule_core::{CapsuleDefinition, ProjectSpec};
use indexmap::IndexMap;

use crate::error::{ExportError, Result};

/// Source of project definitions.
pub trait ProjectStore: Send + Sync {
    /// Fetch a project; `Ok(None)` when it does not exist.
    fn get_project(&self, id: &str) -> Result<Option<ProjectSpec>>;
}

/// Source of capsule definitions and their per-platform templates.
pub trait CapsuleRegistry: Send + Sync {
    fn capsule_definitions(&self) -> Result<Vec<CapsuleDefinition>>;
}

/// Destination for finished archives.
pub trait BlobStorage: Send + Sync {
    /// Store `bytes` under `name` and return a download URL.
    fn upload(&self, bytes: Vec<u8>, name: &str) -> Result<String>;
}

fn poisoned(collaborator: &'static str) -> ExportError {
    ExportError::Collaborator {
        collaborator,
        message: "lock poisoned".to_string(),
    }
}

/// Projects held in memory, keyed by id.
#[derive(Default)]
pub struct InMemoryProjectStore {
    projects: RwLock<IndexMap<String, ProjectSpec>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(projects: impl IntoIterator<Item = (String, ProjectSpec)>) -> Self {
        Self {
            projects: RwLock::new(projects.into_iter().collect()),
        }
    }

    /// Insert or replace a project.
    pub fn insert(&self, id: impl Into<String>, project: ProjectSpec) -> Result<()> {
        self.projects
            .write()
            .map_err(|_| poisoned("project store"))?
            .insert(id.into(), project);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.projects.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn get_project(&self, id: &str) -> Result<Option<ProjectSpec>> {
        let projects = self.projects.read().map_err(|_| poisoned("project store"))?;
        Ok(projects.get(id).cloned())
    }
}

/// A fixed list of capsule definitions.
#[derive(Debug, Clone, Default)]
pub struct StaticCapsuleRegistry {
    definitions: Vec<CapsuleDefinition>,
}

impl StaticCapsuleRegistry {
    pub fn new(definitions: Vec<CapsuleDefinition>) -> Self {
        Self { definitions }
    }
}

impl CapsuleRegistry for StaticCapsuleRegistry {
    fn capsule_definitions(&self) -> Result<Vec<CapsuleDefinition>> {
        Ok(self.definitions.clone())
    }
}

/// Archives held in memory; URLs point at `base_url`.
pub struct InMemoryBlobStorage {
    base_url: String,
    blobs: RwLock<IndexMap<String, Vec<u8>>>,
}

impl InMemoryBlobStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            blobs: RwLock::new(IndexMap::new()),
        }
    }

    /// Stored bytes for `name`.
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.blobs.read().ok()?.get(name).cloned()
    }

    /// Names of stored blobs, in upload order.
    pub fn names(&self) -> Vec<String> {
        self.blobs
            .read()
            .map(|blobs| blobs.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl BlobStorage for InMemoryBlobStorage {
    fn upload(&self, bytes: Vec<u8>, name: &str) -> Result<String> {
        self.blobs
            .write()
            .map_err(|_| ExportError::Upload {
                name: name.to_string(),
                message: "lock poisoned".to_string(),
            })?
            .insert(name.to_string(), bytes);
        Ok(format!("{}/{name}", self.base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_store_roundtrip() {
        let store = InMemoryProjectStore::new();
        assert!(store.get_project("p1").unwrap().is_none());
        store.insert("p1", ProjectSpec::new("One", "1.0.0")).unwrap();
        assert_eq!(store.get_project("p1").unwrap().unwrap().name, "One");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_blob_urls() {
        let blobs = InMemoryBlobStorage::new("http://localhost:8080/v1/blobs/");
        let url = blobs.upload(vec![1, 2, 3], "app-ios-v1.zip").unwrap();
        assert_eq!(url, "http://localhost:8080/v1/blobs/app-ios-v1.zip");
        assert_eq!(blobs.get("app-ios-v1.zip"), Some(vec![1, 2, 3]));
        assert_eq!(blobs.names(), vec!["app-ios-v1.zip"]);
    }
}
