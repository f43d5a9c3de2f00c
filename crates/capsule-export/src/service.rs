//! Export orchestration.
//!
//! A request runs each target to completion before starting the next:
//! compile, package, upload. A target's failure, including a panic inside
//! a compiler, is recorded on its own `ExportResult` and never stops the
//! loop.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use capsule_codegen::{CodegenError, CompilerRegistry};
use capsule_core::{
    CompilationResult, ExportResult, FieldError, Platform, PlatformOptions, ProjectSpec,
};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, info_span, warn};

use crate::aggregate::{aggregate, ExportOutcome};
use crate::error::{ExportError, Result};
use crate::packager::{blob_key, package, PackageOptions};
use crate::store::{BlobStorage, CapsuleRegistry, ProjectStore};
use crate::validator::{validate_request, ExportRequest, ExportTarget};

type RegistryFactory = Box<dyn Fn() -> CompilerRegistry + Send + Sync>;

/// Runs export and inline-generation requests.
///
/// Compilers are built fresh for every request, so concurrent requests
/// never share compiler state.
pub struct ExportService {
    projects: Arc<dyn ProjectStore>,
    capsules: Arc<dyn CapsuleRegistry>,
    blobs: Arc<dyn BlobStorage>,
    compilers: RegistryFactory,
}

impl ExportService {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        capsules: Arc<dyn CapsuleRegistry>,
        blobs: Arc<dyn BlobStorage>,
    ) -> Self {
        Self {
            projects,
            capsules,
            blobs,
            compilers: Box::new(CompilerRegistry::with_defaults),
        }
    }

    /// Replace how the per-request compiler registry is built.
    pub fn with_compilers<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> CompilerRegistry + Send + Sync + 'static,
    {
        self.compilers = Box::new(factory);
        self
    }

    /// Validate a raw request and export the project it names.
    pub fn export(&self, project_id: &str, raw_request: &Value) -> Result<ExportOutcome> {
        let request = validate_request(raw_request)?;
        self.export_request(project_id, &request)
    }

    /// Export a project for already-validated targets.
    pub fn export_request(&self, project_id: &str, request: &ExportRequest) -> Result<ExportOutcome> {
        let _span = info_span!("export", project = project_id).entered();

        let project = self
            .projects
            .get_project(project_id)?
            .ok_or_else(|| ExportError::ProjectNotFound(project_id.to_string()))?;
        let (registry, rejected) = self.registry()?;

        let package_options = PackageOptions {
            include_readme: request.include_readme,
            include_gitignore: request.include_gitignore,
        };

        let exports = request
            .targets
            .iter()
            .map(|target| {
                if let Some(e) = rejected.get(&target.platform) {
                    return ExportResult::failed(target.platform, vec![e.to_string()], Vec::new());
                }
                self.export_target(project_id, &project, &registry, target, package_options)
            })
            .collect();

        let outcome = aggregate(exports);
        let summary = &outcome.response.summary;
        info!(
            succeeded = summary.successful_platforms.len(),
            failed = summary.failed_platforms.len(),
            total_size = summary.total_size,
            "export finished"
        );
        Ok(outcome)
    }

    /// Compile every target of an inline project without packaging.
    ///
    /// Options come from the project's platform config, defaults otherwise.
    pub fn generate_inline(&self, project: &ProjectSpec) -> Result<Vec<CompilationResult>> {
        let _span = info_span!("generate", project = %project.name).entered();

        if project.targets.is_empty() {
            return Err(ExportError::Validation(vec![FieldError::new(
                "targets",
                "must contain at least one target",
            )]));
        }

        let (registry, rejected) = self.registry()?;
        let results: Vec<CompilationResult> = project
            .targets
            .iter()
            .map(|&platform| {
                if let Some(e) = rejected.get(&platform) {
                    return CompilationResult::failure(platform, vec![e.to_string()], Vec::new());
                }
                let options = project
                    .platform_config
                    .as_ref()
                    .map(|config| config.options_for(platform))
                    .unwrap_or_else(|| PlatformOptions::default_for(platform));
                compile_guarded(&registry, project, platform, &options)
            })
            .collect();

        info!(
            targets = results.len(),
            failed = results.iter().filter(|r| !r.success).count(),
            "inline generation finished"
        );
        Ok(results)
    }

    /// A fresh registry with the current capsule templates, plus the
    /// platforms whose compiler rejected a template.
    fn registry(&self) -> Result<(CompilerRegistry, IndexMap<Platform, CodegenError>)> {
        let definitions = self.capsules.capsule_definitions()?;
        let mut registry = (self.compilers)();
        let rejected = registry.register_capsules(&definitions);
        Ok((registry, rejected))
    }

    fn export_target(
        &self,
        project_id: &str,
        project: &ProjectSpec,
        registry: &CompilerRegistry,
        target: &ExportTarget,
        options: PackageOptions,
    ) -> ExportResult {
        let platform = target.platform;

        let result = compile_guarded(registry, project, platform, &target.options);
        if !result.success {
            warn!(platform = %platform, errors = ?result.errors, "compilation failed");
            return ExportResult::failed(platform, result.errors, result.warnings);
        }

        let packaged = match panic::catch_unwind(AssertUnwindSafe(|| package(project, &result, options))) {
            Ok(Ok(packaged)) => packaged,
            Ok(Err(e)) => {
                warn!(platform = %platform, error = %e, "packaging failed");
                return ExportResult::failed(platform, vec![e.to_string()], result.warnings);
            }
            Err(payload) => {
                let message = format!("packaging panicked: {}", panic_message(payload.as_ref()));
                warn!(platform = %platform, "{message}");
                return ExportResult::failed(platform, vec![message], result.warnings);
            }
        };

        let name = blob_key(project_id, project, platform);
        let file_count = packaged.file_count;
        let size = packaged.size();
        debug!(platform = %platform, archive = %name, files = file_count, bytes = size, "packaged");

        match self.blobs.upload(packaged.bytes, &name) {
            Ok(url) => {
                info!(platform = %platform, url = %url, "archive uploaded");
                ExportResult::succeeded(platform, url, file_count, size, result.warnings)
            }
            Err(e) => {
                warn!(platform = %platform, error = %e, "upload failed");
                ExportResult::failed(platform, vec![e.to_string()], result.warnings)
            }
        }
    }
}

/// Compile one target, turning a compiler panic into a failed result.
fn compile_guarded(
    registry: &CompilerRegistry,
    project: &ProjectSpec,
    platform: Platform,
    options: &PlatformOptions,
) -> CompilationResult {
    match panic::catch_unwind(AssertUnwindSafe(|| registry.compile(project, platform, options))) {
        Ok(result) => result,
        Err(payload) => {
            let message = format!("compiler panicked: {}", panic_message(payload.as_ref()));
            warn!(platform = %platform, "{message}");
            CompilationResult::failure(platform, vec![message], Vec::new())
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
