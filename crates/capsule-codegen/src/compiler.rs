//! Per-platform compilers.
//!
//! A [`Compiler`] turns a whole project into the files of one platform's
//! native project. Platform specifics (file layout, scaffolding, navigation
//! wrapper) live behind [`PlatformTarget`]; the compile loop is shared.

use std::marker::PhantomData;

use capsule_core::{
    CapsuleDefinition, CompilationResult, GeneratedFile, Platform, PlatformOptions, ProjectSpec,
    ScreenSpec,
};
use indexmap::IndexMap;
use tracing::debug;

use crate::error::{CodegenError, Result};
use crate::generators::{Dialect, Generator};

/// The interface the orchestrator depends on.
pub trait Compiler: Send + Sync {
    /// Platform this compiler produces.
    fn platform(&self) -> Platform;

    /// Replace the options used by [`Compiler::compile`]. Rejects options
    /// shaped for another platform and options that fail validation.
    fn configure(&mut self, options: PlatformOptions) -> Result<()>;

    /// Options currently configured (documented defaults until configured).
    fn options(&self) -> &PlatformOptions;

    /// Register capsule templates; returns how many apply to this platform.
    fn register_capsules(&mut self, defs: &[CapsuleDefinition]) -> Result<usize>;

    /// Compile with explicitly supplied options. Never panics on bad input:
    /// every failure is reported through `CompilationResult::errors`.
    fn compile_with(&self, project: &ProjectSpec, options: &PlatformOptions) -> CompilationResult;

    /// Compile with the configured options.
    fn compile(&self, project: &ProjectSpec) -> CompilationResult {
        self.compile_with(project, self.options())
    }
}

/// Platform-specific half of a compiler.
pub trait PlatformTarget: Send + Sync + 'static {
    /// This platform's option shape.
    type Options: Send + Sync;

    const PLATFORM: Platform;

    /// The capsule table for this platform.
    fn dialect() -> Dialect;

    /// Extract this platform's options.
    fn select(options: &PlatformOptions) -> Option<&Self::Options>;

    /// Wrap a generated root fragment into the screen's top-level file.
    fn screen_file(
        project: &ProjectSpec,
        options: &Self::Options,
        screen: &ScreenSpec,
        body: &str,
    ) -> GeneratedFile;

    /// Files not tied to one screen: entry point, navigation, theme, build scaffolding.
    fn support_files(project: &ProjectSpec, options: &Self::Options) -> Result<Vec<GeneratedFile>>;
}

/// A compiler for the platform described by `T`.
pub struct PlatformCompiler<T: PlatformTarget> {
    generator: Generator<'static>,
    options: PlatformOptions,
    target: PhantomData<fn() -> T>,
}

impl<T: PlatformTarget> PlatformCompiler<T> {
    pub fn new() -> Self {
        Self {
            generator: Generator::new(T::dialect()),
            options: PlatformOptions::default_for(T::PLATFORM),
            target: PhantomData,
        }
    }

    pub fn generator(&self) -> &Generator<'static> {
        &self.generator
    }

    fn warnings(&self, project: &ProjectSpec) -> Vec<String> {
        let mut warnings = Vec::new();

        if project.screens.is_empty() {
            warnings.push("project has no screens".to_string());
        }

        if let Some(initial) = &project.navigation.initial_screen {
            if project.screen(initial).is_none() {
                warnings.push(format!(
                    "initial screen '{initial}' does not exist; using the first screen"
                ));
            }
        }

        for screen in &project.screens {
            for capsule in self.generator.unknown_capsules(&screen.root) {
                warnings.push(format!(
                    "screen '{}': no {} template for capsule '{capsule}'",
                    screen.id,
                    T::PLATFORM
                ));
            }
        }

        warnings
    }

    fn screen_files(&self, project: &ProjectSpec, options: &T::Options) -> Result<Vec<GeneratedFile>> {
        let mut files = Vec::with_capacity(project.screens.len());
        let mut owners: IndexMap<String, &str> = IndexMap::new();

        for screen in &project.screens {
            let body = self.generator.generate(&screen.root, &project.theme)?;
            let file = T::screen_file(project, options, screen, &body);

            if let Some(first) = owners.insert(file.path.clone(), &screen.id) {
                return Err(CodegenError::DuplicateScreenFile {
                    first: first.to_string(),
                    second: screen.id.clone(),
                    path: file.path,
                });
            }
            files.push(file);
        }

        Ok(files)
    }
}

impl<T: PlatformTarget> Default for PlatformCompiler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PlatformTarget> Compiler for PlatformCompiler<T> {
    fn platform(&self) -> Platform {
        T::PLATFORM
    }

    fn configure(&mut self, options: PlatformOptions) -> Result<()> {
        if options.platform() != T::PLATFORM {
            return Err(CodegenError::PlatformMismatch {
                compiler: T::PLATFORM,
                options: options.platform(),
            });
        }
        options.ensure_valid()?;
        self.options = options;
        Ok(())
    }

    fn options(&self) -> &PlatformOptions {
        &self.options
    }

    fn register_capsules(&mut self, defs: &[CapsuleDefinition]) -> Result<usize> {
        self.generator.register_capsules(defs)
    }

    fn compile_with(&self, project: &ProjectSpec, options: &PlatformOptions) -> CompilationResult {
        let platform = T::PLATFORM;
        let warnings = self.warnings(project);

        let Some(selected) = T::select(options) else {
            let err = CodegenError::PlatformMismatch {
                compiler: platform,
                options: options.platform(),
            };
            return CompilationResult::failure(platform, vec![err.to_string()], warnings);
        };

        let violations = options.validate("options");
        if !violations.is_empty() {
            let errors = violations.iter().map(ToString::to_string).collect();
            return CompilationResult::failure(platform, errors, warnings);
        }

        let mut files = match self.screen_files(project, selected) {
            Ok(files) => files,
            Err(e) => return CompilationResult::failure(platform, vec![e.to_string()], warnings),
        };

        match T::support_files(project, selected) {
            Ok(support) => files.extend(support),
            Err(e) => return CompilationResult::failure(platform, vec![e.to_string()], warnings),
        }

        debug!(
            platform = %platform,
            project = %project.name,
            files = files.len(),
            warnings = warnings.len(),
            "compiled project"
        );

        CompilationResult::success(platform, files, warnings)
    }
}
