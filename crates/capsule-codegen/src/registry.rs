//! Compiler registry keyed by platform.

use capsule_core::{CapsuleDefinition, CompilationResult, Platform, PlatformOptions, ProjectSpec};
use indexmap::IndexMap;
use tracing::warn;

use crate::compiler::Compiler;
use crate::error::CodegenError;

/// Registry of platform compilers.
///
/// At most one compiler per platform; registering a second replaces the
/// first. Platforms without a compiler still compile, to a failure.
pub struct CompilerRegistry {
    compilers: IndexMap<Platform, Box<dyn Compiler>>,
}

impl Default for CompilerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            compilers: IndexMap::new(),
        }
    }

    /// Create a registry with the built-in compilers enabled by features.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        #[cfg(feature = "swiftui")]
        registry.register_compiler(crate::generators::swiftui::SwiftUICompiler::new());

        #[cfg(feature = "compose")]
        registry.register_compiler(crate::generators::compose::ComposeCompiler::new());

        #[cfg(feature = "react")]
        registry.register_compiler(crate::generators::react::ReactCompiler::new());

        registry
    }

    /// Register a compiler under its platform, replacing any previous one.
    pub fn register_compiler<C: Compiler + 'static>(&mut self, compiler: C) {
        self.compilers.insert(compiler.platform(), Box::new(compiler));
    }

    pub fn get_compiler(&self, platform: Platform) -> Option<&dyn Compiler> {
        self.compilers.get(&platform).map(|c| c.as_ref())
    }

    /// Platforms with a registered compiler, in registration order.
    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.compilers.keys().copied()
    }

    /// Register capsule templates with every compiler.
    ///
    /// A compiler that rejects a template keeps going with whatever it had;
    /// the failure is returned for its platform so only that target fails.
    pub fn register_capsules(&mut self, defs: &[CapsuleDefinition]) -> IndexMap<Platform, CodegenError> {
        let mut failures = IndexMap::new();
        for (platform, compiler) in self.compilers.iter_mut() {
            if let Err(e) = compiler.register_capsules(defs) {
                warn!(platform = %platform, error = %e, "capsule template rejected");
                failures.insert(*platform, e);
            }
        }
        failures
    }

    /// Compile `project` for `platform` with explicit options.
    pub fn compile(
        &self,
        project: &ProjectSpec,
        platform: Platform,
        options: &PlatformOptions,
    ) -> CompilationResult {
        match self.get_compiler(platform) {
            Some(compiler) => compiler.compile_with(project, options),
            None => CompilationResult::failure(
                platform,
                vec![format!("compiler not available for platform '{platform}'")],
                Vec::new(),
            ),
        }
    }
}
