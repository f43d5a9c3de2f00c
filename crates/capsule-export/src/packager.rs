//! Archive packaging.

use std::io::{Cursor, Write};

use capsule_core::{CompilationResult, GeneratedFile, Platform, ProjectSpec};
use zip::write::{FileOptions, ZipWriter};
use zip::{CompressionMethod, DateTime};

use crate::error::Result;

/// Path of the injected ignore file.
pub const GITIGNORE_PATH: &str = ".gitignore";
/// Path of the injected readme.
pub const README_PATH: &str = "README.md";

const COMMON_IGNORE: &str = "# OS
.DS_Store
Thumbs.db

# Editors
.idea/
.vscode/
*.swp
*~

# Logs
*.log
";

/// Toolchain artifacts, credentials and caches for one platform.
fn platform_ignore(platform: Platform) -> &'static str {
    match platform {
        Platform::Ios => {
            "# Xcode
build/
DerivedData/
*.xcuserstate
xcuserdata/
*.xcodeproj/
Pods/

# Signing
*.mobileprovision
*.p12
"
        }
        Platform::Android => {
            "# Gradle
.gradle/
build/
app/build/
local.properties
captures/

# Signing
*.jks
*.keystore
google-services.json
"
        }
        Platform::Web => {
            "# Node
node_modules/
dist/
.vite/

# Environment
.env
.env.local
"
        }
        Platform::Desktop => {
            "# Build output
target/
dist/
out/

# Environment
.env
"
        }
    }
}

/// Ignore file content: the common block followed by the platform block.
pub fn gitignore(platform: Platform) -> String {
    format!("{COMMON_IGNORE}\n{}", platform_ignore(platform))
}

fn build_instructions(platform: Platform) -> &'static str {
    match platform {
        Platform::Ios => {
            "1. Install [XcodeGen](https://github.com/yonaskolb/XcodeGen).
2. Run `xcodegen generate` in this directory.
3. Open the generated `.xcodeproj` in Xcode and run."
        }
        Platform::Android => {
            "1. Open this directory in Android Studio.
2. Let Gradle sync.
3. Run the `app` configuration on a device or emulator."
        }
        Platform::Web => {
            "1. Run `npm install`.
2. Run `npm run dev` and open the printed URL."
        }
        Platform::Desktop => "Open the project in your desktop toolchain and build.",
    }
}

/// Readme describing the exported project.
pub fn readme(project: &ProjectSpec, platform: Platform, files: &[GeneratedFile]) -> String {
    let listing: Vec<String> = files.iter().map(|f| format!("- `{}`", f.path)).collect();
    format!(
        "# {name}\n\nVersion {version}, generated for {display} ({id}).\n\n## Build\n\n{steps}\n\n## Files\n\n{listing}\n",
        name = project.name,
        version = project.version,
        display = platform.display_name(),
        id = platform.id(),
        steps = build_instructions(platform),
        listing = listing.join("\n")
    )
}

/// What to add alongside the compiled files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageOptions {
    pub include_readme: bool,
    pub include_gitignore: bool,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            include_readme: true,
            include_gitignore: true,
        }
    }
}

/// A finished archive.
#[derive(Debug, Clone)]
pub struct Package {
    pub bytes: Vec<u8>,
    /// Entries written, extras included.
    pub file_count: usize,
}

impl Package {
    /// Archive size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Archive file name: `<kebab project name>-<platform>-v<version>.zip`.
pub fn archive_name(project: &ProjectSpec, platform: Platform) -> String {
    let slug: String = project
        .name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let slug = if slug.is_empty() { "project".to_string() } else { slug };
    let version: String = project
        .version
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
        .collect();
    format!("{slug}-{}-v{version}.zip", platform.id())
}

/// Storage key for a project's archive: `<project id>/<archive name>`.
///
/// Projects that share a name and version still get distinct keys. Id bytes
/// outside `[A-Za-z0-9_-]` are written as `~XX`, so distinct ids never
/// collide and a key never contains a second `/`.
pub fn blob_key(project_id: &str, project: &ProjectSpec, platform: Platform) -> String {
    let mut id = String::with_capacity(project_id.len());
    for byte in project_id.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-') {
            id.push(byte as char);
        } else {
            id.push_str(&format!("~{byte:02X}"));
        }
    }
    if id.is_empty() {
        id.push('~');
    }
    format!("{id}/{}", archive_name(project, platform))
}

/// Bundle a compilation result into a zip archive.
///
/// Either every entry is written or an error is returned; no partial
/// archive escapes. Entries use maximum deflate compression and a fixed
/// timestamp so identical input yields identical bytes.
pub fn package(
    project: &ProjectSpec,
    result: &CompilationResult,
    options: PackageOptions,
) -> Result<Package> {
    let mut extras = Vec::new();
    if options.include_gitignore && result.file(GITIGNORE_PATH).is_none() {
        extras.push((GITIGNORE_PATH, gitignore(result.platform)));
    }
    if options.include_readme && result.file(README_PATH).is_none() {
        extras.push((README_PATH, readme(project, result.platform, &result.files)));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let file_options: FileOptions<'_, ()> = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9))
        .last_modified_time(DateTime::default());

    let mut file_count = 0;
    for file in &result.files {
        zip.start_file(file.path.as_str(), file_options.clone())?;
        zip.write_all(file.content.as_bytes())?;
        file_count += 1;
    }
    for (path, content) in &extras {
        zip.start_file(*path, file_options.clone())?;
        zip.write_all(content.as_bytes())?;
        file_count += 1;
    }

    let bytes = zip.finish()?.into_inner();
    Ok(Package { bytes, file_count })
}
