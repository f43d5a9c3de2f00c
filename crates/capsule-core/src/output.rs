//! Generation and export outputs.

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// Source language of a generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileLanguage {
    Swift,
    Kotlin,
    Typescript,
    Json,
    Xml,
    Yaml,
    Gradle,
    Html,
    Markdown,
    Text,
}

/// A generated file; the unit of compiler output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Path relative to the project root.
    pub path: String,
    pub content: String,
    pub language: FileLanguage,
}

impl GeneratedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>, language: FileLanguage) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            language,
        }
    }
}

/// Outcome of compiling one project for one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationResult {
    pub platform: Platform,
    pub success: bool,
    pub files: Vec<GeneratedFile>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl CompilationResult {
    pub fn success(platform: Platform, files: Vec<GeneratedFile>, warnings: Vec<String>) -> Self {
        Self {
            platform,
            success: true,
            files,
            warnings,
            errors: Vec::new(),
        }
    }

    pub fn failure(platform: Platform, errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            platform,
            success: false,
            files: Vec::new(),
            warnings,
            errors,
        }
    }

    /// Find a file by path.
    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// Outcome of exporting one requested target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub platform: Platform,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    pub file_count: usize,
    /// Archive size in bytes.
    pub total_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

impl ExportResult {
    pub fn succeeded(
        platform: Platform,
        download_url: impl Into<String>,
        file_count: usize,
        total_size: u64,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            platform,
            success: true,
            download_url: Some(download_url.into()),
            file_count,
            total_size,
            errors: None,
            warnings: (!warnings.is_empty()).then_some(warnings),
        }
    }

    pub fn failed(platform: Platform, errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            platform,
            success: false,
            download_url: None,
            file_count: 0,
            total_size: 0,
            errors: Some(errors),
            warnings: (!warnings.is_empty()).then_some(warnings),
        }
    }
}

/// Totals across all requested targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub total_platforms: usize,
    pub successful_platforms: Vec<Platform>,
    pub failed_platforms: Vec<Platform>,
    /// Files across successful targets only.
    pub total_files: usize,
    /// Archive bytes across successful targets only.
    pub total_size: u64,
}

/// Response to an export request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportResponse {
    /// True iff no target failed.
    pub success: bool,
    pub exports: Vec<ExportResult>,
    pub summary: ExportSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_result_serialization_skips_empty() {
        let ok = ExportResult::succeeded(Platform::Ios, "mem://a.zip", 3, 120, vec![]);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["downloadUrl"], "mem://a.zip");
        assert_eq!(json["fileCount"], 3);
        assert!(json.get("errors").is_none());
        assert!(json.get("warnings").is_none());

        let failed = ExportResult::failed(Platform::Desktop, vec!["boom".into()], vec![]);
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"][0], "boom");
        assert!(json.get("downloadUrl").is_none());
    }

    #[test]
    fn test_compilation_result_file_lookup() {
        let result = CompilationResult::success(
            Platform::Web,
            vec![
                GeneratedFile::new("a.ts", "abc", FileLanguage::Typescript),
                GeneratedFile::new("b.json", "{}", FileLanguage::Json),
            ],
            vec![],
        );
        assert!(result.file("b.json").is_some());
    }
}
