//! Export request validation.
//!
//! Requests arrive as raw JSON and are checked field by field so every
//! problem is reported with its path (`targets[1].options.minSdk`). Nothing
//! is coerced: an unknown platform, an unexpected key or options shaped for
//! another platform all reject the request before any compiler runs.
//! Numeric ranges and version formats are checked here too; identifier
//! patterns are left to each target's compiler so one bad identifier fails
//! only its own target.

use capsule_core::{CoreError, FieldError, Platform, PlatformOptions};
use indexmap::IndexSet;
use serde_json::{Map, Value};

use crate::error::{ExportError, Result};

/// Platforms that can be packaged for download.
pub const EXPORTABLE_PLATFORMS: [Platform; 3] = [Platform::Ios, Platform::Android, Platform::Desktop];

const REQUEST_KEYS: [&str; 3] = ["targets", "includeReadme", "includeGitignore"];
const TARGET_KEYS: [&str; 2] = ["platform", "options"];

/// One validated export target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub platform: Platform,
    pub options: PlatformOptions,
}

/// A validated export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub targets: Vec<ExportTarget>,
    pub include_readme: bool,
    pub include_gitignore: bool,
}

/// Validate a raw export request.
pub fn validate_request(raw: &Value) -> Result<ExportRequest> {
    let mut errors = Vec::new();

    let Some(body) = raw.as_object() else {
        return Err(ExportError::Validation(vec![FieldError::new(
            "body",
            "must be a JSON object",
        )]));
    };

    reject_unknown_keys(body, &REQUEST_KEYS, "", &mut errors);

    let include_readme = flag(body, "includeReadme", &mut errors);
    let include_gitignore = flag(body, "includeGitignore", &mut errors);
    let targets = targets(body.get("targets"), &mut errors);

    if !errors.is_empty() {
        return Err(ExportError::Validation(errors));
    }

    Ok(ExportRequest {
        targets,
        include_readme,
        include_gitignore,
    })
}

fn field(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn reject_unknown_keys(
    object: &Map<String, Value>,
    allowed: &[&str],
    prefix: &str,
    errors: &mut Vec<FieldError>,
) {
    for key in object.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.push(FieldError::new(field(prefix, key), "unknown field"));
        }
    }
}

/// Optional boolean defaulting to `true`.
fn flag(body: &Map<String, Value>, key: &str, errors: &mut Vec<FieldError>) -> bool {
    match body.get(key) {
        None | Some(Value::Null) => true,
        Some(Value::Bool(value)) => *value,
        Some(_) => {
            errors.push(FieldError::new(key, "must be a boolean"));
            true
        }
    }
}

fn targets(raw: Option<&Value>, errors: &mut Vec<FieldError>) -> Vec<ExportTarget> {
    let list = match raw {
        None | Some(Value::Null) => {
            errors.push(FieldError::new("targets", "is required"));
            return Vec::new();
        }
        Some(Value::Array(list)) => list,
        Some(_) => {
            errors.push(FieldError::new("targets", "must be a list"));
            return Vec::new();
        }
    };

    if list.is_empty() {
        errors.push(FieldError::new("targets", "must contain at least one target"));
        return Vec::new();
    }

    let mut seen = IndexSet::new();
    let mut targets = Vec::with_capacity(list.len());
    for (index, raw) in list.iter().enumerate() {
        let path = format!("targets[{index}]");
        if let Some(target) = target(raw, &path, errors) {
            if !seen.insert(target.platform) {
                errors.push(FieldError::new(
                    field(&path, "platform"),
                    format!("duplicate target '{}'", target.platform),
                ));
                continue;
            }
            targets.push(target);
        }
    }
    targets
}

fn target(raw: &Value, path: &str, errors: &mut Vec<FieldError>) -> Option<ExportTarget> {
    let Some(object) = raw.as_object() else {
        errors.push(FieldError::new(path, "must be an object"));
        return None;
    };
    reject_unknown_keys(object, &TARGET_KEYS, path, errors);

    let platform_path = field(path, "platform");
    let platform = match object.get("platform") {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(platform_path, "is required"));
            return None;
        }
        Some(Value::String(id)) => match id.parse::<Platform>() {
            Ok(platform) if EXPORTABLE_PLATFORMS.contains(&platform) => platform,
            _ => {
                errors.push(FieldError::new(
                    platform_path,
                    format!("'{id}' is not exportable; expected one of ios, android, desktop"),
                ));
                return None;
            }
        },
        Some(_) => {
            errors.push(FieldError::new(platform_path, "must be a string"));
            return None;
        }
    };

    let options_path = field(path, "options");
    let raw_options = object.get("options").filter(|v| !v.is_null());
    let options = match PlatformOptions::from_json(platform, raw_options) {
        Ok(options) => options,
        Err(CoreError::Json(e)) => {
            errors.push(FieldError::new(options_path, format!("invalid {platform} options: {e}")));
            return None;
        }
        Err(e) => {
            errors.push(FieldError::new(options_path, e.to_string()));
            return None;
        }
    };

    let violations = options.validate_schema(&options_path);
    if !violations.is_empty() {
        errors.extend(violations);
        return None;
    }

    Some(ExportTarget { platform, options })
}
