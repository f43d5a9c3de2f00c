//! Per-platform build options.
//!
//! Each platform has its own option shape. Option structs reject unknown
//! fields, so options written for one platform never silently configure
//! another. Shape problems surface as serde errors; value problems surface
//! from `validate` as [`FieldError`]s.
//!
//! Value checks come in two tiers. `validate_schema` covers closed numeric
//! ranges and version formats, which export requests check up front.
//! `validate_identifiers` covers bundle, package and team identifiers, which
//! a compiler checks for its own target. `validate` runs both.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{CoreError, FieldError, Result};
use crate::platform::Platform;

/// Reverse-domain identifier: at least two dot-separated segments, each
/// starting with a letter.
static REVERSE_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").expect("valid regex")
});

static APPLE_TEAM_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{10}$").expect("valid regex"));

static OS_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+){0,2}$").expect("valid regex"));

pub const DEFAULT_IDENTIFIER: &str = "com.example.app";
pub const DEFAULT_IOS_MIN_VERSION: &str = "15.0";
pub const DEFAULT_MIN_SDK: u32 = 24;
pub const DEFAULT_TARGET_SDK: u32 = 34;
pub const MIN_SDK_RANGE: (u32, u32) = (21, 34);
pub const TARGET_SDK_RANGE: (u32, u32) = (24, 34);

/// Check a reverse-domain identifier such as `com.acme.app`.
pub fn is_reverse_domain(id: &str) -> bool {
    REVERSE_DOMAIN.is_match(id)
}

/// iOS build options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IosOptions {
    pub bundle_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default = "default_ios_min_version")]
    pub min_version: String,
    #[serde(default)]
    pub capabilities: IndexSet<IosCapability>,
}

fn default_ios_min_version() -> String {
    DEFAULT_IOS_MIN_VERSION.to_string()
}

impl Default for IosOptions {
    fn default() -> Self {
        Self {
            bundle_id: DEFAULT_IDENTIFIER.to_string(),
            team_id: None,
            min_version: default_ios_min_version(),
            capabilities: IndexSet::new(),
        }
    }
}

impl IosOptions {
    pub fn validate(&self, path: &str) -> Vec<FieldError> {
        let mut errors = self.validate_identifiers(path);
        errors.extend(self.validate_schema(path));
        errors
    }

    pub fn validate_identifiers(&self, path: &str) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if !is_reverse_domain(&self.bundle_id) {
            errors.push(FieldError::new(
                format!("{path}.bundleId"),
                format!("'{}' is not a reverse-domain identifier", self.bundle_id),
            ));
        }
        if let Some(team_id) = &self.team_id {
            if !APPLE_TEAM_ID.is_match(team_id) {
                errors.push(FieldError::new(
                    format!("{path}.teamId"),
                    "must be 10 uppercase letters or digits",
                ));
            }
        }
        errors
    }

    pub fn validate_schema(&self, path: &str) -> Vec<FieldError> {
        if OS_VERSION.is_match(&self.min_version) {
            Vec::new()
        } else {
            vec![FieldError::new(
                format!("{path}.minVersion"),
                format!("'{}' is not a version number", self.min_version),
            )]
        }
    }
}

/// iOS entitlements a project may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IosCapability {
    PushNotifications,
    BackgroundModes,
    InAppPurchase,
    SignInWithApple,
    HealthKit,
    HomeKit,
    #[serde(rename = "iCloud")]
    ICloud,
    AppGroups,
    AssociatedDomains,
    KeychainSharing,
}

impl IosCapability {
    /// Entitlements plist key for this capability, if it needs one.
    pub fn entitlement_key(&self) -> Option<&'static str> {
        match self {
            Self::PushNotifications => Some("aps-environment"),
            Self::SignInWithApple => Some("com.apple.developer.applesignin"),
            Self::HealthKit => Some("com.apple.developer.healthkit"),
            Self::HomeKit => Some("com.apple.developer.homekit"),
            Self::ICloud => Some("com.apple.developer.icloud-services"),
            Self::AppGroups => Some("com.apple.security.application-groups"),
            Self::AssociatedDomains => Some("com.apple.developer.associated-domains"),
            Self::KeychainSharing => Some("keychain-access-groups"),
            Self::BackgroundModes | Self::InAppPurchase => None,
        }
    }
}

/// Android build options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AndroidOptions {
    pub package_name: String,
    #[serde(default = "default_min_sdk")]
    pub min_sdk: u32,
    #[serde(default = "default_target_sdk")]
    pub target_sdk: u32,
    #[serde(default = "default_permissions")]
    pub permissions: IndexSet<AndroidPermission>,
}

fn default_min_sdk() -> u32 {
    DEFAULT_MIN_SDK
}

fn default_target_sdk() -> u32 {
    DEFAULT_TARGET_SDK
}

fn default_permissions() -> IndexSet<AndroidPermission> {
    let mut permissions = IndexSet::new();
    permissions.insert(AndroidPermission::Internet);
    permissions
}

impl Default for AndroidOptions {
    fn default() -> Self {
        Self {
            package_name: DEFAULT_IDENTIFIER.to_string(),
            min_sdk: DEFAULT_MIN_SDK,
            target_sdk: DEFAULT_TARGET_SDK,
            permissions: default_permissions(),
        }
    }
}

impl AndroidOptions {
    pub fn validate(&self, path: &str) -> Vec<FieldError> {
        let mut errors = self.validate_identifiers(path);
        errors.extend(self.validate_schema(path));
        errors
    }

    pub fn validate_identifiers(&self, path: &str) -> Vec<FieldError> {
        if is_reverse_domain(&self.package_name) {
            Vec::new()
        } else {
            vec![FieldError::new(
                format!("{path}.packageName"),
                format!("'{}' is not a reverse-domain identifier", self.package_name),
            )]
        }
    }

    /// SDK levels: both inside their closed ranges, target not below min.
    pub fn validate_schema(&self, path: &str) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let (lo, hi) = MIN_SDK_RANGE;
        if !(lo..=hi).contains(&self.min_sdk) {
            errors.push(FieldError::new(
                format!("{path}.minSdk"),
                format!("{} is outside {lo}..={hi}", self.min_sdk),
            ));
        }
        let (lo, hi) = TARGET_SDK_RANGE;
        if !(lo..=hi).contains(&self.target_sdk) {
            errors.push(FieldError::new(
                format!("{path}.targetSdk"),
                format!("{} is outside {lo}..={hi}", self.target_sdk),
            ));
        } else if self.target_sdk < self.min_sdk {
            errors.push(FieldError::new(
                format!("{path}.targetSdk"),
                format!("{} is below minSdk {}", self.target_sdk, self.min_sdk),
            ));
        }
        errors
    }
}

/// Android manifest permissions a project may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AndroidPermission {
    Internet,
    AccessNetworkState,
    Camera,
    RecordAudio,
    AccessFineLocation,
    AccessCoarseLocation,
    ReadContacts,
    PostNotifications,
    Vibrate,
    BluetoothConnect,
    ReadMediaImages,
}

impl AndroidPermission {
    /// Fully qualified manifest name.
    pub fn manifest_name(&self) -> String {
        let short = match self {
            Self::Internet => "INTERNET",
            Self::AccessNetworkState => "ACCESS_NETWORK_STATE",
            Self::Camera => "CAMERA",
            Self::RecordAudio => "RECORD_AUDIO",
            Self::AccessFineLocation => "ACCESS_FINE_LOCATION",
            Self::AccessCoarseLocation => "ACCESS_COARSE_LOCATION",
            Self::ReadContacts => "READ_CONTACTS",
            Self::PostNotifications => "POST_NOTIFICATIONS",
            Self::Vibrate => "VIBRATE",
            Self::BluetoothConnect => "BLUETOOTH_CONNECT",
            Self::ReadMediaImages => "READ_MEDIA_IMAGES",
        };
        format!("android.permission.{short}")
    }
}

/// Web build options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WebOptions {
    /// Document title; defaults to the project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Desktop build options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DesktopOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl DesktopOptions {
    pub fn validate(&self, path: &str) -> Vec<FieldError> {
        match &self.app_id {
            Some(id) if !is_reverse_domain(id) => vec![FieldError::new(
                format!("{path}.appId"),
                format!("'{id}' is not a reverse-domain identifier"),
            )],
            _ => Vec::new(),
        }
    }
}

/// Options for exactly one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformOptions {
    Ios(IosOptions),
    Android(AndroidOptions),
    Web(WebOptions),
    Desktop(DesktopOptions),
}

impl PlatformOptions {
    /// Documented defaults for a platform.
    pub fn default_for(platform: Platform) -> Self {
        match platform {
            Platform::Ios => Self::Ios(IosOptions::default()),
            Platform::Android => Self::Android(AndroidOptions::default()),
            Platform::Web => Self::Web(WebOptions::default()),
            Platform::Desktop => Self::Desktop(DesktopOptions::default()),
        }
    }

    /// Decode raw JSON options for `platform`. `None` yields the defaults.
    pub fn from_json(platform: Platform, raw: Option<&Value>) -> Result<Self> {
        let Some(raw) = raw else {
            return Ok(Self::default_for(platform));
        };
        let options = match platform {
            Platform::Ios => Self::Ios(serde_json::from_value(raw.clone())?),
            Platform::Android => Self::Android(serde_json::from_value(raw.clone())?),
            Platform::Web => Self::Web(serde_json::from_value(raw.clone())?),
            Platform::Desktop => Self::Desktop(serde_json::from_value(raw.clone())?),
        };
        Ok(options)
    }

    pub fn platform(&self) -> Platform {
        match self {
            Self::Ios(_) => Platform::Ios,
            Self::Android(_) => Platform::Android,
            Self::Web(_) => Platform::Web,
            Self::Desktop(_) => Platform::Desktop,
        }
    }

    /// Value-level checks; field paths are prefixed with `path`.
    pub fn validate(&self, path: &str) -> Vec<FieldError> {
        match self {
            Self::Ios(o) => o.validate(path),
            Self::Android(o) => o.validate(path),
            Self::Web(_) => Vec::new(),
            Self::Desktop(o) => o.validate(path),
        }
    }

    /// Range and format checks only, without identifier patterns.
    pub fn validate_schema(&self, path: &str) -> Vec<FieldError> {
        match self {
            Self::Ios(o) => o.validate_schema(path),
            Self::Android(o) => o.validate_schema(path),
            Self::Web(_) | Self::Desktop(_) => Vec::new(),
        }
    }

    /// Validate and return an error carrying every field violation.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate("options");
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidOptions(errors))
        }
    }

    pub fn as_ios(&self) -> Option<&IosOptions> {
        match self {
            Self::Ios(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_android(&self) -> Option<&AndroidOptions> {
        match self {
            Self::Android(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_web(&self) -> Option<&WebOptions> {
        match self {
            Self::Web(o) => Some(o),
            _ => None,
        }
    }
}

/// Per-platform options carried inside a project definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ios: Option<IosOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<DesktopOptions>,
}

impl PlatformConfig {
    /// Options for `platform`, or its defaults when none are configured.
    pub fn options_for(&self, platform: Platform) -> PlatformOptions {
        match platform {
            Platform::Ios => PlatformOptions::Ios(self.ios.clone().unwrap_or_default()),
            Platform::Android => {
                PlatformOptions::Android(self.android.clone().unwrap_or_default())
            }
            Platform::Web => PlatformOptions::Web(self.web.clone().unwrap_or_default()),
            Platform::Desktop => {
                PlatformOptions::Desktop(self.desktop.clone().unwrap_or_default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reverse_domain() {
        assert!(is_reverse_domain("com.acme.app"));
        assert!(is_reverse_domain("io.capsule.my_app"));
        assert!(!is_reverse_domain("Acme"));
        assert!(!is_reverse_domain("com.1acme.app"));
        assert!(!is_reverse_domain("com..app"));
        assert!(!is_reverse_domain("com.acme."));
    }

    #[test]
    fn test_ios_defaults() {
        let opts = PlatformOptions::from_json(Platform::Ios, Some(&json!({"bundleId": "com.acme.app"})))
            .unwrap();
        let ios = opts.as_ios().unwrap();
        assert_eq!(ios.min_version, "15.0");
        assert!(ios.capabilities.is_empty());
        assert!(opts.validate("options").is_empty());
    }

    #[test]
    fn test_ios_rejects_android_shape() {
        let raw = json!({"packageName": "com.acme.app", "minSdk": 24});
        assert!(PlatformOptions::from_json(Platform::Ios, Some(&raw)).is_err());
    }

    #[test]
    fn test_android_rejects_ios_shape() {
        let raw = json!({"bundleId": "com.acme.app"});
        assert!(PlatformOptions::from_json(Platform::Android, Some(&raw)).is_err());
    }

    #[test]
    fn test_unknown_enum_rejected() {
        let raw = json!({"packageName": "com.acme.app", "permissions": ["INTERNET", "READ_MINDS"]});
        assert!(PlatformOptions::from_json(Platform::Android, Some(&raw)).is_err());

        let raw = json!({"bundleId": "com.acme.app", "capabilities": ["teleport"]});
        assert!(PlatformOptions::from_json(Platform::Ios, Some(&raw)).is_err());
    }

    #[test]
    fn test_android_ranges() {
        let opts = AndroidOptions {
            min_sdk: 20,
            ..AndroidOptions::default()
        };
        let errors = opts.validate("t");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "t.minSdk");

        let opts = AndroidOptions {
            min_sdk: 30,
            target_sdk: 28,
            ..AndroidOptions::default()
        };
        assert_eq!(opts.validate("t")[0].field, "t.targetSdk");

        let opts = AndroidOptions {
            min_sdk: 21,
            target_sdk: 34,
            ..AndroidOptions::default()
        };
        assert!(opts.validate("t").is_empty());
    }

    #[test]
    fn test_android_default_permissions() {
        let opts: AndroidOptions =
            serde_json::from_value(json!({"packageName": "com.acme.app"})).unwrap();
        assert!(opts.permissions.contains(&AndroidPermission::Internet));
        assert_eq!(opts.min_sdk, 24);
        assert_eq!(opts.target_sdk, 34);
    }

    #[test]
    fn test_schema_tier_skips_identifiers() {
        let opts = PlatformOptions::Android(AndroidOptions {
            package_name: "fittrack".to_string(),
            min_sdk: 20,
            ..AndroidOptions::default()
        });
        let schema: Vec<_> = opts.validate_schema("o").into_iter().map(|e| e.field).collect();
        assert_eq!(schema, vec!["o.minSdk"]);
        let all: Vec<_> = opts.validate("o").into_iter().map(|e| e.field).collect();
        assert_eq!(all, vec!["o.packageName", "o.minSdk"]);
    }

    #[test]
    fn test_team_id() {
        let opts = IosOptions {
            team_id: Some("abc".to_string()),
            ..IosOptions::default()
        };
        assert_eq!(opts.validate("o")[0].field, "o.teamId");
    }

    #[test]
    fn test_ensure_valid() {
        let opts = PlatformOptions::Ios(IosOptions {
            bundle_id: "Acme".to_string(),
            ..IosOptions::default()
        });
        let err = opts.ensure_valid().unwrap_err();
        assert!(err.to_string().contains("options.bundleId"));
    }

    #[test]
    fn test_platform_config_defaults() {
        let config = PlatformConfig::default();
        assert_eq!(
            config.options_for(Platform::Android),
            PlatformOptions::Android(AndroidOptions::default())
        );
    }
}
