//! Project composition: screens, navigation, theme and platform configuration.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::instance::CapsuleInstance;
use crate::options::PlatformConfig;
use crate::platform::Platform;
use crate::theme::ThemeSpec;

/// One screen of a project; generated independently of its siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenSpec {
    pub id: String,
    pub name: String,
    pub root: CapsuleInstance,
}

impl ScreenSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>, root: CapsuleInstance) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            root,
        }
    }
}

/// How screens are presented at the top level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationType {
    #[default]
    Stack,
    Tabs,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSpec {
    #[serde(rename = "type", default)]
    pub nav_type: NavigationType,
    /// Screen shown first; defaults to the first screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_screen: Option<String>,
}

/// The full declarative description of an app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub targets: IndexSet<Platform>,
    #[serde(default)]
    pub screens: Vec<ScreenSpec>,
    #[serde(default)]
    pub navigation: NavigationSpec,
    #[serde(default)]
    pub theme: ThemeSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_config: Option<PlatformConfig>,
}

impl ProjectSpec {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            targets: IndexSet::new(),
            screens: Vec::new(),
            navigation: NavigationSpec::default(),
            theme: ThemeSpec::default(),
            platform_config: None,
        }
    }

    pub fn with_target(mut self, platform: Platform) -> Self {
        self.targets.insert(platform);
        self
    }

    pub fn with_screen(mut self, screen: ScreenSpec) -> Self {
        self.screens.push(screen);
        self
    }

    pub fn with_navigation(mut self, navigation: NavigationSpec) -> Self {
        self.navigation = navigation;
        self
    }

    pub fn with_theme(mut self, theme: ThemeSpec) -> Self {
        self.theme = theme;
        self
    }

    pub fn screen(&self, id: &str) -> Option<&ScreenSpec> {
        self.screens.iter().find(|s| s.id == id)
    }

    /// The designated initial screen: `navigation.initialScreen` when it names
    /// an existing screen, otherwise the first screen.
    pub fn initial_screen(&self) -> Option<&ScreenSpec> {
        self.navigation
            .initial_screen
            .as_deref()
            .and_then(|id| self.screen(id))
            .or_else(|| self.screens.first())
    }

    /// Whether the navigation wrapper should enumerate every screen as a tab.
    pub fn uses_tabs(&self) -> bool {
        self.navigation.nav_type == NavigationType::Tabs && self.screens.len() > 1
    }
}

/// A capsule as published by the capsule registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapsuleDefinition {
    pub id: String,
    pub name: String,
    /// One Handlebars template per supported platform.
    #[serde(default)]
    pub templates: IndexMap<Platform, String>,
}

impl CapsuleDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            templates: IndexMap::new(),
        }
    }

    pub fn with_template(mut self, platform: Platform, template: impl Into<String>) -> Self {
        self.templates.insert(platform, template.into());
        self
    }
}
