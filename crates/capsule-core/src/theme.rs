//! Theme tokens.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Color used when a theme does not define `primary`.
pub const DEFAULT_PRIMARY: &str = "#007AFF";
/// Font size used when a theme does not define `body`.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
/// Spacing used when a theme does not define `md`.
pub const DEFAULT_SPACING: f64 = 16.0;
/// Corner radius used when a theme does not define `md`.
pub const DEFAULT_RADIUS: f64 = 8.0;

/// Visual tokens applied to every generated fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSpec {
    pub name: String,
    /// Named colors as `#RRGGBB` or `#RRGGBBAA`.
    #[serde(default)]
    pub colors: IndexMap<String, String>,
    #[serde(default)]
    pub typography: Typography,
    /// Named spacing steps in points.
    #[serde(default)]
    pub spacing: IndexMap<String, f64>,
    /// Named corner radii in points.
    #[serde(default)]
    pub border_radius: IndexMap<String, f64>,
}

/// Font tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Named font sizes in points.
    #[serde(default)]
    pub sizes: IndexMap<String, f64>,
}

fn default_font_family() -> String {
    "System".to_string()
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            sizes: IndexMap::new(),
        }
    }
}

impl Default for ThemeSpec {
    fn default() -> Self {
        let mut colors = IndexMap::new();
        colors.insert("primary".to_string(), DEFAULT_PRIMARY.to_string());
        colors.insert("background".to_string(), "#FFFFFF".to_string());
        colors.insert("text".to_string(), "#1C1C1E".to_string());

        let mut sizes = IndexMap::new();
        sizes.insert("body".to_string(), DEFAULT_FONT_SIZE);
        sizes.insert("heading".to_string(), 28.0);

        let mut spacing = IndexMap::new();
        spacing.insert("sm".to_string(), 8.0);
        spacing.insert("md".to_string(), DEFAULT_SPACING);
        spacing.insert("lg".to_string(), 24.0);

        let mut border_radius = IndexMap::new();
        border_radius.insert("md".to_string(), DEFAULT_RADIUS);

        Self {
            name: "Default".to_string(),
            colors,
            typography: Typography {
                font_family: default_font_family(),
                sizes,
            },
            spacing,
            border_radius,
        }
    }
}

impl ThemeSpec {
    /// Look up a color, falling back to `primary` and then the default primary.
    pub fn color(&self, name: &str) -> &str {
        self.colors
            .get(name)
            .or_else(|| self.colors.get("primary"))
            .map(String::as_str)
            .unwrap_or(DEFAULT_PRIMARY)
    }

    pub fn primary(&self) -> &str {
        self.color("primary")
    }

    pub fn font_size(&self, name: &str) -> f64 {
        self.typography
            .sizes
            .get(name)
            .copied()
            .unwrap_or(DEFAULT_FONT_SIZE)
    }

    pub fn spacing(&self, name: &str) -> f64 {
        self.spacing.get(name).copied().unwrap_or(DEFAULT_SPACING)
    }

    pub fn radius(&self, name: &str) -> f64 {
        self.border_radius
            .get(name)
            .copied()
            .unwrap_or(DEFAULT_RADIUS)
    }
}

/// An RGBA color parsed from a hex token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();

        match digits.len() {
            3 => {
                let expand = |c: char| -> Option<u8> {
                    let v = c.to_digit(16)? as u8;
                    Some(v * 16 + v)
                };
                let mut chars = digits.chars();
                Some(Self {
                    r: expand(chars.next()?)?,
                    g: expand(chars.next()?)?,
                    b: expand(chars.next()?)?,
                    a: 255,
                })
            }
            6 => Some(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: 255,
            }),
            8 => Some(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => None,
        }
    }

    /// `0xAARRGGBB` as used by Android.
    pub fn to_argb_u32(&self) -> u32 {
        (u32::from(self.a) << 24)
            | (u32::from(self.r) << 16)
            | (u32::from(self.g) << 8)
            | u32::from(self.b)
    }

    /// Normalized components in `0.0..=1.0`.
    pub fn to_unit(&self) -> [f64; 4] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
            f64::from(self.a) / 255.0,
        ]
    }
}
