//! Per-platform source generators.
//!
//! Each platform contributes a [`Dialect`]: a lookup table from capsule id to
//! a pure builder function, plus the platform's default stacking container
//! and placeholder. [`Generator`] walks a capsule tree depth-first and
//! dispatches every instance through that table. Supporting a new capsule
//! means adding a table entry.

#[cfg(feature = "swiftui")]
pub mod swiftui;
#[cfg(feature = "compose")]
pub mod compose;
#[cfg(feature = "react")]
pub mod react;

mod templates;

pub use templates::TemplateEngine;

use capsule_core::{CapsuleDefinition, CapsuleInstance, Platform, ThemeSpec};
use convert_case::{Case, Casing};
use indexmap::{IndexMap, IndexSet};
use serde_json::json;

use crate::error::Result;

/// Inputs available to a capsule builder.
pub struct Fragment<'a> {
    pub instance: &'a CapsuleInstance,
    pub theme: &'a ThemeSpec,
    /// Generated child fragments, in tree order.
    pub children: &'a [String],
}

impl<'a> Fragment<'a> {
    /// Resolve a color prop: a `#hex` literal is used as-is, anything else is
    /// looked up as a theme token. Missing props resolve `default_token`.
    pub fn color(&self, key: &str, default_token: &str) -> String {
        match self.instance.prop_str(key) {
            Some(value) if value.starts_with('#') => value,
            Some(token) => self.theme.color(&token).to_string(),
            None => self.theme.color(default_token).to_string(),
        }
    }

    /// Resolve a spacing prop: a number is used as-is, a string is a theme token.
    pub fn spacing(&self, key: &str, default_token: &str) -> f64 {
        match self.instance.prop(key) {
            Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or_else(|| self.theme.spacing(default_token)),
            Some(serde_json::Value::String(token)) => self.theme.spacing(token),
            _ => self.theme.spacing(default_token),
        }
    }

    pub fn text(&self, key: &str, fallback: &str) -> String {
        self.instance.prop_str_or(key, fallback)
    }

    /// Progress-style value clamped to `0.0..=1.0`.
    pub fn fraction(&self, key: &str) -> f64 {
        self.instance.prop_f64(key).unwrap_or(0.0).clamp(0.0, 1.0)
    }

    pub fn alignment(&self) -> Alignment {
        match self.instance.prop_str("alignment").as_deref() {
            Some("center") => Alignment::Center,
            Some("end") | Some("trailing") => Alignment::End,
            _ => Alignment::Start,
        }
    }
}

/// Cross-axis alignment requested by a container capsule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Start,
    Center,
    End,
}

/// Builds the source fragment for one capsule instance.
pub type BuildFn = fn(&Fragment<'_>) -> String;

/// The capsule table of one platform.
pub struct Dialect {
    pub platform: Platform,
    builders: IndexMap<&'static str, BuildFn>,
    /// Wraps children of an unrecognized capsule.
    container: fn(&[String]) -> String,
    /// Stands in for an unrecognized childless capsule; receives its id.
    placeholder: fn(&str) -> String,
    /// Escapes text for the inside of the platform's string literals.
    /// Applied to every `{{value}}` a registered template interpolates.
    escape: EscapeFn,
}

/// Escapes text for embedding between the quotes of a string literal.
pub type EscapeFn = fn(&str) -> String;

impl Dialect {
    pub fn new(
        platform: Platform,
        container: fn(&[String]) -> String,
        placeholder: fn(&str) -> String,
        escape: EscapeFn,
    ) -> Self {
        Self {
            platform,
            builders: IndexMap::new(),
            container,
            placeholder,
            escape,
        }
    }

    /// Add or replace the builder for `capsule_id`.
    pub fn with(mut self, capsule_id: &'static str, build: BuildFn) -> Self {
        self.builders.insert(capsule_id, build);
        self
    }

    pub fn knows(&self, capsule_id: &str) -> bool {
        self.builders.contains_key(capsule_id)
    }
}

/// Generates source fragments for one platform.
pub struct Generator<'a> {
    dialect: Dialect,
    engine: TemplateEngine<'a>,
}

impl<'a> Generator<'a> {
    pub fn new(dialect: Dialect) -> Self {
        let engine = TemplateEngine::new(dialect.escape);
        Self { dialect, engine }
    }

    pub fn platform(&self) -> Platform {
        self.dialect.platform
    }

    /// Register capsule definitions that carry a template for this platform.
    /// Registered templates take precedence over built-in builders.
    /// Returns the number of templates registered.
    pub fn register_capsules(&mut self, defs: &[CapsuleDefinition]) -> Result<usize> {
        let mut count = 0;
        for def in defs {
            if let Some(template) = def.templates.get(&self.dialect.platform) {
                self.engine.register_template(&def.id, template)?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// Whether `capsule_id` has a registered template or built-in builder.
    pub fn is_known(&self, capsule_id: &str) -> bool {
        self.engine.has_template(capsule_id) || self.dialect.knows(capsule_id)
    }

    /// Generate the fragment for `instance` and its subtree.
    ///
    /// Children are generated first, in order, and handed to the parent's
    /// builder. Unrecognized capsules with children are wrapped in the
    /// platform's default container; childless ones become a placeholder
    /// naming the capsule id.
    pub fn generate(&self, instance: &CapsuleInstance, theme: &ThemeSpec) -> Result<String> {
        let children = instance
            .children
            .iter()
            .map(|child| self.generate(child, theme))
            .collect::<Result<Vec<_>>>()?;

        if self.engine.has_template(&instance.capsule_id) {
            return self.render_template(instance, theme, &children);
        }

        if let Some(build) = self.dialect.builders.get(instance.capsule_id.as_str()) {
            let fragment = Fragment {
                instance,
                theme,
                children: &children,
            };
            return Ok(build(&fragment));
        }

        if children.is_empty() {
            Ok((self.dialect.placeholder)(&instance.capsule_id))
        } else {
            Ok((self.dialect.container)(&children))
        }
    }

    /// Unrecognized capsule ids in a tree, in first-seen order.
    pub fn unknown_capsules(&self, root: &CapsuleInstance) -> Vec<String> {
        let mut unknown = IndexSet::new();
        root.walk(&mut |instance| {
            if !self.is_known(&instance.capsule_id) {
                unknown.insert(instance.capsule_id.clone());
            }
        });
        unknown.into_iter().collect()
    }

    /// Interpolated values are escaped with the dialect's string escape, so
    /// `Text("{{props.label}}")` stays a valid literal. Generated children
    /// are source code and must be emitted raw: `{{{children}}}` or
    /// `{{indent children 4}}`.
    fn render_template(
        &self,
        instance: &CapsuleInstance,
        theme: &ThemeSpec,
        children: &[String],
    ) -> Result<String> {
        let data = json!({
            "id": instance.id,
            "capsuleId": instance.capsule_id,
            "props": instance.props,
            "children": children.join("\n"),
            "theme": theme,
        });
        self.engine.render(&instance.capsule_id, &data)
    }
}

/// Indent every non-blank line by `spaces`.
pub fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indent each fragment and join them one per line.
pub fn indent_all(fragments: &[String], spaces: usize) -> String {
    fragments
        .iter()
        .map(|f| indent(f, spaces))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A type name derived from an arbitrary id: `user-profile` becomes `UserProfile`.
pub fn type_name(id: &str) -> String {
    let name: String = id
        .to_case(Case::Pascal)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    match name.chars().next() {
        None => "Unnamed".to_string(),
        Some(c) if c.is_ascii_digit() => format!("N{name}"),
        Some(_) => name,
    }
}

/// A member name derived from an arbitrary token: `brand color` becomes `brandColor`.
pub fn member_name(token: &str) -> String {
    let name: String = token
        .to_case(Case::Camel)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    match name.chars().next() {
        None => "unnamed".to_string(),
        Some(c) if c.is_ascii_digit() => format!("n{name}"),
        Some(_) => name,
    }
}

/// Text safe to embed in a line or block comment.
pub fn comment_safe(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ' | ':'))
        .collect()
}

/// Escape text for XML element and attribute content.
pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Format a number without a trailing `.0` for whole values.
pub fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Bar heights scaled so the largest value reaches `max_height`.
pub fn bar_heights(values: &[f64], max_height: f64) -> Vec<f64> {
    let peak = values.iter().cloned().fold(0.0_f64, f64::max);
    values
        .iter()
        .map(|v| {
            if peak <= 0.0 {
                0.0
            } else {
                (v.max(0.0) / peak * max_height * 10.0).round() / 10.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_dialect() -> Dialect {
        Dialect::new(
            Platform::Web,
            |children| format!("<box>\n{}\n</box>", indent_all(children, 2)),
            |id| format!("<missing {id}/>"),
            |text| text.replace('"', "\\\""),
        )
        .with("text", |f| format!("<t>{}</t>", f.text("text", "")))
        .with("stack", |f| format!("<stack>\n{}\n</stack>", indent_all(f.children, 2)))
    }

    #[test]
    fn test_depth_first_child_order() {
        let gen = Generator::new(toy_dialect());
        let tree = CapsuleInstance::new("r", "stack")
            .with_child(CapsuleInstance::new("a", "text").with_prop("text", "A"))
            .with_child(CapsuleInstance::new("b", "text").with_prop("text", "B"));
        let out = gen.generate(&tree, &ThemeSpec::default()).unwrap();
        assert_eq!(out, "<stack>\n  <t>A</t>\n  <t>B</t>\n</stack>");
    }

    #[test]
    fn test_unknown_with_children_wraps() {
        let gen = Generator::new(toy_dialect());
        let tree = CapsuleInstance::new("r", "carousel")
            .with_child(CapsuleInstance::new("a", "text").with_prop("text", "A"));
        let out = gen.generate(&tree, &ThemeSpec::default()).unwrap();
        assert_eq!(out, "<box>\n  <t>A</t>\n</box>");
        assert_eq!(gen.unknown_capsules(&tree), vec!["carousel".to_string()]);
    }

    #[test]
    fn test_unknown_leaf_placeholder() {
        let gen = Generator::new(toy_dialect());
        let out = gen
            .generate(&CapsuleInstance::new("x", "map-view"), &ThemeSpec::default())
            .unwrap();
        assert_eq!(out, "<missing map-view/>");
    }

    #[test]
    fn test_registered_template_overrides_builtin() {
        let mut gen = Generator::new(toy_dialect());
        let defs = vec![
            CapsuleDefinition::new("text", "Text")
                .with_template(Platform::Web, "<em id=\"{{id}}\">{{props.text}}</em>"),
            CapsuleDefinition::new("rating", "Rating")
                .with_template(Platform::Ios, "Stars()"),
        ];
        assert_eq!(gen.register_capsules(&defs).unwrap(), 1);

        let out = gen
            .generate(
                &CapsuleInstance::new("t1", "text").with_prop("text", "hi"),
                &ThemeSpec::default(),
            )
            .unwrap();
        assert_eq!(out, "<em id=\"t1\">hi</em>");
        assert!(!gen.is_known("rating"));
    }

    #[test]
    fn test_template_receives_children() {
        let mut gen = Generator::new(toy_dialect());
        let defs = vec![CapsuleDefinition::new("panel", "Panel")
            .with_template(Platform::Web, "<panel>\n{{indent children 2}}\n</panel>")];
        gen.register_capsules(&defs).unwrap();
        let tree = CapsuleInstance::new("p", "panel")
            .with_child(CapsuleInstance::new("a", "text").with_prop("text", "A"))
            .with_child(CapsuleInstance::new("b", "text").with_prop("text", "B"));
        let out = gen.generate(&tree, &ThemeSpec::default()).unwrap();
        assert_eq!(out, "<panel>\n  <t>A</t>\n  <t>B</t>\n</panel>");
    }

    #[test]
    fn test_template_escapes_values_but_not_children() {
        let mut gen = Generator::new(toy_dialect());
        let defs = vec![CapsuleDefinition::new("badge", "Badge")
            .with_template(Platform::Web, "<badge label=\"{{props.label}}\">{{{children}}}</badge>")];
        gen.register_capsules(&defs).unwrap();
        let tree = CapsuleInstance::new("b", "badge")
            .with_prop("label", "say \"hi\"")
            .with_child(CapsuleInstance::new("a", "text").with_prop("text", "A"));
        let out = gen.generate(&tree, &ThemeSpec::default()).unwrap();
        assert_eq!(out, "<badge label=\"say \\\"hi\\\"\"><t>A</t></badge>");
    }

    #[test]
    fn test_names() {
        assert_eq!(type_name("user-profile"), "UserProfile");
        assert_eq!(type_name("home_screen"), "HomeScreen");
        assert_eq!(type_name("1st"), "N1st");
        assert_eq!(type_name("!!"), "Unnamed");
        assert_eq!(member_name("brand color"), "brandColor");
    }

    #[test]
    fn test_number_format() {
        assert_eq!(number(16.0), "16");
        assert_eq!(number(0.5), "0.5");
    }

    #[test]
    fn test_bar_heights() {
        assert_eq!(bar_heights(&[1.0, 2.0, 4.0], 100.0), vec![25.0, 50.0, 100.0]);
        assert_eq!(bar_heights(&[0.0, 0.0], 100.0), vec![0.0, 0.0]);
    }
}
