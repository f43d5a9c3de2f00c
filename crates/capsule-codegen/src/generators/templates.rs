//! Template engine for registered capsule definitions.

use super::EscapeFn;
use crate::error::{CodegenError, Result};
use convert_case::{Case, Casing};
use handlebars::Handlebars;
use serde::Serialize;

/// Template engine using Handlebars.
///
/// Templates produce source code, not HTML: `{{value}}` is escaped with the
/// target language's string escape instead of HTML entities, and
/// `{{{value}}}` stays raw.
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> TemplateEngine<'a> {
    /// Create a template engine escaping interpolations with `escape`.
    pub fn new(escape: EscapeFn) -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(escape);

        Self::register_helpers(&mut handlebars);

        Self { handlebars }
    }

    /// Register a template under `name`, replacing any previous one.
    pub fn register_template(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| CodegenError::InvalidTemplate {
                capsule: name.to_string(),
                source: Box::new(e),
            })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    /// Render a template.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        self.handlebars
            .render(name, data)
            .map_err(CodegenError::TemplateError)
    }

    fn register_helpers(handlebars: &mut Handlebars) {
        register_case_helper(handlebars, "pascal_case", Case::Pascal);
        register_case_helper(handlebars, "camel_case", Case::Camel);
        register_case_helper(handlebars, "snake_case", Case::Snake);
        register_case_helper(handlebars, "kebab_case", Case::Kebab);

        // Indent helper
        handlebars.register_helper(
            "indent",
            Box::new(
                |h: &handlebars::Helper,
                 _r: &Handlebars,
                 _ctx: &handlebars::Context,
                 _rc: &mut handlebars::RenderContext,
                 out: &mut dyn handlebars::Output| {
                    let content = h
                        .param(0)
                        .and_then(|v| v.value().as_str())
                        .unwrap_or("");
                    let spaces = h
                        .param(1)
                        .and_then(|v| v.value().as_u64())
                        .unwrap_or(4) as usize;
                    out.write(&super::indent(content, spaces))?;
                    Ok(())
                },
            ),
        );
    }
}

fn register_case_helper(handlebars: &mut Handlebars, name: &'static str, case: Case) {
    handlebars.register_helper(
        name,
        Box::new(
            move |h: &handlebars::Helper,
                  _r: &Handlebars,
                  _ctx: &handlebars::Context,
                  _rc: &mut handlebars::RenderContext,
                  out: &mut dyn handlebars::Output| {
                let param = h
                    .param(0)
                    .and_then(|v| v.value().as_str())
                    .unwrap_or("");
                out.write(&param.to_case(case))?;
                Ok(())
            },
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn raw() -> TemplateEngine<'static> {
        TemplateEngine::new(handlebars::no_escape)
    }

    fn render_once(engine: &mut TemplateEngine, template: &str, data: &Value) -> String {
        engine.register_template("t", template).unwrap();
        engine.render("t", data).unwrap()
    }

    #[test]
    fn test_render_simple() {
        let mut engine = raw();
        engine
            .register_template("hello", "Hello, {{name}}!")
            .unwrap();

        let result = engine.render("hello", &json!({"name": "World"})).unwrap();
        assert_eq!(result, "Hello, World!");
    }

    #[test]
    fn test_no_html_escaping() {
        let mut engine = raw();
        let result = render_once(&mut engine, "{{code}}", &json!({"code": "a < b && \"c\""}));
        assert_eq!(result, "a < b && \"c\"");
    }

    #[test]
    fn test_escape_fn_applies_to_double_stash_only() {
        let mut engine = TemplateEngine::new(|s| s.replace('"', "\\\""));
        let result = render_once(
            &mut engine,
            "\"{{label}}\" {{{label}}}",
            &json!({"label": "a \"b\""}),
        );
        assert_eq!(result, "\"a \\\"b\\\"\" a \"b\"");
    }

    #[test]
    fn test_case_helpers() {
        let mut engine = raw();
        let result = render_once(
            &mut engine,
            "{{pascal_case a}} {{camel_case b}} {{kebab_case c}}",
            &json!({"a": "my_component", "b": "MyComponent", "c": "Big Title"}),
        );
        assert_eq!(result, "MyComponent myComponent big-title");
    }

    #[test]
    fn test_indent_helper() {
        let mut engine = raw();
        let result = render_once(&mut engine, "{{indent body 2}}", &json!({"body": "a\n\nb"}));
        assert_eq!(result, "  a\n\n  b");
    }

    #[test]
    fn test_invalid_template() {
        let mut engine = raw();
        let err = engine.register_template("broken", "{{#if cond}}unterminated").unwrap_err();
        assert!(matches!(err, CodegenError::InvalidTemplate { .. }));
    }
}
