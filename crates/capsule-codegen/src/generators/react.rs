//! React (TSX) generator and Vite project target.

use capsule_core::{
    FileLanguage, GeneratedFile, Platform, PlatformOptions, ProjectSpec, ScreenSpec, ThemeSpec,
    WebOptions,
};
use serde_json::{json, Value};

use super::{
    bar_heights, comment_safe, indent, indent_all, number, type_name, xml_escape, Alignment,
    Dialect, Fragment,
};
use crate::compiler::{PlatformCompiler, PlatformTarget};
use crate::error::Result;

/// Web compiler producing a React + Vite project.
pub type ReactCompiler = PlatformCompiler<React>;

/// React target.
pub struct React;

/// Build the React capsule table.
pub fn dialect() -> Dialect {
    Dialect::new(Platform::Web, container, placeholder, js_escape)
        .with("text", text)
        .with("heading", heading)
        .with("button", button)
        .with("input", input)
        .with("card", card)
        .with("list", list)
        .with("image", image)
        .with("switch", switch)
        .with("progress", progress)
        .with("chart", chart)
        .with("stack", stack)
        .with("row", row)
        .with("spacer", spacer)
        .with("divider", divider)
}

/// A JSX expression holding a string literal, e.g. `{"Hello"}`.
pub fn jsx_string(s: &str) -> String {
    format!("{{{}}}", Value::String(s.to_string()))
}

/// Escape text for the inside of a double-quoted JavaScript string.
pub fn js_escape(s: &str) -> String {
    let quoted = Value::String(s.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// Inline style object from `(property, value)` pairs. Numeric values are
/// emitted bare, everything else as a string literal.
fn style(pairs: &[(&str, Value)]) -> String {
    let body: Vec<String> = pairs
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect();
    format!("style={{{{ {} }}}}", body.join(", "))
}

fn element(tag: &str, attrs: &str, children: &[String]) -> String {
    if children.is_empty() {
        format!("<{tag} {attrs} />")
    } else {
        format!("<{tag} {attrs}>\n{}\n</{tag}>", indent_all(children, 2))
    }
}

fn container(children: &[String]) -> String {
    element(
        "div",
        &style(&[
            ("display", json!("flex")),
            ("flexDirection", json!("column")),
        ]),
        children,
    )
}

fn placeholder(capsule_id: &str) -> String {
    format!("<div data-unsupported-capsule={} />", jsx_string(capsule_id))
}

fn text(f: &Fragment<'_>) -> String {
    format!(
        "<p {}>{}</p>",
        style(&[
            ("fontSize", json!(f.theme.font_size("body"))),
            ("color", json!(f.color("color", "text"))),
            ("margin", json!(0)),
        ]),
        jsx_string(&f.text("text", ""))
    )
}

fn heading(f: &Fragment<'_>) -> String {
    format!(
        "<h2 {}>{}</h2>",
        style(&[
            ("fontSize", json!(f.theme.font_size("heading"))),
            ("color", json!(f.color("color", "text"))),
            ("margin", json!(0)),
        ]),
        jsx_string(&f.text("text", ""))
    )
}

fn button(f: &Fragment<'_>) -> String {
    format!(
        "<button\n  type=\"button\"\n  {}\n>\n  {}\n</button>",
        style(&[
            ("background", json!(f.color("color", "primary"))),
            ("color", json!("#FFFFFF")),
            ("border", json!("none")),
            ("borderRadius", json!(f.theme.radius("md"))),
            ("padding", json!("10px 16px")),
        ]),
        jsx_string(&f.text("label", "Button"))
    )
}

fn input(f: &Fragment<'_>) -> String {
    let kind = if f.instance.prop_bool("secure").unwrap_or(false) {
        "password"
    } else {
        "text"
    };
    format!(
        "<input\n  type=\"{kind}\"\n  placeholder={}\n  {}\n/>",
        jsx_string(&f.text("placeholder", "")),
        style(&[
            ("padding", json!(f.theme.spacing("sm"))),
            ("borderRadius", json!(f.theme.radius("md"))),
            ("border", json!("1px solid #C7C7CC")),
        ])
    )
}

fn card(f: &Fragment<'_>) -> String {
    let mut content = Vec::new();
    if let Some(title) = f.instance.prop_str("title") {
        content.push(format!("<h3 style={{{{ margin: 0 }}}}>{}</h3>", jsx_string(&title)));
    }
    content.extend(f.children.iter().cloned());
    element(
        "div",
        &style(&[
            ("display", json!("flex")),
            ("flexDirection", json!("column")),
            ("gap", json!(f.theme.spacing("sm"))),
            ("padding", json!(f.spacing("padding", "md"))),
            ("background", json!(f.color("background", "background"))),
            ("borderRadius", json!(f.theme.radius("md"))),
            ("boxShadow", json!("0 1px 4px rgba(0, 0, 0, 0.12)")),
        ]),
        &content,
    )
}

fn list(f: &Fragment<'_>) -> String {
    let mut items: Vec<String> = f
        .instance
        .prop_list("items")
        .iter()
        .enumerate()
        .map(|(i, item)| format!("<li key={{{i}}}>{}</li>", jsx_string(item)))
        .collect();
    let offset = items.len();
    items.extend(
        f.children
            .iter()
            .enumerate()
            .map(|(i, child)| element("li", &format!("key={{{}}}", offset + i), std::slice::from_ref(child))),
    );
    element(
        "ul",
        &style(&[("listStyle", json!("none")), ("padding", json!(0)), ("margin", json!(0))]),
        &items,
    )
}

fn image(f: &Fragment<'_>) -> String {
    format!(
        "<img\n  src={}\n  alt={}\n  {}\n/>",
        jsx_string(&f.text("src", "")),
        jsx_string(&f.text("alt", "")),
        style(&[
            ("width", json!("100%")),
            ("height", json!(f.instance.prop_f64("height").unwrap_or(200.0))),
            ("objectFit", json!("cover")),
        ])
    )
}

fn switch(f: &Fragment<'_>) -> String {
    format!(
        "<label {}>\n  <input type=\"checkbox\" defaultChecked={{{}}} />\n  {}\n</label>",
        style(&[
            ("display", json!("flex")),
            ("alignItems", json!("center")),
            ("gap", json!(f.theme.spacing("sm"))),
        ]),
        f.instance.prop_bool("value").unwrap_or(false),
        jsx_string(&f.text("label", ""))
    )
}

fn progress(f: &Fragment<'_>) -> String {
    let bar = format!(
        "<progress value={{{}}} max={{1}} {} />",
        number(f.fraction("value")),
        style(&[
            ("width", json!("100%")),
            ("accentColor", json!(f.color("color", "primary"))),
        ])
    );
    match f.instance.prop_str("label") {
        Some(label) => element(
            "div",
            &style(&[("display", json!("flex")), ("flexDirection", json!("column")), ("gap", json!(4))]),
            &[format!("<span>{}</span>", jsx_string(&label)), bar],
        ),
        None => bar,
    }
}

fn chart(f: &Fragment<'_>) -> String {
    let values = f.instance.prop_numbers("data");
    let color = f.color("color", "primary");

    let mut content = Vec::new();
    if let Some(title) = f.instance.prop_str("title") {
        content.push(format!("<h3 style={{{{ margin: 0 }}}}>{}</h3>", jsx_string(&title)));
    }
    if values.is_empty() {
        content.push("<span>No data</span>".to_string());
    } else {
        let bars: Vec<String> = bar_heights(&values, 120.0)
            .into_iter()
            .map(|h| {
                format!(
                    "<div {} />",
                    style(&[
                        ("width", json!(16)),
                        ("height", json!(h)),
                        ("background", json!(color)),
                    ])
                )
            })
            .collect();
        content.push(element(
            "div",
            &style(&[
                ("display", json!("flex")),
                ("alignItems", json!("flex-end")),
                ("gap", json!(4)),
                ("height", json!(120)),
            ]),
            &bars,
        ));
    }
    element(
        "div",
        &style(&[("display", json!("flex")), ("flexDirection", json!("column")), ("gap", json!(8))]),
        &content,
    )
}

fn align_items(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Start => "flex-start",
        Alignment::Center => "center",
        Alignment::End => "flex-end",
    }
}

fn stack(f: &Fragment<'_>) -> String {
    element(
        "div",
        &style(&[
            ("display", json!("flex")),
            ("flexDirection", json!("column")),
            ("gap", json!(f.spacing("spacing", "md"))),
            ("alignItems", json!(align_items(f.alignment()))),
        ]),
        f.children,
    )
}

fn row(f: &Fragment<'_>) -> String {
    element(
        "div",
        &style(&[
            ("display", json!("flex")),
            ("flexDirection", json!("row")),
            ("gap", json!(f.spacing("spacing", "md"))),
            ("alignItems", json!("center")),
        ]),
        f.children,
    )
}

fn spacer(f: &Fragment<'_>) -> String {
    format!(
        "<div {} />",
        style(&[(
            "height",
            json!(f.instance.prop_f64("size").unwrap_or_else(|| f.theme.spacing("md")))
        )])
    )
}

fn divider(_f: &Fragment<'_>) -> String {
    "<hr style={{ border: \"none\", borderTop: \"1px solid #E5E5EA\", width: \"100%\" }} />".to_string()
}

fn screen_component(screen: &ScreenSpec) -> String {
    format!("{}Screen", type_name(&screen.id))
}

impl PlatformTarget for React {
    type Options = WebOptions;

    const PLATFORM: Platform = Platform::Web;

    fn dialect() -> Dialect {
        dialect()
    }

    fn select(options: &PlatformOptions) -> Option<&WebOptions> {
        options.as_web()
    }

    fn screen_file(
        _project: &ProjectSpec,
        _options: &WebOptions,
        screen: &ScreenSpec,
        body: &str,
    ) -> GeneratedFile {
        let name = screen_component(screen);
        let content = format!(
            "// Screen: {title}\nexport default function {name}() {{\n  return (\n    <>\n{body}\n    </>\n  );\n}}\n",
            title = comment_safe(&screen.name),
            body = indent(body, 6)
        );
        GeneratedFile::new(
            format!("src/screens/{name}.tsx"),
            content,
            FileLanguage::Typescript,
        )
    }

    fn support_files(project: &ProjectSpec, options: &WebOptions) -> Result<Vec<GeneratedFile>> {
        Ok(vec![
            GeneratedFile::new("package.json", package_json(project)?, FileLanguage::Json),
            GeneratedFile::new("index.html", index_html(project, options), FileLanguage::Html),
            GeneratedFile::new("tsconfig.json", TSCONFIG, FileLanguage::Json),
            GeneratedFile::new("vite.config.ts", VITE_CONFIG, FileLanguage::Typescript),
            GeneratedFile::new("src/main.tsx", MAIN_TSX, FileLanguage::Typescript),
            GeneratedFile::new("src/App.tsx", app_file(project), FileLanguage::Typescript),
            GeneratedFile::new("src/theme.ts", theme_file(&project.theme)?, FileLanguage::Typescript),
        ])
    }
}

/// npm package names are lowercase and URL safe.
fn package_name(project_name: &str) -> String {
    let name: String = project_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let name = name
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if name.is_empty() {
        "app".to_string()
    } else {
        name
    }
}

fn package_json(project: &ProjectSpec) -> Result<String> {
    let manifest = json!({
        "name": package_name(&project.name),
        "private": true,
        "version": project.version,
        "type": "module",
        "scripts": {
            "dev": "vite",
            "build": "tsc && vite build",
            "preview": "vite preview"
        },
        "dependencies": {
            "react": "^18.2.0",
            "react-dom": "^18.2.0"
        },
        "devDependencies": {
            "@types/react": "^18.2.0",
            "@types/react-dom": "^18.2.0",
            "@vitejs/plugin-react": "^4.2.0",
            "typescript": "^5.3.0",
            "vite": "^5.0.0"
        }
    });
    Ok(format!("{}\n", serde_json::to_string_pretty(&manifest)?))
}

fn index_html(project: &ProjectSpec, options: &WebOptions) -> String {
    let title = options.title.as_deref().unwrap_or(&project.name);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{}</title>
  </head>
  <body>
    <div id="root"></div>
    <script type="module" src="/src/main.tsx"></script>
  </body>
</html>
"#,
        xml_escape(title)
    )
}

const TSCONFIG: &str = r#"{
  "compilerOptions": {
    "target": "ES2020",
    "lib": ["ES2020", "DOM", "DOM.Iterable"],
    "module": "ESNext",
    "moduleResolution": "bundler",
    "jsx": "react-jsx",
    "strict": true,
    "noEmit": true,
    "skipLibCheck": true
  },
  "include": ["src"]
}
"#;

const VITE_CONFIG: &str = r#"import { defineConfig } from "vite";
import react from "@vitejs/plugin-react";

export default defineConfig({
  plugins: [react()],
});
"#;

const MAIN_TSX: &str = r#"import React from "react";
import ReactDOM from "react-dom/client";
import App from "./App";

ReactDOM.createRoot(document.getElementById("root")!).render(
  <React.StrictMode>
    <App />
  </React.StrictMode>
);
"#;

fn app_file(project: &ProjectSpec) -> String {
    let mut imports: Vec<String> = Vec::new();
    if project.uses_tabs() {
        imports.push("import { useState } from \"react\";".to_string());
    }
    imports.push("import { theme } from \"./theme\";".to_string());
    for screen in &project.screens {
        let name = screen_component(screen);
        imports.push(format!("import {name} from \"./screens/{name}\";"));
    }

    let body = if project.uses_tabs() {
        let initial = project
            .initial_screen()
            .map(|s| s.id.as_str())
            .unwrap_or_default();
        let tabs: Vec<String> = project
            .screens
            .iter()
            .map(|screen| {
                format!(
                    "<button type=\"button\" onClick={{() => setSelected({id})}}>\n  {label}\n</button>",
                    id = Value::String(screen.id.clone()),
                    label = jsx_string(&screen.name)
                )
            })
            .collect();
        let panels: Vec<String> = project
            .screens
            .iter()
            .map(|screen| {
                format!(
                    "{{selected === {} && <{} />}}",
                    Value::String(screen.id.clone()),
                    screen_component(screen)
                )
            })
            .collect();
        format!(
            "  const [selected, setSelected] = useState({});\n  return (\n    <div style={{{{ fontFamily: theme.typography.fontFamily }}}}>\n{}\n{}\n    </div>\n  );",
            Value::String(initial.to_string()),
            indent(&element("nav", "style={{ display: \"flex\", gap: 8 }}", &tabs), 6),
            indent(&element("main", "style={{ padding: 16 }}", &panels), 6)
        )
    } else {
        let content = match project.initial_screen() {
            Some(screen) => format!("<{} />", screen_component(screen)),
            None => "<p>No screens</p>".to_string(),
        };
        format!(
            "  return (\n    <main style={{{{ fontFamily: theme.typography.fontFamily, padding: 16 }}}}>\n      {content}\n    </main>\n  );"
        )
    };

    format!(
        "{}\n\nexport default function App() {{\n{body}\n}}\n",
        imports.join("\n")
    )
}

fn theme_file(theme: &ThemeSpec) -> Result<String> {
    Ok(format!(
        "export const theme = {} as const;\n",
        serde_json::to_string_pretty(theme)?
    ))
}
