//! Jetpack Compose generator and Android project target.

use capsule_core::{
    AndroidOptions, FileLanguage, GeneratedFile, Platform, PlatformOptions, ProjectSpec, Rgba,
    ScreenSpec, ThemeSpec,
};

use super::{
    bar_heights, comment_safe, indent, indent_all, number, type_name, xml_escape,
    Alignment, Dialect, Fragment,
};
use crate::compiler::{PlatformCompiler, PlatformTarget};
use crate::error::Result;

/// Android compiler producing a Jetpack Compose project.
pub type ComposeCompiler = PlatformCompiler<Compose>;

/// Jetpack Compose target.
pub struct Compose;

const SCREEN_IMPORTS: &str = "import androidx.compose.foundation.background
import androidx.compose.foundation.layout.*
import androidx.compose.foundation.lazy.LazyColumn
import androidx.compose.foundation.shape.RoundedCornerShape
import androidx.compose.material3.*
import androidx.compose.runtime.Composable
import androidx.compose.ui.Alignment
import androidx.compose.ui.Modifier
import androidx.compose.ui.graphics.Color
import androidx.compose.ui.text.font.FontWeight
import androidx.compose.ui.text.input.PasswordVisualTransformation
import androidx.compose.ui.tooling.preview.Preview
import androidx.compose.ui.unit.dp
import androidx.compose.ui.unit.sp
import coil.compose.AsyncImage";

/// Build the Compose capsule table.
pub fn dialect() -> Dialect {
    Dialect::new(Platform::Android, container, placeholder, kotlin_escape)
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

/// Kotlin string literal.
pub fn kotlin_string(s: &str) -> String {
    format!("\"{}\"", kotlin_escape(s))
}

/// Escape text for the inside of a Kotlin string literal, including `$`.
pub fn kotlin_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Compose `Color` expression for a hex token.
pub fn kotlin_color(hex: &str) -> String {
    match Rgba::from_hex(hex) {
        Some(color) => format!("Color(0x{:08X})", color.to_argb_u32()),
        None => "MaterialTheme.colorScheme.primary".to_string(),
    }
}

fn block(header: &str, children: &[String]) -> String {
    if children.is_empty() {
        format!("{header} {{\n}}")
    } else {
        format!("{header} {{\n{}\n}}", indent_all(children, 4))
    }
}

fn container(children: &[String]) -> String {
    block("Column", children)
}

fn placeholder(capsule_id: &str) -> String {
    format!("// unsupported capsule: {}", comment_safe(capsule_id))
}

fn text(f: &Fragment<'_>) -> String {
    format!(
        "Text(\n    text = {},\n    fontSize = {}.sp,\n    color = {}\n)",
        kotlin_string(&f.text("text", "")),
        number(f.theme.font_size("body")),
        kotlin_color(&f.color("color", "text"))
    )
}

fn heading(f: &Fragment<'_>) -> String {
    format!(
        "Text(\n    text = {},\n    fontSize = {}.sp,\n    fontWeight = FontWeight.Bold,\n    color = {}\n)",
        kotlin_string(&f.text("text", "")),
        number(f.theme.font_size("heading")),
        kotlin_color(&f.color("color", "text"))
    )
}

fn button(f: &Fragment<'_>) -> String {
    format!(
        "Button(\n    onClick = {{ }},\n    colors = ButtonDefaults.buttonColors(containerColor = {}),\n    shape = RoundedCornerShape({}.dp)\n) {{\n    Text(text = {})\n}}",
        kotlin_color(&f.color("color", "primary")),
        number(f.theme.radius("md")),
        kotlin_string(&f.text("label", "Button"))
    )
}

fn input(f: &Fragment<'_>) -> String {
    let mut args = vec![
        "value = \"\"".to_string(),
        "onValueChange = { }".to_string(),
        format!("placeholder = {{ Text(text = {}) }}", kotlin_string(&f.text("placeholder", ""))),
        "modifier = Modifier.fillMaxWidth()".to_string(),
    ];
    if f.instance.prop_bool("secure").unwrap_or(false) {
        args.push("visualTransformation = PasswordVisualTransformation()".to_string());
    }
    format!("OutlinedTextField(\n{}\n)", indent(&args.join(",\n"), 4))
}

fn card(f: &Fragment<'_>) -> String {
    let mut content = Vec::new();
    if let Some(title) = f.instance.prop_str("title") {
        content.push(format!(
            "Text(\n    text = {},\n    style = MaterialTheme.typography.titleMedium\n)",
            kotlin_string(&title)
        ));
    }
    content.extend(f.children.iter().cloned());
    let column = block(
        &format!(
            "Column(\n    modifier = Modifier.padding({}.dp),\n    verticalArrangement = Arrangement.spacedBy({}.dp)\n)",
            number(f.spacing("padding", "md")),
            number(f.theme.spacing("sm"))
        ),
        &content,
    );
    block(
        &format!(
            "Card(\n    modifier = Modifier.fillMaxWidth(),\n    shape = RoundedCornerShape({}.dp)\n)",
            number(f.theme.radius("md"))
        ),
        &[column],
    )
}

fn list(f: &Fragment<'_>) -> String {
    let mut items: Vec<String> = f
        .instance
        .prop_list("items")
        .iter()
        .map(|item| format!("item {{ Text(text = {}) }}", kotlin_string(item)))
        .collect();
    items.extend(f.children.iter().map(|child| block("item", std::slice::from_ref(child))));
    block("LazyColumn", &items)
}

fn image(f: &Fragment<'_>) -> String {
    format!(
        "AsyncImage(\n    model = {},\n    contentDescription = {},\n    modifier = Modifier.fillMaxWidth().height({}.dp)\n)",
        kotlin_string(&f.text("src", "")),
        kotlin_string(&f.text("alt", "")),
        number(f.instance.prop_f64("height").unwrap_or(200.0))
    )
}

fn switch(f: &Fragment<'_>) -> String {
    format!(
        "Row(verticalAlignment = Alignment.CenterVertically) {{\n    Text(text = {}, modifier = Modifier.weight(1f))\n    Switch(checked = {}, onCheckedChange = {{ }})\n}}",
        kotlin_string(&f.text("label", "")),
        f.instance.prop_bool("value").unwrap_or(false)
    )
}

fn progress(f: &Fragment<'_>) -> String {
    let bar = format!(
        "LinearProgressIndicator(\n    progress = {{ {}f }},\n    color = {},\n    modifier = Modifier.fillMaxWidth()\n)",
        number(f.fraction("value")),
        kotlin_color(&f.color("color", "primary"))
    );
    match f.instance.prop_str("label") {
        Some(label) => block(
            "Column(verticalArrangement = Arrangement.spacedBy(4.dp))",
            &[format!("Text(text = {})", kotlin_string(&label)), bar],
        ),
        None => bar,
    }
}

fn chart(f: &Fragment<'_>) -> String {
    let values = f.instance.prop_numbers("data");
    let color = kotlin_color(&f.color("color", "primary"));

    let mut content = Vec::new();
    if let Some(title) = f.instance.prop_str("title") {
        content.push(format!(
            "Text(\n    text = {},\n    style = MaterialTheme.typography.titleMedium\n)",
            kotlin_string(&title)
        ));
    }
    if values.is_empty() {
        content.push("Text(text = \"No data\")".to_string());
    } else {
        let bars: Vec<String> = bar_heights(&values, 120.0)
            .into_iter()
            .map(|h| {
                format!(
                    "Box(\n    modifier = Modifier\n        .width(16.dp)\n        .height({}.dp)\n        .background({color})\n)",
                    number(h)
                )
            })
            .collect();
        content.push(block(
            "Row(\n    modifier = Modifier.height(120.dp),\n    horizontalArrangement = Arrangement.spacedBy(4.dp),\n    verticalAlignment = Alignment.Bottom\n)",
            &bars,
        ));
    }
    block("Column(verticalArrangement = Arrangement.spacedBy(8.dp))", &content)
}

fn stack(f: &Fragment<'_>) -> String {
    let alignment = match f.alignment() {
        Alignment::Start => "Alignment.Start",
        Alignment::Center => "Alignment.CenterHorizontally",
        Alignment::End => "Alignment.End",
    };
    block(
        &format!(
            "Column(\n    verticalArrangement = Arrangement.spacedBy({}.dp),\n    horizontalAlignment = {alignment}\n)",
            number(f.spacing("spacing", "md"))
        ),
        f.children,
    )
}

fn row(f: &Fragment<'_>) -> String {
    block(
        &format!(
            "Row(\n    horizontalArrangement = Arrangement.spacedBy({}.dp),\n    verticalAlignment = Alignment.CenterVertically\n)",
            number(f.spacing("spacing", "md"))
        ),
        f.children,
    )
}

fn spacer(f: &Fragment<'_>) -> String {
    format!(
        "Spacer(modifier = Modifier.height({}.dp))",
        number(f.instance.prop_f64("size").unwrap_or_else(|| f.theme.spacing("md")))
    )
}

fn divider(_f: &Fragment<'_>) -> String {
    "HorizontalDivider()".to_string()
}

fn screen_function(screen: &ScreenSpec) -> String {
    format!("{}Screen", type_name(&screen.id))
}

fn source_root(options: &AndroidOptions) -> String {
    format!("app/src/main/java/{}", options.package_name.replace('.', "/"))
}

impl PlatformTarget for Compose {
    type Options = AndroidOptions;

    const PLATFORM: Platform = Platform::Android;

    fn dialect() -> Dialect {
        dialect()
    }

    fn select(options: &PlatformOptions) -> Option<&AndroidOptions> {
        options.as_android()
    }

    fn screen_file(
        _project: &ProjectSpec,
        options: &AndroidOptions,
        screen: &ScreenSpec,
        body: &str,
    ) -> GeneratedFile {
        let name = screen_function(screen);
        let content = format!(
            r#"package {package}.screens

{imports}

@Composable
fun {name}(modifier: Modifier = Modifier) {{
    Column(modifier = modifier.padding(16.dp)) {{
{body}
    }}
}}

@Preview(showBackground = true)
@Composable
fun {name}Preview() {{
    {name}()
}}
"#,
            package = options.package_name,
            imports = SCREEN_IMPORTS,
            body = indent(body, 8)
        );
        GeneratedFile::new(
            format!("{}/screens/{name}.kt", source_root(options)),
            content,
            FileLanguage::Kotlin,
        )
    }

    fn support_files(project: &ProjectSpec, options: &AndroidOptions) -> Result<Vec<GeneratedFile>> {
        let root = source_root(options);
        Ok(vec![
            GeneratedFile::new("settings.gradle.kts", settings_gradle(project), FileLanguage::Gradle),
            GeneratedFile::new("build.gradle.kts", ROOT_BUILD_GRADLE, FileLanguage::Gradle),
            GeneratedFile::new("app/build.gradle.kts", app_build_gradle(project, options), FileLanguage::Gradle),
            GeneratedFile::new(
                "app/src/main/AndroidManifest.xml",
                manifest(project, options),
                FileLanguage::Xml,
            ),
            GeneratedFile::new(
                format!("{root}/MainActivity.kt"),
                main_activity(project, options),
                FileLanguage::Kotlin,
            ),
            GeneratedFile::new(
                format!("{root}/ui/theme/Theme.kt"),
                theme_file(&project.theme, options),
                FileLanguage::Kotlin,
            ),
        ])
    }
}

fn settings_gradle(project: &ProjectSpec) -> String {
    format!(
        r#"pluginManagement {{
    repositories {{
        google()
        mavenCentral()
        gradlePluginPortal()
    }}
}}

dependencyResolutionManagement {{
    repositories {{
        google()
        mavenCentral()
    }}
}}

rootProject.name = {}
include(":app")
"#,
        kotlin_string(&project.name)
    )
}

const ROOT_BUILD_GRADLE: &str = r#"plugins {
    id("com.android.application") version "8.2.2" apply false
    id("org.jetbrains.kotlin.android") version "1.9.22" apply false
}
"#;

fn app_build_gradle(project: &ProjectSpec, options: &AndroidOptions) -> String {
    format!(
        r#"plugins {{
    id("com.android.application")
    id("org.jetbrains.kotlin.android")
}}

android {{
    namespace = "{package}"
    compileSdk = {target}

    defaultConfig {{
        applicationId = "{package}"
        minSdk = {min}
        targetSdk = {target}
        versionCode = 1
        versionName = {version}
    }}

    buildFeatures {{
        compose = true
    }}

    composeOptions {{
        kotlinCompilerExtensionVersion = "1.5.8"
    }}

    compileOptions {{
        sourceCompatibility = JavaVersion.VERSION_17
        targetCompatibility = JavaVersion.VERSION_17
    }}

    kotlinOptions {{
        jvmTarget = "17"
    }}
}}

dependencies {{
    implementation(platform("androidx.compose:compose-bom:2024.02.00"))
    implementation("androidx.activity:activity-compose:1.8.2")
    implementation("androidx.compose.ui:ui")
    implementation("androidx.compose.ui:ui-tooling-preview")
    implementation("androidx.compose.material3:material3")
    implementation("androidx.compose.material:material-icons-core")
    implementation("io.coil-kt:coil-compose:2.5.0")
    debugImplementation("androidx.compose.ui:ui-tooling")
}}
"#,
        package = options.package_name,
        min = options.min_sdk,
        target = options.target_sdk,
        version = kotlin_string(&project.version)
    )
}

fn manifest(project: &ProjectSpec, options: &AndroidOptions) -> String {
    let permissions: Vec<String> = options
        .permissions
        .iter()
        .map(|p| format!("    <uses-permission android:name=\"{}\" />", p.manifest_name()))
        .collect();
    let permissions = if permissions.is_empty() {
        String::new()
    } else {
        format!("{}\n\n", permissions.join("\n"))
    };

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android">

{permissions}    <application
        android:label="{label}"
        android:theme="@android:style/Theme.Material.Light.NoActionBar">
        <activity
            android:name=".MainActivity"
            android:exported="true">
            <intent-filter>
                <action android:name="android.intent.action.MAIN" />
                <category android:name="android.intent.category.LAUNCHER" />
            </intent-filter>
        </activity>
    </application>
</manifest>
"#,
        label = xml_escape(&project.name)
    )
}

/// Entry activity plus the top-level navigation composable.
fn main_activity(project: &ProjectSpec, options: &AndroidOptions) -> String {
    let package = &options.package_name;
    let mut imports = vec![
        "import android.os.Bundle".to_string(),
        "import androidx.activity.ComponentActivity".to_string(),
        "import androidx.activity.compose.setContent".to_string(),
        "import androidx.compose.foundation.layout.padding".to_string(),
        "import androidx.compose.material.icons.Icons".to_string(),
        "import androidx.compose.material.icons.filled.Star".to_string(),
        "import androidx.compose.material3.*".to_string(),
        "import androidx.compose.runtime.*".to_string(),
        "import androidx.compose.ui.Modifier".to_string(),
        format!("import {package}.ui.theme.AppTheme"),
    ];
    for screen in &project.screens {
        imports.push(format!("import {package}.screens.{}", screen_function(screen)));
    }

    let navigation = if project.uses_tabs() {
        let initial = project
            .initial_screen()
            .map(|s| s.id.as_str())
            .unwrap_or_default();
        let items: Vec<String> = project
            .screens
            .iter()
            .map(|screen| {
                let id = kotlin_string(&screen.id);
                format!(
                    "NavigationBarItem(\n    selected = selected == {id},\n    onClick = {{ selected = {id} }},\n    icon = {{ Icon(Icons.Filled.Star, contentDescription = null) }},\n    label = {{ Text(text = {}) }}\n)",
                    kotlin_string(&screen.name)
                )
            })
            .collect();
        let branches: Vec<String> = project
            .screens
            .iter()
            .map(|screen| {
                format!(
                    "{} -> {}(modifier = Modifier.padding(padding))",
                    kotlin_string(&screen.id),
                    screen_function(screen)
                )
            })
            .collect();
        format!(
            "    var selected by remember {{ mutableStateOf({}) }}\n    Scaffold(\n        bottomBar = {{\n{}\n        }}\n    ) {{ padding ->\n{}\n    }}",
            kotlin_string(initial),
            indent(&block("NavigationBar", &items), 12),
            indent(&block("when (selected)", &branches), 8)
        )
    } else {
        let content = match project.initial_screen() {
            Some(screen) => format!("{}(modifier = Modifier.padding(padding))", screen_function(screen)),
            None => "Text(text = \"No screens\", modifier = Modifier.padding(padding))".to_string(),
        };
        format!("    Scaffold {{ padding ->\n        {content}\n    }}")
    };

    format!(
        r#"package {package}

{imports}

class MainActivity : ComponentActivity() {{
    override fun onCreate(savedInstanceState: Bundle?) {{
        super.onCreate(savedInstanceState)
        setContent {{
            AppTheme {{
                AppNavigation()
            }}
        }}
    }}
}}

@Composable
fun AppNavigation() {{
{navigation}
}}
"#,
        imports = imports.join("\n")
    )
}

fn theme_file(theme: &ThemeSpec, options: &AndroidOptions) -> String {
    let colors: Vec<String> = theme
        .colors
        .iter()
        .map(|(name, hex)| format!("    val {} = {}", type_name(name), kotlin_color(hex)))
        .collect();
    let sizes: Vec<String> = theme
        .typography
        .sizes
        .iter()
        .map(|(name, size)| format!("    val {} = {}.sp", type_name(name), number(*size)))
        .collect();
    let spacing: Vec<String> = theme
        .spacing
        .iter()
        .map(|(name, v)| format!("    val {} = {}.dp", type_name(name), number(*v)))
        .collect();
    let radii: Vec<String> = theme
        .border_radius
        .iter()
        .map(|(name, v)| format!("    val {} = {}.dp", type_name(name), number(*v)))
        .collect();

    let mut scheme = vec![format!("    primary = {}", kotlin_color(theme.primary()))];
    if let Some(bg) = theme.colors.get("background") {
        scheme.push(format!("    background = {}", kotlin_color(bg)));
    }

    format!(
        r#"package {package}.ui.theme

import androidx.compose.material3.MaterialTheme
import androidx.compose.material3.lightColorScheme
import androidx.compose.runtime.Composable
import androidx.compose.ui.graphics.Color
import androidx.compose.ui.unit.dp
import androidx.compose.ui.unit.sp

// Theme: {name}
object AppColors {{
{colors}
}}

object AppTypography {{
    const val FontFamily = {family}
{sizes}
}}

object AppSpacing {{
{spacing}
}}

object AppRadius {{
{radii}
}}

private val AppColorScheme = lightColorScheme(
{scheme}
)

@Composable
fun AppTheme(content: @Composable () -> Unit) {{
    MaterialTheme(colorScheme = AppColorScheme, content = content)
}}
"#,
        package = options.package_name,
        name = comment_safe(&theme.name),
        colors = colors.join("\n"),
        family = kotlin_string(&theme.typography.font_family),
        sizes = sizes.join("\n"),
        spacing = spacing.join("\n"),
        radii = radii.join("\n"),
        scheme = scheme.join(",\n")
    )
}
