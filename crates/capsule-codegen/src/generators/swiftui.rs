//! SwiftUI generator and iOS project target.

use capsule_core::{
    FileLanguage, GeneratedFile, IosCapability, IosOptions, Platform, PlatformOptions,
    ProjectSpec, Rgba, ScreenSpec, ThemeSpec,
};

use super::{
    bar_heights, comment_safe, indent, indent_all, member_name, number, type_name, xml_escape,
    Alignment, Dialect, Fragment,
};
use crate::compiler::{PlatformCompiler, PlatformTarget};
use crate::error::Result;

/// iOS compiler producing a SwiftUI project.
pub type SwiftUICompiler = PlatformCompiler<SwiftUI>;

/// SwiftUI target.
pub struct SwiftUI;

/// Build the SwiftUI capsule table.
pub fn dialect() -> Dialect {
    Dialect::new(Platform::Ios, container, placeholder, swift_escape)
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

/// Swift string literal.
pub fn swift_string(s: &str) -> String {
    format!("\"{}\"", swift_escape(s))
}

/// Escape text for the inside of a Swift string literal.
pub fn swift_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Swift `Color` expression for a hex token.
pub fn swift_color(hex: &str) -> String {
    match Rgba::from_hex(hex) {
        Some(color) => {
            let [r, g, b, a] = color.to_unit();
            format!("Color(red: {r:.3}, green: {g:.3}, blue: {b:.3}, opacity: {a:.3})")
        }
        None => "Color.accentColor".to_string(),
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
    block("VStack", children)
}

fn placeholder(capsule_id: &str) -> String {
    format!("EmptyView() // unsupported capsule: {}", comment_safe(capsule_id))
}

fn horizontal_alignment(f: &Fragment<'_>) -> &'static str {
    match f.alignment() {
        Alignment::Start => ".leading",
        Alignment::Center => ".center",
        Alignment::End => ".trailing",
    }
}

fn text(f: &Fragment<'_>) -> String {
    format!(
        "Text({})\n    .font(.system(size: {}))\n    .foregroundColor({})",
        swift_string(&f.text("text", "")),
        number(f.theme.font_size("body")),
        swift_color(&f.color("color", "text"))
    )
}

fn heading(f: &Fragment<'_>) -> String {
    format!(
        "Text({})\n    .font(.system(size: {}, weight: .bold))\n    .foregroundColor({})",
        swift_string(&f.text("text", "")),
        number(f.theme.font_size("heading")),
        swift_color(&f.color("color", "text"))
    )
}

fn button(f: &Fragment<'_>) -> String {
    let label = format!(
        "Text({})\n    .padding(.horizontal, {})\n    .padding(.vertical, {})\n    .background({})\n    .foregroundColor(.white)\n    .cornerRadius({})",
        swift_string(&f.text("label", "Button")),
        number(f.theme.spacing("md")),
        number(f.theme.spacing("sm")),
        swift_color(&f.color("color", "primary")),
        number(f.theme.radius("md"))
    );
    format!("Button(action: {{}}) {{\n{}\n}}", indent(&label, 4))
}

fn input(f: &Fragment<'_>) -> String {
    let kind = if f.instance.prop_bool("secure").unwrap_or(false) {
        "SecureField"
    } else {
        "TextField"
    };
    format!(
        "{kind}({}, text: .constant(\"\"))\n    .textFieldStyle(.roundedBorder)",
        swift_string(&f.text("placeholder", ""))
    )
}

fn card(f: &Fragment<'_>) -> String {
    let mut content = Vec::new();
    if let Some(title) = f.instance.prop_str("title") {
        content.push(format!("Text({})\n    .font(.headline)", swift_string(&title)));
    }
    content.extend(f.children.iter().cloned());
    format!(
        "{}\n.padding({})\n.background(Color(.secondarySystemBackground))\n.cornerRadius({})",
        block(
            &format!("VStack(alignment: .leading, spacing: {})", number(f.theme.spacing("sm"))),
            &content
        ),
        number(f.spacing("padding", "md")),
        number(f.theme.radius("md"))
    )
}

fn list(f: &Fragment<'_>) -> String {
    let mut rows: Vec<String> = f
        .instance
        .prop_list("items")
        .iter()
        .map(|item| format!("Text({})", swift_string(item)))
        .collect();
    rows.extend(f.children.iter().cloned());
    block("List", &rows)
}

fn image(f: &Fragment<'_>) -> String {
    format!(
        "AsyncImage(url: URL(string: {})) {{ image in\n    image\n        .resizable()\n        .scaledToFit()\n}} placeholder: {{\n    ProgressView()\n}}\n.frame(height: {})\n.accessibilityLabel({})",
        swift_string(&f.text("src", "")),
        number(f.instance.prop_f64("height").unwrap_or(200.0)),
        swift_string(&f.text("alt", ""))
    )
}

fn switch(f: &Fragment<'_>) -> String {
    format!(
        "Toggle({}, isOn: .constant({}))\n    .tint({})",
        swift_string(&f.text("label", "")),
        f.instance.prop_bool("value").unwrap_or(false),
        swift_color(&f.color("color", "primary"))
    )
}

fn progress(f: &Fragment<'_>) -> String {
    let head = match f.instance.prop_str("label") {
        Some(label) => format!("ProgressView({}, value: {})", swift_string(&label), number(f.fraction("value"))),
        None => format!("ProgressView(value: {})", number(f.fraction("value"))),
    };
    format!("{head}\n    .tint({})", swift_color(&f.color("color", "primary")))
}

fn chart(f: &Fragment<'_>) -> String {
    let values = f.instance.prop_numbers("data");
    let color = swift_color(&f.color("color", "primary"));

    let mut content = Vec::new();
    if let Some(title) = f.instance.prop_str("title") {
        content.push(format!("Text({})\n    .font(.headline)", swift_string(&title)));
    }
    if values.is_empty() {
        content.push("Text(\"No data\")\n    .foregroundColor(.secondary)".to_string());
    } else {
        let bars: Vec<String> = bar_heights(&values, 120.0)
            .into_iter()
            .map(|h| format!("Rectangle()\n    .fill({color})\n    .frame(width: 16, height: {})", number(h)))
            .collect();
        content.push(format!(
            "{}\n.frame(height: 120)",
            block("HStack(alignment: .bottom, spacing: 4)", &bars)
        ));
    }
    block("VStack(alignment: .leading, spacing: 8)", &content)
}

fn stack(f: &Fragment<'_>) -> String {
    block(
        &format!(
            "VStack(alignment: {}, spacing: {})",
            horizontal_alignment(f),
            number(f.spacing("spacing", "md"))
        ),
        f.children,
    )
}

fn row(f: &Fragment<'_>) -> String {
    block(
        &format!("HStack(spacing: {})", number(f.spacing("spacing", "md"))),
        f.children,
    )
}

fn spacer(f: &Fragment<'_>) -> String {
    match f.instance.prop_f64("size") {
        Some(size) => format!("Spacer()\n    .frame(height: {})", number(size)),
        None => "Spacer()".to_string(),
    }
}

fn divider(_f: &Fragment<'_>) -> String {
    "Divider()".to_string()
}

/// Directory holding the app sources, named after the project.
fn app_dir(project: &ProjectSpec) -> String {
    type_name(&project.name)
}

fn screen_type(screen: &ScreenSpec) -> String {
    format!("{}Screen", type_name(&screen.id))
}

impl PlatformTarget for SwiftUI {
    type Options = IosOptions;

    const PLATFORM: Platform = Platform::Ios;

    fn dialect() -> Dialect {
        dialect()
    }

    fn select(options: &PlatformOptions) -> Option<&IosOptions> {
        options.as_ios()
    }

    fn screen_file(
        project: &ProjectSpec,
        _options: &IosOptions,
        screen: &ScreenSpec,
        body: &str,
    ) -> GeneratedFile {
        let name = screen_type(screen);
        let content = format!(
            r#"import SwiftUI

struct {name}: View {{
    var body: some View {{
{body}
    }}
}}

#if DEBUG
struct {name}_Previews: PreviewProvider {{
    static var previews: some View {{
        {name}()
    }}
}}
#endif
"#,
            body = indent(body, 8)
        );
        GeneratedFile::new(
            format!("{}/Screens/{name}.swift", app_dir(project)),
            content,
            FileLanguage::Swift,
        )
    }

    fn support_files(project: &ProjectSpec, options: &IosOptions) -> Result<Vec<GeneratedFile>> {
        let dir = app_dir(project);
        let mut files = vec![
            GeneratedFile::new(
                format!("{dir}/{dir}App.swift"),
                app_file(&dir),
                FileLanguage::Swift,
            ),
            GeneratedFile::new(
                format!("{dir}/ContentView.swift"),
                navigation_file(project),
                FileLanguage::Swift,
            ),
            GeneratedFile::new(
                format!("{dir}/Theme/Theme.swift"),
                theme_file(&project.theme),
                FileLanguage::Swift,
            ),
            GeneratedFile::new(
                format!("{dir}/Info.plist"),
                info_plist(project, options),
                FileLanguage::Xml,
            ),
        ];

        let entitlements = entitlements_file(options);
        let entitlements_path = format!("{dir}/{dir}.entitlements");
        files.push(GeneratedFile::new(
            "project.yml",
            xcodegen_spec(project, options, entitlements.is_some().then_some(entitlements_path.as_str())),
            FileLanguage::Yaml,
        ));
        if let Some(content) = entitlements {
            files.push(GeneratedFile::new(entitlements_path, content, FileLanguage::Xml));
        }

        Ok(files)
    }
}

fn app_file(app: &str) -> String {
    format!(
        r#"import SwiftUI

@main
struct {app}App: App {{
    var body: some Scene {{
        WindowGroup {{
            ContentView()
        }}
    }}
}}
"#
    )
}

/// Top-level navigation: a tab view over every screen, or a single screen.
fn navigation_file(project: &ProjectSpec) -> String {
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
                    "{}()\n    .tabItem {{\n        Label({}, systemImage: \"circle\")\n    }}\n    .tag({})",
                    screen_type(screen),
                    swift_string(&screen.name),
                    swift_string(&screen.id)
                )
            })
            .collect();
        format!(
            "    @State private var selection = {}\n\n    var body: some View {{\n{}\n    }}",
            swift_string(initial),
            indent(&block("TabView(selection: $selection)", &tabs), 8)
        )
    } else {
        let content = match project.initial_screen() {
            Some(screen) => format!(
                "{}()\n    .navigationTitle({})",
                screen_type(screen),
                swift_string(&screen.name)
            ),
            None => "Text(\"No screens\")".to_string(),
        };
        format!(
            "    var body: some View {{\n{}\n    }}",
            indent(&block("NavigationView", &[content]), 8)
        )
    };

    format!("import SwiftUI\n\nstruct ContentView: View {{\n{body}\n}}\n")
}

fn theme_file(theme: &ThemeSpec) -> String {
    let mut lines = vec![
        "import SwiftUI".to_string(),
        String::new(),
        "enum Theme {".to_string(),
        format!("    static let name = {}", swift_string(&theme.name)),
        String::new(),
        "    // Colors".to_string(),
    ];
    for (name, hex) in &theme.colors {
        lines.push(format!("    static let {} = {}", member_name(name), swift_color(hex)));
    }

    lines.push(String::new());
    lines.push("    // Typography".to_string());
    lines.push(format!(
        "    static let fontFamily = {}",
        swift_string(&theme.typography.font_family)
    ));
    for (name, size) in &theme.typography.sizes {
        lines.push(format!(
            "    static let {}Size: CGFloat = {}",
            member_name(name),
            number(*size)
        ));
    }

    lines.push(String::new());
    lines.push("    // Spacing".to_string());
    for (name, value) in &theme.spacing {
        lines.push(format!(
            "    static let spacing{}: CGFloat = {}",
            type_name(name),
            number(*value)
        ));
    }

    lines.push(String::new());
    lines.push("    // Corner radius".to_string());
    for (name, value) in &theme.border_radius {
        lines.push(format!(
            "    static let radius{}: CGFloat = {}",
            type_name(name),
            number(*value)
        ));
    }

    lines.push("}".to_string());
    lines.join("\n") + "\n"
}

fn info_plist(project: &ProjectSpec, options: &IosOptions) -> String {
    let mut entries = vec![
        plist_string("CFBundleDisplayName", &project.name),
        plist_string("CFBundleIdentifier", "$(PRODUCT_BUNDLE_IDENTIFIER)"),
        plist_string("CFBundleShortVersionString", &project.version),
        plist_string("CFBundleVersion", "1"),
        "    <key>UILaunchScreen</key>\n    <dict/>".to_string(),
    ];
    if options.capabilities.contains(&IosCapability::BackgroundModes) {
        entries.push(
            "    <key>UIBackgroundModes</key>\n    <array>\n        <string>fetch</string>\n        <string>remote-notification</string>\n    </array>"
                .to_string(),
        );
    }
    plist(&entries.join("\n"))
}

fn plist(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
{body}
</dict>
</plist>
"#
    )
}

fn plist_string(key: &str, value: &str) -> String {
    format!(
        "    <key>{}</key>\n    <string>{}</string>",
        xml_escape(key),
        xml_escape(value)
    )
}

fn entitlement_value(capability: IosCapability) -> &'static str {
    match capability {
        IosCapability::PushNotifications => "<string>development</string>",
        IosCapability::SignInWithApple => "<array>\n        <string>Default</string>\n    </array>",
        IosCapability::ICloud => "<array>\n        <string>CloudKit</string>\n    </array>",
        IosCapability::AppGroups
        | IosCapability::AssociatedDomains
        | IosCapability::KeychainSharing => "<array/>",
        IosCapability::HealthKit
        | IosCapability::HomeKit
        | IosCapability::BackgroundModes
        | IosCapability::InAppPurchase => "<true/>",
    }
}

/// Entitlements plist, or `None` when no capability needs an entitlement.
fn entitlements_file(options: &IosOptions) -> Option<String> {
    let entries: Vec<String> = options
        .capabilities
        .iter()
        .filter_map(|cap| {
            cap.entitlement_key().map(|key| {
                format!(
                    "    <key>{key}</key>\n    {}",
                    entitlement_value(*cap)
                )
            })
        })
        .collect();
    (!entries.is_empty()).then(|| plist(&entries.join("\n")))
}

/// XcodeGen project spec.
fn xcodegen_spec(project: &ProjectSpec, options: &IosOptions, entitlements: Option<&str>) -> String {
    let dir = app_dir(project);
    let quote = |s: &str| serde_json::Value::from(s).to_string();

    let mut settings = vec![
        format!("        PRODUCT_BUNDLE_IDENTIFIER: {}", quote(&options.bundle_id)),
        format!("        MARKETING_VERSION: {}", quote(&project.version)),
        format!("        INFOPLIST_FILE: {}", quote(&format!("{dir}/Info.plist"))),
    ];
    if let Some(team) = &options.team_id {
        settings.push(format!("        DEVELOPMENT_TEAM: {}", quote(team)));
    }
    if let Some(path) = entitlements {
        settings.push(format!("        CODE_SIGN_ENTITLEMENTS: {}", quote(path)));
    }

    format!(
        "name: {name}\noptions:\n  deploymentTarget:\n    iOS: {min}\ntargets:\n  {dir}:\n    type: application\n    platform: iOS\n    sources:\n      - {src}\n    settings:\n      base:\n{settings}\n",
        name = quote(&dir),
        min = quote(&options.min_version),
        src = quote(&dir),
        settings = settings.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Compiler;
    use crate::generators::Generator;
    use capsule_core::{CapsuleInstance, NavigationSpec, NavigationType};
    use indexmap::IndexSet;

    fn generate(instance: &CapsuleInstance) -> String {
        Generator::new(dialect())
            .generate(instance, &ThemeSpec::default())
            .unwrap()
    }

    #[test]
    fn test_button() {
        let code = generate(&CapsuleInstance::new("b", "button").with_prop("label", "Buy \"now\""));
        assert!(code.starts_with("Button(action: {}) {"));
        assert!(code.contains("Text(\"Buy \\\"now\\\"\")"));
        assert!(code.contains(".cornerRadius(8)"));
    }

    #[test]
    fn test_template_props_escaped_as_swift_literal() {
        let mut gen = Generator::new(dialect());
        let defs = vec![capsule_core::CapsuleDefinition::new("promo", "Promo")
            .with_template(Platform::Ios, "VStack {\n{{indent children 4}}\n    Text(\"{{props.label}}\")\n}")];
        gen.register_capsules(&defs).unwrap();
        let tree = CapsuleInstance::new("p", "promo")
            .with_prop("label", "Buy \"now\"\\today")
            .with_child(CapsuleInstance::new("d", "divider"));
        let code = gen.generate(&tree, &ThemeSpec::default()).unwrap();
        assert_eq!(code, "VStack {\n    Divider()\n    Text(\"Buy \\\"now\\\"\\\\today\")\n}");
    }

    #[test]
    fn test_non_finite_height_uses_default() {
        let code = generate(&CapsuleInstance::new("i", "image").with_prop("height", "NaN"));
        assert!(code.contains(".frame(height: 200)"));
    }

    #[test]
    fn test_nested_stack_indentation() {
        let tree = CapsuleInstance::new("root", "stack")
            .with_child(CapsuleInstance::new("t", "text").with_prop("text", "Hi"))
            .with_child(CapsuleInstance::new("d", "divider"));
        let code = generate(&tree);
        assert!(code.starts_with("VStack(alignment: .leading, spacing: 16) {\n    Text(\"Hi\")"));
        assert!(code.contains("\n    Divider()\n}"));
    }

    #[test]
    fn test_unknown_leaf_marker() {
        let code = generate(&CapsuleInstance::new("m", "map-view"));
        assert_eq!(code, "EmptyView() // unsupported capsule: map-view");
    }

    #[test]
    fn test_progress_clamped() {
        let code = generate(&CapsuleInstance::new("p", "progress").with_prop("value", 1.7));
        assert!(code.starts_with("ProgressView(value: 1)"));
    }

    #[test]
    fn test_chart_bars() {
        let code = generate(
            &CapsuleInstance::new("c", "chart").with_prop("data", serde_json::json!([1, 2])),
        );
        assert!(code.contains("height: 60)"));
        assert!(code.contains("height: 120)"));
    }

    #[test]
    fn test_swift_string_escapes() {
        assert_eq!(swift_string("a\\b\"c\nd"), "\"a\\\\b\\\"c\\nd\"");
    }

    fn project() -> ProjectSpec {
        ProjectSpec::new("My Shop", "1.2.0")
            .with_screen(ScreenSpec::new(
                "home",
                "Home",
                CapsuleInstance::new("h", "heading").with_prop("text", "Welcome"),
            ))
            .with_screen(ScreenSpec::new(
                "order-history",
                "Orders",
                CapsuleInstance::new("l", "list").with_prop("items", serde_json::json!(["A"])),
            ))
    }

    #[test]
    fn test_compile_layout() {
        let compiler = SwiftUICompiler::new();
        let result = compiler.compile(&project());
        assert!(result.success, "{:?}", result.errors);
        assert!(result.file("MyShop/Screens/HomeScreen.swift").is_some());
        assert!(result.file("MyShop/Screens/OrderHistoryScreen.swift").is_some());
        assert!(result.file("MyShop/MyShopApp.swift").is_some());
        assert!(result.file("MyShop/Theme/Theme.swift").is_some());
        assert!(result.file("project.yml").is_some());
        assert!(result.file("MyShop/MyShop.entitlements").is_none());

        let yml = &result.file("project.yml").unwrap().content;
        assert!(yml.contains("PRODUCT_BUNDLE_IDENTIFIER: \"com.example.app\""));
        assert!(yml.contains("iOS: \"15.0\""));
    }

    #[test]
    fn test_single_screen_navigation_uses_initial() {
        let mut project = project();
        project.navigation = NavigationSpec {
            nav_type: NavigationType::Stack,
            initial_screen: Some("order-history".to_string()),
        };
        let result = SwiftUICompiler::new().compile(&project);
        let nav = &result.file("MyShop/ContentView.swift").unwrap().content;
        assert!(nav.contains("NavigationView {"));
        assert!(nav.contains("OrderHistoryScreen()"));
        assert!(!nav.contains("HomeScreen()"));
    }

    #[test]
    fn test_tab_navigation_lists_every_screen() {
        let mut project = project();
        project.navigation.nav_type = NavigationType::Tabs;
        let result = SwiftUICompiler::new().compile(&project);
        let nav = &result.file("MyShop/ContentView.swift").unwrap().content;
        assert!(nav.contains("TabView(selection: $selection)"));
        assert!(nav.contains("HomeScreen()"));
        assert!(nav.contains("OrderHistoryScreen()"));
        assert!(nav.contains("@State private var selection = \"home\""));
    }

    #[test]
    fn test_entitlements_for_capabilities() {
        let mut compiler = SwiftUICompiler::new();
        let mut capabilities = IndexSet::new();
        capabilities.insert(IosCapability::PushNotifications);
        compiler
            .configure(PlatformOptions::Ios(IosOptions {
                bundle_id: "com.acme.shop".to_string(),
                team_id: Some("ABCDE12345".to_string()),
                capabilities,
                ..IosOptions::default()
            }))
            .unwrap();

        let result = compiler.compile(&project());
        let ent = &result.file("MyShop/MyShop.entitlements").unwrap().content;
        assert!(ent.contains("aps-environment"));
        let yml = &result.file("project.yml").unwrap().content;
        assert!(yml.contains("DEVELOPMENT_TEAM: \"ABCDE12345\""));
        assert!(yml.contains("CODE_SIGN_ENTITLEMENTS"));
    }
}
