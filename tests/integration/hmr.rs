use twine_cli::config::{NamespaceConfig, TwineConfig};
use twine_cli::core::TwineError;
use twine_cli::plugin::{ModuleEntry, TwigPlugin};
use twine_cli::templating::{ComponentLoader, TemplateLoader};
use twine_cli::test_utils::TemplateTree;

use super::{component_library, library_config};

/// `widgets` → `components`, which also serves as the plain root.
fn widgets_plugin(tree: &TemplateTree) -> TwigPlugin {
    let mut config = TwineConfig::new(tree.path());
    config.namespaces = NamespaceConfig::new().with("widgets", &["components"]);
    TwigPlugin::new(&config).unwrap()
}

fn session_loader(plugin: &TwigPlugin) -> ComponentLoader {
    ComponentLoader::from_templates(plugin.cache().template_map(plugin.table()), "twig")
}

#[test]
fn test_load_generates_module_with_reachable_scripts() {
    let tree = component_library();
    let mut plugin = TwigPlugin::new(&library_config(&tree)).unwrap();

    let source = plugin.load("page.twig?t=1").unwrap().unwrap();
    assert!(source.contains("import \"/components/card/card.js\";"));
    assert!(source.contains("import \"/components/icon/icon.js\";"));
    assert!(source.contains("return env.render(\"page.twig\", context);"));
    assert!(source.contains("export default render;"));
    assert_eq!(plugin.modules_for("page.twig"), &["page.twig?t=1".to_string()]);
}

#[test]
fn test_load_ignores_foreign_ids() {
    let tree = component_library();
    let mut plugin = TwigPlugin::new(&library_config(&tree)).unwrap();

    assert_eq!(plugin.resolve_id("main.css"), None);
    assert_eq!(plugin.load("main.css").unwrap(), None);
}

#[test]
fn test_load_of_missing_template_fails() {
    let tree = component_library();
    let mut plugin = TwigPlugin::new(&library_config(&tree)).unwrap();

    assert!(matches!(
        plugin.load("@widgets/nope.twig"),
        Err(TwineError::TemplateNotFound { .. })
    ));
}

#[test]
fn test_editing_a_component_invalidates_its_referrers() {
    let tree = component_library();
    let mut plugin = TwigPlugin::new(&library_config(&tree)).unwrap();
    plugin.load("@widgets/card/card.twig").unwrap();

    let modules = vec![
        ModuleEntry::new("@widgets/card/card.twig", tree.join("components/card/card.twig")),
        ModuleEntry::new("/templates/page.twig", tree.join("templates/page.twig")),
        ModuleEntry::new(
            "@widgets/gallery/gallery.twig",
            tree.join("components/gallery/gallery.twig"),
        ),
        ModuleEntry::virtual_module("virtual:twine-runtime"),
    ];

    tree.write("components/icon/icon.twig", "<svg class=\"v2\"/>");
    let affected = plugin.handle_change(&tree.join("components/icon/icon.twig"), &modules);

    // One hop only: page embeds card, but does not reference icon itself.
    assert_eq!(affected, vec!["@widgets/card/card.twig".to_string()]);
    assert_eq!(
        plugin.cache().get("@widgets/icon/icon.twig").unwrap().content,
        "<svg class=\"v2\"/>"
    );

    let reloaded = plugin.load("@widgets/card/card.twig").unwrap().unwrap();
    assert!(reloaded.contains("<svg class=\\\"v2\\\"/>"));
}

#[test]
fn test_change_to_unknown_file_is_ignored() {
    let tree = component_library();
    let mut plugin = TwigPlugin::new(&library_config(&tree)).unwrap();
    let modules = vec![ModuleEntry::new("/outside.twig", tree.join("outside.twig"))];

    assert!(plugin.handle_change(&tree.join("nowhere/ghost.twig"), &modules).is_empty());
}

#[test]
fn test_cached_sources_render_through_component_loader() {
    let tree = component_library();
    let plugin = TwigPlugin::new(&library_config(&tree)).unwrap();

    let templates = plugin
        .cache()
        .records()
        .into_iter()
        .map(|record| (record.key.as_str().to_string(), record.content.clone()))
        .collect();
    let loader = ComponentLoader::from_templates(templates, "twig");

    let html = loader
        .load("widgets:card", None)
        .unwrap()
        .render(&serde_json::json!({ "title": "Hello" }))
        .unwrap();
    assert_eq!(html, "<article><svg/>Hello</article>");
}

#[test]
fn test_plain_relative_include_renders_and_ships_in_module() {
    let tree = TemplateTree::new()
        .file("components/card.twig", "<div>{% include 'icon.twig' %}</div>")
        .file("components/icon.twig", "<svg/>");
    let mut plugin = widgets_plugin(&tree);

    let source = plugin.load("@widgets/card.twig").unwrap().unwrap();
    assert!(source.contains("\"icon.twig\":\"<svg/>\""));

    let html = session_loader(&plugin)
        .load("@widgets/card.twig", None)
        .unwrap()
        .render(&serde_json::Value::Null)
        .unwrap();
    assert_eq!(html, "<div><svg/></div>");
}

#[test]
fn test_shorthand_include_inside_component_renders() {
    let tree = TemplateTree::new()
        .file("components/card/card.twig", "<div>{% include 'widgets:icon' %}</div>")
        .file("components/icon/icon.twig", "<svg/>");
    let plugin = widgets_plugin(&tree);
    let loader = session_loader(&plugin);

    assert!(loader.load("widgets:icon", None).is_ok());
    let html = loader.load("widgets:card", None).unwrap().render(&serde_json::Value::Null).unwrap();
    assert_eq!(html, "<div><svg/></div>");
}

#[test]
fn test_root_relative_module_id_loads() {
    let tree = component_library();
    let mut plugin = TwigPlugin::new(&library_config(&tree)).unwrap();

    let id = plugin.resolve_id("/components/card/card.twig").unwrap();
    assert!(id.ends_with("/components/card/card.twig"));
    assert_ne!(id, "/components/card/card.twig");

    let source = plugin.load("/components/card/card.twig?t=2").unwrap().unwrap();
    assert!(source.contains("return env.render(\"@widgets/card/card.twig\", context);"));
    assert_eq!(
        plugin.modules_for("@widgets/card/card.twig"),
        &["/components/card/card.twig?t=2".to_string()]
    );
}
