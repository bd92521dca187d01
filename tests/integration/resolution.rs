use twine_cli::cache::TemplateSourceCache;
use twine_cli::config::{NamespaceConfig, TwineConfig};
use twine_cli::core::TwineError;
use twine_cli::namespace::NamespaceTable;
use twine_cli::resolver::TemplateResolver;
use twine_cli::test_utils::TemplateTree;

use super::{component_library, library_config};

fn session(config: &TwineConfig) -> (NamespaceTable, TemplateSourceCache) {
    let table = NamespaceTable::from_config(config);
    let cache = TemplateSourceCache::init(&table);
    (table, cache)
}

#[test]
fn test_every_specifier_form_reaches_the_same_key() {
    let tree = component_library();
    let (table, mut cache) = session(&library_config(&tree));
    let resolver = TemplateResolver::new(&table);

    let absolute = tree.join("components/card/card.twig");
    let forms = [
        "@widgets/card/card.twig",
        "@widgets/card/card",
        "widgets:card",
        "card/card.twig",
        absolute.to_str().unwrap(),
    ];

    for form in forms {
        let template = resolver.resolve(&mut cache, form).unwrap();
        assert_eq!(template.key.as_str(), "@widgets/card/card.twig", "specifier {form}");
        assert_eq!(template.source_path(), Some(absolute.as_path()));
    }
}

#[test]
fn test_namespace_fallback_across_roots() {
    let tree = TemplateTree::new()
        .file("dir_a/other.twig", "a")
        .file("dir_b/button.twig", "from b");
    let mut config = TwineConfig::new(tree.path());
    config.namespaces = NamespaceConfig::new().with("widgets", &["dir_a", "dir_b"]);
    let (table, mut cache) = session(&config);

    let template =
        TemplateResolver::new(&table).resolve(&mut cache, "@widgets/button.twig").unwrap();
    assert_eq!(template.content, "from b");
}

#[test]
fn test_nested_namespaces_share_one_key() {
    let tree = TemplateTree::new().file("tests/jabba/x.twig", "x");
    let mut config = TwineConfig::new(tree.path());
    config.namespaces =
        NamespaceConfig::new().with("tests", &["tests"]).with("jabba", &["tests/jabba"]);
    let (table, mut cache) = session(&config);
    let resolver = TemplateResolver::new(&table);

    let via_outer = resolver.resolve(&mut cache, "@tests/jabba/x.twig").unwrap();
    let via_inner = resolver.resolve(&mut cache, "@jabba/x.twig").unwrap();
    assert_eq!(via_outer.key, via_inner.key);
    assert_eq!(via_inner.key.as_str(), "@jabba/x.twig");
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_resolution_is_idempotent() {
    let tree = component_library();
    let (table, mut cache) = session(&library_config(&tree));
    let resolver = TemplateResolver::new(&table);

    let first = resolver.resolve(&mut cache, "page").unwrap();
    let second = resolver.resolve(&mut cache, "page").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.key.as_str(), "page.twig");
}

#[test]
fn test_compound_extension_probe() {
    let tree = TemplateTree::new().file("templates/mail.html.twig", "<html/>");
    let mut config = TwineConfig::new(tree.path());
    config.roots = Some(vec!["templates".into()]);
    let (table, mut cache) = session(&config);

    let template = TemplateResolver::new(&table).resolve(&mut cache, "mail").unwrap();
    assert_eq!(template.key.as_str(), "mail.html.twig");
}

#[test]
fn test_not_found_reports_context() {
    let tree = component_library();
    let (table, mut cache) = session(&library_config(&tree));

    let err = TemplateResolver::new(&table)
        .resolve_required(&mut cache, "@widgets/card/crad.twig")
        .unwrap_err();

    match err {
        TwineError::TemplateNotFound {
            specifier,
            namespaces,
            known_keys,
            ..
        } => {
            assert_eq!(specifier, "@widgets/card/crad.twig");
            assert_eq!(namespaces[0].0, "widgets");
            assert!(known_keys.contains(&"@widgets/card/card.twig".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_config_file_drives_resolution() {
    let tree = TemplateTree::new()
        .file(
            "twine.toml",
            "roots = [\"templates\"]\n\n[namespaces]\nwidgets = [\"components/a\", \"components/b\"]\nlayout = \"layouts\"\n",
        )
        .file("components/b/button.twig", "button")
        .file("layouts/base.twig", "base")
        .file("templates/home.twig", "home");

    let config = TwineConfig::load(&tree.join("twine.toml")).unwrap();
    let ids: Vec<&str> = config.namespaces.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["widgets", "layout"]);

    let (table, mut cache) = session(&config);
    let resolver = TemplateResolver::new(&table);
    assert_eq!(resolver.resolve(&mut cache, "@widgets/button.twig").unwrap().content, "button");
    assert_eq!(resolver.resolve(&mut cache, "@layout/base").unwrap().content, "base");
    assert_eq!(resolver.resolve(&mut cache, "home.twig").unwrap().key.as_str(), "home.twig");
}
