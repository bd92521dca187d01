use std::path::PathBuf;
use twine_cli::cache::TemplateSourceCache;
use twine_cli::config::TwineConfig;
use twine_cli::namespace::NamespaceTable;
use twine_cli::resolver::{forward, referrers_of};
use twine_cli::test_utils::TemplateTree;

use super::{component_library, library_config};

#[test]
fn test_walk_collects_scripts_through_every_reference_kind() {
    let tree = component_library();
    let table = NamespaceTable::from_config(&library_config(&tree));
    let mut cache = TemplateSourceCache::init(&table);

    let walk = forward::walk(&table, &mut cache, &["page.twig"]);

    let scripts: Vec<PathBuf> = walk.scripts.into_iter().collect();
    assert_eq!(
        scripts,
        vec![tree.join("components/card/card.js"), tree.join("components/icon/icon.js")]
    );
    assert!(walk.unresolved.is_empty());
    assert_eq!(
        walk.graph.references_of("page.twig"),
        vec!["layout.twig".to_string(), "@widgets/card/card.twig".to_string()]
    );

    let rendered = walk.graph.to_tree_string("page.twig");
    assert!(rendered.starts_with("page.twig"));
    assert!(rendered.contains("@widgets/icon/icon.twig"));
}

#[test]
fn test_walk_terminates_on_cycles() {
    let tree = TemplateTree::new()
        .file("views/a.twig", "{% include 'b.twig' %}")
        .file("views/a.js", "")
        .file("views/b.twig", "{% include 'a.twig' %}")
        .file("views/b.js", "");
    let mut config = TwineConfig::new(tree.path());
    config.roots = Some(vec!["views".into()]);
    let table = NamespaceTable::from_config(&config);
    let mut cache = TemplateSourceCache::init(&table);

    let walk = forward::walk(&table, &mut cache, &["a.twig"]);
    assert_eq!(walk.scripts.len(), 2);
    assert!(walk.graph.find_cycle().is_some());
}

#[test]
fn test_walk_skips_unresolved_references() {
    let tree = TemplateTree::new()
        .file("views/a.twig", "{% include 'ghost.twig' %}{% include 'b.twig' %}")
        .file("views/b.twig", "b")
        .file("views/b.js", "");
    let mut config = TwineConfig::new(tree.path());
    config.roots = Some(vec!["views".into()]);
    let table = NamespaceTable::from_config(&config);
    let mut cache = TemplateSourceCache::init(&table);

    let walk = forward::walk(&table, &mut cache, &["a.twig"]);
    assert_eq!(walk.unresolved, vec!["ghost.twig".to_string()]);
    assert!(walk.scripts.contains(&tree.join("views/b.js")));
}

#[test]
fn test_reverse_index_is_precise() {
    let tree = component_library();
    let table = NamespaceTable::from_config(&library_config(&tree));

    let referrers = referrers_of(&table, &["@widgets/icon/icon.twig"]);
    assert_eq!(referrers, vec![tree.join("components/card/card.twig")]);

    let icon = tree.join("components/icon/icon.twig");
    let by_path = referrers_of(&table, &[icon.to_str().unwrap()]);
    assert_eq!(by_path, referrers);
}

#[test]
fn test_reverse_index_matches_shorthand_references() {
    let tree = component_library();
    let table = NamespaceTable::from_config(&library_config(&tree));

    let referrers = referrers_of(&table, &["@widgets/card/card.twig"]);
    assert_eq!(referrers, vec![tree.join("templates/page.twig")]);
}

#[test]
fn test_reverse_index_sees_new_references_on_disk() {
    let tree = component_library();
    let table = NamespaceTable::from_config(&library_config(&tree));
    assert!(!referrers_of(&table, &["@widgets/icon/icon.twig"])
        .contains(&tree.join("components/gallery/gallery.twig")));

    tree.write("components/gallery/gallery.twig", "{% include '@widgets/icon/icon' %}");
    assert!(referrers_of(&table, &["@widgets/icon/icon.twig"])
        .contains(&tree.join("components/gallery/gallery.twig")));
}
