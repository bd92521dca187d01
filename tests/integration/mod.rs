//! Integration test suite for Twine
//!
//! End-to-end scenarios against real template trees on disk: the library
//! pipeline (configuration, resolution, forward walk, reverse index, bundler
//! hooks) and the `twine` binary.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **resolution**: specifier resolution and canonical keys
//! - **dependencies**: forward walk and reverse index
//! - **hmr**: the bundler hooks and hot invalidation
//! - **cli**: the `twine` binary

mod cli;
mod dependencies;
mod hmr;
mod resolution;

use twine_cli::config::{NamespaceConfig, TwineConfig};
use twine_cli::test_utils::TemplateTree;

/// A component library with nested components, sidecar scripts and a page.
///
/// ```text
/// components/card/card.twig    includes @widgets/icon/icon.twig
/// components/card/card.js
/// components/icon/icon.twig
/// components/icon/icon.js
/// components/gallery/gallery.twig
/// templates/page.twig          extends layout.twig, embeds widgets:card
/// templates/layout.twig
/// ```
pub fn component_library() -> TemplateTree {
    twine_cli::test_utils::init_test_logging(None);

    TemplateTree::new()
        .file(
            "components/card/card.twig",
            "<article>{% include '@widgets/icon/icon.twig' %}{{ title }}</article>",
        )
        .file("components/card/card.js", "export const card = true;")
        .file("components/icon/icon.twig", "<svg/>")
        .file("components/icon/icon.js", "export const icon = true;")
        .file("components/gallery/gallery.twig", "<div class=\"gallery\"></div>")
        .file(
            "templates/page.twig",
            "{% extends \"layout.twig\" %}{% block body %}{% embed 'widgets:card' %}{% endembed %}{% endblock %}",
        )
        .file("templates/layout.twig", "<main>{% block body %}{% endblock %}</main>")
}

/// Configuration for [`component_library`]: `widgets` → `components`,
/// plain root `templates`.
pub fn library_config(tree: &TemplateTree) -> TwineConfig {
    let mut config = TwineConfig::new(tree.path());
    config.namespaces = NamespaceConfig::new().with("widgets", &["components"]);
    config.roots = Some(vec!["templates".into()]);
    config
}
