use assert_cmd::Command;
use predicates::prelude::*;
use twine_cli::test_utils::TemplateTree;

use super::component_library;

fn twine(tree: &TemplateTree) -> Command {
    let mut cmd = Command::cargo_bin("twine").unwrap();
    cmd.env_remove("TWINE_CONFIG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .current_dir(tree.path())
        .arg("--quiet")
        .arg("--base-dir")
        .arg(tree.path())
        .args(["--namespace", "widgets=components"]);
    cmd
}

#[test]
fn test_resolve_prints_canonical_key() {
    let tree = component_library();

    twine(&tree)
        .args(["resolve", "widgets:card"])
        .assert()
        .success()
        .stdout(predicate::str::contains("@widgets/card/card.twig"))
        .stdout(predicate::str::contains("components/card/card.twig"));
}

#[test]
fn test_resolve_with_content() {
    let tree = component_library();

    twine(&tree)
        .args(["resolve", "@widgets/icon/icon", "--content"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<svg/>"));
}

#[test]
fn test_resolve_missing_template_suggests_keys() {
    let tree = component_library();

    twine(&tree)
        .args(["resolve", "@widgets/card/crad.twig"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot find template: @widgets/card/crad.twig"))
        .stderr(predicate::str::contains("@widgets/card/card.twig"));
}

#[test]
fn test_deps_lists_scripts_and_tree() {
    let tree = component_library();

    twine(&tree)
        .args(["deps", "@widgets/card/card.twig", "--tree"])
        .assert()
        .success()
        .stdout(predicate::str::contains("└── @widgets/icon/icon.twig"))
        .stdout(predicate::str::contains("components/card/card.js"))
        .stdout(predicate::str::contains("components/icon/icon.js"));
}

#[test]
fn test_refs_accepts_relative_file_path() {
    let tree = component_library();

    twine(&tree)
        .args(["refs", "components/icon/icon.twig"])
        .assert()
        .success()
        .stdout(predicate::str::contains("components/card/card.twig"))
        .stdout(predicate::str::contains("gallery").not());
}

#[test]
fn test_list_filters_by_namespace() {
    let tree = component_library().file("twine.toml", "roots = [\"templates\"]\n");

    twine(&tree)
        .args(["list", "widgets"])
        .assert()
        .success()
        .stdout(predicate::str::contains("@widgets/gallery/gallery.twig"))
        .stdout(predicate::str::contains("page.twig").not())
        .stdout(predicate::str::contains("3 template(s)"));

    twine(&tree).args(["list", "nope"]).assert().failure();
}

#[test]
fn test_module_prints_generated_source() {
    let tree = component_library();

    twine(&tree)
        .args(["module", "@widgets/card/card.twig?raw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("import \"/components/icon/icon.js\";"))
        .stdout(predicate::str::contains("export default render;"));

    twine(&tree).args(["module", "style.css"]).assert().failure();
}

#[test]
fn test_render_injects_component_metadata() {
    let tree = component_library()
        .file("components/badge/badge.twig", "{{ _sdc.componentName }}:{{ label }}");

    twine(&tree)
        .args(["render", "widgets:badge", "--context", r#"{"label":"new"}"#])
        .assert()
        .success()
        .stdout("badge:new");
}

#[test]
fn test_render_resolves_nested_shorthand_include() {
    let tree = component_library()
        .file("components/panel/panel.twig", "[{% include 'widgets:icon' %}{% include 'gallery/gallery.twig' %}]");

    twine(&tree)
        .args(["render", "widgets:panel"])
        .assert()
        .success()
        .stdout("[<svg/><div class=\"gallery\"></div>]");
}

#[test]
fn test_render_rejects_invalid_context() {
    let tree = component_library();

    twine(&tree)
        .args(["render", "widgets:card", "--context", "not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--context is not valid JSON"));
}

#[test]
fn test_invalid_namespace_flag() {
    let tree = component_library();

    twine(&tree)
        .args(["--namespace", "broken", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected ID=DIR"));
}
