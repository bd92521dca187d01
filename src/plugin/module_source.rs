//! Generated JavaScript module for a template import.
//!
//! Each template import becomes a self-contained module:
//!
//! ```js
//! import "/components/icon/icon.js";
//! import { createEnvironment } from "twing";
//! import createComponentLoader from "twine/runtime/component-loader";
//!
//! const templates = {"@widgets/card.twig":"...","card.twig":"...","@widgets/icon/icon.twig":"..."};
//! const namespaces = {"widgets":["/project/components"]};
//!
//! const loader = createComponentLoader(templates, namespaces);
//! const env = createEnvironment(loader);
//!
//! export function render(context = {}) {
//!   return env.render("@widgets/card.twig", context);
//! }
//!
//! export default render;
//! ```
//!
//! The template table carries canonical keys and the plain-relative aliases
//! from [`TemplateSourceCache::template_map`](crate::cache::TemplateSourceCache::template_map),
//! so a bare `{% include 'card.twig' %}` finds its template at runtime too.
//!
//! # Runtime loader
//!
//! This crate does not ship JavaScript. The generated module imports the
//! template engine from `twing` and a loader factory from the `runtime_loader`
//! module set in `twine.toml` (default
//! [`RUNTIME_LOADER_MODULE`](crate::constants::RUNTIME_LOADER_MODULE)). The
//! host project provides that module, usually through a bundler alias. Its
//! default export is called as `createComponentLoader(templates, namespaces)`
//! and must return a Twing loader that resolves names the way
//! [`ComponentLoader`](crate::templating::ComponentLoader) does.
//!
//! Every string that lands in the output goes through `serde_json`, so
//! template text with quotes, backslashes or `</script>` sequences cannot
//! break out of its literal.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::constants::ENGINE_MODULE;
use crate::core::TemplateKey;
use crate::utils::platform::normalize_path_for_storage;

/// Everything needed to generate one module.
#[derive(Debug)]
pub struct ModuleSource<'a> {
    /// Key the module's `render` export is bound to
    pub key: &'a TemplateKey,
    /// Sidecar scripts to import for their side effects
    pub scripts: &'a BTreeSet<PathBuf>,
    /// Template sources embedded in the module, by loader name
    pub templates: &'a BTreeMap<String, String>,
    /// Namespace table in display form
    pub namespaces: Vec<(String, Vec<String>)>,
    /// Project root; scripts below it are imported root-relative
    pub base_dir: &'a Path,
    /// Module whose default export builds the runtime loader
    pub runtime_loader: &'a str,
}

impl ModuleSource<'_> {
    /// Renders the module text.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut out = String::new();

        for script in self.scripts {
            out.push_str(&format!("import {};\n", json_string(&self.import_path(script))));
        }
        out.push_str(&format!("import {{ createEnvironment }} from {};\n", json_string(ENGINE_MODULE)));
        out.push_str(&format!(
            "import createComponentLoader from {};\n",
            json_string(self.runtime_loader)
        ));
        out.push('\n');

        let templates: Map<String, Value> = self
            .templates
            .iter()
            .map(|(name, source)| (name.clone(), Value::String(source.clone())))
            .collect();
        let namespaces: Map<String, Value> = self
            .namespaces
            .iter()
            .map(|(id, dirs)| {
                (id.clone(), Value::Array(dirs.iter().cloned().map(Value::String).collect()))
            })
            .collect();

        out.push_str(&format!("const templates = {};\n", json_literal(&Value::Object(templates))));
        out.push_str(&format!("const namespaces = {};\n", json_literal(&Value::Object(namespaces))));
        out.push('\n');
        out.push_str("const loader = createComponentLoader(templates, namespaces);\n");
        out.push_str("const env = createEnvironment(loader);\n\n");
        out.push_str("export function render(context = {}) {\n");
        out.push_str(&format!("  return env.render({}, context);\n", json_string(self.key.as_str())));
        out.push_str("}\n\nexport default render;\n");

        out
    }

    /// `/relative/path` for scripts under the project root, else the
    /// absolute path in forward-slash form.
    fn import_path(&self, script: &Path) -> String {
        match script.strip_prefix(self.base_dir) {
            Ok(relative) => format!("/{}", normalize_path_for_storage(relative)),
            Err(_) => normalize_path_for_storage(script),
        }
    }
}

/// A JSON (and therefore JavaScript) string literal, with `</` escaped so
/// the module can be inlined in HTML.
fn json_string(value: &str) -> String {
    json_literal(&Value::String(value.to_string()))
}

fn json_literal(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}
