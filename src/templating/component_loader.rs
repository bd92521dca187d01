//! Namespace-aware loader adapter for components.
//!
//! [`ComponentLoader`] wraps any [`TemplateLoader`] and adds two things:
//!
//! 1. **Name resolution** for `@namespace/…` and `namespace:component` names.
//!    Plain names go straight to the base loader. Other names are looked up in
//!    the adapter's own template map: exact key, then extension probes, then
//!    the shorthand path `@ns/comp/comp.<ext>`, then the first key (in sorted
//!    order) under `@ns/` whose file name is `comp.<ext>`. The same rules
//!    apply to references nested inside a loaded template, where a plain name
//!    the map does not hold may also match `@<any ns>/<name>`.
//! 2. **Component metadata** for names that look like component references
//!    (they contain `@` or `/`). The handle returned by `load` merges an
//!    `_sdc` object into every render context:
//!
//! ```json
//! { "_sdc": { "componentName": "button", "isSDC": true, "loadedAt": "2024-05-01T12:00:00+00:00" } }
//! ```

use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

use crate::constants::COMPONENT_META_KEY;
use crate::core::TwineError;
use crate::resolver::Specifier;
use crate::resolver::specifier::extension_candidates;

use super::loader::{ArrayLoader, TemplateHandle, TemplateLoader, TemplateSource};

/// Loader adapter adding namespace resolution and component metadata.
#[derive(Debug, Clone)]
pub struct ComponentLoader<L = ArrayLoader> {
    base: L,
    templates: BTreeMap<String, String>,
    template_extension: String,
}

impl ComponentLoader<ArrayLoader> {
    /// Adapter over an [`ArrayLoader`] holding the same templates.
    #[must_use]
    pub fn from_templates(templates: BTreeMap<String, String>, template_extension: &str) -> Self {
        Self::new(ArrayLoader::new(templates.clone()), templates, template_extension)
    }
}

impl<L: TemplateLoader> ComponentLoader<L> {
    /// Wraps `base`; `templates` is the map used for namespaced lookups.
    pub fn new(base: L, templates: BTreeMap<String, String>, template_extension: &str) -> Self {
        Self {
            base,
            templates,
            template_extension: template_extension.to_string(),
        }
    }

    /// The wrapped loader.
    pub fn base(&self) -> &L {
        &self.base
    }

    /// Maps a requested name to the key the template is stored under.
    ///
    /// # Errors
    ///
    /// [`TwineError::ComponentNotFound`] for an unknown `namespace:component`
    /// and [`TwineError::TemplateMissing`] for other unknown names.
    pub fn resolve_name(&self, name: &str) -> Result<String, TwineError> {
        if !name.contains('@') && !name.contains(':') {
            return Ok(name.to_string());
        }

        if self.templates.contains_key(name) {
            return Ok(name.to_string());
        }

        if let Some(key) = extension_candidates(name, &self.template_extension)
            .into_iter()
            .find(|candidate| self.templates.contains_key(candidate))
        {
            return Ok(key);
        }

        match Specifier::parse(name) {
            Specifier::Shorthand {
                namespace,
                component,
            } => self.find_component(namespace, component).ok_or_else(|| {
                TwineError::ComponentNotFound {
                    namespace: namespace.to_string(),
                    component: component.to_string(),
                }
            }),
            _ => Err(TwineError::TemplateMissing {
                name: name.to_string(),
            }),
        }
    }

    /// Stored name for a reference inside a loaded template.
    fn resolve_nested(&self, reference: &str) -> Option<String> {
        if let Ok(key) = self.resolve_name(reference)
            && self.templates.contains_key(&key)
        {
            return Some(key);
        }

        if reference.contains('@') || reference.contains(':') {
            return None;
        }

        let candidates = extension_candidates(reference, &self.template_extension);
        if let Some(found) =
            candidates.iter().find(|candidate| self.templates.contains_key(candidate.as_str()))
        {
            return Some(found.clone());
        }

        self.templates
            .keys()
            .find(|key| {
                key.starts_with('@')
                    && key.split_once('/').is_some_and(|(_, relative)| {
                        candidates.iter().any(|candidate| candidate == relative)
                    })
            })
            .cloned()
    }

    fn find_component(&self, namespace: &str, component: &str) -> Option<String> {
        let canonical =
            format!("@{namespace}/{component}/{component}.{}", self.template_extension);
        if self.templates.contains_key(&canonical) {
            return Some(canonical);
        }

        let prefix = format!("@{namespace}/");
        let file_name = format!("/{component}.{}", self.template_extension);
        self.templates
            .keys()
            .find(|key| key.starts_with(&prefix) && key.ends_with(&file_name))
            .cloned()
    }

    fn is_component(name: &str) -> bool {
        name.contains('@') || name.contains('/')
    }

    fn component_name(&self, name: &str) -> String {
        let base = name.rsplit('/').next().unwrap_or(name);
        base.strip_suffix(&format!(".{}", self.template_extension)).unwrap_or(base).to_string()
    }
}

impl<L: TemplateLoader> TemplateLoader for ComponentLoader<L> {
    fn get_source(&self, name: &str) -> Result<TemplateSource, TwineError> {
        trace!("Getting source for: {name}");

        if !name.contains('@') && !name.contains(':') {
            return self.base.get_source(name);
        }

        let key = self.resolve_name(name)?;
        let code = self.templates.get(&key).cloned().ok_or_else(|| TwineError::TemplateMissing {
            name: name.to_string(),
        })?;
        Ok(TemplateSource {
            code,
            path: key.clone(),
            name: key,
        })
    }

    fn get_source_context(&self, name: &str) -> Result<String, TwineError> {
        self.base.get_source_context(&self.resolve_name(name)?)
    }

    fn get_cache_key(&self, name: &str) -> Result<String, TwineError> {
        self.base.get_cache_key(&self.resolve_name(name)?)
    }

    fn exists(&self, name: &str) -> bool {
        let exists = self.resolve_name(name).is_ok_and(|key| self.base.exists(&key));
        if !exists {
            warn!("Template not found: {name}");
        }
        exists
    }

    fn is_fresh(&self, name: &str, timestamp: DateTime<Utc>) -> bool {
        self.resolve_name(name).is_ok_and(|key| self.base.is_fresh(&key, timestamp))
    }

    fn load(&self, name: &str, path: Option<&str>) -> Result<Box<dyn TemplateHandle>, TwineError> {
        let key = self.resolve_name(name)?;
        let handle =
            self.base.load_resolving(&key, path, &|reference: &str| self.resolve_nested(reference))?;

        if !Self::is_component(name) {
            return Ok(handle);
        }

        let component_name = self.component_name(name);
        debug!("Loaded component {component_name} from {key}");
        Ok(Box::new(ComponentTemplate {
            inner: handle,
            meta: json!({
                "componentName": component_name,
                "isSDC": true,
                "loadedAt": Utc::now().to_rfc3339(),
            }),
        }))
    }

    fn add_templates(&mut self, templates: BTreeMap<String, String>) {
        self.templates.extend(templates.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.base.add_templates(templates);
    }

    fn set_template(&mut self, name: &str, source: &str) {
        self.templates.insert(name.to_string(), source.to_string());
        self.base.set_template(name, source);
    }
}

/// Handle that injects component metadata into every render.
struct ComponentTemplate {
    inner: Box<dyn TemplateHandle>,
    meta: Value,
}

impl TemplateHandle for ComponentTemplate {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn render(&self, context: &Value) -> Result<String, TwineError> {
        let mut merged = match context {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            other => {
                return Err(TwineError::InvalidContext {
                    reason: format!("expected a JSON object, got {other}"),
                });
            }
        };
        merged.insert(COMPONENT_META_KEY.to_string(), self.meta.clone());

        self.inner.render(&Value::Object(merged))
    }
}
