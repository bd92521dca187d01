//! Loader capability contract and the default in-memory loader.
//!
//! A [`TemplateLoader`] is everything the rendering side needs from a source
//! of templates: lookups by name, freshness checks, and `load`, which returns
//! a [`TemplateHandle`] that can render with a JSON context. The loader owns
//! the rendering environment.
//!
//! [`ArrayLoader`] keeps a name → source map and renders with Tera. `load`
//! compiles the requested template together with every template it
//! references (transitively) that the map knows about, so `include` and
//! `extends` between templates work while unrelated templates do not affect
//! the result.
//!
//! Tera only finds templates by exact name. [`TemplateLoader::load_resolving`]
//! maps every nested reference through a resolver and registers the source it
//! finds under the literal reference string, so `{% include 'widgets:icon' %}`
//! renders as long as the resolver knows where `widgets:icon` lives.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tera::{Context as TeraContext, Tera};
use tracing::{debug, trace};

use crate::core::TwineError;

use super::references::{ReferenceKind, extract_kind};

/// A template's source as returned by [`TemplateLoader::get_source`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    /// Raw template text
    pub code: String,
    /// Path or key the template was found under
    pub path: String,
    /// Name the template is registered as
    pub name: String,
}

/// A loaded, ready-to-render template.
pub trait TemplateHandle: Send + Sync {
    /// The name the template was loaded under.
    fn name(&self) -> &str;

    /// Renders the template.
    ///
    /// `context` must be a JSON object or `null`.
    ///
    /// # Errors
    ///
    /// [`TwineError::InvalidContext`] for a non-object context and
    /// [`TwineError::RenderFailed`] for engine errors.
    fn render(&self, context: &serde_json::Value) -> Result<String, TwineError>;
}

/// Capability contract of a template loader.
pub trait TemplateLoader {
    /// Source code, path and name of a template.
    ///
    /// # Errors
    ///
    /// Fails when the loader does not know the name.
    fn get_source(&self, name: &str) -> Result<TemplateSource, TwineError>;

    /// Raw source text of a template.
    ///
    /// # Errors
    ///
    /// Fails when the loader does not know the name.
    fn get_source_context(&self, name: &str) -> Result<String, TwineError>;

    /// Key under which compiled output of `name` may be cached.
    ///
    /// # Errors
    ///
    /// Fails when the loader does not know the name.
    fn get_cache_key(&self, name: &str) -> Result<String, TwineError>;

    /// Whether the loader knows `name`.
    fn exists(&self, name: &str) -> bool;

    /// Whether `name` is unchanged since `timestamp`.
    fn is_fresh(&self, name: &str, timestamp: DateTime<Utc>) -> bool;

    /// Compiles `name` and returns a renderable handle.
    ///
    /// `path` is the location the template was requested from, if any.
    ///
    /// # Errors
    ///
    /// Fails when the name is unknown or the engine rejects the template.
    fn load(&self, name: &str, path: Option<&str>) -> Result<Box<dyn TemplateHandle>, TwineError>;

    /// Like [`load`](Self::load), but every nested reference is passed
    /// through `resolve` first.
    ///
    /// `resolve` maps a reference as written in a template to the name it is
    /// stored under, or `None` if it is unknown. Loaders without nested
    /// lookups ignore it.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    fn load_resolving(
        &self,
        name: &str,
        path: Option<&str>,
        resolve: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Box<dyn TemplateHandle>, TwineError> {
        let _ = resolve;
        self.load(name, path)
    }

    /// Adds or replaces several templates at once.
    fn add_templates(&mut self, templates: BTreeMap<String, String>);

    /// Adds or replaces a single template.
    fn set_template(&mut self, name: &str, source: &str);
}

/// In-memory loader backed by a name → source map.
#[derive(Debug, Clone, Default)]
pub struct ArrayLoader {
    templates: BTreeMap<String, String>,
    updated_at: HashMap<String, DateTime<Utc>>,
}

impl ArrayLoader {
    /// Creates a loader over `templates`, all stamped with the current time.
    #[must_use]
    pub fn new(templates: BTreeMap<String, String>) -> Self {
        let mut loader = Self::default();
        loader.add_templates(templates);
        loader
    }

    /// Template names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    fn missing(name: &str) -> TwineError {
        TwineError::TemplateMissing {
            name: name.to_string(),
        }
    }

    /// Engine names to register for `name`: the template itself plus every
    /// reference reachable from it, transitively, mapped to its stored name.
    ///
    /// A reference is registered under its literal text, and the stored name
    /// is registered as well so canonical references keep working.
    fn closure_of(
        &self,
        name: &str,
        resolve: &dyn Fn(&str) -> Option<String>,
    ) -> BTreeMap<String, String> {
        let mut registered = BTreeMap::new();
        let mut visited = BTreeSet::new();
        let mut stack = vec![name.to_string()];
        registered.insert(name.to_string(), name.to_string());

        while let Some(current) = stack.pop() {
            let Some(source) = self.templates.get(&current) else {
                continue;
            };
            if !visited.insert(current) {
                continue;
            }

            for kind in ReferenceKind::ALL {
                for reference in extract_kind(source, kind) {
                    let Some(stored) =
                        resolve(&reference).filter(|stored| self.templates.contains_key(stored))
                    else {
                        trace!("Leaving unknown reference {reference} to the engine");
                        continue;
                    };

                    registered.entry(stored.clone()).or_insert_with(|| stored.clone());
                    registered.entry(reference).or_insert_with(|| stored.clone());
                    if !visited.contains(&stored) {
                        stack.push(stored);
                    }
                }
            }
        }

        registered
    }
}

impl TemplateLoader for ArrayLoader {
    fn get_source(&self, name: &str) -> Result<TemplateSource, TwineError> {
        let code = self.get_source_context(name)?;
        Ok(TemplateSource {
            code,
            path: name.to_string(),
            name: name.to_string(),
        })
    }

    fn get_source_context(&self, name: &str) -> Result<String, TwineError> {
        self.templates.get(name).cloned().ok_or_else(|| Self::missing(name))
    }

    fn get_cache_key(&self, name: &str) -> Result<String, TwineError> {
        if self.templates.contains_key(name) {
            Ok(name.to_string())
        } else {
            Err(Self::missing(name))
        }
    }

    fn exists(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    fn is_fresh(&self, name: &str, timestamp: DateTime<Utc>) -> bool {
        self.updated_at.get(name).is_some_and(|updated| *updated <= timestamp)
    }

    fn load(&self, name: &str, path: Option<&str>) -> Result<Box<dyn TemplateHandle>, TwineError> {
        self.load_resolving(name, path, &|reference: &str| {
            self.templates.contains_key(reference).then(|| reference.to_string())
        })
    }

    fn load_resolving(
        &self,
        name: &str,
        _path: Option<&str>,
        resolve: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Box<dyn TemplateHandle>, TwineError> {
        if !self.exists(name) {
            return Err(Self::missing(name));
        }

        let names = self.closure_of(name, resolve);
        debug!("Compiling {name} with {} template name(s)", names.len());

        let mut tera = Tera::default();
        tera.add_raw_templates(names.iter().filter_map(|(registered, stored)| {
            self.templates.get(stored).map(|src| (registered.as_str(), src.as_str()))
        }))
        .map_err(|e| TwineError::TemplateLoadFailed {
            name: name.to_string(),
            reason: format_tera_error(&e),
        })?;

        Ok(Box::new(TeraTemplate {
            tera,
            name: name.to_string(),
        }))
    }

    fn add_templates(&mut self, templates: BTreeMap<String, String>) {
        let now = Utc::now();
        for (name, source) in templates {
            self.updated_at.insert(name.clone(), now);
            self.templates.insert(name, source);
        }
    }

    fn set_template(&mut self, name: &str, source: &str) {
        trace!("Setting template {name}");
        self.updated_at.insert(name.to_string(), Utc::now());
        self.templates.insert(name.to_string(), source.to_string());
    }
}

/// A compiled Tera template set with one entry point.
struct TeraTemplate {
    tera: Tera,
    name: String,
}

impl TemplateHandle for TeraTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, context: &serde_json::Value) -> Result<String, TwineError> {
        let context = match context {
            serde_json::Value::Null => TeraContext::new(),
            value => TeraContext::from_value(value.clone()).map_err(|e| {
                TwineError::InvalidContext {
                    reason: e.to_string(),
                }
            })?,
        };

        self.tera.render(&self.name, &context).map_err(|e| TwineError::RenderFailed {
            name: self.name.clone(),
            reason: format_tera_error(&e),
        })
    }
}

/// Flattens a Tera error and its causes into one line per message.
#[must_use]
pub fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut messages = vec![error.to_string()];
    let mut current: Option<&dyn Error> = error.source();
    while let Some(err) = current {
        messages.push(err.to_string());
        current = err.source();
    }

    messages.retain(|m| !m.trim().is_empty());
    messages.dedup();
    messages.join("\n  → ")
}
