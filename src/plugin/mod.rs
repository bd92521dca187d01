//! Bundler plugin session.
//!
//! [`TwigPlugin`] owns one [`NamespaceTable`] and one [`TemplateSourceCache`]
//! for the lifetime of a bundler session and exposes the three hooks a
//! bundler drives:
//!
//! - [`resolve_id`](TwigPlugin::resolve_id) claims template imports
//! - [`load`](TwigPlugin::load) turns a template import into JavaScript
//! - [`handle_change`](TwigPlugin::handle_change) maps a changed file to the
//!   modules that must be reloaded
//!
//! All cache mutation happens through `&mut self`, so there is exactly one
//! writer and no locking.
//!
//! # Module ids
//!
//! Bundlers hand out root-relative ids such as `/components/card.twig`. An id
//! with a leading `/` that names no file on disk is rebased onto the project
//! root when that yields a file, so it resolves like the absolute path it
//! stands for. [`resolve_id`](TwigPlugin::resolve_id) returns the rebased id.
//!
//! # Hot invalidation
//!
//! When a template changes, the plugin re-reads it, overwrites every cached
//! record backed by that file, asks the
//! [reverse index](crate::resolver::referrers_of) for direct referrers and
//! returns the affected module ids: modules backed by the changed file or a
//! referrer, plus every id previously loaded for the changed template's key.

pub mod module_source;

pub use module_source::ModuleSource;

use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::cache::TemplateSourceCache;
use crate::config::TwineConfig;
use crate::core::{ResolvedTemplate, TemplateKey, TwineError};
use crate::namespace::NamespaceTable;
use crate::resolver::{self, ForwardWalk, TemplateResolver, collect_component_scripts};
use crate::utils::fs::{has_extension, read_template};
use crate::utils::platform::{absolutize, normalize_path_for_storage};

/// A bundler module as seen by the change hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    /// Module id as the bundler knows it (may carry a query)
    pub id: String,
    /// Backing file, if the module has one
    pub file: Option<PathBuf>,
}

impl ModuleEntry {
    /// A module backed by `file`.
    pub fn new(id: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            file: Some(file.into()),
        }
    }

    /// A virtual module without a backing file.
    pub fn virtual_module(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            file: None,
        }
    }
}

/// One bundler session: namespace table, source cache and HMR bookkeeping.
#[derive(Debug)]
pub struct TwigPlugin {
    table: NamespaceTable,
    cache: TemplateSourceCache,
    include: Regex,
    runtime_loader: String,
    /// Module ids loaded per canonical key, in first-load order
    loaded: HashMap<TemplateKey, Vec<String>>,
}

impl TwigPlugin {
    /// Builds the namespace table and scans every root into the cache.
    ///
    /// # Errors
    ///
    /// [`TwineError::InvalidIncludePattern`] if the include pattern does not
    /// compile.
    pub fn new(config: &TwineConfig) -> Result<Self, TwineError> {
        let include = config.include_regex()?;
        let table = NamespaceTable::from_config(config);
        let cache = TemplateSourceCache::init(&table);

        Ok(Self {
            table,
            cache,
            include,
            runtime_loader: config.runtime_loader.clone(),
            loaded: HashMap::new(),
        })
    }

    /// The session's namespace table.
    #[must_use]
    pub fn table(&self) -> &NamespaceTable {
        &self.table
    }

    /// The session's source cache.
    #[must_use]
    pub fn cache(&self) -> &TemplateSourceCache {
        &self.cache
    }

    /// Module ids loaded for `key`, in first-load order.
    #[must_use]
    pub fn modules_for(&self, key: &str) -> &[String] {
        self.loaded.get(&TemplateKey::from(key)).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolves `specifier` against the session's table and cache.
    ///
    /// # Errors
    ///
    /// [`TwineError::TemplateNotFound`] when no strategy resolves it.
    pub fn resolve(&mut self, specifier: &str) -> Result<ResolvedTemplate, TwineError> {
        TemplateResolver::new(&self.table).resolve_required(&mut self.cache, specifier)
    }

    /// Forward walk from `starts`.
    pub fn walk<S: AsRef<str>>(&mut self, starts: &[S]) -> ForwardWalk {
        resolver::forward::walk(&self.table, &mut self.cache, starts)
    }

    /// Files that directly reference any of `targets`.
    #[must_use]
    pub fn referrers_of<S: AsRef<str>>(&self, targets: &[S]) -> Vec<PathBuf> {
        resolver::referrers_of(&self.table, targets)
    }

    /// Claims `specifier` if it matches the include pattern and returns its
    /// canonical id.
    #[must_use]
    pub fn resolve_id(&self, specifier: &str) -> Option<String> {
        self.include.is_match(specifier).then(|| self.canonical_id(specifier))
    }

    /// Rebases a root-relative id onto the project root; see the module docs.
    ///
    /// The query string, if any, is kept.
    fn canonical_id(&self, id: &str) -> String {
        let (path, query) = match id.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (id, None),
        };
        if !path.starts_with('/') || Path::new(path).is_file() {
            return id.to_string();
        }

        let rebased = absolutize(self.table.base_dir(), Path::new(path.trim_start_matches('/')));
        if !rebased.is_file() {
            return id.to_string();
        }

        let mut canonical = normalize_path_for_storage(&rebased);
        if let Some(query) = query {
            canonical.push('?');
            canonical.push_str(query);
        }
        debug!("Rebased module id {id} to {canonical}");
        canonical
    }

    /// Generates the JavaScript module for a template import.
    ///
    /// Returns `Ok(None)` for ids this plugin does not handle. The query
    /// string, if any, is ignored for resolution but the full id is recorded
    /// for hot invalidation.
    ///
    /// # Errors
    ///
    /// [`TwineError::TemplateNotFound`] when no strategy resolves the id.
    pub fn load(&mut self, id: &str) -> Result<Option<String>, TwineError> {
        let clean = id.split('?').next().unwrap_or(id);
        if !self.include.is_match(clean) {
            return Ok(None);
        }

        info!("Resolving template: {clean}");
        let specifier = self.canonical_id(clean);
        let template = self.resolve(&specifier).map_err(|err| {
            warn!("{err}");
            // Report the id as requested, not the rebased path.
            match err {
                TwineError::TemplateNotFound {
                    roots,
                    namespaces,
                    known_keys,
                    ..
                } => TwineError::TemplateNotFound {
                    specifier: clean.to_string(),
                    roots,
                    namespaces,
                    known_keys,
                },
                other => other,
            }
        })?;

        let ids = self.loaded.entry(template.key.clone()).or_default();
        if !ids.iter().any(|known| known == id) {
            ids.push(id.to_string());
        }

        let scripts = collect_component_scripts(&self.table, &mut self.cache, &[template.key.as_str()]);
        debug!("{} imports {} component script(s)", template.key, scripts.len());

        let templates = self.cache.template_map(&self.table);
        let source = ModuleSource {
            key: &template.key,
            scripts: &scripts,
            templates: &templates,
            namespaces: self.table.describe_namespaces(),
            base_dir: self.table.base_dir(),
            runtime_loader: &self.runtime_loader,
        }
        .generate();

        Ok(Some(source))
    }

    /// Maps a changed file to the module ids that must be reloaded.
    ///
    /// The changed file is always re-read from disk, never served from the
    /// cache. Non-template files yield an empty list, and so does a file that
    /// cannot be read (the problem is logged); this hook never fails.
    pub fn handle_change(&mut self, file: &Path, modules: &[ModuleEntry]) -> Vec<String> {
        if !has_extension(file, self.table.template_extension()) {
            return Vec::new();
        }

        info!("Processing template change: {}", file.display());
        let file = absolutize(self.table.base_dir(), file);
        let specifier = normalize_path_for_storage(&file);

        let content = match read_template(&file) {
            Ok(content) => content,
            Err(err) => {
                warn!("Could not read changed template: {err:#}");
                return Vec::new();
            }
        };

        let key = self.table.canonical_key_for(&file);
        self.cache.set_record(key.clone(), content.as_str(), Some(file.clone()));
        let updated = self.cache.update_by_source(&file, &content);
        debug!("Refreshed {} cached record(s) for {key}", updated.len());

        let referrers = self.referrers_of(&[specifier.as_str()]);
        let previously_loaded = self.modules_for(key.as_str());

        let mut affected: Vec<String> = Vec::new();
        for module in modules {
            let backed_by_change = module.file.as_deref().is_some_and(|module_file| {
                let module_file = absolutize(self.table.base_dir(), module_file);
                module_file == file || referrers.contains(&module_file)
            });

            if (backed_by_change || previously_loaded.contains(&module.id))
                && !affected.contains(&module.id)
            {
                affected.push(module.id.clone());
            }
        }

        info!("Found {} affected module(s)", affected.len());
        affected
    }
}
