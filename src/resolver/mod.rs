//! Template path resolution and dependency walking.
//!
//! [`TemplateResolver`] turns any specifier into a canonical key plus content.
//! It tries a fixed sequence of strategies and the first success wins:
//!
//! 1. **Namespace-qualified** - `@namespace/rest` probed under each root of
//!    the namespace, in registration order
//! 2. **Plain roots** - a relative specifier probed under each plain root
//! 3. **Cache reuse** - the bare relative path is already a cached key (an
//!    absolute path under a plain root is relativized first)
//! 4. **Absolute path** - an existing absolute file, keyed canonically
//! 5. **Namespace retry** - an absolute path matching a namespace root under
//!    a looser comparison, or a relative specifier probed under every
//!    namespace root
//! 6. **Suffix match** - a cached key ending with the specifier
//!
//! `namespace:component` shorthand is expanded to
//! `@namespace/component/component` first; if that file does not exist, a
//! recursive search under the namespace's roots looks for
//! `component.<ext>` at any depth.
//!
//! Misses are soft: each strategy returns `None` and resolution moves on. A
//! file that exists but cannot be read is logged and treated as a miss for
//! that candidate. Only callers at a hard boundary turn a final `None` into
//! [`TwineError::TemplateNotFound`] via [`TemplateResolver::not_found`].
//!
//! Every successful disk read is memoized in the
//! [`TemplateSourceCache`] under the key from
//! [`NamespaceTable::canonical_key_for`], so a file always ends up with one
//! key no matter which specifier found it.
//!
//! # Modules
//!
//! - [`specifier`] - specifier classification and extension probing
//! - [`forward`] - forward walk collecting sidecar scripts
//! - [`reverse`] - one-hop reverse reference lookup
//! - [`dependency_graph`] - reference graph with cycle detection

pub mod dependency_graph;
pub mod forward;
pub mod reverse;
pub mod specifier;

pub use dependency_graph::TemplateGraph;
pub use forward::{ForwardWalk, collect_component_scripts};
pub use reverse::referrers_of;
pub use specifier::Specifier;

use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use crate::cache::TemplateSourceCache;
use crate::core::{ResolvedTemplate, TemplateKey, TwineError};
use crate::namespace::NamespaceTable;
use crate::utils::fs::{find_file_named, read_template};
use crate::utils::platform::{
    absolutize, normalize_path, normalize_path_for_storage, strip_prefix_loose,
};

use specifier::extension_candidates;

/// Multi-strategy specifier resolver over one namespace table.
///
/// The resolver holds no state of its own; the cache is passed explicitly so
/// that one owner decides when it is mutated.
#[derive(Debug, Clone, Copy)]
pub struct TemplateResolver<'a> {
    table: &'a NamespaceTable,
}

impl<'a> TemplateResolver<'a> {
    /// Creates a resolver over `table`.
    #[must_use]
    pub const fn new(table: &'a NamespaceTable) -> Self {
        Self {
            table,
        }
    }

    /// Resolves `specifier` to a canonical key and its content.
    ///
    /// Returns `None` when every strategy misses.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use twine_cli::cache::TemplateSourceCache;
    /// use twine_cli::config::TwineConfig;
    /// use twine_cli::namespace::NamespaceTable;
    /// use twine_cli::resolver::TemplateResolver;
    ///
    /// let mut config = TwineConfig::new("/project");
    /// config.add_namespace_flag("widgets=components").unwrap();
    /// let table = NamespaceTable::from_config(&config);
    /// let mut cache = TemplateSourceCache::init(&table);
    ///
    /// let resolver = TemplateResolver::new(&table);
    /// if let Some(template) = resolver.resolve(&mut cache, "widgets:button") {
    ///     println!("{} => {} bytes", template.key, template.content.len());
    /// }
    /// ```
    pub fn resolve(
        &self,
        cache: &mut TemplateSourceCache,
        specifier: &str,
    ) -> Option<ResolvedTemplate> {
        trace!("Resolving template specifier: {specifier}");

        let resolved = match Specifier::parse(specifier) {
            Specifier::Shorthand {
                namespace,
                component,
            } => {
                let expanded = format!("@{namespace}/{component}/{component}");
                debug!("Expanded shorthand {specifier} to {expanded}");
                self.resolve_namespaced(cache, namespace, &format!("{component}/{component}"))
                    .or_else(|| self.find_component(cache, namespace, component))
                    .or_else(|| self.resolve_chain(cache, &expanded))
            }
            _ => self.resolve_chain(cache, specifier),
        };

        match &resolved {
            Some(template) => debug!("Resolved {specifier} to {}", template.key),
            None => debug!("No strategy resolved {specifier}"),
        }
        resolved
    }

    /// Strategies 1 to 6 for an already-expanded specifier.
    fn resolve_chain(
        &self,
        cache: &mut TemplateSourceCache,
        specifier: &str,
    ) -> Option<ResolvedTemplate> {
        let parsed = Specifier::parse(specifier);

        if let Specifier::Namespaced {
            namespace,
            rest,
        } = parsed
            && let Some(found) = self.resolve_namespaced(cache, namespace, rest)
        {
            return Some(found);
        }

        if let Specifier::Relative(relative) = parsed
            && let Some(found) = self.probe_roots(cache, self.table.plain_roots(), relative)
        {
            return Some(found);
        }

        if let Some(found) = self.reuse_cached(cache, &parsed) {
            return Some(found);
        }

        if let Specifier::Absolute(absolute) = parsed {
            let path = normalize_path(Path::new(absolute));
            if path.is_file()
                && let Some(found) = self.read_and_cache(cache, &path)
            {
                return Some(found);
            }
        }

        if let Some(found) = self.retry_under_namespaces(cache, &parsed) {
            return Some(found);
        }

        let found = cache.suffix_lookup(specifier).cloned().map(ResolvedTemplate::from);
        if let Some(template) = &found {
            debug!("Suffix match for {specifier}: {}", template.key);
        }
        found
    }

    /// Strategy 1: probe `rest` under each root of `namespace`.
    fn resolve_namespaced(
        &self,
        cache: &mut TemplateSourceCache,
        namespace: &str,
        rest: &str,
    ) -> Option<ResolvedTemplate> {
        let roots = self.table.roots(namespace);
        if roots.is_empty() {
            trace!("Unknown namespace @{namespace}");
            return None;
        }
        self.probe_roots(cache, roots, rest)
    }

    /// Probes every extension candidate of `relative` under each root in order.
    fn probe_roots(
        &self,
        cache: &mut TemplateSourceCache,
        roots: &[PathBuf],
        relative: &str,
    ) -> Option<ResolvedTemplate> {
        let candidates = extension_candidates(relative, self.table.template_extension());

        for root in roots {
            for candidate in &candidates {
                let path = absolutize(root, Path::new(candidate));
                if path.is_file()
                    && let Some(found) = self.read_and_cache(cache, &path)
                {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Strategy 3: reuse a cached bare key without touching disk.
    fn reuse_cached(
        &self,
        cache: &TemplateSourceCache,
        parsed: &Specifier<'_>,
    ) -> Option<ResolvedTemplate> {
        let bare = match parsed {
            Specifier::Relative(relative) => {
                Some(normalize_path_for_storage(normalize_path(Path::new(relative))))
            }
            Specifier::Absolute(absolute) => {
                let path = normalize_path(Path::new(absolute));
                self.table.plain_roots().iter().find_map(|root| {
                    path.strip_prefix(root).ok().map(normalize_path_for_storage)
                })
            }
            _ => None,
        }?;

        cache.get(&bare).cloned().map(ResolvedTemplate::from)
    }

    /// Strategy 5: looser namespace matching.
    fn retry_under_namespaces(
        &self,
        cache: &mut TemplateSourceCache,
        parsed: &Specifier<'_>,
    ) -> Option<ResolvedTemplate> {
        match *parsed {
            Specifier::Absolute(absolute) => {
                let path = normalize_path(Path::new(absolute));
                for namespace in self.table.namespaces() {
                    for root in &namespace.roots {
                        let Some(relative) = strip_prefix_loose(&path, root) else {
                            continue;
                        };
                        let key = TemplateKey::namespaced(&namespace.id, &relative);
                        if let Some(record) = cache.get(key.as_str()) {
                            return Some(record.clone().into());
                        }
                        if path.is_file() {
                            match read_template(&path) {
                                Ok(content) => {
                                    let record = cache.set_record(key, content, Some(path.clone()));
                                    return Some(record.clone().into());
                                }
                                Err(err) => warn!("{err:#}"),
                            }
                            return None;
                        }
                    }
                }
                None
            }
            Specifier::Relative(relative) => {
                for namespace in self.table.namespaces() {
                    if let Some(found) = self.probe_roots(cache, &namespace.roots, relative) {
                        return Some(found);
                    }
                }
                None
            }
            _ => None,
        }
    }

    /// Shorthand fallback: first `component.<ext>` at any depth under the
    /// namespace roots.
    fn find_component(
        &self,
        cache: &mut TemplateSourceCache,
        namespace: &str,
        component: &str,
    ) -> Option<ResolvedTemplate> {
        let file_name = format!("{component}.{}", self.table.template_extension());

        self.table
            .roots(namespace)
            .iter()
            .find_map(|root| find_file_named(root, &file_name))
            .and_then(|path| {
                debug!("Found {namespace}:{component} by nested search at {}", path.display());
                self.read_and_cache(cache, &path)
            })
    }

    /// Reads `path`, memoizes it under its canonical key and returns it.
    fn read_and_cache(
        &self,
        cache: &mut TemplateSourceCache,
        path: &Path,
    ) -> Option<ResolvedTemplate> {
        match read_template(path) {
            Ok(content) => {
                let key = self.table.canonical_key_for(path);
                let record = cache.set_record(key, content, Some(path.to_path_buf()));
                Some(record.clone().into())
            }
            Err(err) => {
                warn!("{err:#}");
                None
            }
        }
    }

    /// Builds the hard-failure error for a specifier nothing resolved.
    #[must_use]
    pub fn not_found(&self, cache: &TemplateSourceCache, specifier: &str) -> TwineError {
        TwineError::TemplateNotFound {
            specifier: specifier.to_string(),
            roots: self.table.describe_roots(),
            namespaces: self.table.describe_namespaces(),
            known_keys: cache.keys().into_iter().map(|k| k.as_str().to_string()).collect(),
        }
    }

    /// Resolves `specifier` or fails with [`TwineError::TemplateNotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`TwineError::TemplateNotFound`] when every strategy misses.
    pub fn resolve_required(
        &self,
        cache: &mut TemplateSourceCache,
        specifier: &str,
    ) -> Result<ResolvedTemplate, TwineError> {
        self.resolve(cache, specifier).ok_or_else(|| self.not_found(cache, specifier))
    }
}
