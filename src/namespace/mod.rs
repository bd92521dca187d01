//! Namespace table: resolved template roots.
//!
//! Turns a [`TwineConfig`] into absolute, lexically normalized root lists:
//! the ordered directories of every namespace plus the plain (unnamespaced)
//! roots. Nothing here touches the filesystem; a directory that does not exist
//! simply never produces a match.
//!
//! The table also owns key canonicalization. Every component that turns a
//! file path into a [`TemplateKey`] goes through
//! [`NamespaceTable::canonical_key_for`], so a file reachable through several
//! roots (for example nested namespaces `tests => fixtures` and
//! `jabba => fixtures/jabba`) still has exactly one key.

use std::path::{Path, PathBuf};

use crate::config::TwineConfig;
use crate::core::TemplateKey;
use crate::utils::platform::{absolutize, normalize_path, normalize_path_for_storage};

/// One namespace: id and its ordered absolute roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub id: String,
    pub roots: Vec<PathBuf>,
}

/// A registered root directory and what it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind<'a> {
    /// A plain template root: keys are relative paths
    Plain,
    /// A namespace root: keys are `@namespace/relative`
    Namespace(&'a str),
}

/// Immutable, resolved namespace and root configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceTable {
    base_dir: PathBuf,
    namespaces: Vec<Namespace>,
    plain_roots: Vec<PathBuf>,
    template_extension: String,
    script_extension: String,
}

impl NamespaceTable {
    /// Resolves every configured directory against `config.base_dir`.
    ///
    /// When `config.roots` is `None` the plain roots are the flattened
    /// namespace directories in registration order, duplicates removed.
    #[must_use]
    pub fn from_config(config: &TwineConfig) -> Self {
        let base = if config.base_dir.is_absolute() {
            normalize_path(&config.base_dir)
        } else {
            std::env::current_dir()
                .map(|cwd| absolutize(&cwd, &config.base_dir))
                .unwrap_or_else(|_| normalize_path(&config.base_dir))
        };

        let namespaces: Vec<Namespace> = config
            .namespaces
            .iter()
            .map(|(id, dirs)| Namespace {
                id: id.to_string(),
                roots: dirs.iter().map(|dir| absolutize(&base, dir)).collect(),
            })
            .collect();

        let mut plain_roots: Vec<PathBuf> = Vec::new();
        let configured: Vec<PathBuf> = match &config.roots {
            Some(roots) => roots.iter().map(|dir| absolutize(&base, dir)).collect(),
            None => namespaces.iter().flat_map(|ns| ns.roots.iter().cloned()).collect(),
        };
        for root in configured {
            if !plain_roots.contains(&root) {
                plain_roots.push(root);
            }
        }

        Self {
            base_dir: base,
            namespaces,
            plain_roots,
            template_extension: config.template_extension.clone(),
            script_extension: config.script_extension.clone(),
        }
    }

    /// Absolute directory every configured path was resolved against.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Roots registered under `namespace`, in order; empty for unknown ids.
    #[must_use]
    pub fn roots(&self, namespace: &str) -> &[PathBuf] {
        self.namespaces
            .iter()
            .find(|ns| ns.id == namespace)
            .map(|ns| ns.roots.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `namespace` is registered.
    #[must_use]
    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.namespaces.iter().any(|ns| ns.id == namespace)
    }

    /// Plain template roots, in order.
    #[must_use]
    pub fn plain_roots(&self) -> &[PathBuf] {
        &self.plain_roots
    }

    /// Namespaces, in registration order.
    #[must_use]
    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    /// Every registered root with its kind: plain roots first, then namespace
    /// roots, each in registration order.
    pub fn all_roots(&self) -> impl Iterator<Item = (RootKind<'_>, &Path)> {
        self.plain_roots.iter().map(|root| (RootKind::Plain, root.as_path())).chain(
            self.namespaces.iter().flat_map(|ns| {
                ns.roots.iter().map(move |root| (RootKind::Namespace(ns.id.as_str()), root.as_path()))
            }),
        )
    }

    /// Template extension, without the dot.
    #[must_use]
    pub fn template_extension(&self) -> &str {
        &self.template_extension
    }

    /// Sidecar script extension, without the dot.
    #[must_use]
    pub fn script_extension(&self) -> &str {
        &self.script_extension
    }

    /// The canonical key of an absolute file path.
    ///
    /// The registered root that is the longest component-wise prefix of the
    /// path wins; on equal length namespace roots beat plain roots, then
    /// registration order decides. A path under no root keys as its own
    /// normalized absolute path.
    #[must_use]
    pub fn canonical_key_for(&self, path: &Path) -> TemplateKey {
        let path = normalize_path(path);
        let mut best: Option<(usize, u8, RootKind<'_>, String)> = None;

        for (kind, root) in self.all_roots() {
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            if relative.as_os_str().is_empty() {
                continue;
            }

            let depth = root.components().count();
            let rank = match kind {
                RootKind::Namespace(_) => 1,
                RootKind::Plain => 0,
            };
            let better = match &best {
                None => true,
                Some((best_depth, best_rank, ..)) => (depth, rank) > (*best_depth, *best_rank),
            };
            if better {
                best = Some((depth, rank, kind, normalize_path_for_storage(relative)));
            }
        }

        match best {
            Some((_, _, RootKind::Namespace(ns), relative)) => {
                TemplateKey::namespaced(ns, &relative)
            }
            Some((_, _, RootKind::Plain, relative)) => TemplateKey::new(relative),
            None => TemplateKey::new(normalize_path_for_storage(&path)),
        }
    }

    /// `@namespace/relative` for a path under a namespace root.
    ///
    /// Uses the same longest-root rule as [`canonical_key_for`](Self::canonical_key_for)
    /// restricted to namespace roots.
    #[must_use]
    pub fn namespaced_reference(&self, path: &Path) -> Option<TemplateKey> {
        let path = normalize_path(path);

        self.namespaces
            .iter()
            .flat_map(|ns| ns.roots.iter().map(move |root| (ns.id.as_str(), root)))
            .filter_map(|(id, root)| {
                let relative = path.strip_prefix(root).ok()?;
                if relative.as_os_str().is_empty() {
                    return None;
                }
                Some((root.components().count(), id, normalize_path_for_storage(relative)))
            })
            .fold(None::<(usize, &str, String)>, |best, candidate| match best {
                Some(b) if b.0 >= candidate.0 => Some(b),
                _ => Some(candidate),
            })
            .map(|(_, id, relative)| TemplateKey::namespaced(id, &relative))
    }

    /// Path of `path` relative to the first plain root containing it.
    ///
    /// This is the name a bare relative reference uses for the file, which
    /// differs from the canonical key when a namespace root wins the key.
    #[must_use]
    pub fn plain_alias_for(&self, path: &Path) -> Option<String> {
        let path = normalize_path(path);

        self.plain_roots.iter().find_map(|root| {
            let relative = path.strip_prefix(root).ok()?;
            (!relative.as_os_str().is_empty()).then(|| normalize_path_for_storage(relative))
        })
    }

    /// Namespace table in display form, for diagnostics.
    #[must_use]
    pub fn describe_namespaces(&self) -> Vec<(String, Vec<String>)> {
        self.namespaces
            .iter()
            .map(|ns| {
                (ns.id.clone(), ns.roots.iter().map(|r| normalize_path_for_storage(r)).collect())
            })
            .collect()
    }

    /// Plain roots in display form, for diagnostics.
    #[must_use]
    pub fn describe_roots(&self) -> Vec<String> {
        self.plain_roots.iter().map(|r| normalize_path_for_storage(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamespaceConfig;

    fn table(namespaces: NamespaceConfig, roots: Option<Vec<&str>>) -> NamespaceTable {
        let mut config = TwineConfig::new("/project");
        config.namespaces = namespaces;
        config.roots = roots.map(|r| r.into_iter().map(PathBuf::from).collect());
        NamespaceTable::from_config(&config)
    }

    #[test]
    fn test_resolves_relative_dirs_against_base() {
        let t = table(NamespaceConfig::new().with("widgets", &["components/a", "./components/b"]), None);
        assert_eq!(
            t.roots("widgets"),
            &[PathBuf::from("/project/components/a"), PathBuf::from("/project/components/b")]
        );
        assert!(t.roots("unknown").is_empty());
        assert!(t.has_namespace("widgets"));
        assert_eq!(t.base_dir(), Path::new("/project"));
    }

    #[test]
    fn test_plain_roots_default_to_namespace_dirs() {
        let t = table(NamespaceConfig::new().with("a", &["x"]).with("b", &["x", "y"]), None);
        assert_eq!(t.plain_roots(), &[PathBuf::from("/project/x"), PathBuf::from("/project/y")]);
    }

    #[test]
    fn test_explicit_plain_roots() {
        let t = table(NamespaceConfig::new().with("a", &["x"]), Some(vec!["templates"]));
        assert_eq!(t.plain_roots(), &[PathBuf::from("/project/templates")]);
    }

    #[test]
    fn test_canonical_key_prefers_longest_root() {
        let t = table(
            NamespaceConfig::new().with("tests", &["fixtures"]).with("jabba", &["fixtures/jabba"]),
            Some(vec![]),
        );
        assert_eq!(
            t.canonical_key_for(Path::new("/project/fixtures/jabba/x.twig")).as_str(),
            "@jabba/x.twig"
        );
        assert_eq!(
            t.canonical_key_for(Path::new("/project/fixtures/y.twig")).as_str(),
            "@tests/y.twig"
        );
    }

    #[test]
    fn test_canonical_key_namespace_beats_plain_on_same_root() {
        let t = table(NamespaceConfig::new().with("widgets", &["components"]), None);
        assert_eq!(
            t.canonical_key_for(Path::new("/project/components/icon.twig")).as_str(),
            "@widgets/icon.twig"
        );
    }

    #[test]
    fn test_canonical_key_plain_and_unmanaged() {
        let t = table(NamespaceConfig::new(), Some(vec!["templates"]));
        assert_eq!(
            t.canonical_key_for(Path::new("/project/templates/pages/home.twig")).as_str(),
            "pages/home.twig"
        );
        assert_eq!(t.canonical_key_for(Path::new("/elsewhere/x.twig")).as_str(), "/elsewhere/x.twig");
    }

    #[test]
    fn test_namespaced_reference() {
        let t = table(NamespaceConfig::new().with("widgets", &["components"]), Some(vec!["templates"]));
        assert_eq!(
            t.namespaced_reference(Path::new("/project/components/icon.twig")).unwrap().as_str(),
            "@widgets/icon.twig"
        );
        assert!(t.namespaced_reference(Path::new("/project/templates/x.twig")).is_none());
    }

    #[test]
    fn test_plain_alias_for() {
        let t = table(NamespaceConfig::new().with("widgets", &["components"]), None);
        assert_eq!(
            t.plain_alias_for(Path::new("/project/components/icon/icon.twig")).as_deref(),
            Some("icon/icon.twig")
        );
        assert!(t.plain_alias_for(Path::new("/elsewhere/x.twig")).is_none());
    }
}
