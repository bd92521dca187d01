//! Template source cache.
//!
//! An explicit, session-owned store of canonical key → template record. It is
//! seeded once by [`TemplateSourceCache::init`], which walks every registered
//! root, and afterwards only changes through [`set`](TemplateSourceCache::set)
//! and [`set_record`](TemplateSourceCache::set_record): the resolver memoizes
//! freshly read files and the change hook overwrites edited ones.
//!
//! Apart from the initial scan the cache never reads from disk. Disk access
//! belongs to the [resolver](crate::resolver).
//!
//! # Suffix lookup
//!
//! [`suffix_lookup`](TemplateSourceCache::suffix_lookup) is the resolver's
//! last resort. Several keys may share a suffix, so the winner is chosen by a
//! fixed policy rather than storage order:
//!
//! 1. keys where the fragment starts on a path segment boundary
//! 2. then the shortest key
//! 3. then lexicographic order

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::core::{TemplateKey, TemplateRecord};
use crate::namespace::NamespaceTable;
use crate::utils::fs::{collect_files_with_extension, read_template};
use crate::utils::platform::normalize_path_for_storage;

/// Mutable store of template sources, keyed canonically.
#[derive(Debug, Default, Clone)]
pub struct TemplateSourceCache {
    records: HashMap<TemplateKey, TemplateRecord>,
}

impl TemplateSourceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cache by scanning every root of `table`.
    ///
    /// Each template file is keyed by
    /// [`NamespaceTable::canonical_key_for`]. When the same key turns up under
    /// several roots the first registered root wins. Unreadable files are
    /// logged and skipped.
    #[must_use]
    pub fn init(table: &NamespaceTable) -> Self {
        let mut cache = Self::new();
        let extension = table.template_extension().to_string();

        for (_, root) in table.all_roots() {
            for path in collect_files_with_extension(root, &extension) {
                let key = table.canonical_key_for(&path);
                if cache.records.contains_key(&key) {
                    continue;
                }

                match read_template(&path) {
                    Ok(content) => {
                        cache.set_record(key, content, Some(path));
                    }
                    Err(err) => warn!("Skipping template {}: {:#}", path.display(), err),
                }
            }
        }

        info!("Loaded {} templates (including namespaces)", cache.len());
        cache
    }

    /// Looks up a record by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TemplateRecord> {
        self.records.get(&TemplateKey::from(key))
    }

    /// Whether `key` is cached.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(&TemplateKey::from(key))
    }

    /// Sets the content of `key`, keeping an existing source path.
    pub fn set(&mut self, key: impl Into<TemplateKey>, content: impl Into<String>) {
        let key = key.into();
        let content = content.into();

        match self.records.get_mut(&key) {
            Some(record) => record.content = content,
            None => {
                self.records.insert(
                    key.clone(),
                    TemplateRecord {
                        key,
                        content,
                        source_path: None,
                    },
                );
            }
        }
    }

    /// Inserts or overwrites a record, including its backing file.
    pub fn set_record(
        &mut self,
        key: impl Into<TemplateKey>,
        content: impl Into<String>,
        source_path: Option<PathBuf>,
    ) -> &TemplateRecord {
        let key = key.into();
        let record = TemplateRecord {
            key: key.clone(),
            content: content.into(),
            source_path,
        };
        self.records.insert(key.clone(), record);
        &self.records[&key]
    }

    /// Overwrites the content of every record backed by `path`.
    ///
    /// Returns the keys that were updated, sorted.
    pub fn update_by_source(&mut self, path: &std::path::Path, content: &str) -> Vec<TemplateKey> {
        let mut updated: Vec<TemplateKey> = self
            .records
            .values_mut()
            .filter(|record| record.source_path.as_deref() == Some(path))
            .map(|record| {
                record.content = content.to_string();
                record.key.clone()
            })
            .collect();
        updated.sort();
        debug!("Updated {} cached record(s) backed by {}", updated.len(), path.display());
        updated
    }

    /// Finds the best key ending with `fragment`.
    ///
    /// Backslashes in the fragment are treated as `/`. See the module docs for
    /// the tie-break policy.
    #[must_use]
    pub fn suffix_lookup(&self, fragment: &str) -> Option<&TemplateRecord> {
        let fragment = normalize_path_for_storage(fragment);
        if fragment.is_empty() {
            return None;
        }

        self.records
            .values()
            .filter(|record| record.key.ends_with(&fragment))
            .min_by(|a, b| {
                let a_boundary = !a.key.ends_with_segment(&fragment);
                let b_boundary = !b.key.ends_with_segment(&fragment);
                a_boundary
                    .cmp(&b_boundary)
                    .then(a.key.as_str().len().cmp(&b.key.as_str().len()))
                    .then(a.key.cmp(&b.key))
            })
    }

    /// All keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<TemplateKey> {
        let mut keys: Vec<_> = self.records.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// All records, sorted by key.
    #[must_use]
    pub fn records(&self) -> Vec<&TemplateRecord> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        records
    }

    /// Name → source map for a runtime loader.
    ///
    /// Holds every canonical key plus, for files under a plain root, the
    /// plain-relative path a bare reference would use (`icon.twig` next to
    /// `@widgets/icon.twig`). A canonical key always wins over an alias of
    /// the same text.
    #[must_use]
    pub fn template_map(&self, table: &NamespaceTable) -> BTreeMap<String, String> {
        let mut map: BTreeMap<String, String> = self
            .records
            .values()
            .map(|record| (record.key.as_str().to_string(), record.content.clone()))
            .collect();

        for record in self.records() {
            let Some(alias) = record.source_path.as_deref().and_then(|p| table.plain_alias_for(p))
            else {
                continue;
            };
            map.entry(alias).or_insert_with(|| record.content.clone());
        }

        map
    }

    /// Number of cached templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NamespaceConfig, TwineConfig};
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &std::path::Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_init_scans_plain_and_namespace_roots() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "templates/page.twig", "page");
        write(temp.path(), "components/icon/icon.twig", "icon");
        write(temp.path(), "components/icon/icon.js", "js");

        let mut config = TwineConfig::new(temp.path());
        config.roots = Some(vec![PathBuf::from("templates")]);
        config.namespaces = NamespaceConfig::new().with("widgets", &["components"]);
        let table = NamespaceTable::from_config(&config);

        let cache = TemplateSourceCache::init(&table);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("page.twig").unwrap().content, "page");
        let icon = cache.get("@widgets/icon/icon.twig").unwrap();
        assert_eq!(icon.content, "icon");
        assert_eq!(
            icon.source_path.as_deref(),
            Some(temp.path().join("components/icon/icon.twig").as_path())
        );
    }

    #[test]
    fn test_init_first_namespace_dir_wins() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a/button.twig", "from a");
        write(temp.path(), "b/button.twig", "from b");

        let mut config = TwineConfig::new(temp.path());
        config.roots = Some(vec![]);
        config.namespaces = NamespaceConfig::new().with("widgets", &["a", "b"]);
        let cache = TemplateSourceCache::init(&NamespaceTable::from_config(&config));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("@widgets/button.twig").unwrap().content, "from a");
    }

    #[test]
    fn test_set_keeps_source_path() {
        let mut cache = TemplateSourceCache::new();
        cache.set_record("x.twig", "old", Some(PathBuf::from("/t/x.twig")));
        cache.set("x.twig", "new");

        let record = cache.get("x.twig").unwrap();
        assert_eq!(record.content, "new");
        assert_eq!(record.source_path, Some(PathBuf::from("/t/x.twig")));

        cache.set("fresh.twig", "body");
        assert_eq!(cache.get("fresh.twig").unwrap().source_path, None);
    }

    #[test]
    fn test_suffix_lookup_prefers_segment_boundary_then_shortest() {
        let mut cache = TemplateSourceCache::new();
        cache.set("@widgets/postcard.twig", "a");
        cache.set("@widgets/deep/nested/card.twig", "b");
        cache.set("@cards/card.twig", "c");

        let hit = cache.suffix_lookup("card.twig").unwrap();
        assert_eq!(hit.key.as_str(), "@cards/card.twig");

        let hit = cache.suffix_lookup("stcard.twig").unwrap();
        assert_eq!(hit.key.as_str(), "@widgets/postcard.twig");

        assert!(cache.suffix_lookup("nothing.twig").is_none());
        assert!(cache.suffix_lookup("").is_none());
    }

    #[test]
    fn test_suffix_lookup_lexicographic_tie_break() {
        let mut cache = TemplateSourceCache::new();
        cache.set("@b/x.twig", "b");
        cache.set("@a/x.twig", "a");

        for _ in 0..5 {
            assert_eq!(cache.suffix_lookup("x.twig").unwrap().key.as_str(), "@a/x.twig");
        }
    }

    #[test]
    fn test_suffix_lookup_normalizes_backslashes() {
        let mut cache = TemplateSourceCache::new();
        cache.set("@widgets/icon/icon.twig", "i");
        assert!(cache.suffix_lookup("icon\\icon.twig").is_some());
    }

    #[test]
    fn test_update_by_source() {
        let mut cache = TemplateSourceCache::new();
        let path = PathBuf::from("/t/icon.twig");
        cache.set_record("@w/icon.twig", "old", Some(path.clone()));
        cache.set_record("other.twig", "keep", Some(PathBuf::from("/t/other.twig")));

        let updated = cache.update_by_source(&path, "new");
        assert_eq!(updated, vec![TemplateKey::from("@w/icon.twig")]);
        assert_eq!(cache.get("@w/icon.twig").unwrap().content, "new");
        assert_eq!(cache.get("other.twig").unwrap().content, "keep");
    }

    #[test]
    fn test_template_map_adds_plain_aliases() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "components/icon.twig", "icon");
        write(temp.path(), "components/card/card.twig", "card");

        let mut config = TwineConfig::new(temp.path());
        config.namespaces = NamespaceConfig::new().with("widgets", &["components"]);
        let table = NamespaceTable::from_config(&config);
        let mut cache = TemplateSourceCache::init(&table);
        cache.set("icon.twig", "virtual");

        let map = cache.template_map(&table);
        assert_eq!(map["@widgets/icon.twig"], "icon");
        assert_eq!(map["@widgets/card/card.twig"], "card");
        assert_eq!(map["card/card.twig"], "card");
        // An existing key is never shadowed by an alias.
        assert_eq!(map["icon.twig"], "virtual");
        assert_eq!(map.len(), 4);
    }
}
