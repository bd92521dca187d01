//! Template identity types shared by the cache, the resolver and the plugin.

use std::fmt;
use std::path::{Path, PathBuf};

/// Canonical identity of a template within one cache instance.
///
/// Either a path relative to a plain template root (`pages/home.twig`) or a
/// namespace-qualified path (`@widgets/button/button.twig`). Keys always use
/// forward slashes. A filesystem file maps to exactly one key; see
/// [`NamespaceTable::canonical_key_for`](crate::namespace::NamespaceTable::canonical_key_for).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateKey(String);

impl TemplateKey {
    /// Wraps a key string. The caller is responsible for canonical form.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Builds a namespace-qualified key `@namespace/relative`.
    pub fn namespaced(namespace: &str, relative: &str) -> Self {
        Self(format!("@{namespace}/{}", relative.trim_start_matches('/')))
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The namespace id if this key is namespace-qualified.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.0.strip_prefix('@').and_then(|rest| rest.split_once('/')).map(|(ns, _)| ns)
    }

    /// Whether the key ends with `fragment`.
    #[must_use]
    pub fn ends_with(&self, fragment: &str) -> bool {
        self.0.ends_with(fragment)
    }

    /// Whether `fragment` matches the end of the key on a path segment boundary.
    #[must_use]
    pub fn ends_with_segment(&self, fragment: &str) -> bool {
        match self.0.strip_suffix(fragment) {
            Some("") => true,
            Some(head) => head.ends_with('/'),
            None => false,
        }
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TemplateKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TemplateKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TemplateKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A cached template: key, raw text and the file it was read from.
///
/// Owned exclusively by [`TemplateSourceCache`](crate::cache::TemplateSourceCache).
/// Records are overwritten in place on change and never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRecord {
    pub key: TemplateKey,
    pub content: String,
    /// `None` only for records injected without a backing file.
    pub source_path: Option<PathBuf>,
}

/// Result of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    pub key: TemplateKey,
    pub content: String,
    pub source_path: Option<PathBuf>,
}

impl ResolvedTemplate {
    /// The backing file, if the template came from disk.
    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
}

impl From<TemplateRecord> for ResolvedTemplate {
    fn from(record: TemplateRecord) -> Self {
        Self {
            key: record.key,
            content: record.content,
            source_path: record.source_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_key() {
        let key = TemplateKey::namespaced("widgets", "button/button.twig");
        assert_eq!(key.as_str(), "@widgets/button/button.twig");
        assert_eq!(key.namespace(), Some("widgets"));
        assert_eq!(TemplateKey::new("page.twig").namespace(), None);
    }

    #[test]
    fn test_ends_with_segment() {
        let key = TemplateKey::new("@widgets/icon.twig");
        assert!(key.ends_with_segment("icon.twig"));
        assert!(key.ends_with_segment("@widgets/icon.twig"));
        assert!(!key.ends_with_segment("con.twig"));
        assert!(key.ends_with("con.twig"));
    }
}
