//! Configuration management for Twine
//!
//! A project is described by a `twine.toml` file. Relative directories are
//! resolved against the directory that contains the file (or `--base-dir`).
//!
//! ```toml
//! # Which bundler ids the plugin claims (regular expression)
//! include = '\.twig(\?.*)?$'
//!
//! # Plain roots for bare relative specifiers. When omitted, every namespace
//! # directory also acts as a plain root.
//! roots = ["templates"]
//!
//! template_extension = "twig"
//! script_extension = "js"
//!
//! # Module imported by generated template modules for the runtime loader
//! runtime_loader = "twine/runtime/component-loader"
//!
//! # Namespace id -> directory or ordered list of directories.
//! # The first directory containing a match wins.
//! [namespaces]
//! widgets = ["components/base", "components/theme"]
//! layout = "layouts"
//! ```
//!
//! Namespace order follows document order and is significant for
//! [`NamespaceTable`](crate::namespace::NamespaceTable) probing.
//!
//! # Modules
//!
//! - `parser` - Generic TOML parsing with file-path error context

mod parser;

pub use parser::parse_config;

use anyhow::Result;
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_INCLUDE_PATTERN, DEFAULT_SCRIPT_EXTENSION, DEFAULT_TEMPLATE_EXTENSION,
    RUNTIME_LOADER_MODULE,
};
use crate::core::TwineError;

/// Project configuration as read from `twine.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TwineConfig {
    /// Regular expression selecting bundler ids handled by the plugin
    #[serde(default = "default_include")]
    pub include: String,

    /// Plain template roots. `None` means "derive from namespaces".
    #[serde(default)]
    pub roots: Option<Vec<PathBuf>>,

    /// Ordered namespace table, unresolved
    #[serde(default)]
    pub namespaces: NamespaceConfig,

    /// Template file extension, without the dot
    #[serde(default = "default_template_extension")]
    pub template_extension: String,

    /// Sidecar script extension, without the dot
    #[serde(default = "default_script_extension")]
    pub script_extension: String,

    /// Module generated template modules import their loader factory from
    #[serde(default = "default_runtime_loader")]
    pub runtime_loader: String,

    /// Directory relative paths resolve against. Set by the loader, not the file.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_include() -> String {
    DEFAULT_INCLUDE_PATTERN.to_string()
}

fn default_runtime_loader() -> String {
    RUNTIME_LOADER_MODULE.to_string()
}

fn default_template_extension() -> String {
    DEFAULT_TEMPLATE_EXTENSION.to_string()
}

fn default_script_extension() -> String {
    DEFAULT_SCRIPT_EXTENSION.to_string()
}

impl Default for TwineConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            roots: None,
            namespaces: NamespaceConfig::default(),
            template_extension: default_template_extension(),
            script_extension: default_script_extension(),
            runtime_loader: default_runtime_loader(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl TwineConfig {
    /// Creates an empty configuration rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Loads `twine.toml` from `path`; relative directories resolve against
    /// the file's parent directory.
    ///
    /// # Errors
    ///
    /// Returns [`TwineError::ConfigNotFound`] if the file does not exist and
    /// [`TwineError::ConfigError`] if it cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TwineError::ConfigNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let mut config: Self = parse_config(path).map_err(|err| TwineError::ConfigError {
            message: format!("{err:#}"),
        })?;
        config.base_dir = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        debug!(
            "Loaded {} with {} namespace(s) from {}",
            CONFIG_FILE_NAME,
            config.namespaces.len(),
            path.display()
        );
        Ok(config)
    }

    /// Searches `start` and its ancestors for `twine.toml`.
    #[must_use]
    pub fn discover(start: &Path) -> Option<PathBuf> {
        let mut current = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Appends directories from a `--namespace id=dir` flag.
    ///
    /// # Errors
    ///
    /// Returns [`TwineError::InvalidNamespaceFlag`] when the value has no `=`
    /// or an empty side.
    pub fn add_namespace_flag(&mut self, value: &str) -> Result<(), TwineError> {
        match value.split_once('=') {
            Some((id, dir)) if !id.trim().is_empty() && !dir.trim().is_empty() => {
                self.namespaces.push(id.trim(), PathBuf::from(dir.trim()));
                Ok(())
            }
            _ => Err(TwineError::InvalidNamespaceFlag {
                value: value.to_string(),
            }),
        }
    }

    /// Compiles the include pattern.
    ///
    /// # Errors
    ///
    /// Returns [`TwineError::InvalidIncludePattern`] for an invalid regex.
    pub fn include_regex(&self) -> Result<Regex, TwineError> {
        Regex::new(&self.include).map_err(|e| TwineError::InvalidIncludePattern {
            pattern: self.include.clone(),
            reason: e.to_string(),
        })
    }
}

/// Ordered namespace configuration: id to one or more directories.
///
/// Deserialized from a TOML table in document order; each value is either a
/// single directory string or an array of directory strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceConfig {
    entries: Vec<(String, Vec<PathBuf>)>,
}

impl NamespaceConfig {
    /// Creates an empty namespace configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a directory to namespace `id`, creating it if needed.
    ///
    /// Existing namespaces keep their position; new ones go last.
    pub fn push(&mut self, id: &str, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if let Some((_, dirs)) = self.entries.iter_mut().find(|(name, _)| name == id) {
            dirs.push(dir);
        } else {
            self.entries.push((id.to_string(), vec![dir]));
        }
    }

    /// Builder-style variant of [`push`](Self::push) for a whole directory list.
    #[must_use]
    pub fn with(mut self, id: &str, dirs: &[&str]) -> Self {
        for dir in dirs {
            self.push(id, *dir);
        }
        self
    }

    /// Iterates namespaces in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.entries.iter().map(|(id, dirs)| (id.as_str(), dirs.as_slice()))
    }

    /// Number of namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no namespaces are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DirList {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl<'de> Deserialize<'de> for NamespaceConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NamespaceVisitor;

        impl<'de> Visitor<'de> for NamespaceVisitor {
            type Value = NamespaceConfig;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of namespace ids to a directory or a list of directories")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut config = NamespaceConfig::new();
                while let Some((id, dirs)) = map.next_entry::<String, DirList>()? {
                    let dirs = match dirs {
                        DirList::One(dir) => vec![dir],
                        DirList::Many(dirs) => dirs,
                    };
                    for dir in dirs {
                        config.push(&id, dir);
                    }
                }
                Ok(config)
            }
        }

        deserializer.deserialize_map(NamespaceVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_preserves_namespace_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"
roots = ["templates"]

[namespaces]
zeta = "z"
alpha = ["a1", "a2"]
"#,
        )
        .unwrap();

        let config = TwineConfig::load(&path).unwrap();
        let ids: Vec<_> = config.namespaces.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);

        let alpha: Vec<_> = config.namespaces.iter().nth(1).unwrap().1.to_vec();
        assert_eq!(alpha, vec![PathBuf::from("a1"), PathBuf::from("a2")]);
        assert_eq!(config.roots, Some(vec![PathBuf::from("templates")]));
        assert_eq!(config.base_dir, temp.path());
        assert_eq!(config.template_extension, "twig");
        assert_eq!(config.script_extension, "js");
        assert_eq!(config.runtime_loader, RUNTIME_LOADER_MODULE);
    }

    #[test]
    fn test_load_missing_config() {
        let temp = TempDir::new().unwrap();
        let err = TwineConfig::load(&temp.path().join(CONFIG_FILE_NAME)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TwineError>(),
            Some(TwineError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn test_load_invalid_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[namespaces]\nwidgets = 3\n").unwrap();

        let err = TwineConfig::load(&path).unwrap_err();
        match err.downcast_ref::<TwineError>() {
            Some(TwineError::ConfigError {
                message,
            }) => {
                assert!(message.contains("Failed to parse config file"));
                assert!(message.contains(CONFIG_FILE_NAME));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_discover_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "").unwrap();

        let found = TwineConfig::discover(&nested).unwrap();
        assert_eq!(found.file_name().unwrap(), CONFIG_FILE_NAME);
    }

    #[test]
    fn test_namespace_flag() {
        let mut config = TwineConfig::new("/p");
        config.add_namespace_flag("widgets=components").unwrap();
        config.add_namespace_flag("widgets=more").unwrap();
        assert_eq!(config.namespaces.len(), 1);
        assert_eq!(config.namespaces.iter().next().unwrap().1.len(), 2);

        assert!(matches!(
            config.add_namespace_flag("nodir"),
            Err(TwineError::InvalidNamespaceFlag { .. })
        ));
    }

    #[test]
    fn test_include_regex() {
        let config = TwineConfig::default();
        let re = config.include_regex().unwrap();
        assert!(re.is_match("card.twig"));
        assert!(re.is_match("card.twig?raw"));
        assert!(!re.is_match("card.js"));

        let bad = TwineConfig {
            include: "(".to_string(),
            ..TwineConfig::default()
        };
        assert!(matches!(bad.include_regex(), Err(TwineError::InvalidIncludePattern { .. })));
    }
}
