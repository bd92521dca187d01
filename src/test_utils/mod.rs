//! Test utilities for Twine
//!
//! Helpers shared by unit tests and the integration suite (enable the
//! `test-utils` feature to use them outside this crate):
//!
//! - [`init_test_logging`] installs a tracing subscriber once per process
//! - [`TemplateTree`] builds a throwaway project directory of templates
//!
//! # Example
//!
//! ```rust,no_run
//! use twine_cli::test_utils::TemplateTree;
//!
//! let tree = TemplateTree::new()
//!     .file("components/card/card.twig", "{% include '@widgets/icon/icon.twig' %}")
//!     .file("components/icon/icon.twig", "<svg/>")
//!     .file("components/icon/icon.js", "");
//!
//! assert!(tree.path().join("components/icon/icon.js").exists());
//! ```

use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` set, that level is used;
/// otherwise `RUST_LOG` is honored, and without either nothing is logged.
///
/// ```bash
/// RUST_LOG=twine_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// A temporary project directory populated with files.
///
/// The directory is deleted when the tree is dropped.
pub struct TemplateTree {
    temp_dir: TempDir,
    root: PathBuf,
}

impl TemplateTree {
    /// Creates an empty tree.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        // Canonical so paths compare equal to what directory walks return
        // (macOS tempdirs live behind a /var symlink).
        let root = temp_dir.path().canonicalize().unwrap_or_else(|_| temp_dir.path().to_path_buf());
        Self {
            temp_dir,
            root,
        }
    }

    /// Adds a file (creating parent directories) and returns the tree.
    #[must_use]
    pub fn file(self, relative: &str, content: &str) -> Self {
        self.write(relative, content);
        self
    }

    /// Writes or overwrites a file in place.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&path, content).expect("Failed to write test file");
    }

    /// Root of the tree.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `relative` inside the tree.
    #[must_use]
    pub fn join(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// The underlying temporary directory.
    #[must_use]
    pub fn temp_dir(&self) -> &TempDir {
        &self.temp_dir
    }
}

impl Default for TemplateTree {
    fn default() -> Self {
        Self::new()
    }
}
