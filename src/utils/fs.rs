//! File system helpers for template trees.
//!
//! All directory walks in Twine go through [`collect_files_with_extension`] so
//! that the cache scan, the reverse index and the shorthand nested search share
//! one traversal policy: symlinks are not followed, entries are visited in
//! sorted order, and unreadable entries are logged and skipped instead of
//! aborting the walk.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};
use walkdir::WalkDir;

/// Returns whether `path` names a file with the given extension.
///
/// The comparison is on the final extension only, so `card.html.twig` has the
/// extension `twig`.
#[must_use]
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

/// Recursively collects every regular file under `dir` whose extension is
/// `extension`.
///
/// A missing root yields an empty list. Walk errors (permission problems,
/// files vanishing mid-walk) are logged as warnings and the offending entry is
/// skipped.
///
/// # Examples
///
/// ```rust,no_run
/// use twine_cli::utils::collect_files_with_extension;
/// use std::path::Path;
///
/// let templates = collect_files_with_extension(Path::new("components"), "twig");
/// for path in templates {
///     println!("{}", path.display());
/// }
/// ```
#[must_use]
pub fn collect_files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if !dir.is_dir() {
        trace!("Skipping missing template root {}", dir.display());
        return files;
    }

    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && has_extension(entry.path(), extension) {
                    files.push(entry.into_path());
                }
            }
            Err(err) => {
                warn!("Could not walk directory {}: {}", dir.display(), err);
            }
        }
    }

    files
}

/// Finds the first file literally named `file_name` at any depth under `dir`.
///
/// Entries are visited in sorted order, so the result is stable for an
/// unchanged tree.
#[must_use]
pub fn find_file_named(dir: &Path, file_name: &str) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }

    WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Could not walk directory {}: {}", dir.display(), err);
                None
            }
        })
        .find(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
        .map(walkdir::DirEntry::into_path)
}

/// Reads a template file as UTF-8 text.
///
/// # Errors
///
/// Returns an error with the file path as context if the file cannot be read.
pub fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read template: {}", path.display()))
}
