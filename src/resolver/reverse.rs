//! Reverse reference lookup: which templates reference a given one?
//!
//! Used for hot invalidation. Every query walks all registered roots afresh
//! and re-reads each template, so results always reflect what is on disk at
//! the moment of the change. Only direct referrers are reported; a template
//! that references a referrer is not.
//!
//! A target is matched against references through a set of aliases, since
//! the same file can be named in several ways:
//!
//! - the target string itself
//! - `@namespace/relative` for every namespace root containing the file
//! - the root-relative path for every plain root containing the file
//! - each of the above without the template extension

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::TemplateKey;
use crate::namespace::{NamespaceTable, RootKind};
use crate::templating::extract_references;
use crate::utils::fs::{collect_files_with_extension, read_template};
use crate::utils::platform::{absolutize, normalize_path, normalize_path_for_storage};

use super::Specifier;
use super::specifier::extension_candidates;

/// Files that directly reference any of `targets`, sorted.
///
/// Targets may be absolute paths, `@namespace/…` specifiers, shorthand
/// references or root-relative paths. Unreadable files are logged and
/// skipped.
pub fn referrers_of<S: AsRef<str>>(table: &NamespaceTable, targets: &[S]) -> Vec<PathBuf> {
    let aliases = target_aliases(table, targets);
    debug!("Looking for references to: {}", aliases.iter().cloned().collect::<Vec<_>>().join(", "));

    let files: BTreeSet<PathBuf> = table
        .all_roots()
        .flat_map(|(_, root)| collect_files_with_extension(root, table.template_extension()))
        .collect();
    debug!("Scanning {} template files", files.len());

    let referrers: Vec<PathBuf> = files
        .into_iter()
        .filter(|file| match read_template(file) {
            Ok(content) => extract_references(&content, table.template_extension())
                .iter()
                .any(|reference| aliases.contains(reference)),
            Err(err) => {
                warn!("{err:#}");
                false
            }
        })
        .collect();

    debug!("Found {} files referencing target templates", referrers.len());
    referrers
}

/// Every string a reference to one of `targets` could use.
#[must_use]
pub fn target_aliases<S: AsRef<str>>(table: &NamespaceTable, targets: &[S]) -> BTreeSet<String> {
    let mut aliases = BTreeSet::new();

    for target in targets {
        let target = target.as_ref();
        aliases.insert(target.to_string());

        for file in target_files(table, target) {
            aliases.extend(file_aliases(table, &file));
        }
    }

    let extension_suffix = format!(".{}", table.template_extension());
    let bare: Vec<String> = aliases
        .iter()
        .filter_map(|alias| alias.strip_suffix(&extension_suffix).map(str::to_string))
        .collect();
    aliases.extend(bare);

    aliases
}

/// The files a target may denote, without reading them.
fn target_files(table: &NamespaceTable, target: &str) -> Vec<PathBuf> {
    let extension = table.template_extension();
    let first_existing = |roots: &[PathBuf], relative: &str| {
        roots.iter().find_map(|root| probe(root, relative, extension))
    };

    match Specifier::parse(target) {
        Specifier::Absolute(absolute) => vec![normalize_path(Path::new(absolute))],
        Specifier::Namespaced {
            namespace,
            rest,
        } => first_existing(table.roots(namespace), rest).into_iter().collect(),
        Specifier::Shorthand {
            namespace,
            component,
        } => first_existing(table.roots(namespace), &format!("{component}/{component}"))
            .into_iter()
            .collect(),
        Specifier::Relative(relative) => {
            let mut seen = HashSet::new();
            table
                .all_roots()
                .filter_map(|(_, root)| probe(root, relative, extension))
                .filter(|path| seen.insert(path.clone()))
                .collect()
        }
    }
}

/// First extension candidate of `relative` that exists under `root`.
fn probe(root: &Path, relative: &str, extension: &str) -> Option<PathBuf> {
    extension_candidates(relative, extension)
        .into_iter()
        .map(|candidate| absolutize(root, Path::new(&candidate)))
        .find(|path| path.is_file())
}

/// `@namespace/relative` and plain-relative names of `file`.
fn file_aliases(table: &NamespaceTable, file: &Path) -> Vec<String> {
    table
        .all_roots()
        .filter_map(|(kind, root)| {
            let relative = file.strip_prefix(root).ok()?;
            let relative = normalize_path_for_storage(relative);
            Some(match kind {
                RootKind::Namespace(id) => {
                    TemplateKey::namespaced(id, &relative).as_str().to_string()
                }
                RootKind::Plain => relative,
            })
        })
        .collect()
}
