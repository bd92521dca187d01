//! Forward dependency walk: which sidecar scripts does a template pull in?
//!
//! Starting from one or more specifiers, the walk resolves each template,
//! extracts its references and descends into them depth-first. After all of a
//! template's references have been processed, the walk checks for a sidecar
//! script next to the resolved file (`card.twig` → `card.js`) and records it.
//!
//! The visited set is keyed by the *unresolved* specifier string, so a cycle
//! of references terminates before resolution even happens twice. The stack
//! is explicit: deep include chains cannot overflow the call stack.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::cache::TemplateSourceCache;
use crate::namespace::NamespaceTable;
use crate::templating::extract_references;

use super::{TemplateGraph, TemplateResolver};

/// Outcome of a forward walk.
#[derive(Debug, Default)]
pub struct ForwardWalk {
    /// Sidecar scripts reachable from the start specifiers, sorted
    pub scripts: BTreeSet<PathBuf>,
    /// Every `referrer → reference` edge seen during the walk
    pub graph: TemplateGraph,
    /// Specifiers that no strategy could resolve, in visit order
    pub unresolved: Vec<String>,
}

enum Frame {
    /// Visit a specifier
    Enter(String),
    /// All references of a resolved template are done; check its sidecar
    Exit(PathBuf),
}

/// Walks the references of `starts` and collects everything reachable.
///
/// Unresolved specifiers are logged and skipped. Reference cycles are legal
/// and reported with a warning once the walk completes.
pub fn walk<S: AsRef<str>>(
    table: &NamespaceTable,
    cache: &mut TemplateSourceCache,
    starts: &[S],
) -> ForwardWalk {
    let resolver = TemplateResolver::new(table);
    let mut result = ForwardWalk::default();
    let mut visited: HashSet<String> = HashSet::new();
    let mut stack: Vec<Frame> =
        starts.iter().rev().map(|s| Frame::Enter(s.as_ref().to_string())).collect();

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(specifier) => {
                if !visited.insert(specifier.clone()) {
                    continue;
                }
                result.graph.ensure_node(&specifier);

                let Some(template) = resolver.resolve(cache, &specifier) else {
                    debug!("Skipping unresolved dependency: {specifier}");
                    result.unresolved.push(specifier);
                    continue;
                };

                let references = extract_references(&template.content, table.template_extension());
                for reference in &references {
                    result.graph.add_reference(&specifier, reference);
                }

                if let Some(path) = template.source_path {
                    stack.push(Frame::Exit(path));
                }
                for reference in references.into_iter().rev() {
                    if !visited.contains(&reference) {
                        stack.push(Frame::Enter(reference));
                    }
                }
            }
            Frame::Exit(template_path) => {
                let sidecar = template_path.with_extension(table.script_extension());
                if sidecar.is_file() {
                    debug!("Found component script {}", sidecar.display());
                    result.scripts.insert(sidecar);
                }
            }
        }
    }

    if let Some(cycle) = result.graph.find_cycle() {
        warn!("Template reference cycle: {}", cycle.join(" → "));
    }

    result
}

/// Sidecar scripts reachable from `starts`, sorted and de-duplicated.
///
/// # Examples
///
/// ```rust,no_run
/// use twine_cli::cache::TemplateSourceCache;
/// use twine_cli::config::TwineConfig;
/// use twine_cli::namespace::NamespaceTable;
/// use twine_cli::resolver::collect_component_scripts;
///
/// let mut config = TwineConfig::new(".");
/// config.add_namespace_flag("widgets=components").unwrap();
/// let table = NamespaceTable::from_config(&config);
/// let mut cache = TemplateSourceCache::init(&table);
///
/// for script in collect_component_scripts(&table, &mut cache, &["@widgets/card/card.twig"]) {
///     println!("import '{}';", script.display());
/// }
/// ```
pub fn collect_component_scripts<S: AsRef<str>>(
    table: &NamespaceTable,
    cache: &mut TemplateSourceCache,
    starts: &[S],
) -> BTreeSet<PathBuf> {
    walk(table, cache, starts).scripts
}
