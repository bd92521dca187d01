//! Static extraction of template references.
//!
//! Scans a template body for the directives that pull in other templates and
//! returns the literal specifiers they name. Nothing is resolved or checked
//! for existence here.
//!
//! # Recognized directives
//!
//! | Kind      | Forms                                              |
//! |-----------|----------------------------------------------------|
//! | `extends` | `{% extends 'x' %}`                                |
//! | `include` | `{% include 'x' %}`, `{{ include('x') }}`          |
//! | `embed`   | `{% embed 'x' %}`, `{% embed 'x' with {...} %}`    |
//! | `import`  | `{% import 'x' as m %}`                            |
//! | `from`    | `{% from 'x' import m %}`                          |
//!
//! Whitespace-control markers (`{%-`, `{{-`) are accepted. Only the first
//! quoted literal argument counts; dynamic references such as
//! `{% include name %}` are ignored.
//!
//! # Ordering
//!
//! Results are grouped by kind in the order of the table above and, within a
//! kind, follow source position. Both include forms are one kind, so a tag
//! and a function call interleave by position. Duplicates are kept.
//!
//! ```rust
//! use twine_cli::templating::extract_references;
//!
//! let body = r#"
//! {{ include('b.twig') }}
//! {% extends "base.twig" %}
//! {% include 'a.twig' %}
//! {% include 'widgets:icon' %}
//! "#;
//!
//! assert_eq!(
//!     extract_references(body, "twig"),
//!     vec!["base.twig", "b.twig", "a.twig", "@widgets/icon/icon.twig"]
//! );
//! ```

use regex::Regex;
use std::sync::LazyLock;

use crate::resolver::Specifier;

/// A single quoted literal: `'...'` or `"..."`.
const QUOTED: &str = r#"(?:'([^'\n]*)'|"([^"\n]*)")"#;

/// Reference directive kinds, in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Extends,
    Include,
    Embed,
    Import,
    From,
}

impl ReferenceKind {
    /// All kinds, in the order their references are reported.
    pub const ALL: [Self; 5] = [Self::Extends, Self::Include, Self::Embed, Self::Import, Self::From];

    fn patterns(self) -> &'static [Regex] {
        match self {
            Self::Extends => &EXTENDS,
            Self::Include => &INCLUDE,
            Self::Embed => &EMBED,
            Self::Import => &IMPORT,
            Self::From => &FROM,
        }
    }
}

fn tag_patterns(keyword: &str) -> Vec<Regex> {
    Regex::new(&format!(r"\{{%-?\s*{keyword}\s+{QUOTED}")).into_iter().collect()
}

static EXTENDS: LazyLock<Vec<Regex>> = LazyLock::new(|| tag_patterns("extends"));
static EMBED: LazyLock<Vec<Regex>> = LazyLock::new(|| tag_patterns("embed"));
static IMPORT: LazyLock<Vec<Regex>> = LazyLock::new(|| tag_patterns("import"));
static FROM: LazyLock<Vec<Regex>> = LazyLock::new(|| tag_patterns("from"));
static INCLUDE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let mut patterns = tag_patterns("include");
    patterns.extend(Regex::new(&format!(r"\{{\{{-?\s*include\s*\(\s*{QUOTED}")));
    patterns
});

/// Extracts every literal reference in `body`, kind by kind.
///
/// Legacy `prefix:name` references are normalized to
/// `@prefix/name/name.<extension>`. Never fails: malformed markup simply
/// yields fewer matches.
#[must_use]
pub fn extract_references(body: &str, extension: &str) -> Vec<String> {
    ReferenceKind::ALL
        .into_iter()
        .flat_map(|kind| extract_kind(body, kind))
        .map(|reference| normalize_reference(&reference, extension))
        .collect()
}

/// References of a single kind, in source order.
#[must_use]
pub fn extract_kind(body: &str, kind: ReferenceKind) -> Vec<String> {
    let mut found: Vec<(usize, String)> = kind
        .patterns()
        .iter()
        .flat_map(|pattern| pattern.captures_iter(body))
        .filter_map(|caps| {
            let start = caps.get(0)?.start();
            let literal = caps.get(1).or_else(|| caps.get(2))?;
            Some((start, literal.as_str().to_string()))
        })
        .collect();

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, reference)| reference).collect()
}

/// Rewrites `prefix:name` to `@prefix/name/name.<extension>`.
fn normalize_reference(reference: &str, extension: &str) -> String {
    match Specifier::parse(reference) {
        Specifier::Shorthand {
            namespace,
            component,
        } => format!("@{namespace}/{component}/{component}.{extension}"),
        _ => reference.to_string(),
    }
}
