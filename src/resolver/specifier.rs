//! Specifier classification and extension probing.
//!
//! ```text
//! Specifier := PlainPath | '@' Namespace '/' Path | Namespace ':' Component | AbsolutePath
//! ```

use std::path::Path;

use crate::constants::COMPOUND_KIND;

/// A parsed import specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specifier<'a> {
    /// `@namespace/rest`
    Namespaced {
        namespace: &'a str,
        rest: &'a str,
    },
    /// `namespace:component`
    Shorthand {
        namespace: &'a str,
        component: &'a str,
    },
    /// A filesystem-absolute path, including drive-letter paths
    Absolute(&'a str),
    /// Anything else: a path relative to some template root
    Relative(&'a str),
}

impl<'a> Specifier<'a> {
    /// Classifies `raw`. Never fails; unrecognized input is `Relative`.
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        if let Some(body) = raw.strip_prefix('@')
            && let Some((namespace, rest)) = body.split_once('/')
            && !namespace.is_empty()
        {
            return Self::Namespaced {
                namespace,
                rest,
            };
        }

        if is_absolute(raw) {
            return Self::Absolute(raw);
        }

        if let Some((namespace, component)) = raw.split_once(':')
            && is_shorthand_part(namespace)
            && is_shorthand_part(component)
        {
            return Self::Shorthand {
                namespace,
                component,
            };
        }

        Self::Relative(raw)
    }
}

fn is_shorthand_part(part: &str) -> bool {
    !part.is_empty() && !part.contains(['/', '\\', ':', '@'])
}

/// Whether `raw` is an absolute path on this host or looks like a Windows
/// drive path (`C:\x`, `C:/x`).
#[must_use]
pub fn is_absolute(raw: &str) -> bool {
    if Path::new(raw).is_absolute() {
        return true;
    }

    let bytes = raw.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// Candidate file names for a specifier path, in probe order.
///
/// A path whose last segment already has an extension is probed as-is. A
/// bare path is tried unmodified, then with `.<ext>`, then with
/// `.html.<ext>`.
///
/// # Examples
///
/// ```rust
/// use twine_cli::resolver::specifier::extension_candidates;
///
/// assert_eq!(
///     extension_candidates("card", "twig"),
///     vec!["card", "card.twig", "card.html.twig"]
/// );
/// assert_eq!(extension_candidates("card.twig", "twig"), vec!["card.twig"]);
/// ```
#[must_use]
pub fn extension_candidates(path: &str, extension: &str) -> Vec<String> {
    let last_segment = path.rsplit(['/', '\\']).next().unwrap_or(path);
    if last_segment.contains('.') || last_segment.is_empty() {
        return vec![path.to_string()];
    }

    vec![
        path.to_string(),
        format!("{path}.{extension}"),
        format!("{path}.{COMPOUND_KIND}.{extension}"),
    ]
}
