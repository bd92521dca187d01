//! Path helpers shared by the namespace table, the cache and the resolver.
//!
//! Template keys are always stored with forward slashes, regardless of the
//! host platform, so that keys produced on Windows and Unix compare equal.

use std::path::{Component, Path, PathBuf};

/// Normalizes a path lexically, resolving `.` and `..` components.
///
/// No filesystem access happens here: symlinks are not followed and the path
/// does not need to exist. Leading `..` components of a relative path are kept.
///
/// # Examples
///
/// ```rust
/// use twine_cli::utils::platform::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize_path(Path::new("/foo/./bar/../baz")), PathBuf::from("/foo/baz"));
/// assert_eq!(normalize_path(Path::new("../src/./lib.rs")), PathBuf::from("../src/lib.rs"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Resolves `path` against `base` (unless already absolute) and normalizes it.
#[must_use]
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// Converts a path to the forward-slash form used for template keys.
///
/// Windows extended-length prefixes (`\\?\`) are stripped.
///
/// # Examples
///
/// ```rust
/// use twine_cli::utils::platform::normalize_path_for_storage;
///
/// assert_eq!(normalize_path_for_storage("widgets\\button.twig"), "widgets/button.twig");
/// ```
pub fn normalize_path_for_storage<P: AsRef<Path>>(path: P) -> String {
    let path_str = path.as_ref().to_string_lossy();

    let cleaned = if let Some(stripped) = path_str.strip_prefix(r"\\?\UNC\") {
        format!("//{}", stripped)
    } else if let Some(stripped) = path_str.strip_prefix(r"\\?\") {
        stripped.to_string()
    } else {
        path_str.to_string()
    };

    cleaned.replace('\\', "/")
}

/// Component-wise, looser prefix test: trailing separators are ignored and
/// ASCII case differences are tolerated.
///
/// Returns the remainder of `path` below `root` in storage form.
pub fn strip_prefix_loose(path: &Path, root: &Path) -> Option<String> {
    let path_str = normalize_path_for_storage(path);
    let root_str = normalize_path_for_storage(root);
    let root_str = root_str.trim_end_matches('/');

    if root_str.is_empty() || path_str.len() <= root_str.len() {
        return None;
    }

    let (head, tail) = path_str.split_at(root_str.len());
    if !head.eq_ignore_ascii_case(root_str) {
        return None;
    }

    let rest = tail.strip_prefix('/')?;
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_removes_dots() {
        assert_eq!(normalize_path(Path::new("/a/b/./c/../d")), PathBuf::from("/a/b/d"));
        assert_eq!(normalize_path(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize_path(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_absolutize_relative_and_absolute() {
        let base = Path::new("/project");
        assert_eq!(absolutize(base, Path::new("components")), PathBuf::from("/project/components"));
        assert_eq!(absolutize(base, Path::new("../shared")), PathBuf::from("/shared"));
        assert_eq!(absolutize(base, Path::new("/abs/dir")), PathBuf::from("/abs/dir"));
    }

    #[test]
    fn test_storage_form_uses_forward_slashes() {
        assert_eq!(normalize_path_for_storage("a\\b\\c.twig"), "a/b/c.twig");
        assert_eq!(normalize_path_for_storage(r"\\?\C:\tpl\x.twig"), "C:/tpl/x.twig");
    }

    #[test]
    fn test_strip_prefix_loose() {
        let path = Path::new("/Project/Components/button.twig");
        assert_eq!(
            strip_prefix_loose(path, Path::new("/project/components/")),
            Some("button.twig".to_string())
        );
        assert_eq!(strip_prefix_loose(path, Path::new("/project/comp")), None);
        assert_eq!(strip_prefix_loose(path, Path::new("/other")), None);
    }
}
