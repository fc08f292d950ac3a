//! Path utilities bridging slash-separated import paths and filesystem paths.
//!
//! Import paths always use `/`, regardless of platform. Filesystem paths are
//! built by pushing each import path element so the conversion is lossless on
//! Windows as well.

use std::path::{Component, Path, PathBuf};

/// Lexically normalizes a path, resolving `.` and `..` without touching the disk.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                } else {
                    components.push(component);
                }
            }
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

/// Joins a slash-separated import path onto a filesystem directory.
#[must_use]
pub fn import_to_path(base: &Path, import_path: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for element in import_path.split('/').filter(|e| !e.is_empty()) {
        path.push(element);
    }
    path
}

/// Returns the slash-separated path of `dir` relative to `base`.
///
/// Returns `None` when `dir` is not inside `base`. `base` itself maps to an
/// empty string.
#[must_use]
pub fn path_to_import(base: &Path, dir: &Path) -> Option<String> {
    let rel = dir.strip_prefix(base).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Returns true if `path` equals `prefix` or lies below it on an element boundary.
///
/// ```rust
/// use gvend_cli::utils::fs::has_path_prefix;
///
/// assert!(has_path_prefix("co1/pk1/sub", "co1/pk1"));
/// assert!(has_path_prefix("co1/pk1", "co1/pk1"));
/// assert!(!has_path_prefix("co1/pk10", "co1/pk1"));
/// ```
#[must_use]
pub fn has_path_prefix(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Walks from `start` towards the filesystem root looking for `relative`.
///
/// Returns the first existing `dir/relative` found, checking `start` first.
#[must_use]
pub fn find_upward(start: &Path, relative: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(relative);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
