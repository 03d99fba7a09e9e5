//! Path utility functions for normalization and relative rendering.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by processing `.` and `..` components lexically.
/// This does not access the filesystem and does not follow symlinks.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Keep the `..` if there is nothing left to pop
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => {
                result.push(component);
            }
        }
    }
    result
}

/// Check if a path is under a given directory by comparing normalized path components.
/// Returns true if `path` is under `dir` (i.e., `dir` is a prefix of `path`).
pub fn is_path_under(path: &Path, dir: &Path) -> bool {
    let normalized_path = normalize_path(path);
    let normalized_dir = normalize_path(dir);

    let path_components: Vec<_> = normalized_path.components().collect();
    let dir_components: Vec<_> = normalized_dir.components().collect();

    if path_components.len() < dir_components.len() {
        return false;
    }

    dir_components
        .iter()
        .zip(path_components.iter())
        .all(|(d, p)| d == p)
}

/// Calculate the relative path from a directory to a target path.
///
/// For example, if from_dir is `/home/user/.shelf` and to_path is
/// `/home/user/.shelf/me/a/versions/1/a.jar`, this returns `me/a/versions/1/a.jar`.
///
/// Returns `None` if a relative path cannot be computed (e.g., different drive letters on Windows).
pub fn relative_path_from_dir(from_dir: &Path, to_path: &Path) -> Option<PathBuf> {
    let result = pathdiff::diff_paths(normalize_path(to_path), normalize_path(from_dir))?;

    // An absolute result means no relative path exists
    if result.is_absolute() {
        return None;
    }

    Some(result)
}

/// Render `path` relative to `root` using `/` separators on every platform.
///
/// Returns `None` when `path` is not under `root`; such locations cannot be
/// expressed relative to a relocatable root.
pub fn portable_relative_path(root: &Path, path: &Path) -> Option<String> {
    if !is_path_under(path, root) {
        return None;
    }
    let relative = relative_path_from_dir(root, path)?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
