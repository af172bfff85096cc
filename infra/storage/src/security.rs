use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

fn traversal(path: &Path, reason: &'static str) -> StorageError {
    StorageError::PathTraversalAttempt {
        message: path.display().to_string().into(),
        context: Some(reason.into()),
    }
}

/// Collapses `.` and `..` lexically. `..` may never climb above the sandbox root.
fn normalize_relative(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for c in path.components() {
        match c {
            Component::CurDir => {},
            Component::Normal(seg) => out.push(seg),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(traversal(path, "Path attempted to escape sandbox via '..'"));
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(traversal(path, "Absolute paths are not allowed in sandbox"));
            },
        }
    }

    Ok(out)
}

/// Joins `path` onto `root` and proves the result stays inside `root`,
/// following symlinks of whatever part of the path already exists.
pub(crate) fn resolve_path(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();
    if path.is_absolute() {
        return Err(traversal(path, "Absolute paths are not allowed in sandbox"));
    }

    let joined = root.join(normalize_relative(path)?);

    match joined.canonicalize() {
        Ok(canonical) if canonical.starts_with(root) => Ok(canonical),
        Ok(canonical) => Err(traversal(&canonical, "Resolved path is outside the sandbox")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => validate_ancestors(root, &joined),
        Err(e) => Err(StorageError::Io { source: e, context: None }),
    }
}

/// Places `path` under the optional namespace directory. With sharding on, the
/// file lands in two extra levels named after its first four characters
/// (`ab/cd/abcdef.png`); subdirectories given by the caller are kept.
pub(crate) fn resolve_layout(
    root: &Path,
    namespace: Option<&str>,
    path: impl AsRef<Path>,
    sharded: bool,
) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();
    let filename =
        path.file_name().and_then(|s| s.to_str()).ok_or_else(|| StorageError::FileNotFound {
            message: path.display().to_string().into(),
            context: Some("Target must be a file".into()),
        })?;

    let mut target = PathBuf::new();
    if let Some(ns) = namespace {
        target.push(ns);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        target.push(parent);
    }

    if sharded {
        let chars: Vec<char> = filename.chars().take(4).collect();
        if chars.len() == 4 {
            target.push(chars[..2].iter().collect::<String>());
            target.push(chars[2..].iter().collect::<String>());
        }
    }
    target.push(filename);

    resolve_path(root, target)
}

/// For paths that do not exist yet: the nearest existing ancestor must live in the sandbox.
fn validate_ancestors(root: &Path, joined: &Path) -> Result<PathBuf, StorageError> {
    if !joined.starts_with(root) {
        return Err(traversal(joined, "Path is outside sandbox boundaries"));
    }

    let mut current = Some(joined);
    while let Some(path) = current {
        if path == root {
            return Ok(joined.to_path_buf());
        }

        if path.exists() {
            return match path.canonicalize() {
                Ok(canonical) if canonical.starts_with(root) => Ok(joined.to_path_buf()),
                Ok(canonical) => {
                    Err(traversal(&canonical, "Existing parent directory is a symlink outside sandbox"))
                },
                Err(e) => Err(StorageError::Io {
                    source: e,
                    context: Some("Failed to verify parent directory".into()),
                }),
            };
        }

        current = path.parent();
    }

    Err(traversal(joined, "No valid parent directory found within sandbox"))
}
