use std::path::{Component, Path, PathBuf};

/// Image sources starting with these are already hosted and never uploaded.
pub const REMOTE_SCHEMES: &[&str] = &["http://", "https://"];

/// Is this image source a remote URL?
pub fn is_remote_url(path: &str) -> bool {
    REMOTE_SCHEMES.iter().any(|scheme| path.starts_with(scheme))
}

/// Anything that isn't a remote URL is read from the local filesystem,
/// including `file:`-less absolute paths and paths that don't exist.
pub fn is_local_path(path: &str) -> bool {
    !is_remote_url(path)
}

/// Resolve an image path from a document to an absolute filesystem path.
///
/// Relative paths are joined onto `base_dir`, or the working directory when
/// no base is given. `.` and `..` segments are folded without touching the
/// filesystem.
pub fn resolve_asset_path(path: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        return normalize_lexically(path);
    }

    let cwd = std::env::current_dir().unwrap_or_default();
    let base = match base_dir {
        Some(base) if base.is_absolute() => base.to_path_buf(),
        Some(base) => cwd.join(base),
        None => cwd,
    };
    normalize_lexically(&base.join(path))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root leaves the root in place.
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
