use std::fs;
use std::io;
use std::path::Path;

use crate::fs_op::path::{check_removable, Refusal};
use crate::fs_op::stat::PathType;

/// Result of a removal attempt that did not hit an I/O error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The path existed and was removed.
    Removed,
    /// Nothing was at the path; nothing to do.
    Absent,
    /// The guard declined to touch the path.
    Refused(Refusal),
}

/// Remove a file or directory at `path`.
///
/// Directories are removed recursively. A path that does not exist is a
/// no-op reported as `Removal::Absent`, so callers can attempt removal
/// without checking first. Symlinks are unlinked, never followed.
pub fn remove_path(path: &Path) -> io::Result<Removal> {
    match PathType::of(path) {
        PathType::NotFound => Ok(Removal::Absent),
        PathType::Directory => {
            fs::remove_dir_all(path)?;
            Ok(Removal::Removed)
        }
        PathType::File | PathType::Symlink | PathType::Other => {
            fs::remove_file(path)?;
            Ok(Removal::Removed)
        }
    }
}

/// Remove the directory tree at `path` only if it is strictly nested under
/// `temp_root`.
///
/// Refusals are returned as `Removal::Refused` and leave the filesystem
/// untouched; see [`check_removable`] for the rules.
pub fn remove_dir_guarded(path: &Path, temp_root: &Path) -> io::Result<Removal> {
    match check_removable(path, temp_root) {
        Ok(clean) => remove_path(&clean),
        Err(refusal) => {
            tracing::warn!("refusing to remove {}: {}", path.display(), refusal);
            Ok(Removal::Refused(refusal))
        }
    }
}
