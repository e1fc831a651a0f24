use std::fs;
use std::path::Path;

/// Lightweight classification of a filesystem path's kind.
///
/// Symlinks are reported as such rather than followed, so a dangling link
/// is still visible to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    /// The path does not exist.
    NotFound,
    /// The path exists and is a directory.
    Directory,
    /// The path exists and is a regular file.
    File,
    /// The path is a symbolic link.
    Symlink,
    /// Socket, FIFO, device and the like.
    Other,
}

impl PathType {
    /// Classify `path` with a single `lstat`.
    pub fn of<P: AsRef<Path>>(path: P) -> Self {
        match fs::symlink_metadata(path.as_ref()) {
            Err(_) => PathType::NotFound,
            Ok(meta) => {
                let ft = meta.file_type();
                if ft.is_symlink() {
                    PathType::Symlink
                } else if ft.is_dir() {
                    PathType::Directory
                } else if ft.is_file() {
                    PathType::File
                } else {
                    PathType::Other
                }
            }
        }
    }
}

/// Return `true` if the provided `path` exists (dangling symlinks included).
pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    PathType::of(path) != PathType::NotFound
}

/// Return `true` if the provided `path` is a directory.
pub fn is_dir<P: AsRef<Path>>(path: P) -> bool {
    PathType::of(path) == PathType::Directory
}

/// Return `true` if the provided `path` is a regular file.
pub fn is_file<P: AsRef<Path>>(path: P) -> bool {
    PathType::of(path) == PathType::File
}
