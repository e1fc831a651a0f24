use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Reasons the removal guard refuses to delete a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    Empty,
    Relative,
    FilesystemRoot,
    TempRoot,
    Unrelated,
    OutsideTempRoot,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Refusal::Empty => write!(f, "empty path"),
            Refusal::Relative => write!(f, "path is not absolute"),
            Refusal::FilesystemRoot => write!(f, "path is a filesystem root"),
            Refusal::TempRoot => write!(f, "path is the temporary directory root"),
            Refusal::Unrelated => write!(f, "path cannot be related to the temporary directory root"),
            Refusal::OutsideTempRoot => write!(f, "path lies outside the temporary directory root"),
        }
    }
}

/// Join `name` under `base`, keeping the result inside `base`.
///
/// Root and drive prefixes of `name` are dropped, `.` is skipped, and `..`
/// only cancels a segment that `name` itself added; it never climbs above
/// `base`. `Path::join` would replace the base for an absolute name or walk
/// out of it for `../x`; fixtures must never be written outside their parent.
pub fn join_under(base: &Path, name: &Path) -> PathBuf {
    let mut out = base.to_path_buf();
    let mut depth = 0usize;
    for c in name.components() {
        match c {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    out.pop();
                    depth -= 1;
                }
            }
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
        }
    }
    out
}

/// Lexically clean `path`: drop `.` segments and resolve `..` against a
/// preceding normal segment. `..` never climbs above a root; leading `..`
/// segments of a relative path are kept. An empty result becomes `.`.
///
/// No filesystem access happens here; symlinks are not resolved.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for c in path.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(c),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// The filesystem root of `path`'s volume: `/` on Unix, `C:\` for a
/// Windows drive path. Relative paths have no root and yield an empty path.
pub fn filesystem_root(path: &Path) -> PathBuf {
    path.components()
        .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
        .collect()
}

/// Express `path` relative to `base`, climbing with `..` where needed.
///
/// Both inputs are normalized first. Returns `None` when the two paths do
/// not share the same anchor (one absolute and one relative, or different
/// volumes), since no relative path links them. Equal paths yield `.`.
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    let path = normalize(path);
    let base = normalize(base);
    if filesystem_root(&path) != filesystem_root(&base) {
        return None;
    }

    let path_parts: Vec<Component<'_>> = path
        .components()
        .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir | Component::CurDir))
        .collect();
    let base_parts: Vec<Component<'_>> = base
        .components()
        .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir | Component::CurDir))
        .collect();

    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    // A relative base that starts with `..` cannot be walked back out of.
    if base_parts[common..]
        .iter()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return None;
    }

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for c in &path_parts[common..] {
        rel.push(c.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    Some(rel)
}

/// Decide whether `path` may be deleted recursively, given the platform
/// temporary directory root `temp_root`.
///
/// Only a normalized absolute path strictly nested under `temp_root` is
/// accepted; it is returned on success. This function is pure: it never
/// touches the filesystem.
pub fn check_removable(path: &Path, temp_root: &Path) -> Result<PathBuf, Refusal> {
    if path.as_os_str().is_empty() {
        return Err(Refusal::Empty);
    }

    let path = normalize(path);
    if !path.is_absolute() {
        return Err(Refusal::Relative);
    }

    if path == filesystem_root(&path) {
        return Err(Refusal::FilesystemRoot);
    }

    let temp_root = normalize(temp_root);
    if path == temp_root {
        return Err(Refusal::TempRoot);
    }

    let rel = relative_to(&path, &temp_root).ok_or(Refusal::Unrelated)?;
    if rel == Path::new(".") {
        return Err(Refusal::TempRoot);
    }
    if matches!(rel.components().next(), Some(Component::ParentDir)) {
        return Err(Refusal::OutsideTempRoot);
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_dots_and_resolves_parents() {
        assert_eq!(normalize(Path::new("/tmp/./a/../b/")), PathBuf::from("/tmp/b"));
        assert_eq!(normalize(Path::new("/../..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("../a/../../b")), PathBuf::from("../../b"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn join_under_ignores_leading_root() {
        let base = Path::new("/tmp/root");
        assert_eq!(join_under(base, Path::new("a/b")), PathBuf::from("/tmp/root/a/b"));
        assert_eq!(join_under(base, Path::new("/etc")), PathBuf::from("/tmp/root/etc"));
        assert_eq!(join_under(base, Path::new("")), PathBuf::from("/tmp/root"));
    }

    #[test]
    fn join_under_never_climbs_above_base() {
        let base = Path::new("/tmp/root");
        assert_eq!(join_under(base, Path::new("../x")), PathBuf::from("/tmp/root/x"));
        assert_eq!(join_under(base, Path::new("a/../../../b")), PathBuf::from("/tmp/root/b"));
        assert_eq!(join_under(base, Path::new("a/b/../c")), PathBuf::from("/tmp/root/a/c"));
        assert_eq!(join_under(base, Path::new("./a/.")), PathBuf::from("/tmp/root/a"));
        assert_eq!(join_under(Path::new(""), Path::new("../x")), PathBuf::from("x"));
    }

    #[test]
    fn filesystem_root_of_unix_paths() {
        assert_eq!(filesystem_root(Path::new("/tmp/x")), PathBuf::from("/"));
        assert_eq!(filesystem_root(Path::new("tmp/x")), PathBuf::new());
    }

    #[test]
    fn relative_to_climbs_and_descends() {
        let rel = |p: &str, b: &str| relative_to(Path::new(p), Path::new(b));
        assert_eq!(rel("/tmp/a/b", "/tmp"), Some(PathBuf::from("a/b")));
        assert_eq!(rel("/tmp", "/tmp"), Some(PathBuf::from(".")));
        assert_eq!(rel("/var/x", "/tmp"), Some(PathBuf::from("../var/x")));
        assert_eq!(rel("/tmp/../etc", "/tmp"), Some(PathBuf::from("../etc")));
        assert_eq!(rel("tmp/a", "/tmp"), None);
    }

    #[test]
    fn guard_refuses_dangerous_paths() {
        let tmp = Path::new("/tmp");
        let check = |p: &str| check_removable(Path::new(p), tmp);
        assert_eq!(check(""), Err(Refusal::Empty));
        assert_eq!(check("relative/dir"), Err(Refusal::Relative));
        assert_eq!(check("/"), Err(Refusal::FilesystemRoot));
        assert_eq!(check("/tmp/a/../.."), Err(Refusal::FilesystemRoot));
        assert_eq!(check("/tmp"), Err(Refusal::TempRoot));
        assert_eq!(check("/tmp/./"), Err(Refusal::TempRoot));
        assert_eq!(check("/tmp/x/.."), Err(Refusal::TempRoot));
        assert_eq!(check("/home/user"), Err(Refusal::OutsideTempRoot));
        assert_eq!(check("/tmp/../home"), Err(Refusal::OutsideTempRoot));
        assert_eq!(check("/tmpfoo"), Err(Refusal::OutsideTempRoot));
    }

    #[test]
    fn guard_accepts_nested_temp_paths() {
        let tmp = Path::new("/tmp/");
        assert_eq!(
            check_removable(Path::new("/tmp/my-test-abc"), tmp),
            Ok(PathBuf::from("/tmp/my-test-abc"))
        );
        assert_eq!(
            check_removable(Path::new("/tmp/a/./b/../c"), tmp),
            Ok(PathBuf::from("/tmp/a/c"))
        );
    }

    #[test]
    fn guard_with_relative_temp_root_is_unrelated() {
        assert_eq!(
            check_removable(Path::new("/tmp/x"), Path::new("tmp")),
            Err(Refusal::Unrelated)
        );
    }
}
