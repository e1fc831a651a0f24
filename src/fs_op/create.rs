use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Create `path` and any missing parents, applying `mode` to every
/// directory created along the way (subject to the process umask), then set
/// `mode` exactly on `path` itself.
///
/// An existing directory is left untouched, permissions included. On
/// non-Unix platforms the mode is ignored.
pub fn create_dir_all(path: &Path, mode: u32) -> io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    builder.create(path)?;
    set_mode(path, mode)
}

/// Write `data` to `path`, creating or truncating it, and set its
/// permission bits to `mode`. The parent directory must already exist.
pub fn write_file(path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.flush()?;
    drop(file);
    set_mode(path, mode)
}

/// Set the permission bits of `path`. No-op on non-Unix platforms.
pub fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_nested_dirs_and_file() {
        let td = tempdir().unwrap();
        let dir = td.path().join("a/b");
        let file = dir.join("f.txt");
        create_dir_all(&dir, 0o755).unwrap();
        write_file(&file, b"hello", 0o644).unwrap();
        assert!(dir.is_dir());
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "hello");
    }

    #[test]
    fn existing_dir_is_not_an_error() {
        let td = tempdir().unwrap();
        create_dir_all(td.path(), 0o700).unwrap();
        create_dir_all(td.path(), 0o700).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn existing_dir_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;
        let td = tempdir().unwrap();
        let dir = td.path().join("d");
        create_dir_all(&dir, 0o700).unwrap();
        create_dir_all(&dir, 0o755).unwrap();
        let mode = std::fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
    }

    #[test]
    fn write_truncates_previous_content() {
        let td = tempdir().unwrap();
        let file = td.path().join("f.txt");
        write_file(&file, b"a longer first version", 0o644).unwrap();
        write_file(&file, b"short", 0o644).unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "short");
    }

    #[test]
    fn write_without_parent_fails() {
        let td = tempdir().unwrap();
        let file = td.path().join("missing/f.txt");
        assert!(write_file(&file, b"x", 0o644).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn modes_are_applied_exactly() {
        use std::os::unix::fs::PermissionsExt;
        let td = tempdir().unwrap();
        let dir = td.path().join("d");
        let file = dir.join("f");
        create_dir_all(&dir, 0o750).unwrap();
        write_file(&file, b"", 0o600).unwrap();
        let dmode = std::fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        let fmode = std::fs::metadata(&file).unwrap().permissions().mode() & 0o777;
        assert_eq!(dmode, 0o750);
        assert_eq!(fmode, 0o600);
    }
}
