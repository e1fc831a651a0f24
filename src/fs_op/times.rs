//! Timestamp overrides for fixture entries.

use std::io;
use std::path::Path;
use std::time::SystemTime;

use filetime::{set_file_times, FileTime};

/// Set both the access and modification time of `path` to `when`.
///
/// Works on files and directories alike.
pub fn set_times(path: &Path, when: SystemTime) -> io::Result<()> {
    let ft = FileTime::from_system_time(when);
    set_file_times(path, ft, ft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::tempdir;

    #[test]
    fn sets_file_and_dir_mtime() {
        let td = tempdir().unwrap();
        let file = td.path().join("f.txt");
        std::fs::write(&file, b"x").unwrap();
        let when = UNIX_EPOCH + Duration::from_secs(1_600_000_000);

        set_times(&file, when).unwrap();
        set_times(td.path(), when).unwrap();

        assert_eq!(std::fs::metadata(&file).unwrap().modified().unwrap(), when);
        assert_eq!(std::fs::metadata(td.path()).unwrap().modified().unwrap(), when);
    }

    #[test]
    fn missing_path_is_an_error() {
        let td = tempdir().unwrap();
        assert!(set_times(&td.path().join("nope"), SystemTime::now()).is_err());
    }
}
