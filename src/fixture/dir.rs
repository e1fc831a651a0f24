use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use super::{require_created, Failures, FileId, Fixture, NodeId, ParentId, DEFAULT_DIR_PERMISSIONS};
use crate::error::{FixtureError, FixtureKind};
use crate::fs_op::{create, path::join_under, times};

/// Optional settings for a directory or repository fixture.
#[derive(Debug, Clone, Default)]
pub struct DirArgs {
    permissions: Option<u32>,
    modified: Option<SystemTime>,
}

impl DirArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory mode; defaults to `0o755`.
    pub fn permissions(mut self, mode: u32) -> Self {
        self.permissions = Some(mode);
        self
    }

    /// Modification time applied once the directory's contents exist.
    pub fn modified(mut self, when: SystemTime) -> Self {
        self.modified = Some(when);
        self
    }
}

/// A directory under the root or under another directory.
#[derive(Debug)]
pub struct DirFixture {
    pub(crate) kind: FixtureKind,
    pub(crate) name: PathBuf,
    pub(crate) relative_path: PathBuf,
    pub(crate) permissions: u32,
    pub(crate) modified: Option<SystemTime>,
    pub(crate) parent: ParentId,
    pub(crate) children: Vec<NodeId>,
    pub(crate) files: Vec<FileId>,
    pub(crate) dir: Option<PathBuf>,
}

impl DirFixture {
    pub(crate) fn new(
        kind: FixtureKind,
        name: &Path,
        parent: ParentId,
        parent_relative: &Path,
        args: DirArgs,
    ) -> Self {
        Self {
            kind,
            name: name.to_path_buf(),
            relative_path: join_under(parent_relative, name),
            permissions: args.permissions.unwrap_or(DEFAULT_DIR_PERMISSIONS),
            modified: args.modified,
            parent,
            children: Vec::new(),
            files: Vec::new(),
            dir: None,
        }
    }

    pub fn name(&self) -> &Path {
        &self.name
    }

    pub fn permissions(&self) -> u32 {
        self.permissions
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    pub fn parent(&self) -> ParentId {
        self.parent
    }

    /// Files declared directly in this directory, in declaration order.
    pub fn files(&self) -> &[FileId] {
        &self.files
    }

    pub fn is_created(&self) -> bool {
        self.dir.is_some()
    }

    /// Path relative to the root fixture, available before creation.
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Absolute path of this directory.
    ///
    /// # Panics
    ///
    /// If the tree has not been created yet.
    #[track_caller]
    pub fn dir(&self) -> &Path {
        require_created(self.dir.as_ref(), self.kind, &self.name)
    }

    pub fn try_dir(&self) -> Result<&Path, FixtureError> {
        self.dir
            .as_deref()
            .ok_or_else(|| FixtureError::not_created(self.kind, self.name.display().to_string()))
    }

    /// Absolute path of `rel` inside this directory. Nothing is created.
    ///
    /// # Panics
    ///
    /// If the tree has not been created yet.
    #[track_caller]
    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        join_under(self.dir(), rel.as_ref())
    }

    pub(crate) fn create_in(&mut self, parent_dir: &Path, failures: &mut Failures<'_>) -> PathBuf {
        let dir = join_under(parent_dir, &self.name);
        self.dir = Some(dir.clone());
        match create::create_dir_all(&dir, self.permissions) {
            Ok(()) => debug!("created directory {}", dir.display()),
            Err(source) => failures.record(FixtureError::CreateDir {
                path: dir.clone(),
                source,
            }),
        }
        dir
    }

    /// Apply the modification time override. Runs after the directory's
    /// files and children exist, since creating them bumps the mtime.
    pub(crate) fn apply_modified(&self, failures: &mut Failures<'_>) {
        let (Some(when), Some(dir)) = (self.modified, self.dir.as_ref()) else {
            return;
        };
        if let Err(source) = times::set_times(dir, when) {
            failures.record(FixtureError::SetTimes {
                path: dir.clone(),
                source,
            });
        }
    }
}

impl Fixture for DirFixture {
    fn dir(&self) -> &Path {
        DirFixture::dir(self)
    }

    fn relative_path(&self) -> &Path {
        DirFixture::relative_path(self)
    }
}
