use std::ops::Deref;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{DirArgs, DirFixture, Failures, Fixture, ParentId, DEFAULT_DIR_PERMISSIONS};
use crate::error::{FixtureError, FixtureKind};
use crate::fs_op::create;

/// Name of the marker directory that makes a directory look like a
/// repository. No version-control tool is ever run.
pub const MARKER_DIR: &str = ".git";

/// A directory fixture that also gets a `.git` marker directory.
#[derive(Debug)]
pub struct RepoFixture {
    pub(crate) dir: DirFixture,
}

impl RepoFixture {
    pub(crate) fn new(name: &Path, parent: ParentId, parent_relative: &Path, args: DirArgs) -> Self {
        Self {
            dir: DirFixture::new(FixtureKind::Repo, name, parent, parent_relative, args),
        }
    }

    /// Absolute path of the marker directory.
    ///
    /// # Panics
    ///
    /// If the tree has not been created yet.
    #[track_caller]
    pub fn git_path(&self) -> PathBuf {
        self.dir.dir().join(MARKER_DIR)
    }

    pub fn relative_git_path(&self) -> PathBuf {
        self.dir.relative_path().join(MARKER_DIR)
    }

    pub(crate) fn create_in(&mut self, parent_dir: &Path, failures: &mut Failures<'_>) -> PathBuf {
        let dir = self.dir.create_in(parent_dir, failures);
        let marker = dir.join(MARKER_DIR);
        match create::create_dir_all(&marker, DEFAULT_DIR_PERMISSIONS) {
            Ok(()) => debug!("created repository marker {}", marker.display()),
            Err(source) => failures.record(FixtureError::CreateMarker {
                path: dir.clone(),
                source,
            }),
        }
        dir
    }
}

impl Deref for RepoFixture {
    type Target = DirFixture;

    fn deref(&self) -> &DirFixture {
        &self.dir
    }
}

impl Fixture for RepoFixture {
    fn dir(&self) -> &Path {
        self.dir.dir()
    }

    fn relative_path(&self) -> &Path {
        self.dir.relative_path()
    }
}
