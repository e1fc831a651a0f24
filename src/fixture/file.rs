use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use super::{require_created, Failures, ParentId, DEFAULT_DIR_PERMISSIONS, DEFAULT_FILE_PERMISSIONS};
use crate::error::{FixtureError, FixtureKind};
use crate::fs_op::{create, path::join_under, times};

/// Computes file content at creation time from the fixture itself. The
/// fixture's `path()` is already resolved when the function runs.
pub type ContentFn = Arc<dyn Fn(&FileFixture) -> String + Send + Sync>;

/// What a file fixture writes: nothing, a fixed string, or the output of a
/// [`ContentFn`]. Exactly one of these is ever set.
#[derive(Clone, Default)]
pub enum FileContent {
    #[default]
    Empty,
    Literal(String),
    Generated(ContentFn),
}

impl FileContent {
    fn resolve(&self, file: &FileFixture) -> String {
        match self {
            FileContent::Empty => String::new(),
            FileContent::Literal(s) => s.clone(),
            FileContent::Generated(f) => f(file),
        }
    }
}

impl fmt::Debug for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileContent::Empty => write!(f, "Empty"),
            FileContent::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            FileContent::Generated(_) => write!(f, "Generated(..)"),
        }
    }
}

/// Optional settings for a file fixture.
#[derive(Debug, Clone, Default)]
pub struct FileArgs {
    content: FileContent,
    permissions: Option<u32>,
    dir_permissions: Option<u32>,
    modified: Option<SystemTime>,
    skip_create: bool,
}

impl FileArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Literal content. Replaces literal content set earlier.
    ///
    /// # Panics
    ///
    /// If a content function was already set; a file has one kind of
    /// content.
    #[track_caller]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        if matches!(self.content, FileContent::Generated(_)) {
            panic!("FileArgs already has a content function; literal content cannot also be set");
        }
        self.content = FileContent::Literal(content.into());
        self
    }

    /// Generated content. Replaces a content function set earlier.
    ///
    /// # Panics
    ///
    /// If literal content was already set.
    #[track_caller]
    pub fn content_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&FileFixture) -> String + Send + Sync + 'static,
    {
        if matches!(self.content, FileContent::Literal(_)) {
            panic!("FileArgs already has literal content; a content function cannot also be set");
        }
        self.content = FileContent::Generated(Arc::new(f));
        self
    }

    /// File mode; defaults to `0o644`.
    pub fn permissions(mut self, mode: u32) -> Self {
        self.permissions = Some(mode);
        self
    }

    /// Mode for missing parent directories of a nested file name; defaults
    /// to `0o755`.
    pub fn dir_permissions(mut self, mode: u32) -> Self {
        self.dir_permissions = Some(mode);
        self
    }

    pub fn modified(mut self, when: SystemTime) -> Self {
        self.modified = Some(when);
        self
    }

    /// Resolve the path but never write the file.
    pub fn skip_create(mut self) -> Self {
        self.skip_create = true;
        self
    }
}

/// A single file under the root or a directory fixture.
#[derive(Debug)]
pub struct FileFixture {
    pub(crate) name: PathBuf,
    pub(crate) relative_path: PathBuf,
    pub(crate) content: FileContent,
    pub(crate) permissions: u32,
    pub(crate) dir_permissions: u32,
    pub(crate) modified: Option<SystemTime>,
    pub(crate) skip_create: bool,
    pub(crate) parent: ParentId,
    pub(crate) path: Option<PathBuf>,
}

impl FileFixture {
    pub(crate) fn new(name: &Path, parent: ParentId, parent_relative: &Path, args: FileArgs) -> Self {
        Self {
            name: name.to_path_buf(),
            relative_path: join_under(parent_relative, name),
            content: args.content,
            permissions: args.permissions.unwrap_or(DEFAULT_FILE_PERMISSIONS),
            dir_permissions: args.dir_permissions.unwrap_or(DEFAULT_DIR_PERMISSIONS),
            modified: args.modified,
            skip_create: args.skip_create,
            parent,
            path: None,
        }
    }

    pub fn name(&self) -> &Path {
        &self.name
    }

    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    pub fn content(&self) -> &FileContent {
        &self.content
    }

    pub fn permissions(&self) -> u32 {
        self.permissions
    }

    pub fn dir_permissions(&self) -> u32 {
        self.dir_permissions
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    pub fn skip_create(&self) -> bool {
        self.skip_create
    }

    pub fn parent(&self) -> ParentId {
        self.parent
    }

    pub fn is_created(&self) -> bool {
        self.path.is_some()
    }

    /// Absolute path of this file, resolved even when `skip_create` is set.
    ///
    /// # Panics
    ///
    /// If the tree has not been created yet.
    #[track_caller]
    pub fn path(&self) -> &Path {
        require_created(self.path.as_ref(), FixtureKind::File, &self.name)
    }

    pub fn try_path(&self) -> Result<&Path, FixtureError> {
        self.path
            .as_deref()
            .ok_or_else(|| FixtureError::not_created(FixtureKind::File, self.name.display().to_string()))
    }

    pub(crate) fn create_in(&mut self, parent_dir: &Path, failures: &mut Failures<'_>) {
        let path = join_under(parent_dir, &self.name);
        self.path = Some(path.clone());

        if self.skip_create {
            debug!("skipping creation of {}", path.display());
            return;
        }

        // Nested names need their intermediate directories.
        if let Some(dir) = path.parent() {
            if let Err(source) = create::create_dir_all(dir, self.dir_permissions) {
                failures.record(FixtureError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        }

        let data = self.content.resolve(self);
        if let Err(source) = create::write_file(&path, data.as_bytes(), self.permissions) {
            failures.record(FixtureError::WriteFile { path, source });
            return;
        }
        debug!("wrote {} ({} bytes)", path.display(), data.len());

        if let Some(when) = self.modified {
            if let Err(source) = times::set_times(&path, when) {
                failures.record(FixtureError::SetTimes { path, source });
            }
        }
    }
}
