//! Declarative temp-directory trees for tests.
//!
//! A [`RootFixture`] owns every node of the tree. Attaching a directory,
//! repository or file returns a small `Copy` handle ([`DirId`], [`RepoId`],
//! [`FileId`]) that indexes back into the root, e.g. `root[file].path()`.
//! Nodes record their parent as a [`ParentId`]; the root is the only owner.
//!
//! ```no_run
//! use fixture_tree::{DirArgs, FileArgs, RootFixture};
//!
//! let mut root = RootFixture::new("my-test");
//! let proj = root.add_repo("proj", DirArgs::new());
//! let main = root.within(proj).add_file("main.txt", FileArgs::new().content("hi"));
//! root.create().expect("fixture tree");
//!
//! assert!(root[proj].git_path().is_dir());
//! assert_eq!(std::fs::read_to_string(root[main].path()).unwrap(), "hi");
//! ```

mod dir;
mod file;
mod repo;
mod root;

use std::path::{Path, PathBuf};

pub use dir::{DirArgs, DirFixture};
pub use file::{ContentFn, FileArgs, FileContent, FileFixture};
pub use repo::{RepoFixture, MARKER_DIR};
pub use root::{Attach, RootFixture};

use crate::error::{CreateFailures, FixtureError, FixtureKind};
use crate::report::Reporter;

/// Mode used for directories when none is given (`rwxr-xr-x`).
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o755;
/// Mode used for files when none is given (`rw-r--r--`).
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o644;

/// Position of a directory or repository node inside its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Handle to a directory fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirId(pub(crate) NodeId);

/// Handle to a repository fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepoId(pub(crate) NodeId);

/// Handle to a file fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub(crate) usize);

/// Non-owning reference from a node to the node that contains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentId {
    Root,
    Node(NodeId),
}

impl From<DirId> for ParentId {
    fn from(id: DirId) -> Self {
        ParentId::Node(id.0)
    }
}

impl From<RepoId> for ParentId {
    fn from(id: RepoId) -> Self {
        ParentId::Node(id.0)
    }
}

impl From<NodeId> for ParentId {
    fn from(id: NodeId) -> Self {
        ParentId::Node(id)
    }
}

/// What every container fixture (root, directory, repository) can answer.
pub trait Fixture {
    /// Absolute path of the created directory. Panics before creation.
    fn dir(&self) -> &Path;
    /// Path relative to the root fixture; empty for the root itself.
    fn relative_path(&self) -> &Path;
}

/// The closed set of container nodes stored in the root's arena.
#[derive(Debug)]
pub(crate) enum Node {
    Dir(DirFixture),
    Repo(RepoFixture),
}

impl Node {
    pub(crate) fn as_dir(&self) -> &DirFixture {
        match self {
            Node::Dir(d) => d,
            Node::Repo(r) => &r.dir,
        }
    }

    pub(crate) fn as_dir_mut(&mut self) -> &mut DirFixture {
        match self {
            Node::Dir(d) => d,
            Node::Repo(r) => &mut r.dir,
        }
    }

    /// Create this node's own directory (and marker, for repositories)
    /// under `parent_dir`, returning the resolved path.
    pub(crate) fn create_in(&mut self, parent_dir: &Path, failures: &mut Failures<'_>) -> PathBuf {
        match self {
            Node::Dir(d) => d.create_in(parent_dir, failures),
            Node::Repo(r) => r.create_in(parent_dir, failures),
        }
    }

    pub(crate) fn as_fixture(&self) -> &dyn Fixture {
        match self {
            Node::Dir(d) => d,
            Node::Repo(r) => r,
        }
    }
}

/// Collects failures during a create walk and forwards each one to the
/// reporter as it happens.
pub(crate) struct Failures<'a> {
    reporter: &'a dyn Reporter,
    errors: Vec<FixtureError>,
}

impl<'a> Failures<'a> {
    pub(crate) fn new(reporter: &'a dyn Reporter) -> Self {
        Self {
            reporter,
            errors: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, err: FixtureError) {
        self.reporter.report(&err);
        self.errors.push(err);
    }

    pub(crate) fn into_result(self) -> Result<(), CreateFailures> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CreateFailures(self.errors))
        }
    }
}

#[track_caller]
pub(crate) fn require_created<'p>(
    path: Option<&'p PathBuf>,
    kind: FixtureKind,
    name: &Path,
) -> &'p Path {
    match path {
        Some(p) => p,
        None => panic!("{}", FixtureError::not_created(kind, name.display().to_string())),
    }
}
