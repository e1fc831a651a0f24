//! Temporary directory trees for tests.
//!
//! Declare directories, fake repositories (a directory with a `.git`
//! marker) and files with literal or generated content, create them all
//! under a fresh temp directory in one call, and have the whole tree
//! removed when the test is done.

pub mod config;
pub mod error;
pub mod fixture;
pub mod fs_op;
pub mod logging;
pub mod report;

pub use crate::config::FixtureConfig;
pub use crate::error::{CreateFailures, FixtureError, FixtureKind};
pub use crate::fixture::{
    Attach, ContentFn, DirArgs, DirFixture, DirId, FileArgs, FileContent, FileFixture, FileId,
    Fixture, NodeId, ParentId, RepoFixture, RepoId, RootFixture, DEFAULT_DIR_PERMISSIONS,
    DEFAULT_FILE_PERMISSIONS, MARKER_DIR,
};
pub use crate::fs_op::{Refusal, Removal};
pub use crate::report::{CollectingReporter, Reporter, TracingReporter};
