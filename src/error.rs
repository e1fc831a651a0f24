use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Which kind of fixture an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureKind {
    Root,
    Dir,
    Repo,
    File,
}

impl fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureKind::Root => write!(f, "RootFixture"),
            FixtureKind::Dir => write!(f, "DirFixture"),
            FixtureKind::Repo => write!(f, "RepoFixture"),
            FixtureKind::File => write!(f, "FileFixture"),
        }
    }
}

/// Errors produced while creating or tearing down a fixture tree.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// A resolved path was requested before `create` ran.
    #[error("{kind} '{name}' has not yet been created")]
    NotCreated { kind: FixtureKind, name: String },

    #[error("failed to create temp directory using '{prefix}-*': {source}")]
    TempDir {
        prefix: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to create directory `{}`: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create .git directory within `{}`: {source}", path.display())]
    CreateMarker {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write file `{}`: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to set modification time for `{}`: {source}", path.display())]
    SetTimes {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove temp directory `{}`: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FixtureError {
    pub(crate) fn not_created(kind: FixtureKind, name: impl Into<String>) -> Self {
        FixtureError::NotCreated {
            kind,
            name: name.into(),
        }
    }
}

/// Every failure recorded during one `RootFixture::create` walk.
#[derive(Debug, Error)]
#[error("{} fixture operation(s) failed; first: {}", .0.len(), first_message(.0))]
pub struct CreateFailures(pub Vec<FixtureError>);

impl CreateFailures {
    pub fn failures(&self) -> &[FixtureError] {
        &self.0
    }
}

fn first_message(errs: &[FixtureError]) -> String {
    errs.first().map(|e| e.to_string()).unwrap_or_default()
}
