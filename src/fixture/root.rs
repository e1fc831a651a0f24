use std::fmt;
use std::io;
use std::ops::Index;
use std::path::{is_separator, Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{
    require_created, DirArgs, DirFixture, DirId, Failures, FileArgs, FileFixture, FileId,
    Fixture, Node, NodeId, ParentId, RepoFixture, RepoId,
};
use crate::config::FixtureConfig;
use crate::error::{CreateFailures, FixtureError, FixtureKind};
use crate::fs_op::remove::{remove_dir_guarded, Removal};
use crate::report::{Reporter, TracingReporter};

/// Owner of a fixture tree and of the temporary directory it is created in.
///
/// Build the tree with the `add_*` methods (or [`RootFixture::within`] for
/// nested nodes), call [`create`](RootFixture::create) once, then read paths
/// through the returned handles. The temporary directory is removed by
/// [`cleanup`](RootFixture::cleanup) or, at the latest, when the root is
/// dropped.
pub struct RootFixture {
    dir_prefix: String,
    temp_dir: Option<PathBuf>,
    guard: Option<TempDir>,
    children: Vec<NodeId>,
    files: Vec<FileId>,
    nodes: Vec<Node>,
    file_nodes: Vec<FileFixture>,
    reporter: Box<dyn Reporter>,
    config: FixtureConfig,
}

impl RootFixture {
    /// Declare a new tree whose directory name will start with
    /// `"{dir_prefix}-"`. No I/O happens until [`create`](Self::create).
    pub fn new(dir_prefix: impl Into<String>) -> Self {
        Self {
            dir_prefix: dir_prefix.into(),
            temp_dir: None,
            guard: None,
            children: Vec::new(),
            files: Vec::new(),
            nodes: Vec::new(),
            file_nodes: Vec::new(),
            reporter: Box::new(TracingReporter),
            config: FixtureConfig::from_env(),
        }
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn with_config(mut self, config: FixtureConfig) -> Self {
        self.config = config;
        self
    }

    pub fn dir_prefix(&self) -> &str {
        &self.dir_prefix
    }

    pub fn is_created(&self) -> bool {
        self.temp_dir.is_some()
    }

    /// Absolute path of the temporary directory.
    ///
    /// # Panics
    ///
    /// If [`create`](Self::create) has not run.
    #[track_caller]
    pub fn dir(&self) -> &Path {
        require_created(self.temp_dir.as_ref(), FixtureKind::Root, Path::new(&self.dir_prefix))
    }

    /// Same as [`dir`](Self::dir).
    #[track_caller]
    pub fn temp_dir(&self) -> &Path {
        self.dir()
    }

    pub fn try_dir(&self) -> Result<&Path, FixtureError> {
        self.temp_dir
            .as_deref()
            .ok_or_else(|| FixtureError::not_created(FixtureKind::Root, self.dir_prefix.clone()))
    }

    /// Attach children to `parent` (a [`DirId`], [`RepoId`] or
    /// [`ParentId::Root`]).
    pub fn within(&mut self, parent: impl Into<ParentId>) -> Attach<'_> {
        Attach {
            root: self,
            parent: parent.into(),
        }
    }

    pub fn add_dir(&mut self, name: impl AsRef<Path>, args: DirArgs) -> DirId {
        self.within(ParentId::Root).add_dir(name, args)
    }

    pub fn add_repo(&mut self, name: impl AsRef<Path>, args: DirArgs) -> RepoId {
        self.within(ParentId::Root).add_repo(name, args)
    }

    pub fn add_file(&mut self, name: impl AsRef<Path>, args: FileArgs) -> FileId {
        self.within(ParentId::Root).add_file(name, args)
    }

    pub fn add_files<I, P>(&mut self, defaults: &FileArgs, names: I) -> Vec<FileId>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.within(ParentId::Root).add_files(defaults, names)
    }

    /// Create the temporary directory and everything declared under it.
    ///
    /// Failures do not stop the walk: each one is handed to the reporter
    /// and collected, and the collection is returned once the whole tree
    /// has been attempted. Calling this twice starts over in a fresh
    /// directory and removes the previous one.
    pub fn create(&mut self) -> Result<(), CreateFailures> {
        if self.guard.is_some() {
            warn!("RootFixture '{}' is being created again", self.dir_prefix);
        }

        let mut failures = Failures::new(&*self.reporter);

        let temp = match make_temp_dir(&self.dir_prefix) {
            Ok(t) => t,
            Err(source) => {
                failures.record(FixtureError::TempDir {
                    prefix: self.dir_prefix.clone(),
                    source,
                });
                return failures.into_result();
            }
        };
        let root_dir = temp.path().to_path_buf();
        debug!("created fixture root {}", root_dir.display());
        self.guard = Some(temp);
        self.temp_dir = Some(root_dir.clone());

        for fid in &self.files {
            self.file_nodes[fid.0].create_in(&root_dir, &mut failures);
        }
        for &id in &self.children {
            create_node(&mut self.nodes, &mut self.file_nodes, id, &root_dir, &mut failures);
        }

        failures.into_result()
    }

    /// Remove the temporary directory. Runs at most once; later calls and
    /// the eventual drop do nothing. Failures are reported, never raised.
    pub fn cleanup(&mut self) {
        match self.guard.take() {
            Some(guard) => release(guard, &*self.reporter),
            None => debug!("nothing to clean up for RootFixture '{}'", self.dir_prefix),
        }
    }

    /// Remove the temporary directory, but only after checking that it is
    /// an absolute path strictly inside the platform temp directory.
    ///
    /// A refusal leaves everything in place and is returned as
    /// `Removal::Refused`; it is not an error.
    ///
    /// # Panics
    ///
    /// If [`create`](Self::create) has not run.
    #[track_caller]
    pub fn remove_files(&mut self) -> Result<Removal, FixtureError> {
        let path = self.dir().to_path_buf();
        match remove_dir_guarded(&path, &std::env::temp_dir()) {
            Ok(removal) => {
                if matches!(removal, Removal::Removed | Removal::Absent) {
                    // Already gone; disarm the guard so drop doesn't retry.
                    if let Some(guard) = self.guard.take() {
                        let _ = guard.keep();
                    }
                }
                Ok(removal)
            }
            Err(source) => {
                let err = FixtureError::Remove { path, source };
                self.reporter.report(&err);
                Err(err)
            }
        }
    }

    /// Relative paths of everything currently under the root directory,
    /// depth-first with siblings sorted by name.
    ///
    /// # Panics
    ///
    /// If [`create`](Self::create) has not run.
    pub fn manifest(&self) -> io::Result<Vec<PathBuf>> {
        let root = self.dir();
        let mut entries = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if let Ok(rel) = entry.path().strip_prefix(root) {
                entries.push(rel.to_path_buf());
            }
        }
        Ok(entries)
    }

    fn node(&self, id: NodeId) -> &Node {
        self.nodes
            .get(id.0)
            .unwrap_or_else(|| panic!("node handle {} does not belong to this RootFixture", id.0))
    }

    fn parent_fixture(&self, parent: ParentId) -> &dyn Fixture {
        match parent {
            ParentId::Root => self,
            ParentId::Node(id) => self.node(id).as_fixture(),
        }
    }
}

fn make_temp_dir(prefix: &str) -> io::Result<TempDir> {
    if prefix.chars().any(is_separator) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "prefix contains path separator",
        ));
    }
    tempfile::Builder::new()
        .prefix(&format!("{prefix}-"))
        .tempdir()
}

fn release(guard: TempDir, reporter: &dyn Reporter) {
    let path = guard.path().to_path_buf();
    match guard.close() {
        Ok(()) => debug!("removed fixture root {}", path.display()),
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            debug!("fixture root {} was already gone", path.display())
        }
        Err(source) => reporter.report(&FixtureError::Remove { path, source }),
    }
}

/// Depth-first creation of one node: its directory, its files, its
/// children, then its own modification time.
fn create_node(
    nodes: &mut [Node],
    files: &mut [FileFixture],
    id: NodeId,
    parent_dir: &Path,
    failures: &mut Failures<'_>,
) {
    let dir = nodes[id.0].create_in(parent_dir, failures);

    let node = nodes[id.0].as_dir();
    let file_ids = node.files.clone();
    let child_ids = node.children.clone();

    for fid in file_ids {
        files[fid.0].create_in(&dir, failures);
    }
    for child in child_ids {
        create_node(nodes, files, child, &dir, failures);
    }

    nodes[id.0].as_dir().apply_modified(failures);
}

impl Drop for RootFixture {
    fn drop(&mut self) {
        let Some(guard) = self.guard.take() else {
            return;
        };
        if self.config.keep_on_drop {
            let kept = guard.keep();
            info!("keeping fixture directory {}", kept.display());
            return;
        }
        release(guard, &*self.reporter);
    }
}

impl fmt::Debug for RootFixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootFixture")
            .field("dir_prefix", &self.dir_prefix)
            .field("temp_dir", &self.temp_dir)
            .field("children", &self.children)
            .field("files", &self.files)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Fixture for RootFixture {
    fn dir(&self) -> &Path {
        RootFixture::dir(self)
    }

    fn relative_path(&self) -> &Path {
        Path::new("")
    }
}

impl Index<DirId> for RootFixture {
    type Output = DirFixture;

    fn index(&self, id: DirId) -> &DirFixture {
        self.node(id.0).as_dir()
    }
}

impl Index<RepoId> for RootFixture {
    type Output = RepoFixture;

    fn index(&self, id: RepoId) -> &RepoFixture {
        match self.node(id.0) {
            Node::Repo(r) => r,
            Node::Dir(_) => panic!("handle {} is not a repository fixture", id.0 .0),
        }
    }
}

impl Index<FileId> for RootFixture {
    type Output = FileFixture;

    fn index(&self, id: FileId) -> &FileFixture {
        self.file_nodes
            .get(id.0)
            .unwrap_or_else(|| panic!("file handle {} does not belong to this RootFixture", id.0))
    }
}

/// Attaches children to one container of a [`RootFixture`].
///
/// Obtained from [`RootFixture::within`]. Each call only records the child;
/// nothing touches the filesystem until `create`.
pub struct Attach<'a> {
    root: &'a mut RootFixture,
    parent: ParentId,
}

impl Attach<'_> {
    pub fn add_dir(&mut self, name: impl AsRef<Path>, args: DirArgs) -> DirId {
        let rel = self.parent_relative();
        let dir = DirFixture::new(FixtureKind::Dir, name.as_ref(), self.parent, &rel, args);
        DirId(self.push_node(Node::Dir(dir)))
    }

    pub fn add_repo(&mut self, name: impl AsRef<Path>, args: DirArgs) -> RepoId {
        let rel = self.parent_relative();
        let repo = RepoFixture::new(name.as_ref(), self.parent, &rel, args);
        RepoId(self.push_node(Node::Repo(repo)))
    }

    pub fn add_file(&mut self, name: impl AsRef<Path>, args: FileArgs) -> FileId {
        let rel = self.parent_relative();
        let file = FileFixture::new(name.as_ref(), self.parent, &rel, args);
        let id = FileId(self.root.file_nodes.len());
        self.root.file_nodes.push(file);
        match self.parent {
            ParentId::Root => self.root.files.push(id),
            ParentId::Node(p) => self.root.nodes[p.0].as_dir_mut().files.push(id),
        }
        id
    }

    /// Attach one file per name, each with a copy of `defaults`.
    pub fn add_files<I, P>(&mut self, defaults: &FileArgs, names: I) -> Vec<FileId>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        names
            .into_iter()
            .map(|name| self.add_file(name, defaults.clone()))
            .collect()
    }

    fn parent_relative(&self) -> PathBuf {
        self.root
            .parent_fixture(self.parent)
            .relative_path()
            .to_path_buf()
    }

    /// Callers resolve `parent_relative` first, which rejects foreign
    /// parent handles before the arena grows.
    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.root.nodes.len());
        self.root.nodes.push(node);
        match self.parent {
            ParentId::Root => self.root.children.push(id),
            ParentId::Node(p) => self.root.nodes[p.0].as_dir_mut().children.push(id),
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;

    fn quiet_root(prefix: &str) -> RootFixture {
        RootFixture::new(prefix).with_config(FixtureConfig::default())
    }

    #[test]
    fn relative_paths_compose_before_create() {
        let mut root = quiet_root("rel");
        let internal = root.add_dir("internal", DirArgs::new());
        let widgets = root.within(internal).add_dir("widgets", DirArgs::new());
        let repo = root.within(widgets).add_repo("r", DirArgs::new());
        let file = root.within(repo).add_file("main.go", FileArgs::new());

        assert_eq!(root[widgets].relative_path(), Path::new("internal/widgets"));
        assert_eq!(root[repo].relative_git_path(), PathBuf::from("internal/widgets/r/.git"));
        assert_eq!(root[file].relative_path(), Path::new("internal/widgets/r/main.go"));
        assert_eq!(root[file].parent(), ParentId::from(repo));
        assert!(!root.is_created());
    }

    #[test]
    #[should_panic(expected = "RootFixture 'early' has not yet been created")]
    fn dir_before_create_panics() {
        let root = quiet_root("early");
        let _ = root.dir();
    }

    #[test]
    fn prefix_with_separator_is_a_reported_failure() {
        let rep = CollectingReporter::new();
        let mut root = quiet_root("test/nested").with_reporter(rep.clone());
        root.add_file("a.txt", FileArgs::new());

        let errs = root.create().unwrap_err();

        assert!(matches!(errs.failures(), [FixtureError::TempDir { .. }]));
        assert_eq!(rep.failures().len(), 1);
        assert!(!root.is_created());
    }

    #[test]
    fn create_then_cleanup_twice() {
        let mut root = quiet_root("twice");
        root.add_file("a.txt", FileArgs::new().content("a"));
        root.create().unwrap();
        let dir = root.dir().to_path_buf();
        assert!(dir.join("a.txt").is_file());

        root.cleanup();
        root.cleanup();
        assert!(!dir.exists());
    }

    #[test]
    fn drop_removes_directory() {
        let dir = {
            let mut root = quiet_root("dropped");
            root.create().unwrap();
            root.dir().to_path_buf()
        };
        assert!(!dir.exists());
    }

    #[test]
    fn drop_keeps_directory_when_configured() {
        let dir = {
            let mut root = RootFixture::new("kept").with_config(FixtureConfig { keep_on_drop: true });
            root.create().unwrap();
            root.dir().to_path_buf()
        };
        assert!(dir.is_dir());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn recreate_moves_to_fresh_directory() {
        let mut root = quiet_root("again");
        root.create().unwrap();
        let first = root.dir().to_path_buf();
        root.create().unwrap();
        let second = root.dir().to_path_buf();

        assert_ne!(first, second);
        assert!(!first.exists());
        assert!(second.is_dir());
    }

    /// Make `locked/` read-only so its file cannot be unlinked. Returns
    /// `false` when the process can write there anyway (running as root).
    #[cfg(unix)]
    fn lock_subdir(root: &RootFixture, locked: DirId) -> bool {
        use std::os::unix::fs::PermissionsExt;

        let dir = root[locked].dir();
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o500)).unwrap();
        let canary = dir.join(".writable");
        if std::fs::write(&canary, b"").is_ok() {
            std::fs::remove_file(&canary).unwrap();
            std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o755)).unwrap();
            return false;
        }
        true
    }

    #[cfg(unix)]
    fn unlock_and_remove(dir: &Path, locked: &Path) {
        use std::os::unix::fs::PermissionsExt;

        std::fs::set_permissions(locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn cleanup_failure_is_reported_not_raised() {
        let rep = CollectingReporter::new();
        let mut root = quiet_root("stuck").with_reporter(rep.clone());
        let locked = root.add_dir("locked", DirArgs::new());
        root.within(locked).add_file("pinned.txt", FileArgs::new().content("x"));
        root.create().unwrap();
        let dir = root.dir().to_path_buf();
        let locked_dir = root[locked].dir().to_path_buf();
        if !lock_subdir(&root, locked) {
            return;
        }

        root.cleanup();

        let failures = rep.failures();
        assert_eq!(failures.len(), 1, "{failures:?}");
        assert!(failures[0].contains("failed to remove temp directory"), "{}", failures[0]);
        assert!(dir.is_dir());

        // The guard is spent: a second cleanup reports nothing new.
        root.cleanup();
        assert_eq!(rep.failures().len(), 1);

        unlock_and_remove(&dir, &locked_dir);
    }

    #[cfg(unix)]
    #[test]
    fn drop_failure_is_reported_not_raised() {
        let rep = CollectingReporter::new();
        let (dir, locked_dir) = {
            let mut root = quiet_root("stuck-drop").with_reporter(rep.clone());
            let locked = root.add_dir("locked", DirArgs::new());
            root.within(locked).add_file("pinned.txt", FileArgs::new().content("x"));
            root.create().unwrap();
            if !lock_subdir(&root, locked) {
                return;
            }
            (root.dir().to_path_buf(), root[locked].dir().to_path_buf())
        };

        let failures = rep.failures();
        assert_eq!(failures.len(), 1, "{failures:?}");
        assert!(failures[0].contains("failed to remove temp directory"), "{}", failures[0]);

        unlock_and_remove(&dir, &locked_dir);
    }

    #[test]
    #[should_panic(expected = "is not a repository fixture")]
    fn dir_handle_reinterpreted_as_repo_panics() {
        let mut root = quiet_root("mixup");
        let d = root.add_dir("d", DirArgs::new());
        let _ = &root[RepoId(d.0)];
    }
}
