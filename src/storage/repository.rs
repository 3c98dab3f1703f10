//!   Core repository handle.
//!
//!  This is the central component of the storage layer. It owns the on-disk
//!  layout, coordinates the object store, staging index and HEAD, and
//!  serializes mutating operations behind the repository lock.
//!
//! All other storage modules are reached through this.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::storage::commit::{self, CommitBuilder, CommitRecord, History};
use crate::storage::diff::{self, CommitDiff};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::index::{StagingEntry, StagingIndex};
use crate::storage::lock::LockGuard;
use crate::storage::object::ObjectStore;
use crate::storage::refs::HeadRef;
use crate::storage::types::{logical_path, Digest};

/// default name of the control directory under the repository root
pub const DEFAULT_CONTROL_DIR: &str = ".revu";

/// Paths of everything the repository keeps on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLayout {
    pub root: PathBuf,
    pub control: PathBuf,
    pub objects: PathBuf,
    pub head: PathBuf,
    pub index: PathBuf,
    pub lock: PathBuf,
}

impl RepoLayout {
    pub fn new(root: impl Into<PathBuf>, control_dir: &str) -> Self {
        let root = root.into();
        let control = root.join(control_dir);
        Self {
            objects: control.join("objects"),
            head: control.join("HEAD"),
            index: control.join("index"),
            lock: control.join("lock"),
            control,
            root,
        }
    }

    /// check that the control directory and its files are present
    pub fn is_initialized(&self) -> bool {
        self.objects.is_dir() && self.head.is_file() && self.index.is_file()
    }
}

/// outcome of bootstrapping a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    /// the layout was created (or completed) by this call
    Created,
    /// everything was already in place; nothing was touched
    AlreadyInitialized,
}

/// The main repository handle.
///
/// Clone this to share it - it uses Arc internally, and clones share the
/// in-process write lock.
#[derive(Clone)]
pub struct Repository {
    inner: Arc<RepositoryInner>,
}

struct RepositoryInner {
    layout: RepoLayout,
    store: ObjectStore,
    index: StagingIndex,
    head: HeadRef,
    write_lock: Mutex<()>,
}

impl Repository {
    fn from_layout(layout: RepoLayout) -> Self {
        Self {
            inner: Arc::new(RepositoryInner {
                store: ObjectStore::new(&layout.objects),
                index: StagingIndex::new(&layout.index),
                head: HeadRef::new(&layout.head),
                write_lock: Mutex::new(()),
                layout,
            }),
        }
    }

    /// Open an existing repository.
    pub fn open(root: impl AsRef<Path>, control_dir: &str) -> StorageResult<Self> {
        let layout = RepoLayout::new(root.as_ref(), control_dir);
        if !layout.is_initialized() {
            return Err(StorageError::NotInitialized(layout.control));
        }
        Ok(Self::from_layout(layout))
    }

    /// Bootstrap the on-disk layout.
    ///
    /// Idempotent: existing files are never overwritten, and a complete
    /// layout reports [`InitStatus::AlreadyInitialized`].
    pub fn init(root: impl AsRef<Path>, control_dir: &str) -> StorageResult<(Self, InitStatus)> {
        let layout = RepoLayout::new(root.as_ref(), control_dir);
        fs::create_dir_all(&layout.objects)?;

        let created_head = create_if_absent(&layout.head, b"")?;
        let created_index = create_if_absent(&layout.index, b"[]")?;

        let status = if created_head || created_index {
            info!(path = %layout.control.display(), "initialized repository");
            InitStatus::Created
        } else {
            debug!(path = %layout.control.display(), "repository already initialized");
            InitStatus::AlreadyInitialized
        };

        Ok((Self::from_layout(layout), status))
    }

    /// Open a repository, bootstrapping it first if needed.
    pub fn open_or_init(root: impl AsRef<Path>, control_dir: &str) -> StorageResult<Self> {
        let layout = RepoLayout::new(root.as_ref(), control_dir);
        if layout.is_initialized() {
            Ok(Self::from_layout(layout))
        } else {
            Self::init(&layout.root, control_dir).map(|(repo, _)| repo)
        }
    }

    pub fn layout(&self) -> &RepoLayout {
        &self.inner.layout
    }

    pub fn store(&self) -> &ObjectStore {
        &self.inner.store
    }

    /// Run `f` holding both the in-process and the on-disk lock.
    fn with_write_lock<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce() -> StorageResult<T>,
    {
        let _local = self
            .inner
            .write_lock
            .try_lock()
            .ok_or_else(|| StorageError::RepositoryLocked(self.inner.layout.lock.clone()))?;
        let _guard = LockGuard::acquire(&self.inner.layout.lock)?;
        f()
    }

    // ==================== Read Operations ====================

    /// Get the current HEAD commit, `None` before the first commit.
    pub fn head(&self) -> StorageResult<Option<Digest>> {
        self.inner.head.read()
    }

    /// Everything staged since the last commit, in add order.
    pub fn staged(&self) -> StorageResult<Vec<StagingEntry>> {
        self.inner.index.read_all()
    }

    /// Load the commit stored under `digest`.
    pub fn load_commit(&self, digest: &Digest) -> StorageResult<CommitRecord> {
        commit::load_commit(&self.inner.store, digest)
    }

    /// Walk the chain from HEAD to the first commit.
    pub fn history(&self) -> StorageResult<History<'_>> {
        Ok(commit::history(&self.inner.store, self.head()?))
    }

    /// Collect up to `limit` commits from HEAD, newest first.
    pub fn log(&self, limit: Option<usize>) -> StorageResult<Vec<(Digest, CommitRecord)>> {
        let walk = self.history()?;
        match limit {
            Some(n) => walk.take(n).collect(),
            None => walk.collect(),
        }
    }

    /// Diff every file of the commit `digest` against its parent.
    pub fn diff_commit(&self, digest: &Digest) -> StorageResult<CommitDiff> {
        diff::diff_commit(&self.inner.store, digest)
    }

    // ==================== Mutating Operations ====================

    /// Store the content of `file` and stage it.
    ///
    /// The file must be UTF-8 text.
    pub fn add(&self, file: impl AsRef<Path>) -> StorageResult<StagingEntry> {
        let file = file.as_ref();
        let content = fs::read_to_string(file).map_err(|source| StorageError::FileRead {
            path: file.to_path_buf(),
            source,
        })?;
        let path = logical_path(&self.inner.layout.root, file);

        self.stage_content(path, &content)
    }

    /// Store `content` and stage it under the logical path `path`.
    pub fn stage_content(&self, path: impl Into<String>, content: &str) -> StorageResult<StagingEntry> {
        let path = path.into();
        self.with_write_lock(|| {
            let hash = self.inner.store.put(content)?;
            let entry = StagingEntry {
                path,
                stored_path: self.inner.store.object_path(&hash),
                hash,
            };
            self.inner.index.stage(entry.clone())?;
            Ok(entry)
        })
    }

    /// Create a commit from the staged entries.
    ///
    /// The record is persisted before HEAD moves, and the index is cleared
    /// only after HEAD points at the new commit. An error at any step leaves
    /// HEAD and the index as they were.
    pub fn commit(&self, message: impl Into<String>) -> StorageResult<Digest> {
        let message = message.into();
        self.with_write_lock(|| {
            let staged = self.inner.index.read_all()?;
            let parent = self.inner.head.read()?;

            let record = CommitBuilder::new()
                .message(message)
                .staged(&staged)
                .parent(parent)
                .build();

            let digest = commit::write_commit(&self.inner.store, &record)?;
            self.inner.head.update(&digest)?;
            self.inner.index.clear()?;

            info!(
                commit = %digest.short(),
                parent = record.parent.as_ref().map(|p| p.short()).unwrap_or("none"),
                files = record.files.len(),
                "created commit"
            );
            Ok(digest)
        })
    }

    /// Get statistics about the repository.
    pub fn stats(&self) -> StorageResult<RepositoryStats> {
        let mut commits = 0;
        for entry in self.history()? {
            entry?;
            commits += 1;
        }

        let mut objects = 0;
        for entry in fs::read_dir(&self.inner.layout.objects)? {
            if entry?.file_type()?.is_file() {
                objects += 1;
            }
        }

        Ok(RepositoryStats {
            head: self.head()?,
            commits,
            objects,
            staged: self.staged()?.len(),
        })
    }
}

/// Write `bytes` to `path` unless the file already exists.
///
/// Returns whether the file was created.
fn create_if_absent(path: &Path, bytes: &[u8]) -> io::Result<bool> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(bytes)?;
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e),
    }
}

/// Statistics about the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryStats {
    pub head: Option<Digest>,
    pub commits: usize,
    pub objects: usize,
    pub staged: usize,
}

impl fmt::Display for RepositoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.head {
            Some(head) => writeln!(f, "HEAD: {}", head)?,
            None => writeln!(f, "HEAD: (no commits yet)")?,
        }
        writeln!(f, "Commits: {}", self.commits)?;
        writeln!(f, "Objects: {}", self.objects)?;
        write!(f, "Staged files: {}", self.staged)
    }
}
