//! Exclusive repository lock for mutating operations.
//!
//! `add` and `commit` hold an advisory lock on `.revu/lock` for their whole
//! duration. The lock is released when the guard drops, so early returns
//! through `?` unlock too.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::storage::error::{StorageError, StorageResult};

/// Holds the repository lock until dropped.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Take the lock at `path`, failing immediately if someone else holds it.
    pub fn acquire(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)?;

        file.try_lock_exclusive()
            .map_err(|_| StorageError::RepositoryLocked(path.to_path_buf()))?;

        debug!(path = %path.display(), "acquired repository lock");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "failed to release repository lock");
        } else {
            debug!(path = %self.path.display(), "released repository lock");
        }
    }
}
