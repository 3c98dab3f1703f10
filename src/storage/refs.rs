//! The HEAD pointer.
//!
//! HEAD is a plain text file holding the digest of the latest commit, or
//! nothing before the first commit. It is only ever replaced whole, through a
//! temp file and a rename.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::object::write_atomic;
use crate::storage::types::Digest;

/// Manages the HEAD file.
#[derive(Debug, Clone)]
pub struct HeadRef {
    path: PathBuf,
}

impl HeadRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current HEAD commit.
    ///
    /// Returns `None` when no commit has been made yet (missing or empty file).
    /// Other read errors are reported rather than treated as an empty history.
    pub fn read(&self) -> StorageResult<Option<Digest>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        Digest::from_hex(raw)
            .map(Some)
            .map_err(|e| StorageError::corrupted(&self.path, format!("HEAD does not hold a digest: {}", e)))
    }

    /// Point HEAD at `target`.
    pub fn update(&self, target: &Digest) -> StorageResult<()> {
        write_atomic(&self.path, target.as_str().as_bytes())?;
        debug!(head = %target.short(), "updated HEAD");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::object::ObjectStore;
    use tempfile::TempDir;

    fn setup_head() -> (TempDir, HeadRef) {
        let dir = TempDir::new().unwrap();
        let head = HeadRef::new(dir.path().join("HEAD"));
        (dir, head)
    }

    #[test]
    fn test_missing_and_empty_head() {
        let (_dir, head) = setup_head();
        assert_eq!(head.read().unwrap(), None);

        fs::write(head.path(), "").unwrap();
        assert_eq!(head.read().unwrap(), None);

        fs::write(head.path(), "  \n").unwrap();
        assert_eq!(head.read().unwrap(), None);
    }

    #[test]
    fn test_update_and_read() {
        let (_dir, head) = setup_head();
        let first = ObjectStore::hash("first");
        let second = ObjectStore::hash("second");

        head.update(&first).unwrap();
        assert_eq!(head.read().unwrap(), Some(first));

        head.update(&second).unwrap();
        assert_eq!(head.read().unwrap(), Some(second.clone()));
        assert_eq!(fs::read_to_string(head.path()).unwrap(), second.as_str());
    }

    #[test]
    fn test_garbage_head() {
        let (_dir, head) = setup_head();
        fs::write(head.path(), "refs/heads/main").unwrap();

        assert!(matches!(head.read(), Err(StorageError::CorruptedData { .. })));
    }
}
