//! The staging index.
//!
//! The index is a JSON array of entries in the order files were added. It is
//! append-only until a commit clears it. Nothing is deduplicated: staging the
//! same path twice records both entries.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::object::write_atomic;
use crate::storage::types::Digest;

/// one file queued for the next commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingEntry {
    /// logical path of the file as given to `add`
    pub path: String,
    /// location of the stored blob inside the objects directory
    pub stored_path: PathBuf,
    /// digest of the blob
    pub hash: Digest,
}

/// Handle on the `index` file.
#[derive(Debug, Clone)]
pub struct StagingIndex {
    path: PathBuf,
}

impl StagingIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// append an entry to the persisted sequence
    pub fn stage(&self, entry: StagingEntry) -> StorageResult<()> {
        let mut entries = self.read_all()?;
        debug!(path = %entry.path, digest = %entry.hash.short(), position = entries.len(), "staging entry");
        entries.push(entry);
        self.write(&entries)
    }

    /// load every staged entry, in add order
    ///
    /// a missing index file reads as empty
    pub fn read_all(&self) -> StorageResult<Vec<StagingEntry>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw)
            .map_err(|e| StorageError::corrupted(&self.path, format!("malformed index: {}", e)))
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.read_all()?.is_empty())
    }

    /// drop every staged entry
    pub fn clear(&self) -> StorageResult<()> {
        debug!("clearing staging index");
        self.write(&[])
    }

    fn write(&self, entries: &[StagingEntry]) -> StorageResult<()> {
        let bytes = serde_json::to_vec(entries)?;
        write_atomic(&self.path, &bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::object::ObjectStore;
    use tempfile::TempDir;

    fn entry(path: &str, content: &str) -> StagingEntry {
        let hash = ObjectStore::hash(content);
        StagingEntry {
            path: path.to_string(),
            stored_path: PathBuf::from("objects").join(hash.as_str()),
            hash,
        }
    }

    fn setup_index() -> (TempDir, StagingIndex) {
        let dir = TempDir::new().unwrap();
        let index = StagingIndex::new(dir.path().join("index"));
        (dir, index)
    }

    #[test]
    fn test_missing_index_is_empty() {
        let (_dir, index) = setup_index();
        assert!(index.read_all().unwrap().is_empty());
        assert!(index.is_empty().unwrap());
    }

    #[test]
    fn test_stage_preserves_order() {
        let (_dir, index) = setup_index();
        let entries = vec![entry("b.txt", "b"), entry("a.txt", "a"), entry("c.txt", "c")];

        for e in &entries {
            index.stage(e.clone()).unwrap();
        }

        assert_eq!(index.read_all().unwrap(), entries);
    }

    #[test]
    fn test_stage_keeps_duplicates() {
        let (_dir, index) = setup_index();

        index.stage(entry("notes.txt", "v1")).unwrap();
        index.stage(entry("notes.txt", "v2")).unwrap();
        index.stage(entry("copy.txt", "v1")).unwrap();

        let staged = index.read_all().unwrap();
        assert_eq!(staged.len(), 3);
        assert_eq!(staged[0].hash, staged[2].hash);
        assert_eq!(staged[0].path, staged[1].path);
    }

    #[test]
    fn test_clear() {
        let (_dir, index) = setup_index();
        index.stage(entry("a.txt", "a")).unwrap();

        index.clear().unwrap();

        assert!(index.is_empty().unwrap());
        assert_eq!(fs::read_to_string(index.path()).unwrap(), "[]");
    }

    #[test]
    fn test_serialized_field_names() {
        let (_dir, index) = setup_index();
        index.stage(entry("a.txt", "a")).unwrap();

        let raw = fs::read_to_string(index.path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &parsed[0];
        assert!(first.get("path").is_some());
        assert!(first.get("storedPath").is_some());
        assert!(first.get("hash").is_some());
    }

    #[test]
    fn test_malformed_index() {
        let (_dir, index) = setup_index();
        fs::write(index.path(), "{not json").unwrap();

        assert!(matches!(index.read_all(), Err(StorageError::CorruptedData { .. })));
    }
}
