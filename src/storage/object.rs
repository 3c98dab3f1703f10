//! Content-addressed object storage.
//!
//! Every object (file blob or serialized commit) lives in one flat directory,
//! `objects/<digest>`, where the digest is the SHA-256 of the content. Writing
//! identical content twice lands on the same key, so identical file versions
//! are stored once.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest as _, Sha256};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::Digest;

/// Handle on the `objects/` directory.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    dir: PathBuf,
}

impl ObjectStore {
    /// create a store rooted at an existing objects directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// digest of `content`: hex SHA-256 of its UTF-8 bytes
    pub fn hash(content: &str) -> Digest {
        let digest = Sha256::digest(content.as_bytes());
        Digest::from_trusted(hex::encode(digest))
    }

    /// where the object for `digest` is (or would be) stored
    pub fn object_path(&self, digest: &Digest) -> PathBuf {
        self.dir.join(digest.as_str())
    }

    pub fn contains(&self, digest: &Digest) -> bool {
        self.object_path(digest).is_file()
    }

    /// store `content` under its digest and return the digest
    pub fn put(&self, content: &str) -> StorageResult<Digest> {
        let digest = Self::hash(content);
        let path = self.object_path(&digest);

        if path.is_file() {
            debug!(digest = %digest.short(), "object already stored");
            return Ok(digest);
        }

        write_atomic(&path, content.as_bytes())?;
        debug!(digest = %digest.short(), size = content.len(), "stored object");
        Ok(digest)
    }

    /// read back the content stored under `digest`
    pub fn get(&self, digest: &Digest) -> StorageResult<String> {
        let path = self.object_path(digest);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::ObjectNotFound(digest.clone()))
            }
            Err(e) => return Err(e.into()),
        };

        String::from_utf8(bytes)
            .map_err(|e| StorageError::corrupted(&path, format!("object is not valid utf-8: {}", e)))
    }
}

/// Replace `path` with `bytes` through a sibling temp file and a rename.
///
/// Readers see either the old file or the complete new one.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
