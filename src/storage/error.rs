//! Storage layer error types
//!
//! All errors that can occur during storage operations are defined here
//! We use `thiserror` for ergonomic error definition and better error messages

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::types::{Digest, InvalidDigestError};

/// the main error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// no object is stored under the requested digest
    #[error("object not found: {0}")]
    ObjectNotFound(Digest),

    /// the object exists but is not a commit record
    #[error("{digest} is not a valid commit object: {reason}")]
    InvalidCommitObject { digest: Digest, reason: String },

    /// the file passed to `add` could not be read
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// repo is not initialized
    #[error("not a revu repository (or control directory missing): {0}")]
    NotInitialized(PathBuf),

    /// another process or handle holds the repository lock
    #[error("repository is locked by another operation: {0}")]
    RepositoryLocked(PathBuf),

    /// a string could not be parsed as a digest
    #[error("invalid digest: {0}")]
    InvalidDigest(#[from] InvalidDigestError),

    /// data integrity check failed
    #[error("corrupted data at {path}: {reason}")]
    CorruptedData { path: PathBuf, reason: String },

    /// JSON serialization or deserialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// check if this error indicates the resource doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::ObjectNotFound(_) | StorageError::NotInitialized(_)
        )
    }

    /// check if this error means on-disk state is damaged
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            StorageError::CorruptedData { .. } | StorageError::InvalidCommitObject { .. }
        )
    }

    pub(crate) fn corrupted(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        StorageError::CorruptedData {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let digest = Digest::from_hex(&"0".repeat(64)).unwrap();

        let not_found = StorageError::ObjectNotFound(digest.clone());
        assert!(not_found.is_not_found());
        assert!(!not_found.is_corruption());

        let invalid = StorageError::InvalidCommitObject {
            digest,
            reason: "expected value".to_string(),
        };
        assert!(!invalid.is_not_found());
        assert!(invalid.is_corruption());
    }

    #[test]
    fn test_file_read_message() {
        let err = StorageError::FileRead {
            path: PathBuf::from("missing.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        assert!(err.to_string().starts_with("failed to read missing.txt"));
    }
}
