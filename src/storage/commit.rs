//!  Commit records and history traversal
//!
//! A commit is a JSON record stored in the object store like any blob:
//! - its digest is the hash of its serialized form
//! - `parent` links it to the previous commit, `null` for the first one
//! - `files` lists the staged `{path, hash}` pairs in add order
//!
//! this module handles building, encoding and decoding commit records, and
//! walking the parent chain

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::index::StagingEntry;
use crate::storage::object::ObjectStore;
use crate::storage::types::Digest;

/// one file captured by a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitFile {
    /// logical path of the file
    pub path: String,
    /// digest of the blob holding its content
    pub hash: Digest,
}

impl From<&StagingEntry> for CommitFile {
    fn from(entry: &StagingEntry) -> Self {
        Self {
            path: entry.path.clone(),
            hash: entry.hash.clone(),
        }
    }
}

/// An immutable commit snapshot.
///
/// Field order is the serialized key order, so encoding is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    #[serde(rename = "timeStamp")]
    pub timestamp: String,
    pub message: String,
    pub files: Vec<CommitFile>,
    #[serde(default)]
    pub parent: Option<Digest>,
}

impl CommitRecord {
    /// check if this is the first commit of the chain
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// get a short summary of the commit (first line of message)
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or(&self.message)
    }

    /// the commit time, if the stored timestamp parses
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// the entry for `path`; the last one wins when a path was staged twice
    pub fn file(&self, path: &str) -> Option<&CommitFile> {
        self.files.iter().rev().find(|f| f.path == path)
    }

    /// serialize to the stored form
    pub fn encode(&self) -> StorageResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// parse the stored form of the object named `digest`
    pub fn decode(digest: &Digest, raw: &str) -> StorageResult<Self> {
        serde_json::from_str(raw).map_err(|e| StorageError::InvalidCommitObject {
            digest: digest.clone(),
            reason: e.to_string(),
        })
    }
}

/// builder for creating commits with a fluent interface
#[derive(Debug, Default)]
pub struct CommitBuilder {
    timestamp: Option<String>,
    message: String,
    files: Vec<CommitFile>,
    parent: Option<Digest>,
}

impl CommitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// set the commit message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// capture the given staged entries, in order
    pub fn staged(mut self, entries: &[StagingEntry]) -> Self {
        self.files = entries.iter().map(CommitFile::from).collect();
        self
    }

    /// set the file list directly
    pub fn files(mut self, files: Vec<CommitFile>) -> Self {
        self.files = files;
        self
    }

    /// set the parent commit
    pub fn parent(mut self, parent: Option<Digest>) -> Self {
        self.parent = parent;
        self
    }

    /// pin the timestamp instead of using the current time
    pub fn timestamp(mut self, time: DateTime<Utc>) -> Self {
        self.timestamp = Some(format_timestamp(time));
        self
    }

    pub fn build(self) -> CommitRecord {
        CommitRecord {
            timestamp: self.timestamp.unwrap_or_else(|| format_timestamp(Utc::now())),
            message: self.message,
            files: self.files,
            parent: self.parent,
        }
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`
fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// store a commit record and return its digest
pub fn write_commit(store: &ObjectStore, record: &CommitRecord) -> StorageResult<Digest> {
    let encoded = record.encode()?;
    store.put(&encoded)
}

/// load and parse the commit stored under `digest`
pub fn load_commit(store: &ObjectStore, digest: &Digest) -> StorageResult<CommitRecord> {
    let raw = store.get(digest)?;
    CommitRecord::decode(digest, &raw)
}

/// iterate over commit history starting from a commit, newest first
pub struct History<'a> {
    store: &'a ObjectStore,
    next: Option<Digest>,
    seen: HashSet<Digest>,
}

impl<'a> History<'a> {
    pub fn new(store: &'a ObjectStore, start: Option<Digest>) -> Self {
        Self {
            store,
            next: start,
            seen: HashSet::new(),
        }
    }
}

impl Iterator for History<'_> {
    type Item = StorageResult<(Digest, CommitRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        let digest = self.next.take()?;

        if !self.seen.insert(digest.clone()) {
            return Some(Err(StorageError::corrupted(
                self.store.object_path(&digest),
                "commit chain loops back on itself",
            )));
        }

        match load_commit(self.store, &digest) {
            Ok(record) => {
                self.next = record.parent.clone();
                Some(Ok((digest, record)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// get history starting at `start` (usually HEAD)
pub fn history(store: &ObjectStore, start: Option<Digest>) -> History<'_> {
    History::new(store, start)
}
