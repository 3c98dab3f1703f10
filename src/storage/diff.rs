//! Line-level diffing of commits against their parents.
//!
//! Each file of a commit is compared with the file at the same logical path
//! in the parent commit. The result is data only; colouring and prefixes are
//! left to the caller.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::storage::commit::{self, CommitRecord};
use crate::storage::error::StorageResult;
use crate::storage::object::ObjectStore;
use crate::storage::types::Digest;

/// how a run of lines relates to the parent version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentTag {
    Unchanged,
    Added,
    Removed,
}

/// consecutive lines sharing one tag, line breaks included
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffSegment {
    pub tag: SegmentTag,
    pub value: String,
}

impl DiffSegment {
    pub fn new(tag: SegmentTag, value: impl Into<String>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }

    /// number of lines in the segment (a trailing partial line counts)
    pub fn line_count(&self) -> usize {
        self.value.lines().count()
    }
}

/// Diff `old` against `new` line by line.
///
/// Adjacent changes with the same tag are merged into one segment. In a
/// replaced region removals come before additions.
pub fn diff_lines(old: &str, new: &str) -> Vec<DiffSegment> {
    let diff = TextDiff::from_lines(old, new);
    let mut segments: Vec<DiffSegment> = Vec::new();

    for change in diff.iter_all_changes() {
        let tag = match change.tag() {
            ChangeTag::Equal => SegmentTag::Unchanged,
            ChangeTag::Insert => SegmentTag::Added,
            ChangeTag::Delete => SegmentTag::Removed,
        };

        match segments.last_mut() {
            Some(last) if last.tag == tag => last.value.push_str(change.value()),
            _ => segments.push(DiffSegment::new(tag, change.value())),
        }
    }

    segments
}

/// line counts for a set of segments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
}

impl DiffStats {
    pub fn from_segments(segments: &[DiffSegment]) -> Self {
        segments.iter().fold(Self::default(), |mut stats, seg| {
            match seg.tag {
                SegmentTag::Added => stats.added += seg.line_count(),
                SegmentTag::Removed => stats.removed += seg.line_count(),
                SegmentTag::Unchanged => {}
            }
            stats
        })
    }

    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// what happened to a file relative to the parent commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// the commit has no parent
    FirstCommit,
    /// the parent has no file at this path
    NewFile,
    /// the parent has a version at this path
    Modified { segments: Vec<DiffSegment> },
}

/// a file of the commit with its change against the parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub hash: Digest,
    pub content: String,
    pub kind: ChangeKind,
}

impl FileChange {
    pub fn stats(&self) -> DiffStats {
        match &self.kind {
            ChangeKind::Modified { segments } => DiffStats::from_segments(segments),
            ChangeKind::FirstCommit | ChangeKind::NewFile => DiffStats {
                added: self.content.lines().count(),
                removed: 0,
            },
        }
    }
}

/// every file of a commit, diffed against the parent
#[derive(Debug, Clone)]
pub struct CommitDiff {
    pub digest: Digest,
    pub commit: CommitRecord,
    pub files: Vec<FileChange>,
}

/// compute the per-file diff of the commit `digest` against its parent
pub fn diff_commit(store: &ObjectStore, digest: &Digest) -> StorageResult<CommitDiff> {
    let record = commit::load_commit(store, digest)?;
    let parent = match &record.parent {
        Some(parent) => Some(commit::load_commit(store, parent)?),
        None => None,
    };

    let mut files = Vec::with_capacity(record.files.len());
    for file in &record.files {
        let content = store.get(&file.hash)?;

        let kind = match &parent {
            None => ChangeKind::FirstCommit,
            Some(parent) => match parent.file(&file.path) {
                Some(previous) => {
                    let old = store.get(&previous.hash)?;
                    ChangeKind::Modified {
                        segments: diff_lines(&old, &content),
                    }
                }
                None => ChangeKind::NewFile,
            },
        };

        files.push(FileChange {
            path: file.path.clone(),
            hash: file.hash.clone(),
            content,
            kind,
        });
    }

    Ok(CommitDiff {
        digest: digest.clone(),
        commit: record,
        files,
    })
}
