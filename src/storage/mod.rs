//! storage layer for revu
//!
//! this module is the whole version-control core: content-addressed objects,
//! the staging index, the HEAD pointer, commit records and the diff engine.
//! The upper layers (façade, CLI) use this API and never touch the control
//! directory directly.
//!
//!  # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Repository                            │
//! │        (layout, locking, add / commit / log / show)         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!        │                     │                     │
//!        ▼                     ▼                     ▼
//!  ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//!  │   index     │       │   commit    │       │    refs     │
//!  │  (staging)  │       │  (history)  │       │   (HEAD)    │
//!  └─────────────┘       └─────────────┘       └─────────────┘
//!         │                     │  ▲
//!         │                     │  └────── diff (per-file line diff)
//!         └──────────┬──────────┘
//!                    ▼
//!             ┌─────────────┐
//!             │   object    │
//!             │ (blobs/ids) │
//!             └─────────────┘
//!  ```
//!
//! # Usage
//!
//! ```no_run
//! use revu::storage::{Repository, DEFAULT_CONTROL_DIR};
//!
//! let (repo, _status) = Repository::init(".", DEFAULT_CONTROL_DIR)?;
//! repo.add("hello.txt")?;
//! let digest = repo.commit("first")?;
//!
//! for entry in repo.history()? {
//!     let (id, commit) = entry?;
//!     println!("{} {}", id.short(), commit.summary());
//! }
//!
//! let diff = repo.diff_commit(&digest)?;
//! # Ok::<(), revu::storage::StorageError>(())
//! ```

mod commit;
mod diff;
mod error;
mod index;
mod lock;
mod object;
mod refs;
mod repository;
mod types;

// Re-export public API
pub use commit::{CommitBuilder, CommitFile, CommitRecord, History};
pub use diff::{diff_lines, ChangeKind, CommitDiff, DiffSegment, DiffStats, FileChange, SegmentTag};
pub use error::{StorageError, StorageResult};
pub use index::{StagingEntry, StagingIndex};
pub use lock::LockGuard;
pub use object::ObjectStore;
pub use refs::HeadRef;
pub use repository::{InitStatus, RepoLayout, Repository, RepositoryStats, DEFAULT_CONTROL_DIR};
pub use types::{logical_path, Digest, InvalidDigestError};
