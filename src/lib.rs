//! revu - a minimal local version control engine
//!
//! File contents are stored as content-addressed objects, staged files are
//! grouped into immutable commits linked by parent digests, and any commit
//! can be diffed line by line against its parent.
//!
//! # Example
//!
//! ```no_run
//! use revu::repo::{Revu, RevuConfig};
//!
//! let (revu, _status) = Revu::init(RevuConfig::new(".")).unwrap();
//! revu.add("hello.txt").unwrap();
//! let digest = revu.commit("first").unwrap();
//! let diff = revu.show(digest.as_str()).unwrap();
//! ```

pub mod repo;
pub mod storage;
