//! core type-safe wrappers for the storage layer.

use std::fmt;
use std::fmt::Formatter;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

/// A content digest: lowercase hex SHA-256.
///
/// Blobs and commits share one namespace, so the same type names both.
/// Construction from untrusted text goes through [`Digest::from_hex`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

impl Digest {
    /// number of hex characters in a digest
    pub const HEX_LEN: usize = 64;

    /// wrap an already-validated hex string (for internal use only)
    pub(crate) fn from_trusted(hex: String) -> Self {
        Self(hex)
    }

    /// parse a Digest from a hex string
    pub fn from_hex(hex: &str) -> Result<Self, InvalidDigestError> {
        let hex = hex.trim();
        if hex.len() != Self::HEX_LEN {
            return Err(InvalidDigestError::BadLength(hex.len()));
        }
        if let Some(c) = hex.chars().find(|c| !matches!(c, '0'..='9' | 'a'..='f')) {
            return Err(InvalidDigestError::BadChar(c));
        }
        Ok(Self(hex.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// short form of the digest
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Digest {
    type Error = InvalidDigestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

/// error when a string is not a well-formed digest
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidDigestError {
    #[error("digest must be 64 hex characters, got {0}")]
    BadLength(usize),

    #[error("digest contains invalid character '{0}'")]
    BadChar(char),
}

/// Normalize a path given to `add` into the logical path recorded in commits.
///
/// Paths inside `root` are made relative to it; separators become `/` and
/// `.` components are dropped so the same file always gets the same key.
pub fn logical_path(root: &Path, file: &Path) -> String {
    let relative = match (file.canonicalize(), root.canonicalize()) {
        (Ok(file_abs), Ok(root_abs)) => match file_abs.strip_prefix(&root_abs) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => file.to_path_buf(),
        },
        _ => file.strip_prefix(root).unwrap_or(file).to_path_buf(),
    };

    relative
        .components()
        .filter_map(|c| match c {
            Component::CurDir => None,
            Component::RootDir => Some(String::new()),
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "98ea6e4f216f2fb4b69fff9b3a44842c38686ca685f3f55dc48c5d3fb1107be4";

    #[test]
    fn test_digest_parse() {
        let digest = Digest::from_hex(SAMPLE).unwrap();
        assert_eq!(digest.as_str(), SAMPLE);
        assert_eq!(digest.short(), "98ea6e4f");
        assert_eq!(digest.to_string(), SAMPLE);
    }

    #[test]
    fn test_digest_trims_whitespace() {
        let digest = Digest::from_hex(&format!("{}\n", SAMPLE)).unwrap();
        assert_eq!(digest.as_str(), SAMPLE);
    }

    #[test]
    fn test_digest_rejects_bad_input() {
        assert_eq!(Digest::from_hex("abc"), Err(InvalidDigestError::BadLength(3)));

        let upper = SAMPLE.to_uppercase();
        assert!(matches!(Digest::from_hex(&upper), Err(InvalidDigestError::BadChar(_))));

        let traversal = format!("../{}", &SAMPLE[3..]);
        assert!(Digest::from_hex(&traversal).is_err());
    }

    #[test]
    fn test_digest_serde() {
        let digest = Digest::from_hex(SAMPLE).unwrap();
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", SAMPLE));

        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);

        assert!(serde_json::from_str::<Digest>("\"nope\"").is_err());
    }

    #[test]
    fn test_logical_path_relative_to_root() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        let file = dir.path().join("src").join("main.txt");
        std::fs::write(&file, "x").unwrap();

        assert_eq!(logical_path(dir.path(), &file), "src/main.txt");
    }

    #[test]
    fn test_logical_path_drops_cur_dir() {
        let root = Path::new("/nonexistent/root");
        assert_eq!(logical_path(root, Path::new("./notes/todo.txt")), "notes/todo.txt");
    }
}
