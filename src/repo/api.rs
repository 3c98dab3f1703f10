//! Repository API - high-level interface for revu.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::storage::{
    CommitDiff, CommitRecord, Digest, InitStatus, Repository, RepositoryStats, StagingEntry,
    StorageError, DEFAULT_CONTROL_DIR,
};

/// Result type for façade operations.
pub type RevuResult<T> = Result<T, RevuError>;

/// Façade errors.
#[derive(Debug, Error)]
pub enum RevuError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RevuError {
    /// the underlying storage error, if any
    pub fn storage(&self) -> Option<&StorageError> {
        match self {
            RevuError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

/// Repository configuration options.
#[derive(Debug, Clone)]
pub struct RevuConfig {
    /// Repository root (the working directory being versioned).
    pub root: PathBuf,
    /// Name of the control directory under the root.
    pub control_dir: String,
    /// Bootstrap the layout on open if it is missing.
    pub create_if_missing: bool,
    /// Enable verbose logging.
    pub verbose: bool,
}

impl Default for RevuConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            control_dir: DEFAULT_CONTROL_DIR.to_string(),
            create_if_missing: false,
            verbose: false,
        }
    }
}

impl RevuConfig {
    /// Create a new configuration with the given root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Set the control directory name.
    pub fn control_dir(mut self, name: impl Into<String>) -> Self {
        self.control_dir = name.into();
        self
    }

    /// Set create_if_missing flag.
    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Set verbose flag.
    pub fn verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Check the configuration before touching the filesystem.
    pub fn validate(&self) -> RevuResult<()> {
        let name = self.control_dir.as_str();
        if name.is_empty() || name == "." || name == ".." {
            return Err(RevuError::InvalidConfig(format!(
                "control directory name '{}' is not usable",
                name
            )));
        }
        if name.contains(['/', '\\']) {
            return Err(RevuError::InvalidConfig(format!(
                "control directory name '{}' must not contain path separators",
                name
            )));
        }
        Ok(())
    }
}

/// The main repository handle.
pub struct Revu {
    config: RevuConfig,
    repo: Repository,
}

impl Revu {
    /// Open the repository rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> RevuResult<Self> {
        Self::open_with_config(RevuConfig::new(root.as_ref()))
    }

    /// Open a repository with custom configuration.
    pub fn open_with_config(config: RevuConfig) -> RevuResult<Self> {
        config.validate()?;
        let repo = if config.create_if_missing {
            Repository::open_or_init(&config.root, &config.control_dir)?
        } else {
            Repository::open(&config.root, &config.control_dir)?
        };
        Ok(Self { config, repo })
    }

    /// Bootstrap a repository; reports whether it already existed.
    pub fn init(config: RevuConfig) -> RevuResult<(Self, InitStatus)> {
        config.validate()?;
        let (repo, status) = Repository::init(&config.root, &config.control_dir)?;
        Ok((Self { config, repo }, status))
    }

    pub fn config(&self) -> &RevuConfig {
        &self.config
    }

    /// The storage-level handle.
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Stage the file at `file`.
    pub fn add(&self, file: impl AsRef<Path>) -> RevuResult<StagingEntry> {
        let file = file.as_ref();
        debug!(file = %file.display(), "add");
        Ok(self.repo.add(file)?)
    }

    /// Commit everything staged.
    pub fn commit(&self, message: &str) -> RevuResult<Digest> {
        debug!(msg = message, "commit");
        Ok(self.repo.commit(message)?)
    }

    /// Commits from HEAD, newest first.
    pub fn log(&self, limit: Option<usize>) -> RevuResult<Vec<(Digest, CommitRecord)>> {
        Ok(self.repo.log(limit)?)
    }

    /// Per-file diff of the commit named by the hex string `digest`.
    pub fn show(&self, digest: &str) -> RevuResult<CommitDiff> {
        let digest = Digest::from_hex(digest).map_err(StorageError::from)?;
        debug!(digest = %digest.short(), "show");
        Ok(self.repo.diff_commit(&digest)?)
    }

    /// Repository summary and the currently staged entries.
    pub fn status(&self) -> RevuResult<(RepositoryStats, Vec<StagingEntry>)> {
        Ok((self.repo.stats()?, self.repo.staged()?))
    }
}
