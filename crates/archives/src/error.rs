use std::path::PathBuf;

use thiserror::Error;

use crate::DatasetName;

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("transfer failed for {url}: {message}")]
    Transfer { url: String, message: String },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    Integrity {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("unsupported archive format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("not found: {path}")]
    NotFound { path: PathBuf },

    #[error("{dataset}: expected {expected} ± {tolerance} files, found {actual}")]
    CountMismatch {
        dataset: DatasetName,
        expected: usize,
        actual: usize,
        tolerance: usize,
    },

    #[error("archive {archive} has a member escaping the destination: {entry}")]
    UnsafeEntry { archive: PathBuf, entry: String },

    #[error("cannot read archive {path}: {message}")]
    Archive { path: PathBuf, message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AcquireError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AcquireError::Io { path: path.into(), source }
    }

    pub fn transfer(url: &str, message: impl ToString) -> Self {
        AcquireError::Transfer { url: url.to_string(), message: message.to_string() }
    }

    /// Whether a retry of the same operation could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AcquireError::Transfer { .. })
    }
}

pub type Result<T> = std::result::Result<T, AcquireError>;
