use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PackError>;

/// The primary error type for all operations in the `treepack` crate.
///
/// Every failure carries the offending path. No operation retries; all
/// failures are treated as non-transient and returned to the caller.
#[derive(Debug, Error)]
pub enum PackError {
    /// A source path or archive file that must exist does not.
    #[error("path does not exist: {0}")]
    NotFound(PathBuf),

    /// The archive target already exists at creation time.
    #[error("cowardly refusing to over-write existing archive {0}")]
    AlreadyExists(PathBuf),

    /// A destination file implied by the archive already exists, found during
    /// the validate pass of extraction (or its defensive re-check on apply).
    #[error("cowardly refusing to over-write {0}")]
    WouldOverwrite(PathBuf),

    /// A stat, read, or write failed, including zero-byte short writes.
    #[error("I/O error on path '{path}': {source}")]
    Io { source: io::Error, path: PathBuf },

    /// The archive stream is truncated or malformed.
    #[error("malformed archive '{path}': {detail}")]
    Format { path: PathBuf, detail: String },
}

impl PackError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PackError::Io {
            source,
            path: path.into(),
        }
    }

    pub(crate) fn format(path: impl Into<PathBuf>, detail: impl ToString) -> Self {
        PackError::Format {
            path: path.into(),
            detail: detail.to_string(),
        }
    }
}
