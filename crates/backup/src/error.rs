//! Error types for the backup crate

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while recording or restoring a stage backup
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to copy a file into or out of the backup area
    #[error("failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to delete a path during restore
    #[error("failed to remove {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to walk a directory tree
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// The recorded path is not inside the backup root
    #[error("path is outside of {}: {}", .root.display(), .path.display())]
    OutsideRoot { root: PathBuf, path: PathBuf },

    /// The backup area was already discarded
    #[error("stage backup is closed")]
    Closed,
}

/// Result type for backup operations
pub type Result<T> = std::result::Result<T, Error>;
