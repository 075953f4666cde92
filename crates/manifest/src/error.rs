//! Error types for the manifest crate

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during manifest operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Path does not exist
    #[error("path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Failed to hash file
    #[error("failed to hash file {}: {source}", .path.display())]
    HashFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to walk a directory tree
    #[error("failed to walk {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A manifest file could not be parsed
    #[error("invalid manifest {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A manifest could not be serialized
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Component coordinate is not `group:artifact[:classifier]`
    #[error("invalid component coordinate: {0}")]
    InvalidCoordinate(String),

    /// Invalid path (e.g., cannot be expressed relative to the scan root)
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, Error>;
