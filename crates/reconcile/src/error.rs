//! Error types for the reconcile crate

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while diffing, planning or executing a merge
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A planned action failed against the filesystem
    #[error("failed to {action} {}: {source}", .path.display())]
    Action {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot or hashing failure
    #[error(transparent)]
    Manifest(#[from] manifest::Error),

    /// A system path pattern could not be compiled
    #[error("invalid system path pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// No baseline has been recorded for a tree
    #[error("no baseline recorded at {}", .0.display())]
    MissingBaseline(PathBuf),

    /// The recorded baseline could not be parsed
    #[error("invalid baseline {}: {source}", .path.display())]
    BaselineParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The baseline could not be serialized
    #[error("failed to serialize baseline: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for reconcile operations
pub type Result<T> = std::result::Result<T, Error>;
