//! Errors raised by the candidate validator and merge engine

use std::path::PathBuf;
use thiserror::Error;

use super::validator::CandidateStatus;
use crate::history::HistoryError;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The candidate cannot be applied to the installation
    #[error(
        "candidate {} cannot be applied to {}: {status} (expected {expected}, found {actual})",
        .candidate.display(),
        .installation.display()
    )]
    InvalidCandidate {
        status: CandidateStatus,
        candidate: PathBuf,
        installation: PathBuf,
        expected: String,
        actual: String,
    },

    /// A startup marker shows the server is running
    #[error("server appears to be running ({} exists); stop it before applying", .marker.display())]
    ServerRunning { marker: PathBuf },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid candidate marker {}: {source}", .path.display())]
    Marker {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid version record {}: {source}", .path.display())]
    VersionRecord {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Reconcile(#[from] reconcile::Error),

    #[error(transparent)]
    Manifest(#[from] manifest::Error),

    #[error(transparent)]
    History(#[from] HistoryError),
}

impl EngineError {
    /// Whether repeating the same call could succeed; never true for engine failures
    pub fn is_retryable(&self) -> bool {
        false
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
