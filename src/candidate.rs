//! Candidate bookkeeping
//!
//! A candidate is a provisioned server tree waiting to be folded into an
//! installation. Stamping it records which installation revision it was built
//! against and what kind of operation it represents.

use clap::ValueEnum;
use manifest::{ArtifactChange, ComponentManifest};
use reconcile::Baseline;
use reconcile::layout::{MARKER_FILE, SOURCES_RECORD_FILE, metadata_dir};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::engine::{EngineError, Result};
use crate::history::HistoryLog;
use crate::installation::{Installation, VersionRecord};

/// Kind of change a candidate carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    /// Newer component versions
    Update,
    /// A previous revision rebuilt
    Revert,
    /// Additional features installed
    FeatureAdd,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Revert => "revert",
            Self::FeatureAdd => "feature-add",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "update" => Ok(Self::Update),
            "revert" => Ok(Self::Revert),
            "feature-add" => Ok(Self::FeatureAdd),
            other => Err(format!("unknown operation '{other}'")),
        }
    }
}

/// Marker written into a candidate's metadata directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Installation revision the candidate was built against
    pub base_revision: u64,
    pub operation: OperationKind,
}

impl Marker {
    pub fn path(candidate: &Path) -> PathBuf {
        metadata_dir(candidate).join(MARKER_FILE)
    }

    /// Read the marker of `candidate`; `None` if it was never stamped
    pub fn load(candidate: &Path) -> Result<Option<Self>> {
        let path = Self::path(candidate);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|source| EngineError::Io {
            path: path.clone(),
            source,
        })?;
        let marker =
            toml::from_str(&content).map_err(|source| EngineError::Marker { path, source })?;
        Ok(Some(marker))
    }

    pub fn save(&self, candidate: &Path) -> Result<()> {
        let path = Self::path(candidate);
        let content = toml::to_string(self).map_err(|e| EngineError::Io {
            path: path.clone(),
            source: std::io::Error::other(e),
        })?;
        write_file(&path, &content)
    }
}

/// Stamp `candidate` as built from `installation` for `operation`
///
/// Writes the marker (fatal on failure), records a baseline for the
/// candidate if provisioning did not leave one, and stores which source
/// supplied each changed component (best effort). Returns the component
/// changes the candidate brings.
pub fn stamp(
    installation: &Installation,
    candidate: &Path,
    operation: OperationKind,
    history: &dyn HistoryLog,
) -> Result<Vec<ArtifactChange>> {
    let marker = Marker {
        base_revision: history.current_revision()?,
        operation,
    };
    marker.save(candidate)?;
    log::info!(
        "Stamped {} as {} from revision {}",
        candidate.display(),
        operation,
        marker.base_revision
    );

    if !Baseline::exists(candidate) {
        log::debug!("Recording baseline for {}", candidate.display());
        Baseline::capture(candidate)?.save(candidate)?;
    }

    let installed = installation.manifest()?;
    let incoming = Installation::new(candidate).manifest()?;
    let changes = installed.diff(&incoming);

    let fallback = VersionRecord::load_optional(candidate)?
        .and_then(|record| record.sources.first().map(|s| s.name.clone()));
    if let Err(e) = write_sources_record(candidate, &incoming, &changes, fallback.as_deref()) {
        log::warn!("Could not record update sources for {}: {e}", candidate.display());
    }

    Ok(changes)
}

/// Persist `coordinate -> source label` for every changed component
fn write_sources_record(
    candidate: &Path,
    incoming: &ComponentManifest,
    changes: &[ArtifactChange],
    fallback: Option<&str>,
) -> Result<()> {
    let record: BTreeMap<String, String> = changes
        .iter()
        .filter_map(|change| {
            let label = change
                .source
                .clone()
                .or_else(|| {
                    incoming
                        .get(&change.coordinate)
                        .and_then(|c| c.source.clone())
                })
                .or_else(|| fallback.map(str::to_string))?;
            Some((change.coordinate.to_string(), label))
        })
        .collect();

    let path = sources_record_path(candidate);
    let content = serde_json::to_string_pretty(&record).map_err(|e| EngineError::Io {
        path: path.clone(),
        source: std::io::Error::other(e),
    })?;
    write_file(&path, &content)
}

pub fn sources_record_path(candidate: &Path) -> PathBuf {
    metadata_dir(candidate).join(SOURCES_RECORD_FILE)
}

/// Read the side record written by [`stamp`]
pub fn load_sources_record(candidate: &Path) -> Result<BTreeMap<String, String>> {
    let path = sources_record_path(candidate);
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content = fs::read_to_string(&path).map_err(|source| EngineError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| EngineError::Io {
        path,
        source: std::io::Error::other(e),
    })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    let io = |source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io)?;
    }
    fs::write(path, content).map_err(io)
}
