//! Live installation metadata

use manifest::ComponentManifest;
use reconcile::layout::{MANIFEST_FILE, VERSION_FILE, metadata_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::{EngineError, Result};

/// Startup markers checked when no others are configured
pub const DEFAULT_RUNNING_MARKERS: &[&str] =
    &["standalone/tmp/startup-marker", "domain/tmp/startup-marker"];

/// A named update source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
}

/// Product name, version and configured update sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl VersionRecord {
    pub fn path(root: &Path) -> PathBuf {
        metadata_dir(root).join(VERSION_FILE)
    }

    /// Load the version record under `root`, if there is one
    pub fn load_optional(root: &Path) -> Result<Option<Self>> {
        let path = Self::path(root);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|source| EngineError::Io {
            path: path.clone(),
            source,
        })?;
        let record = toml::from_str(&content)
            .map_err(|source| EngineError::VersionRecord { path, source })?;
        Ok(Some(record))
    }
}

/// An installed server tree
#[derive(Debug, Clone)]
pub struct Installation {
    root: PathBuf,
}

impl Installation {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        metadata_dir(&self.root).join(MANIFEST_FILE)
    }

    /// Component manifest of this tree
    pub fn manifest(&self) -> Result<ComponentManifest> {
        Ok(ComponentManifest::load(&self.manifest_path())?)
    }

    pub fn version_record(&self) -> Result<VersionRecord> {
        Ok(VersionRecord::load_optional(&self.root)?.unwrap_or_default())
    }

    /// First startup marker present below the root
    ///
    /// Advisory only: the server may start or stop right after the check.
    pub fn running_marker<S: AsRef<str>>(&self, markers: &[S]) -> Option<PathBuf> {
        markers
            .iter()
            .map(|m| reconcile::layout::resolve(&self.root, m.as_ref()))
            .find(|path| path.exists())
    }
}
