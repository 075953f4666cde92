//! Baselines and local drift detection

use crate::context::DiffProvider;
use crate::error::{Error, Result};
use crate::layout::{self, BASELINE_FILE, BOOKKEEPING_DIRS};
use crate::types::{DiffEntry, FsDiff};
use manifest::TreeSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Hashes of every file as last provisioned
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    /// Relative file path -> BLAKE3 hex digest
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

impl Baseline {
    /// Location of the baseline file under `root`
    pub fn path(root: &Path) -> PathBuf {
        layout::provisioning_dir(root).join(BASELINE_FILE)
    }

    /// Build a baseline from a snapshot, dropping conflict sentinels
    pub fn from_snapshot(tree: &TreeSnapshot) -> Self {
        let files = tree
            .files
            .iter()
            .filter(|(path, _)| !layout::is_sentinel(path))
            .map(|(path, hash)| (path.clone(), hash.clone()))
            .collect();
        Self { files }
    }

    /// Snapshot `root` (without bookkeeping) and build its baseline
    pub fn capture(root: &Path) -> Result<Self> {
        let tree = manifest::snapshot(root, BOOKKEEPING_DIRS)?;
        Ok(Self::from_snapshot(&tree))
    }

    pub fn exists(root: &Path) -> bool {
        Self::path(root).is_file()
    }

    /// Load the baseline recorded under `root`
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::path(root);
        if !path.exists() {
            return Err(Error::MissingBaseline(path));
        }
        let content = fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|source| Error::BaselineParse { path, source })
    }

    /// Record this baseline under `root`
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = Self::path(root);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml::to_string(self)?)?;
        log::debug!("Recorded baseline of {} files at {}", self.files.len(), path.display());
        Ok(())
    }

    pub fn hash_of(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }
}

impl FsDiff {
    /// Differences between a recorded baseline and a current snapshot
    ///
    /// Conflict sentinels on either side are ignored.
    pub fn between(baseline: &Baseline, current: &TreeSnapshot) -> Self {
        let mut diff = Self::new();

        for (path, recorded) in &baseline.files {
            if layout::is_sentinel(path) {
                continue;
            }
            match current.hash_of(path) {
                None => diff.insert(DiffEntry::Removed {
                    path: path.clone(),
                    baseline: recorded.clone(),
                }),
                Some(hash) if hash != recorded => diff.insert(DiffEntry::Modified {
                    path: path.clone(),
                    baseline: recorded.clone(),
                    current: hash.to_string(),
                }),
                Some(_) => {}
            }
        }

        for (path, hash) in &current.files {
            if !layout::is_sentinel(path) && !baseline.files.contains_key(path) {
                diff.insert(DiffEntry::Added {
                    path: path.clone(),
                    current: hash.clone(),
                });
            }
        }

        diff
    }
}

/// Diff provider backed by `.provisioning/baseline.toml`
#[derive(Debug, Default, Clone, Copy)]
pub struct BaselineDiffProvider;

impl DiffProvider for BaselineDiffProvider {
    fn compute_diff(&self, installation_root: &Path) -> Result<FsDiff> {
        let baseline = Baseline::load(installation_root)?;
        let current = manifest::snapshot(installation_root, BOOKKEEPING_DIRS)?;
        let diff = FsDiff::between(&baseline, &current);
        log::debug!(
            "{} local changes in {}",
            diff.len(),
            installation_root.display()
        );
        Ok(diff)
    }
}
