//! Data types for the manifest crate

use crate::component::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Content snapshot of a directory tree
///
/// Paths are relative to the scanned root and always `/`-separated so that
/// snapshots taken on different platforms compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    /// Relative file path -> BLAKE3 hex digest
    pub files: BTreeMap<String, String>,
    /// Relative directory paths
    pub dirs: BTreeSet<String>,
}

impl TreeSnapshot {
    /// Hash of the file at `path`, if the snapshot contains it
    pub fn hash_of(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn contains_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn contains_dir(&self, path: &str) -> bool {
        self.dirs.contains(path)
    }

    /// Number of files in the snapshot
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Files located below `dir` (at any depth)
    pub fn files_under<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let prefix = format!("{dir}/");
        self.files
            .keys()
            .filter(move |p| p.starts_with(&prefix))
            .map(String::as_str)
    }

    /// Directories located below `dir` (at any depth)
    pub fn dirs_under<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let prefix = format!("{dir}/");
        self.dirs
            .iter()
            .filter(move |p| p.starts_with(&prefix))
            .map(String::as_str)
    }
}

/// What happened to a single component between two manifests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeKind {
    /// Component only exists on the new side
    Added { version: String },
    /// Component only exists on the old side
    Removed { version: String },
    /// Component exists on both sides with different versions
    Updated { from: String, to: String },
}

/// A reported difference for one component coordinate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactChange {
    pub coordinate: Coordinate,
    pub kind: ChangeKind,
    /// Channel or source label that supplied the new version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ArtifactChange {
    pub fn added(coordinate: Coordinate, version: impl Into<String>) -> Self {
        Self {
            coordinate,
            kind: ChangeKind::Added {
                version: version.into(),
            },
            source: None,
        }
    }

    pub fn removed(coordinate: Coordinate, version: impl Into<String>) -> Self {
        Self {
            coordinate,
            kind: ChangeKind::Removed {
                version: version.into(),
            },
            source: None,
        }
    }

    pub fn updated(coordinate: Coordinate, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            coordinate,
            kind: ChangeKind::Updated {
                from: from.into(),
                to: to.into(),
            },
            source: None,
        }
    }

    /// Attach the source label that supplied this change
    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    /// Version installed before the change
    pub fn old_version(&self) -> Option<&str> {
        match &self.kind {
            ChangeKind::Added { .. } => None,
            ChangeKind::Removed { version } => Some(version),
            ChangeKind::Updated { from, .. } => Some(from),
        }
    }

    /// Version installed after the change
    pub fn new_version(&self) -> Option<&str> {
        match &self.kind {
            ChangeKind::Added { version } => Some(version),
            ChangeKind::Removed { .. } => None,
            ChangeKind::Updated { to, .. } => Some(to),
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self.kind, ChangeKind::Added { .. })
    }

    pub fn is_removed(&self) -> bool {
        matches!(self.kind, ChangeKind::Removed { .. })
    }

    pub fn is_updated(&self) -> bool {
        matches!(self.kind, ChangeKind::Updated { .. })
    }
}

impl fmt::Display for ArtifactChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ChangeKind::Added { version } => write!(f, "+ {} {}", self.coordinate, version),
            ChangeKind::Removed { version } => write!(f, "- {} {}", self.coordinate, version),
            ChangeKind::Updated { from, to } => {
                write!(f, "~ {} {} -> {}", self.coordinate, from, to)
            }
        }?;
        if let Some(source) = &self.source {
            write!(f, " [{source}]")?;
        }
        Ok(())
    }
}
