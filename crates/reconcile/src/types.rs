//! Core types for merging a candidate into an installation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Local drift
// ============================================================================

/// One local divergence from the installation's recorded baseline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiffEntry {
    /// File created locally; not part of the baseline
    Added { path: String, current: String },
    /// Baseline file deleted locally
    Removed { path: String, baseline: String },
    /// Baseline file edited locally
    Modified {
        path: String,
        baseline: String,
        current: String,
    },
}

impl DiffEntry {
    pub fn path(&self) -> &str {
        match self {
            Self::Added { path, .. } | Self::Removed { path, .. } | Self::Modified { path, .. } => {
                path
            }
        }
    }

    /// What the user did to this path
    pub fn user_change(&self) -> UserChange {
        match self {
            Self::Added { .. } => UserChange::Added,
            Self::Removed { .. } => UserChange::Removed,
            Self::Modified { .. } => UserChange::Modified,
        }
    }
}

/// Differences between an installation's baseline and its on-disk state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsDiff {
    entries: BTreeMap<String, DiffEntry>,
}

impl FsDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a diff from entries; a later entry for the same path wins
    pub fn from_entries(entries: impl IntoIterator<Item = DiffEntry>) -> Self {
        let mut diff = Self::new();
        for entry in entries {
            diff.insert(entry);
        }
        diff
    }

    pub fn insert(&mut self, entry: DiffEntry) {
        self.entries.insert(entry.path().to_string(), entry);
    }

    pub fn get(&self, path: &str) -> Option<&DiffEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Entries in path order
    pub fn entries(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Conflicts
// ============================================================================

/// What the user did to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserChange {
    Added,
    Removed,
    Modified,
}

/// What the candidate does to a path, relative to the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateChange {
    Added,
    Removed,
    Modified,
    Unchanged,
}

/// Which side won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Candidate content forced in; user's copy saved as `.glold` when it existed
    Overwritten,
    /// User content kept; candidate's copy saved as `.glnew` when it exists
    UserPreserved,
}

/// How one divergent path was resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConflict {
    pub path: String,
    pub user: UserChange,
    pub update: UpdateChange,
    pub resolution: Resolution,
}

impl FileConflict {
    pub fn new(
        path: impl Into<String>,
        user: UserChange,
        update: UpdateChange,
        resolution: Resolution,
    ) -> Self {
        Self {
            path: path.into(),
            user,
            update,
            resolution,
        }
    }

    pub fn is_overwritten(&self) -> bool {
        self.resolution == Resolution::Overwritten
    }
}

impl fmt::Display for UserChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
        })
    }
}

impl fmt::Display for UpdateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
            Self::Unchanged => "unchanged",
        })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Overwritten => "overwritten",
            Self::UserPreserved => "user preserved",
        })
    }
}

impl fmt::Display for FileConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: user {}, update {} -> {}",
            self.path, self.user, self.update, self.resolution
        )
    }
}

// ============================================================================
// Plan
// ============================================================================

/// A single filesystem step of a merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "path", rename_all = "snake_case")]
pub enum PlannedAction {
    /// Copy the installation's file to `<path>.glold`
    SaveUserCopy(String),
    /// Copy the candidate's file to `<path>.glnew` inside the installation
    SaveCandidateCopy(String),
    /// Rename an installation directory to `<path>.glold`
    MoveAside(String),
    /// Create a directory the candidate has and the installation lacks
    CreateDir(String),
    /// Copy the candidate's file over the installation's
    Install(String),
    /// Delete an installation file
    DeleteFile(String),
    /// Remove an installation directory left empty by file deletions
    DeleteDir(String),
}

impl PlannedAction {
    pub fn path(&self) -> &str {
        match self {
            Self::SaveUserCopy(p)
            | Self::SaveCandidateCopy(p)
            | Self::MoveAside(p)
            | Self::CreateDir(p)
            | Self::Install(p)
            | Self::DeleteFile(p)
            | Self::DeleteDir(p) => p,
        }
    }

    /// Short verb for progress output and error messages
    pub fn verb(&self) -> &'static str {
        match self {
            Self::SaveUserCopy(_) => "save user copy of",
            Self::SaveCandidateCopy(_) => "save candidate copy of",
            Self::MoveAside(_) => "move aside",
            Self::CreateDir(_) => "create directory",
            Self::Install(_) => "install",
            Self::DeleteFile(_) => "delete",
            Self::DeleteDir(_) => "remove directory",
        }
    }
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb(), self.path())
    }
}

/// The outcome of planning a merge: conflicts plus ordered actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergePlan {
    pub conflicts: Vec<FileConflict>,
    pub actions: Vec<PlannedAction>,
}

impl MergePlan {
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty() && self.actions.is_empty()
    }

    /// Actions of one kind, e.g. `plan.count(|a| matches!(a, PlannedAction::Install(_)))`
    pub fn count(&self, predicate: impl Fn(&PlannedAction) -> bool) -> usize {
        self.actions.iter().filter(|a| predicate(a)).count()
    }
}

/// Summary of an executed plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub installed: usize,
    pub deleted: usize,
    pub dirs_created: usize,
    pub dirs_removed: usize,
    pub sentinels: usize,
}

impl ExecuteSummary {
    /// Total number of filesystem changes made
    pub fn total_changes(&self) -> usize {
        self.installed + self.deleted + self.dirs_created + self.dirs_removed + self.sentinels
    }

    /// Add an executed action to the summary
    pub fn add_action(&mut self, action: &PlannedAction) {
        match action {
            PlannedAction::SaveUserCopy(_)
            | PlannedAction::SaveCandidateCopy(_)
            | PlannedAction::MoveAside(_) => {
                self.sentinels += 1;
            }
            PlannedAction::CreateDir(_) => self.dirs_created += 1,
            PlannedAction::Install(_) => self.installed += 1,
            PlannedAction::DeleteFile(_) => self.deleted += 1,
            PlannedAction::DeleteDir(_) => self.dirs_removed += 1,
        }
    }
}
