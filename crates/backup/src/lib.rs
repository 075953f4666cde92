//! # backup
//!
//! Before/after snapshot-and-restore for a set of paths below a root.
//!
//! A [`StageBackup`] brackets an operation that mutates a directory tree in
//! several non-atomic steps. Record every path the operation may touch, run
//! the operation, and call [`StageBackup::restore`] if it failed half-way:
//!
//! - files that existed are copied back (only when their content changed),
//! - directories that were recorded as a whole lose any entry the operation
//!   created inside them,
//! - paths that did not exist at record time are deleted again.
//!
//! ```no_run
//! use backup::StageBackup;
//! use std::path::Path;
//!
//! let root = Path::new("/opt/server");
//! let mut stage = StageBackup::new(root)?;
//! stage.record(Path::new("configuration"))?;
//! stage.record(Path::new("modules/new-module"))?; // does not exist yet
//!
//! if let Err(e) = mutate_tree(root) {
//!     eprintln!("update failed: {e}, rolling back");
//!     stage.restore()?;
//! }
//! stage.close()?;
//! # fn mutate_tree(_: &Path) -> std::io::Result<()> { Ok(()) }
//! # Ok::<(), backup::Error>(())
//! ```
//!
//! Deciding *when* to snapshot is left to the caller.

mod error;

pub use error::{Error, Result};

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Counts reported by [`StageBackup::restore`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Files copied back from the backup area
    pub restored: usize,
    /// Files left untouched because their content was unchanged
    pub unchanged: usize,
    /// Live paths deleted because they were not part of the backup
    pub deleted: usize,
}

/// A set of recorded paths with an isolated backup area
#[derive(Debug)]
pub struct StageBackup {
    root: PathBuf,
    area: Option<TempDir>,
    /// Directories recorded as a whole (relative to root)
    full_dirs: BTreeSet<PathBuf>,
    /// Paths that did not exist at record time (relative to root)
    added: BTreeSet<PathBuf>,
}

impl StageBackup {
    /// Create a stage backup for paths below `root`, using a fresh
    /// temporary directory as backup area
    pub fn new(root: &Path) -> Result<Self> {
        let area = tempfile::Builder::new().prefix("stage-backup-").tempdir()?;
        Ok(Self::with_area(root, area))
    }

    /// Create a stage backup whose backup area lives below `parent`
    ///
    /// Useful when the system temp directory is on another filesystem.
    pub fn new_in(root: &Path, parent: &Path) -> Result<Self> {
        fs::create_dir_all(parent)?;
        let area = tempfile::Builder::new()
            .prefix("stage-backup-")
            .tempdir_in(parent)?;
        Ok(Self::with_area(root, area))
    }

    fn with_area(root: &Path, area: TempDir) -> Self {
        log::debug!(
            "Stage backup for {} in {}",
            root.display(),
            area.path().display()
        );
        Self {
            root: root.to_path_buf(),
            area: Some(area),
            full_dirs: BTreeSet::new(),
            added: BTreeSet::new(),
        }
    }

    /// Root every recorded path is resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths recorded as not existing, to be deleted on restore
    pub fn added_paths(&self) -> impl Iterator<Item = &Path> {
        self.added.iter().map(PathBuf::as_path)
    }

    fn area(&self) -> Result<&Path> {
        self.area.as_ref().map(TempDir::path).ok_or(Error::Closed)
    }

    /// Record `path` (absolute below root, or relative to root)
    ///
    /// An existing file is copied into the backup area, an existing directory
    /// is copied recursively and remembered as fully backed up. A missing
    /// path is remembered as added, together with the topmost missing
    /// ancestor so intermediate directories created later are removed too.
    pub fn record(&mut self, path: &Path) -> Result<()> {
        let rel = self.relative(path)?;
        let live = self.root.join(&rel);
        let area = self.area()?.to_path_buf();

        if fs::symlink_metadata(&live).is_err() {
            let mut topmost = rel.clone();
            while let Some(parent) = topmost.parent() {
                if parent.as_os_str().is_empty() || self.root.join(parent).exists() {
                    break;
                }
                topmost = parent.to_path_buf();
            }
            log::debug!(
                "Recording {} as added (topmost missing: {})",
                rel.display(),
                topmost.display()
            );
            self.added.insert(topmost);
            self.added.insert(rel);
            return Ok(());
        }

        if live.is_dir() {
            log::debug!("Recording directory {}", rel.display());
            copy_tree(&live, &area.join(&rel))?;
            self.full_dirs.insert(rel);
        } else {
            log::debug!("Recording file {}", rel.display());
            copy_file(&live, &area.join(&rel))?;
        }
        Ok(())
    }

    /// Put every recorded path back into its recorded state
    pub fn restore(&self) -> Result<RestoreSummary> {
        let area = self.area()?;
        let mut summary = RestoreSummary::default();

        // 1. Copy backed-up files back, skipping identical content
        for entry in WalkDir::new(area).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let rel = entry
                .path()
                .strip_prefix(area)
                .map_err(|_| Error::OutsideRoot {
                    root: area.to_path_buf(),
                    path: entry.path().to_path_buf(),
                })?;
            let live = self.root.join(rel);

            if entry.file_type().is_dir() {
                if live.is_file() {
                    remove_path(&live)?;
                }
                fs::create_dir_all(&live)?;
                continue;
            }

            if live.is_dir() {
                remove_path(&live)?;
            } else if live.is_file() && same_content(entry.path(), &live)? {
                summary.unchanged += 1;
                continue;
            }
            copy_file(entry.path(), &live)?;
            summary.restored += 1;
        }

        // 2. Drop entries created inside fully backed-up directories
        for dir in &self.full_dirs {
            let live_dir = self.root.join(dir);
            if !live_dir.is_dir() {
                continue;
            }
            let mut extra = Vec::new();
            for entry in WalkDir::new(&live_dir).min_depth(1).sort_by_file_name() {
                let entry = entry?;
                let rel = entry
                    .path()
                    .strip_prefix(&self.root)
                    .map_err(|_| Error::OutsideRoot {
                        root: self.root.clone(),
                        path: entry.path().to_path_buf(),
                    })?;
                if fs::symlink_metadata(area.join(rel)).is_err() {
                    extra.push(entry.path().to_path_buf());
                }
            }
            for path in extra {
                // An ancestor may already have taken this path with it
                if fs::symlink_metadata(&path).is_ok() {
                    remove_path(&path)?;
                    summary.deleted += 1;
                }
            }
        }

        // 3. Delete paths that did not exist at record time
        for rel in &self.added {
            let live = self.root.join(rel);
            if fs::symlink_metadata(&live).is_ok() {
                remove_path(&live)?;
                summary.deleted += 1;
            }
        }

        log::debug!(
            "Restored {} files, deleted {} paths, {} unchanged",
            summary.restored,
            summary.deleted,
            summary.unchanged
        );
        Ok(summary)
    }

    /// Discard the backup area
    ///
    /// Safe to call more than once, and after an operation that never
    /// called [`restore`](Self::restore).
    pub fn close(&mut self) -> Result<()> {
        if let Some(area) = self.area.take() {
            log::debug!("Discarding stage backup {}", area.path().display());
            area.close()?;
        }
        Ok(())
    }

    fn relative(&self, path: &Path) -> Result<PathBuf> {
        let outside = || Error::OutsideRoot {
            root: self.root.clone(),
            path: path.to_path_buf(),
        };
        let rel = if path.is_absolute() {
            path.strip_prefix(&self.root).map_err(|_| outside())?
        } else {
            path
        };
        let mut clean = PathBuf::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                _ => return Err(outside()),
            }
        }
        Ok(clean)
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to).map_err(|source| Error::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to)?;
    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn remove_path(path: &Path) -> Result<()> {
    let result = if path.is_dir() && !path.is_symlink() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|source| Error::Remove {
        path: path.to_path_buf(),
        source,
    })
}

fn same_content(a: &Path, b: &Path) -> Result<bool> {
    let (meta_a, meta_b) = (fs::metadata(a)?, fs::metadata(b)?);
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }
    Ok(hash(a)? == hash(b)?)
}

fn hash(path: &Path) -> Result<blake3::Hash> {
    let mut hasher = blake3::Hasher::new();
    let mut file = fs::File::open(path)?;
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize())
}

impl Drop for StageBackup {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Failed to discard stage backup: {e}");
        }
    }
}
