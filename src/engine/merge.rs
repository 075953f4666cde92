//! Folding a candidate into the installation

use manifest::TreeSnapshot;
use reconcile::layout::{
    self, BOOKKEEPING_DIRS, CACHE_DIR, MANIFEST_FILE, PROVISIONING_DIR, VERSION_FILE,
};
use reconcile::{
    DiffProvider, ExecuteSummary, FileConflict, MergeInput, MergePlan, ProgressCallback,
    SystemPaths,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::error::{EngineError, Result};
use super::validator::{self, Verification};
use crate::candidate::OperationKind;
use crate::history::{HistoryLog, SavedState};
use crate::installation::{DEFAULT_RUNNING_MARKERS, Installation};

/// Result of a successful apply
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub conflicts: Vec<FileConflict>,
    pub summary: ExecuteSummary,
    pub revision: SavedState,
}

/// Validates a candidate and merges it into an installation
pub struct MergeEngine<'a> {
    installation: Installation,
    candidate: PathBuf,
    diff_provider: &'a dyn DiffProvider,
    history: &'a dyn HistoryLog,
    running_markers: Vec<String>,
}

impl<'a> MergeEngine<'a> {
    pub fn new(
        installation: Installation,
        candidate: impl Into<PathBuf>,
        diff_provider: &'a dyn DiffProvider,
        history: &'a dyn HistoryLog,
    ) -> Self {
        Self {
            installation,
            candidate: candidate.into(),
            diff_provider,
            history,
            running_markers: DEFAULT_RUNNING_MARKERS
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
        }
    }

    /// Replace the startup markers that signal a running server
    pub fn with_running_markers(mut self, markers: Vec<String>) -> Self {
        self.running_markers = markers;
        self
    }

    /// Validate the candidate for `operation` without modifying anything
    pub fn verify_candidate(&self, operation: OperationKind) -> Result<Verification> {
        validator::verify(&self.installation, &self.candidate, operation, self.history)
    }

    /// Conflicts an apply would produce right now
    pub fn conflicts(&self) -> Result<Vec<FileConflict>> {
        Ok(self.plan()?.conflicts)
    }

    /// The full merge plan for the current state of both trees
    pub fn plan(&self) -> Result<MergePlan> {
        let root = self.installation.root();
        let diff = self.diff_provider.compute_diff(root)?;
        let installation = snapshot(root)?;
        let candidate = snapshot(&self.candidate)?;
        let system = self.system_paths()?;

        Ok(reconcile::plan(
            &MergeInput {
                diff: &diff,
                candidate: &candidate,
                installation: &installation,
            },
            &system,
        ))
    }

    /// Patterns recorded by the installation and by the candidate
    fn system_paths(&self) -> Result<SystemPaths> {
        let installed = SystemPaths::load(self.installation.root())?;
        let incoming = SystemPaths::load(&self.candidate)?;
        Ok(SystemPaths::new(
            installed.patterns().iter().chain(incoming.patterns()),
        )?)
    }

    /// Merge the candidate into the installation
    ///
    /// Fails without touching the installation if the candidate is not
    /// applicable for `operation` or the server is running. A failure after
    /// that point leaves the installation partially updated.
    pub fn apply_update<P: ProgressCallback>(
        &self,
        operation: OperationKind,
        progress: &mut P,
    ) -> Result<ApplyOutcome> {
        let verification = self.verify_candidate(operation)?;
        if !verification.status.is_ok() {
            return Err(EngineError::InvalidCandidate {
                status: verification.status,
                candidate: self.candidate.clone(),
                installation: self.installation.root().to_path_buf(),
                expected: verification.expected,
                actual: verification.actual,
            });
        }

        if let Some(marker) = self.installation.running_marker(&self.running_markers) {
            return Err(EngineError::ServerRunning { marker });
        }

        let plan = self.plan()?;
        log::info!(
            "Merging {} into {} ({} actions, {} conflicts)",
            self.candidate.display(),
            self.installation.root().display(),
            plan.actions.len(),
            plan.conflicts.len()
        );

        let summary = reconcile::execute(
            &plan,
            self.installation.root(),
            &self.candidate,
            progress,
        )?;

        self.update_metadata()?;
        let revision = self
            .history
            .record_revision(operation, &describe(&summary, plan.conflicts.len()))?;

        Ok(ApplyOutcome {
            conflicts: plan.conflicts,
            summary,
            revision,
        })
    }

    /// Carry the candidate's bookkeeping over to the installation
    fn update_metadata(&self) -> Result<()> {
        let root = self.installation.root();
        let from_meta = layout::metadata_dir(&self.candidate);
        let to_meta = layout::metadata_dir(root);

        for name in [MANIFEST_FILE, VERSION_FILE] {
            let source = from_meta.join(name);
            if source.is_file() {
                copy_file(&source, &to_meta.join(name))?;
            } else {
                log::debug!("Candidate has no {name}");
            }
        }

        replace_tree(
            &self.candidate.join(PROVISIONING_DIR),
            &root.join(PROVISIONING_DIR),
        )?;
        replace_tree(&from_meta.join(CACHE_DIR), &to_meta.join(CACHE_DIR))?;

        log::debug!("Updated metadata of {}", root.display());
        Ok(())
    }
}

fn describe(summary: &ExecuteSummary, conflicts: usize) -> String {
    format!(
        "{} installed, {} deleted, {} conflicts",
        summary.installed, summary.deleted, conflicts
    )
}

fn snapshot(root: &Path) -> Result<TreeSnapshot> {
    Ok(manifest::snapshot(root, BOOKKEEPING_DIRS)?)
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> EngineError + '_ {
    move |source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    fs::copy(from, to).map_err(io_error(to))?;
    Ok(())
}

/// Replace `to` with a copy of `from`; remove `to` when `from` is absent
fn replace_tree(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        fs::remove_dir_all(to).map_err(io_error(to))?;
    }
    if !from.is_dir() {
        return Ok(());
    }

    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| EngineError::Io {
            path: from.to_path_buf(),
            source: e.into(),
        })?;
        let Ok(rel) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_error(&target))?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}
