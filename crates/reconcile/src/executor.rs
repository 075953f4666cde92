//! Execution engine - applies a merge plan to the installation

use crate::context::ProgressCallback;
use crate::error::{Error, Result};
use crate::layout;
use crate::types::{ExecuteSummary, MergePlan, PlannedAction};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Apply every action of `plan`, in order
///
/// # Arguments
/// * `plan` - The merge plan to run
/// * `installation` - Root of the live installation
/// * `candidate` - Root of the candidate tree supplying new content
/// * `progress` - Progress callback
///
/// The first failing action aborts execution; earlier actions are not
/// undone.
pub fn execute<P: ProgressCallback>(
    plan: &MergePlan,
    installation: &Path,
    candidate: &Path,
    progress: &mut P,
) -> Result<ExecuteSummary> {
    let mut summary = ExecuteSummary::default();
    progress.on_start(plan.actions.len());

    for action in &plan.actions {
        apply_action(action, installation, candidate)?;
        summary.add_action(action);
        progress.on_action(action);
    }

    progress.on_complete(&summary);
    log::info!(
        "Applied {} changes to {}",
        summary.total_changes(),
        installation.display()
    );
    Ok(summary)
}

/// Apply a single action
fn apply_action(action: &PlannedAction, installation: &Path, candidate: &Path) -> Result<()> {
    let rel = action.path();
    let target = layout::resolve(installation, rel);
    log::debug!("{action}");

    let failed = |path: PathBuf| {
        move |source: io::Error| Error::Action {
            action: action.verb(),
            path,
            source,
        }
    };

    match action {
        PlannedAction::SaveUserCopy(_) => {
            let copy = layout::resolve(installation, &layout::user_copy_of(rel));
            copy_file(&target, &copy).map_err(failed(target.clone()))
        }
        PlannedAction::SaveCandidateCopy(_) => {
            let source = layout::resolve(candidate, rel);
            let copy = layout::resolve(installation, &layout::candidate_copy_of(rel));
            copy_file(&source, &copy).map_err(failed(source.clone()))
        }
        PlannedAction::MoveAside(_) => {
            let aside = layout::resolve(installation, &layout::user_copy_of(rel));
            move_aside(&target, &aside).map_err(failed(target.clone()))
        }
        PlannedAction::CreateDir(_) => fs::create_dir_all(&target).map_err(failed(target.clone())),
        PlannedAction::Install(_) => {
            let source = layout::resolve(candidate, rel);
            copy_file(&source, &target).map_err(failed(target.clone()))
        }
        PlannedAction::DeleteFile(_) => match fs::remove_file(&target) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("{} already gone", target.display());
                Ok(())
            }
            other => other.map_err(failed(target.clone())),
        },
        PlannedAction::DeleteDir(_) => fs::remove_dir(&target).map_err(failed(target.clone())),
    }
}

/// Copy a file, creating the destination's parent directories
fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    Ok(())
}

/// Rename `from` to `to`, replacing whatever an earlier merge left at `to`
fn move_aside(from: &Path, to: &Path) -> io::Result<()> {
    match fs::symlink_metadata(to) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(to)?,
        Ok(_) => fs::remove_file(to)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::rename(from, to)
}
