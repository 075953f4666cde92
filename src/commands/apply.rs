//! `ferry apply`: merge a candidate into the installation

use anyhow::{Context as _, Result, bail};
use backup::StageBackup;
use colored::Colorize;
use reconcile::{BaselineDiffProvider, PlannedAction};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Context;
use crate::cli::{CandidateArgs, InstallationArgs};
use crate::config::FerryConfig;
use crate::engine::MergeEngine;
use crate::installation::Installation;
use crate::progress::{self, BarProgress};
use crate::ui;

pub fn run(
    ctx: &Context,
    args: &InstallationArgs,
    candidate_args: &CandidateArgs,
    yes: bool,
    backup: bool,
) -> Result<()> {
    let config = FerryConfig::load()?;
    let installation = super::open_installation(&config, args)?;
    let history = super::open_history(&installation)?;
    let candidate = candidate_args.candidate.as_path();
    let operation = candidate_args.operation;
    super::require_candidate(candidate)?;

    let engine = MergeEngine::new(
        installation.clone(),
        candidate,
        &BaselineDiffProvider,
        &history,
    )
    .with_running_markers(config.running_markers());

    let verification = engine.verify_candidate(operation)?;
    if !verification.status.is_ok() {
        bail!(
            "Cannot apply {}: candidate is {} (expected {}, found {})",
            candidate.display(),
            verification.status,
            verification.expected,
            verification.actual
        );
    }

    let plan = engine
        .plan()
        .with_context(|| format!("Failed to plan merge of {}", candidate.display()))?;

    if !ctx.quiet {
        ui::header(&format!("Apply {} ({operation})", candidate.display()));
        ui::kv("Installation", &installation.root().display().to_string());
        ui::kv(
            "Install",
            &plan
                .count(|a| matches!(a, PlannedAction::Install(_)))
                .to_string(),
        );
        ui::kv(
            "Delete",
            &plan
                .count(|a| matches!(a, PlannedAction::DeleteFile(_)))
                .to_string(),
        );
        ui::kv("Conflicts", &plan.conflicts.len().to_string());
        for conflict in &plan.conflicts {
            ui::conflict(conflict);
        }
        println!();
    }

    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt("Merge the candidate into the installation?")
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;

        if !confirmed {
            ui::info("Cancelled");
            return Ok(());
        }
    }

    let mut stage = if backup {
        Some(record_backup(&installation, candidate, ctx.quiet)?)
    } else {
        None
    };

    let mut progress = BarProgress::new(ctx.quiet);
    let outcome = match engine.apply_update(operation, &mut progress) {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(stage) = &stage {
                ui::warn("Merge failed, restoring the installation from backup");
                match stage.restore() {
                    Ok(summary) => log::info!(
                        "Restored {} files, removed {} added paths",
                        summary.restored,
                        summary.deleted
                    ),
                    Err(restore_err) => ui::error(&format!("Restore failed: {restore_err}")),
                }
            }
            if !e.is_retryable() {
                ui::dim("Provision and stamp a new candidate before trying again");
            }
            return Err(e).with_context(|| format!("Failed to apply {}", candidate.display()));
        }
    };

    if let Some(stage) = stage.as_mut() {
        stage.close().context("Failed to discard backup")?;
    }

    if ctx.quiet {
        return Ok(());
    }

    let summary = &outcome.summary;
    ui::success(&format!(
        "Applied {} as revision {}",
        candidate.display(),
        outcome.revision.revision
    ));
    ui::kv("Installed", &summary.installed.to_string());
    ui::kv("Deleted", &summary.deleted.to_string());
    ui::kv(
        "Directories",
        &format!("+{} -{}", summary.dirs_created, summary.dirs_removed),
    );
    if summary.sentinels > 0 {
        ui::kv(
            "Saved copies",
            &format!("{} (.glnew/.glold)", summary.sentinels)
                .yellow()
                .to_string(),
        );
    }
    Ok(())
}

/// Back up every top-level entry the merge may touch
///
/// The backup area sits next to the installation so restoring stays on the
/// same filesystem.
fn record_backup(
    installation: &Installation,
    candidate: &Path,
    quiet: bool,
) -> Result<StageBackup> {
    let root = installation.root();
    let mut names: BTreeSet<OsString> = top_level_names(root)?;
    names.extend(top_level_names(candidate)?);

    let spinner = progress::spinner("Backing up installation...", quiet);
    let stage = match root.parent() {
        Some(parent) => StageBackup::new_in(root, parent),
        None => StageBackup::new(root),
    };
    let mut stage =
        stage.with_context(|| format!("Failed to create backup for {}", root.display()))?;
    for name in names {
        let rel = PathBuf::from(&name);
        stage
            .record(&rel)
            .with_context(|| format!("Failed to back up {}", rel.display()))?;
    }
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    log::info!(
        "Backed up {} ({} entries only in the candidate)",
        root.display(),
        stage.added_paths().count()
    );
    Ok(stage)
}

fn top_level_names(dir: &Path) -> Result<BTreeSet<OsString>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        names.insert(entry.file_name());
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{read, write};
    use manifest::TreeSnapshot;
    use reconcile::{MergePlan, NoProgress};
    use tempfile::TempDir;

    fn tree(root: &Path) -> TreeSnapshot {
        manifest::snapshot(root, &[]).unwrap()
    }

    #[test]
    fn test_backup_restores_failed_merge() {
        let inst = TempDir::new().unwrap();
        let cand = TempDir::new().unwrap();
        write(inst.path(), "bin/run.sh", "1");
        write(inst.path(), "conf/a.xml", "a");
        write(inst.path(), "lib/foo", "file");
        write(cand.path(), "bin/run.sh", "2");
        write(cand.path(), "lib/foo/a.jar", "1");
        write(cand.path(), "modules/new.jar", "n");
        let before = tree(inst.path());

        let installation = Installation::new(inst.path());
        let stage = record_backup(&installation, cand.path(), true).unwrap();
        assert!(stage.added_paths().any(|p| p == Path::new("modules")));

        // Fails on the last install, after the tree has been changed
        let plan = MergePlan {
            conflicts: vec![],
            actions: vec![
                PlannedAction::Install("bin/run.sh".into()),
                PlannedAction::DeleteFile("conf/a.xml".into()),
                PlannedAction::DeleteFile("lib/foo".into()),
                PlannedAction::CreateDir("lib/foo".into()),
                PlannedAction::CreateDir("modules".into()),
                PlannedAction::Install("lib/foo/a.jar".into()),
                PlannedAction::Install("modules/new.jar".into()),
                PlannedAction::Install("modules/missing.jar".into()),
            ],
        };
        reconcile::execute(&plan, inst.path(), cand.path(), &mut NoProgress).unwrap_err();
        assert_eq!(read(inst.path(), "bin/run.sh"), "2");
        assert!(inst.path().join("lib/foo").is_dir());

        stage.restore().unwrap();
        assert_eq!(tree(inst.path()), before);
        assert_eq!(read(inst.path(), "lib/foo"), "file");
        assert!(!inst.path().join("modules").exists());
    }

    #[test]
    fn test_backup_area_next_to_installation() {
        let parent = TempDir::new().unwrap();
        let root = parent.path().join("server");
        let cand = TempDir::new().unwrap();
        write(&root, "bin/run.sh", "1");

        let mut stage = record_backup(&Installation::new(&root), cand.path(), true).unwrap();
        assert_eq!(fs::read_dir(parent.path()).unwrap().count(), 2);

        stage.close().unwrap();
        assert_eq!(fs::read_dir(parent.path()).unwrap().count(), 1);
    }
}
