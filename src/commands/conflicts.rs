//! `ferry conflicts`: dry run of a merge

use anyhow::{Context as _, Result};
use colored::Colorize;
use reconcile::{BaselineDiffProvider, FileConflict, layout};
use std::fs;
use std::path::Path;

use crate::Context;
use crate::cli::{CandidateArgs, InstallationArgs};
use crate::config::FerryConfig;
use crate::engine::MergeEngine;
use crate::ui;

pub fn run(
    ctx: &Context,
    args: &InstallationArgs,
    candidate_args: &CandidateArgs,
    show_diff: bool,
) -> Result<()> {
    let config = FerryConfig::load()?;
    let installation = super::open_installation(&config, args)?;
    let history = super::open_history(&installation)?;
    let candidate = candidate_args.candidate.as_path();
    super::require_candidate(candidate)?;

    let engine = MergeEngine::new(
        installation.clone(),
        candidate,
        &BaselineDiffProvider,
        &history,
    );

    let verification = engine.verify_candidate(candidate_args.operation)?;
    if !verification.status.is_ok() {
        ui::warn(&format!(
            "Candidate is {} (expected {}, found {})",
            verification.status, verification.expected, verification.actual
        ));
    }

    let plan = engine
        .plan()
        .with_context(|| format!("Failed to plan merge of {}", candidate.display()))?;

    if plan.conflicts.is_empty() {
        ui::success("No conflicts");
    } else {
        ui::header(&format!("{} conflicts", plan.conflicts.len()));
        for conflict in &plan.conflicts {
            ui::conflict(conflict);
            if show_diff {
                show_text_diff(installation.root(), candidate, conflict);
            }
        }
    }

    if ctx.verbose > 0 && !plan.actions.is_empty() {
        ui::section("Planned actions");
        for action in &plan.actions {
            println!("  {} {}", format!("{:<14}", action.verb()).dimmed(), action.path());
        }
    }
    Ok(())
}

/// Line diff from the installed file to the candidate's copy
fn show_text_diff(installation: &Path, candidate: &Path, conflict: &FileConflict) {
    let ours =
        fs::read_to_string(layout::resolve(installation, &conflict.path)).unwrap_or_default();
    let Ok(theirs) = fs::read_to_string(layout::resolve(candidate, &conflict.path)) else {
        println!("    {}", "(no text in candidate)".dimmed());
        return;
    };

    let diff = similar::TextDiff::from_lines(&ours, &theirs);
    let mut has_changes = false;

    for change in diff.iter_all_changes() {
        match change.tag() {
            similar::ChangeTag::Delete => {
                has_changes = true;
                print!("    {}", format!("- {change}").red());
            }
            similar::ChangeTag::Insert => {
                has_changes = true;
                print!("    {}", format!("+ {change}").green());
            }
            similar::ChangeTag::Equal => {}
        }
    }

    if !has_changes {
        println!("    {}", "(files are identical)".dimmed());
    }
}
