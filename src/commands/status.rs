//! `ferry status`: installation state, local drift and candidate validity

use anyhow::{Context as _, Result};
use colored::Colorize;
use reconcile::{Baseline, BaselineDiffProvider, DiffEntry, DiffProvider};
use std::path::Path;

use crate::Context;
use crate::candidate::{OperationKind, load_sources_record};
use crate::cli::InstallationArgs;
use crate::config::FerryConfig;
use crate::engine::MergeEngine;
use crate::history::HistoryLog;
use crate::ui;

pub fn run(
    ctx: &Context,
    args: &InstallationArgs,
    candidate: Option<&Path>,
    operation: OperationKind,
) -> Result<()> {
    let config = FerryConfig::load()?;
    let installation = super::open_installation(&config, args)?;
    let history = super::open_history(&installation)?;
    let root = installation.root();

    ui::header(&format!("Installation {}", root.display()));

    let record = installation.version_record()?;
    if !record.product.is_empty() {
        ui::kv("Product", &format!("{} {}", record.product, record.version));
    }
    ui::kv("Revision", &history.current_revision()?.to_string());
    if installation.manifest_path().exists() {
        let manifest = installation.manifest().with_context(|| {
            format!(
                "Failed to read {}",
                installation.manifest_path().display()
            )
        })?;
        ui::kv("Components", &manifest.len().to_string());
    }
    ui::kv("Sources", &record.sources.len().to_string());
    match installation.running_marker(&config.running_markers()) {
        Some(marker) => ui::kv(
            "Server",
            &format!("running ({})", marker.display()).yellow().to_string(),
        ),
        None => ui::kv("Server", "stopped"),
    }

    ui::section("Local changes");
    if Baseline::exists(root) {
        let diff = BaselineDiffProvider
            .compute_diff(root)
            .with_context(|| format!("Failed to diff {}", root.display()))?;
        if diff.is_empty() {
            ui::dim("none");
        }
        for entry in diff.entries() {
            print_entry(entry, ctx.verbose > 0);
        }
    } else {
        ui::warn("No baseline recorded; run `ferry init` first");
    }

    if let Some(candidate) = candidate {
        super::require_candidate(candidate)?;
        let engine = MergeEngine::new(
            installation.clone(),
            candidate,
            &BaselineDiffProvider,
            &history,
        );
        let verification = engine.verify_candidate(operation)?;

        ui::section("Candidate");
        ui::kv("Path", &candidate.display().to_string());
        ui::kv("Operation", operation.as_str());
        if verification.status.is_ok() {
            ui::kv("Status", &"ok".green().to_string());
        } else {
            ui::kv("Status", &verification.status.to_string().red().to_string());
            ui::kv("Expected", &verification.expected);
            ui::kv("Actual", &verification.actual);
        }

        let sources = load_sources_record(candidate)?;
        if !sources.is_empty() {
            ui::section("Update sources");
            for (coordinate, source) in &sources {
                ui::kv(coordinate, source);
            }
        }
    }

    println!();
    Ok(())
}

fn print_entry(entry: &DiffEntry, hashes: bool) {
    let (mark, detail) = match entry {
        DiffEntry::Added { current, .. } => ("+".green(), current.as_str()),
        DiffEntry::Removed { baseline, .. } => ("-".red(), baseline.as_str()),
        DiffEntry::Modified { current, .. } => ("~".yellow(), current.as_str()),
    };
    if hashes {
        println!("  {} {} {}", mark, entry.path(), detail.dimmed());
    } else {
        println!("  {} {}", mark, entry.path());
    }
}
