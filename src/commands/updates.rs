//! `ferry updates`: ask the configured sources for newer components

use anyhow::{Context as _, Result};
use colored::Colorize;

use crate::Context;
use crate::cli::InstallationArgs;
use crate::config::FerryConfig;
use crate::progress;
use crate::ui;
use crate::updates::{ChannelResolver, ResolveOptions, UpdateFinder};

pub fn run(ctx: &Context, args: &InstallationArgs, jobs: Option<usize>) -> Result<()> {
    let config = FerryConfig::load()?;
    let installation = super::open_installation(&config, args)?;

    let manifest = installation.manifest().with_context(|| {
        format!(
            "Failed to read component manifest of {}",
            installation.root().display()
        )
    })?;
    let record = installation.version_record()?;
    let opts = ResolveOptions::new(record.sources).with_cache_dir(Some(config.cache_dir()?));

    let resolver = ChannelResolver::new();
    let finder = UpdateFinder::new(&resolver).with_jobs(config.jobs(jobs));

    let spinner = progress::spinner(
        &format!("Checking {} components...", manifest.len()),
        ctx.quiet,
    );
    let found = finder.find_updates(&manifest, installation.root(), &opts);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let updates = found.context("Failed to look up updates")?;

    if updates.is_empty() {
        ui::success("Everything is up to date");
        return Ok(());
    }

    ui::header("Available updates");
    for change in &updates.artifacts {
        println!("  {change}");
    }
    if !updates.packages.is_empty() {
        ui::section("Packages");
        for package in &updates.packages {
            let current = package.current.as_deref().unwrap_or("not installed");
            println!(
                "  {} {} {}",
                package.name,
                current.dimmed(),
                format!("-> {}", package.target).green()
            );
        }
    }

    println!();
    ui::info(&format!(
        "{} components and {} packages can be updated",
        updates.artifacts.len(),
        updates.packages.len()
    ));
    Ok(())
}
