//! `ferry init`: record the baseline local changes are measured against

use anyhow::{Context as _, Result};
use reconcile::Baseline;

use crate::Context;
use crate::cli::InstallationArgs;
use crate::config::FerryConfig;
use crate::history::HistoryLog;
use crate::ui;

pub fn run(ctx: &Context, args: &InstallationArgs, force: bool) -> Result<()> {
    let config = FerryConfig::load()?;
    let installation = super::open_installation(&config, args)?;
    let root = installation.root();

    if Baseline::exists(root) && !force {
        ui::info(&format!(
            "{} already has a baseline (use --force to record a new one)",
            root.display()
        ));
        return Ok(());
    }

    let baseline = Baseline::capture(root)
        .with_context(|| format!("Failed to scan {}", root.display()))?;
    baseline
        .save(root)
        .with_context(|| format!("Failed to record baseline of {}", root.display()))?;

    let history = super::open_history(&installation)?;
    let revision = history.current_revision()?;

    if !ctx.quiet {
        ui::success(&format!(
            "Recorded baseline of {} files for {}",
            baseline.files.len(),
            root.display()
        ));
        ui::kv("Revision", &revision.to_string());
    }
    Ok(())
}
