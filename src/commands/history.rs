//! `ferry history`: list recorded revisions

use anyhow::{Context as _, Result};
use colored::Colorize;

use crate::Context;
use crate::cli::InstallationArgs;
use crate::config::FerryConfig;
use crate::history::HistoryLog;
use crate::ui;

pub fn run(_ctx: &Context, args: &InstallationArgs) -> Result<()> {
    let config = FerryConfig::load()?;
    let installation = super::open_installation(&config, args)?;
    let history = super::open_history(&installation)?;

    let revisions = history
        .list_revisions()
        .context("Failed to read revisions")?;

    if revisions.is_empty() {
        ui::info("No revisions recorded yet");
        return Ok(());
    }

    ui::header(&format!("History of {}", installation.root().display()));
    for state in &revisions {
        println!(
            "  {}  {:<12} {}  {}",
            format!("{:>4}", state.revision).bold(),
            state.operation.as_str(),
            state.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            state.summary
        );
    }
    Ok(())
}
