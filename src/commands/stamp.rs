//! `ferry stamp`: mark a provisioned tree as a candidate

use anyhow::{Context as _, Result};

use crate::Context;
use crate::candidate;
use crate::cli::{CandidateArgs, InstallationArgs};
use crate::config::FerryConfig;
use crate::ui;

pub fn run(ctx: &Context, args: &InstallationArgs, candidate_args: &CandidateArgs) -> Result<()> {
    let config = FerryConfig::load()?;
    let installation = super::open_installation(&config, args)?;
    let history = super::open_history(&installation)?;
    let path = candidate_args.candidate.as_path();
    super::require_candidate(path)?;

    let changes = candidate::stamp(&installation, path, candidate_args.operation, &history)
        .with_context(|| format!("Failed to stamp {}", path.display()))?;

    if ctx.quiet {
        return Ok(());
    }

    ui::success(&format!(
        "Stamped {} for {}",
        path.display(),
        candidate_args.operation
    ));
    if changes.is_empty() {
        ui::dim("no component changes");
    } else {
        ui::section("Component changes");
        for change in &changes {
            println!("  {change}");
        }
    }
    Ok(())
}
