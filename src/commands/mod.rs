pub mod apply;
pub mod conflicts;
pub mod history;
pub mod init;
pub mod stamp;
pub mod status;
pub mod updates;

use anyhow::{Context, Result, bail};
use std::path::Path;

use crate::cli::InstallationArgs;
use crate::config::FerryConfig;
use crate::history::SqliteHistory;
use crate::installation::Installation;

/// Installation selected by `--dir`, the config file or the current directory
pub(crate) fn open_installation(
    config: &FerryConfig,
    args: &InstallationArgs,
) -> Result<Installation> {
    let root = config.installation_dir(args.dir.as_deref());
    if !root.is_dir() {
        bail!("Installation directory not found: {}", root.display());
    }
    log::debug!("Using installation {}", root.display());
    Ok(Installation::new(root))
}

pub(crate) fn open_history(installation: &Installation) -> Result<SqliteHistory> {
    SqliteHistory::open(installation.root()).with_context(|| {
        format!(
            "Failed to open history of {}",
            installation.root().display()
        )
    })
}

pub(crate) fn require_candidate(candidate: &Path) -> Result<()> {
    if !candidate.is_dir() {
        bail!("Candidate directory not found: {}", candidate.display());
    }
    Ok(())
}
