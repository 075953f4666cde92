//! Path resolution for ferry's own files
//!
//! # Environment Variables
//!
//! - `FERRY_CONFIG_DIR` - Override config directory
//! - `FERRY_CACHE_DIR` - Override cache directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `FERRY_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/ferry` (if set)
//! 3. `~/.config/ferry`
//!
//! For cache_dir():
//! 1. `FERRY_CACHE_DIR` environment variable
//! 2. `XDG_CACHE_HOME/ferry` (if set)
//! 3. `~/.cache/ferry`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "FERRY_CONFIG_DIR";

/// Environment variable for cache directory override
pub const ENV_CACHE_DIR: &str = "FERRY_CACHE_DIR";

/// Get the ferry config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("ferry");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("ferry");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Get the ferry cache directory path
pub fn cache_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CACHE_DIR) {
        return Ok(expand(&dir));
    }

    if let Ok(xdg_cache) = std::env::var("XDG_CACHE_HOME") {
        return Ok(PathBuf::from(xdg_cache).join("ferry"));
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".cache").join("ferry"))
}

/// Expand ~ and environment variables in a path string
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
