//! User configuration (`config.toml` in the config directory)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::installation::DEFAULT_RUNNING_MARKERS;
use crate::paths;
use crate::updates::DEFAULT_JOBS;

/// Settings read from `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FerryConfig {
    /// Default installation directory for `--dir`
    #[serde(default)]
    pub installation: Option<String>,

    /// Width of the update-lookup worker pool
    #[serde(default)]
    pub jobs: Option<usize>,

    /// Where fetched channel files are cached
    #[serde(default)]
    pub cache_dir: Option<String>,

    /// Paths (relative to the installation) whose presence means the server runs
    #[serde(default)]
    pub running_markers: Option<Vec<String>>,
}

impl FerryConfig {
    /// Path of the config file
    pub fn config_file() -> Result<PathBuf> {
        Ok(paths::config_dir()?.join("config.toml"))
    }

    /// Load the config file, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Installation directory: explicit flag, then config, then the current directory
    pub fn installation_dir(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.installation.as_deref().map(paths::expand))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Worker pool width: explicit flag, then config, then the default
    pub fn jobs(&self, flag: Option<usize>) -> usize {
        flag.or(self.jobs).unwrap_or(DEFAULT_JOBS)
    }

    /// Channel cache directory
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(paths::expand(dir)),
            None => Ok(paths::cache_dir()?.join("channels")),
        }
    }

    pub fn running_markers(&self) -> Vec<String> {
        self.running_markers.clone().unwrap_or_else(|| {
            DEFAULT_RUNNING_MARKERS
                .iter()
                .map(|m| (*m).to_string())
                .collect()
        })
    }
}
