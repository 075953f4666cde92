//! Artifact update discovery
//!
//! The finder asks a [`VersionResolver`] for the newest version of every
//! installed component and combines the result with the provisioning
//! engine's package plan into an [`UpdateSet`].

mod channel;
mod finder;

pub use channel::ChannelResolver;
pub use finder::{DEFAULT_JOBS, UpdateFinder};

use manifest::{ArtifactChange, ComponentVersion, Coordinate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::installation::Source;

/// Errors raised while looking for updates
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("no source knows {coordinate}")]
    Unresolved { coordinate: Coordinate },

    #[error("no update sources configured")]
    NoSources,

    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid channel {source_name}: {source}")]
    Parse {
        source_name: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to create worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("package plan failed: {0}")]
    Plan(String),
}

pub type Result<T> = std::result::Result<T, UpdateError>;

/// Resolver configuration for one lookup batch
///
/// Passed into every resolver call; nothing is read from process-wide state.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Sources to consult, in order
    pub sources: Vec<Source>,
    /// Where fetched remote channels are cached; no caching when `None`
    pub cache_dir: Option<PathBuf>,
}

impl ResolveOptions {
    pub fn new(sources: Vec<Source>) -> Self {
        Self {
            sources,
            cache_dir: None,
        }
    }

    pub fn with_cache_dir(mut self, cache_dir: Option<PathBuf>) -> Self {
        self.cache_dir = cache_dir;
        self
    }
}

/// Looks up the newest available version of a component
pub trait VersionResolver: Sync {
    fn latest_version(
        &self,
        coordinate: &Coordinate,
        opts: &ResolveOptions,
    ) -> Result<ComponentVersion>;
}

/// A package-level change planned by the provisioning engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageUpdate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    pub target: String,
}

/// Source of the provisioning engine's package update plan
///
/// Queried on the lookup pool alongside the version lookups.
pub trait PackagePlanner: Sync {
    fn update_plan(&self, installation: &Path) -> Result<Vec<PackageUpdate>>;
}

/// Planner for installations without package-level provisioning
pub struct NoPackagePlan;

impl PackagePlanner for NoPackagePlan {
    fn update_plan(&self, _installation: &Path) -> Result<Vec<PackageUpdate>> {
        Ok(Vec::new())
    }
}

/// Everything an update would change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSet {
    pub artifacts: Vec<ArtifactChange>,
    pub packages: Vec<PackageUpdate>,
}

impl UpdateSet {
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty() && self.packages.is_empty()
    }
}
