//! Channel files: TOML lists of published component versions

use manifest::{ComponentVersion, Coordinate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::{ResolveOptions, Result, UpdateError, VersionResolver};
use crate::installation::Source;

/// Published versions of one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub coordinate: Coordinate,
    #[serde(default)]
    pub versions: Vec<String>,
}

/// A parsed channel file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub components: Vec<ChannelEntry>,
}

impl Channel {
    pub fn parse(source_name: &str, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| UpdateError::Parse {
            source_name: source_name.to_string(),
            source,
        })
    }

    /// Newest version this channel publishes for `coordinate`
    pub fn latest(&self, coordinate: &Coordinate) -> Option<ComponentVersion> {
        self.components
            .iter()
            .filter(|entry| &entry.coordinate == coordinate)
            .flat_map(|entry| entry.versions.iter())
            .map(|v| ComponentVersion::parse(v))
            .max()
    }
}

/// Resolver reading channel files from local paths, `file://` or `http(s)://` URLs
///
/// Each source is loaded once per resolver and shared between workers.
pub struct ChannelResolver {
    agent: ureq::Agent,
    loaded: Mutex<HashMap<String, Arc<Channel>>>,
}

impl ChannelResolver {
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    fn channel(&self, source: &Source, opts: &ResolveOptions) -> Result<Arc<Channel>> {
        if let Some(channel) = self
            .loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&source.url)
        {
            return Ok(Arc::clone(channel));
        }

        let content = self.read_source(source, opts)?;
        let channel = Arc::new(Channel::parse(&source.name, &content)?);
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(source.url.clone(), Arc::clone(&channel));
        Ok(channel)
    }

    fn read_source(&self, source: &Source, opts: &ResolveOptions) -> Result<String> {
        let url = source.url.as_str();
        if url.starts_with("http://") || url.starts_with("https://") {
            return self.fetch_remote(source, opts);
        }

        let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
        log::debug!("Reading channel {} from {}", source.name, path.display());
        fs::read_to_string(&path).map_err(|e| UpdateError::Io { path, source: e })
    }

    fn fetch_remote(&self, source: &Source, opts: &ResolveOptions) -> Result<String> {
        let cached = opts
            .cache_dir
            .as_deref()
            .map(|dir| cache_path(dir, &source.url));

        log::debug!("Fetching channel {} from {}", source.name, source.url);
        let fetched = self
            .agent
            .get(&source.url)
            .header("User-Agent", "ferry")
            .call()
            .and_then(|mut response| response.body_mut().read_to_string());

        match fetched {
            Ok(body) => {
                if let Some(path) = &cached {
                    store_cache(path, &body);
                }
                Ok(body)
            }
            Err(e) => match cached.filter(|p| p.is_file()) {
                Some(path) => {
                    log::warn!(
                        "Fetching {} failed ({e}); using cached copy {}",
                        source.url,
                        path.display()
                    );
                    fs::read_to_string(&path).map_err(|source| UpdateError::Io { path, source })
                }
                None => Err(UpdateError::Fetch {
                    url: source.url.clone(),
                    message: e.to_string(),
                }),
            },
        }
    }
}

impl Default for ChannelResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionResolver for ChannelResolver {
    fn latest_version(
        &self,
        coordinate: &Coordinate,
        opts: &ResolveOptions,
    ) -> Result<ComponentVersion> {
        if opts.sources.is_empty() {
            return Err(UpdateError::NoSources);
        }

        let mut latest: Option<ComponentVersion> = None;
        for source in &opts.sources {
            let found = self.channel(source, opts)?.latest(coordinate);
            if let Some(found) = found {
                if latest.as_ref().is_none_or(|current| found > *current) {
                    latest = Some(found);
                }
            }
        }

        latest.ok_or_else(|| UpdateError::Unresolved {
            coordinate: coordinate.clone(),
        })
    }
}

/// Cache file of the channel served at `url`
fn cache_path(dir: &Path, url: &str) -> PathBuf {
    let key = blake3::hash(url.as_bytes()).to_hex();
    dir.join(format!("{key}.toml"))
}

/// Best effort; a failed cache write only costs a refetch
fn store_cache(path: &Path, body: &str) {
    let result = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::write(path, body));
    if let Err(e) = result {
        log::debug!("Could not cache channel at {}: {e}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn coord(s: &str) -> Coordinate {
        Coordinate::parse(s).unwrap()
    }

    fn channel_file(dir: &Path, name: &str, body: &str) -> Source {
        let path = dir.join(format!("{name}.toml"));
        fs::write(&path, body).unwrap();
        Source {
            name: name.to_string(),
            url: format!("file://{}", path.display()),
        }
    }

    #[test]
    fn test_channel_latest_uses_version_order() {
        let channel = Channel::parse(
            "stable",
            r#"
[[components]]
coordinate = "g:a"
versions = ["1.9", "1.10", "1.10.0.Beta1"]
"#,
        )
        .unwrap();
        assert_eq!(channel.latest(&coord("g:a")).unwrap().as_str(), "1.10");
        assert!(channel.latest(&coord("g:b")).is_none());
    }

    #[test]
    fn test_latest_across_sources() {
        let tmp = TempDir::new().unwrap();
        let stable = channel_file(
            tmp.path(),
            "stable",
            "[[components]]\ncoordinate = \"g:a\"\nversions = [\"1.0.0\", \"1.1.0\"]\n",
        );
        let preview = channel_file(
            tmp.path(),
            "preview",
            "[[components]]\ncoordinate = \"g:a\"\nversions = [\"1.2.0.Beta1\"]\n",
        );
        let opts = ResolveOptions::new(vec![stable, preview]);

        let latest = ChannelResolver::new()
            .latest_version(&coord("g:a"), &opts)
            .unwrap();
        assert_eq!(latest.as_str(), "1.2.0.Beta1");
    }

    #[test]
    fn test_plain_path_source() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("local.toml");
        fs::write(&path, "[[components]]\ncoordinate = \"g:a\"\nversions = [\"3\"]\n").unwrap();
        let opts = ResolveOptions::new(vec![Source {
            name: "local".into(),
            url: path.display().to_string(),
        }]);
        let latest = ChannelResolver::new()
            .latest_version(&coord("g:a"), &opts)
            .unwrap();
        assert_eq!(latest.as_str(), "3");
    }

    #[test]
    fn test_unknown_coordinate_is_error() {
        let tmp = TempDir::new().unwrap();
        let source = channel_file(tmp.path(), "stable", "components = []\n");
        let opts = ResolveOptions::new(vec![source]);
        let result = ChannelResolver::new().latest_version(&coord("g:x"), &opts);
        assert!(matches!(result, Err(UpdateError::Unresolved { .. })));
    }

    #[test]
    fn test_no_sources_is_error() {
        let result =
            ChannelResolver::new().latest_version(&coord("g:a"), &ResolveOptions::default());
        assert!(matches!(result, Err(UpdateError::NoSources)));
    }

    #[test]
    fn test_missing_file_is_error() {
        let opts = ResolveOptions::new(vec![Source {
            name: "gone".into(),
            url: "file:///nonexistent/ferry/channel.toml".into(),
        }]);
        let result = ChannelResolver::new().latest_version(&coord("g:a"), &opts);
        assert!(matches!(result, Err(UpdateError::Io { .. })));
    }

    #[test]
    fn test_cache_path_keyed_by_url() {
        let dir = Path::new("/cache");
        let first = cache_path(dir, "https://repo.example/a.b/channel.toml");
        let second = cache_path(dir, "https://repo.example/a_b/channel.toml");
        assert_ne!(first, second);
        assert_eq!(first.parent(), Some(dir));
        assert_eq!(first, cache_path(dir, "https://repo.example/a.b/channel.toml"));
    }

    #[test]
    fn test_similar_source_names_do_not_share_cache() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache");
        let dotted = Source {
            name: "a.b".into(),
            url: "https://repo.example/dotted.toml".into(),
        };
        let underscored = Source {
            name: "a_b".into(),
            url: "https://repo.example/underscored.toml".into(),
        };
        store_cache(&cache_path(&cache, &dotted.url), "dotted");
        store_cache(&cache_path(&cache, &underscored.url), "underscored");

        let read = |s: &Source| fs::read_to_string(cache_path(&cache, &s.url)).unwrap();
        assert_eq!(read(&dotted), "dotted");
        assert_eq!(read(&underscored), "underscored");
    }
}
