//! Component manifests: which version of each component is installed.

use crate::error::{Error, Result};
use crate::types::ArtifactChange;
use crate::version::ComponentVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// A component coordinate in `group:artifact[:classifier]` form
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate(String);

impl Coordinate {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let parts: Vec<&str> = raw.split(':').collect();
        let valid = (2..=3).contains(&parts.len())
            && parts
                .iter()
                .all(|p| !p.is_empty() && !p.chars().any(char::is_whitespace));
        if !valid {
            return Err(Error::InvalidCoordinate(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn group(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }

    pub fn artifact(&self) -> &str {
        self.0.split(':').nth(1).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Coordinate {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Coordinate> for String {
    fn from(value: Coordinate) -> Self {
        value.0
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One installed component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub coordinate: Coordinate,
    pub version: String,
    /// Channel that supplied this version, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Component {
    pub fn new(coordinate: Coordinate, version: impl Into<String>) -> Self {
        Self {
            coordinate,
            version: version.into(),
            source: None,
        }
    }

    pub fn parsed_version(&self) -> ComponentVersion {
        ComponentVersion::parse(&self.version)
    }
}

/// The set of components recorded by an installation or a candidate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentManifest {
    #[serde(default)]
    pub components: Vec<Component>,
}

impl ComponentManifest {
    /// Load a manifest from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::PathNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save the manifest as TOML, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut sorted = self.clone();
        sorted
            .components
            .sort_by(|a, b| a.coordinate.cmp(&b.coordinate));
        fs::write(path, toml::to_string_pretty(&sorted)?)?;
        Ok(())
    }

    pub fn get(&self, coordinate: &Coordinate) -> Option<&Component> {
        self.components.iter().find(|c| &c.coordinate == coordinate)
    }

    /// Insert or replace a component
    pub fn set(&mut self, component: Component) {
        self.components
            .retain(|c| c.coordinate != component.coordinate);
        self.components.push(component);
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Components keyed by coordinate
    pub fn by_coordinate(&self) -> BTreeMap<&Coordinate, &Component> {
        self.components.iter().map(|c| (&c.coordinate, c)).collect()
    }

    /// Compare this (installed) manifest against a `candidate` manifest.
    ///
    /// Added and updated changes carry the candidate's coordinate, version
    /// and source; removed changes carry the installed ones. Versions that
    /// only differ in insignificant trailing items are not reported.
    pub fn diff(&self, candidate: &ComponentManifest) -> Vec<ArtifactChange> {
        let installed = self.by_coordinate();
        let incoming = candidate.by_coordinate();
        let mut changes = Vec::new();

        for (coordinate, old) in &installed {
            match incoming.get(coordinate) {
                None => changes.push(
                    ArtifactChange::removed((*coordinate).clone(), &old.version)
                        .with_source(old.source.clone()),
                ),
                Some(new) if old.parsed_version() != new.parsed_version() => changes.push(
                    ArtifactChange::updated((*coordinate).clone(), &old.version, &new.version)
                        .with_source(new.source.clone()),
                ),
                Some(_) => {}
            }
        }

        for (coordinate, new) in &incoming {
            if !installed.contains_key(coordinate) {
                changes.push(
                    ArtifactChange::added(new.coordinate.clone(), &new.version)
                        .with_source(new.source.clone()),
                );
            }
        }

        changes.sort_by(|a, b| a.coordinate.cmp(&b.coordinate));
        changes
    }
}
