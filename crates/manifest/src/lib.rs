//! # Manifest
//!
//! Content snapshots and component manifests for installed server trees.
//!
//! This crate provides functionality to:
//! - Scan directories and compute BLAKE3 hashes for all files
//! - Record which version of each component an installation carries
//! - Compare manifests and report added, removed and updated components
//! - Order component versions (`1.0.0.Beta1 < 1.0.0.Final < 1.0.0.SP1`)
//!
//! ## Example
//!
//! ```no_run
//! use manifest::{ComponentManifest, snapshot};
//! use std::path::Path;
//!
//! // Hash every file below the installation, skipping metadata directories
//! let tree = snapshot(Path::new("/opt/server"), &[".installation"])?;
//! println!("{} files", tree.file_count());
//!
//! // Compare the installed components against a candidate
//! let installed = Path::new("/opt/server/.installation/manifest.toml");
//! let candidate = Path::new("/tmp/candidate/.installation/manifest.toml");
//! let installed = ComponentManifest::load(installed)?;
//! let candidate = ComponentManifest::load(candidate)?;
//! for change in installed.diff(&candidate) {
//!     println!("{change}");
//! }
//! # Ok::<(), manifest::Error>(())
//! ```

pub mod component;
mod error;
mod types;
pub mod version;

pub use component::{Component, ComponentManifest, Coordinate};
pub use error::{Error, Result};
pub use types::{ArtifactChange, ChangeKind, TreeSnapshot};
pub use version::ComponentVersion;

use blake3::Hasher;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component as PathComponent, Path};
use walkdir::WalkDir;

/// Snapshot a directory tree
///
/// Every regular file is hashed with BLAKE3. Top-level entries whose name is
/// listed in `exclude` are skipped entirely (together with their contents).
/// Symlinks are hashed through to their target.
///
/// # Arguments
/// * `root` - The directory to scan
/// * `exclude` - Top-level names to skip (e.g. metadata directories)
pub fn snapshot(root: &Path, exclude: &[&str]) -> Result<TreeSnapshot> {
    if !root.is_dir() {
        return Err(Error::PathNotFound(root.to_path_buf()));
    }

    let mut tree = TreeSnapshot::default();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !(e.depth() == 1
                && e.file_name()
                    .to_str()
                    .is_some_and(|name| exclude.contains(&name)))
        });

    for entry in walker {
        let entry = entry.map_err(|source| Error::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        let rel = relative_key(root, entry.path())?;

        if entry.file_type().is_dir() {
            tree.dirs.insert(rel);
        } else if entry.path().is_file() {
            let hash = hash_file(entry.path()).map_err(|source| Error::HashFailed {
                path: entry.path().to_path_buf(),
                source,
            })?;
            tree.files.insert(rel, hash);
        }
    }

    Ok(tree)
}

/// Hash a file using BLAKE3
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(1024 * 1024, file);
    let mut hasher = Hasher::new();

    let mut buffer = [0u8; 65536];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

/// Hash an in-memory buffer the same way [`hash_file`] hashes files
pub fn hash_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Express `path` relative to `root` as a `/`-separated key
pub fn relative_key(root: &Path, path: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| Error::InvalidPath(path.display().to_string()))?;

    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            PathComponent::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            PathComponent::CurDir => {}
            _ => return Err(Error::InvalidPath(path.display().to_string())),
        }
    }
    Ok(parts.join("/"))
}

// ============================================================================
// Tests
// ============================================================================
