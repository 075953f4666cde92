//! Well-known paths inside an installation or candidate tree

use std::path::{Path, PathBuf};

/// Metadata directory (manifest, version record, history, marker, cache)
pub const METADATA_DIR: &str = ".installation";

/// Provisioning-state snapshot (baseline hashes, system paths)
pub const PROVISIONING_DIR: &str = ".provisioning";

/// Top-level directories that never take part in a merge
pub const BOOKKEEPING_DIRS: &[&str] = &[METADATA_DIR, PROVISIONING_DIR];

pub const MANIFEST_FILE: &str = "manifest.toml";
pub const VERSION_FILE: &str = "version.toml";
pub const HISTORY_FILE: &str = "history.db";
pub const MARKER_FILE: &str = "candidate.toml";
pub const SOURCES_RECORD_FILE: &str = "update-sources.json";
pub const CACHE_DIR: &str = "cache";
pub const BASELINE_FILE: &str = "baseline.toml";
pub const SYSTEM_PATHS_FILE: &str = "system-paths.txt";

/// Suffix of the candidate's copy saved next to a preserved user file
pub const CANDIDATE_SUFFIX: &str = ".glnew";

/// Suffix of the user's copy saved next to a forced candidate file
pub const USER_SUFFIX: &str = ".glold";

/// Whether a relative path lives in a bookkeeping directory
pub fn is_bookkeeping(rel: &str) -> bool {
    let top = rel.split('/').next().unwrap_or_default();
    BOOKKEEPING_DIRS.contains(&top)
}

/// Whether a relative path is a conflict sentinel (`.glnew` / `.glold`) or
/// lies inside a directory moved aside as one
pub fn is_sentinel(rel: &str) -> bool {
    rel.split('/')
        .any(|part| part.ends_with(CANDIDATE_SUFFIX) || part.ends_with(USER_SUFFIX))
}

pub fn candidate_copy_of(rel: &str) -> String {
    format!("{rel}{CANDIDATE_SUFFIX}")
}

pub fn user_copy_of(rel: &str) -> String {
    format!("{rel}{USER_SUFFIX}")
}

/// Join a `/`-separated relative key onto a root
pub fn resolve(root: &Path, rel: &str) -> PathBuf {
    rel.split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

pub fn metadata_dir(root: &Path) -> PathBuf {
    root.join(METADATA_DIR)
}

pub fn provisioning_dir(root: &Path) -> PathBuf {
    root.join(PROVISIONING_DIR)
}
