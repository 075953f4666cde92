//! Provider traits
//!
//! These traits let the reconcile crate be used without depending on a
//! specific provisioning backend, UI, or system-path source.

use crate::error::Result;
use crate::types::{ExecuteSummary, FsDiff, PlannedAction};
use std::path::Path;

/// Source of an installation's local drift
///
/// Implemented by the provisioning backend that recorded the baseline. The
/// merge engine consumes the diff and never recomputes it.
pub trait DiffProvider {
    /// Diff between the last recorded baseline and the current on-disk tree
    fn compute_diff(&self, installation_root: &Path) -> Result<FsDiff>;
}

/// Classifier for paths owned by the platform
///
/// Implement this trait to define which paths are never user-customizable.
pub trait PathClassifier {
    /// Check if a relative, `/`-separated path is a system path
    fn is_system_path(&self, path: &str) -> bool;
}

/// Classifier that treats every path as user-owned
pub struct NoSystemPaths;

impl PathClassifier for NoSystemPaths {
    fn is_system_path(&self, _path: &str) -> bool {
        false
    }
}

impl<F: Fn(&str) -> bool> PathClassifier for F {
    fn is_system_path(&self, path: &str) -> bool {
        self(path)
    }
}

/// Progress callback for plan execution
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback {
    /// Called before the first action with the total number of actions
    fn on_start(&mut self, total: usize);

    /// Called when an action has been applied
    fn on_action(&mut self, action: &PlannedAction);

    /// Called once every action has been applied
    fn on_complete(&mut self, summary: &ExecuteSummary);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_start(&mut self, _total: usize) {}
    fn on_action(&mut self, _action: &PlannedAction) {}
    fn on_complete(&mut self, _summary: &ExecuteSummary) {}
}
