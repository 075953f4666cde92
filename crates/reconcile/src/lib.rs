//! # Reconcile
//!
//! Three-way merge of a provisioned candidate tree into a live installation
//! that may carry local customizations.
//!
//! ## Architecture
//!
//! - **Baseline**: hashes of every file as last provisioned
//! - **FsDiff**: local drift of the installation since its baseline
//! - **Planner**: pure decision logic producing a [`MergePlan`]
//! - **Executor**: applies the plan's actions to the filesystem
//!
//! System paths (platform-owned files) always end up with the candidate's
//! content. Other paths the user touched keep the user's content, with the
//! candidate's version saved next to them as `<name>.glnew`.
//!
//! ## Example
//!
//! ```no_run
//! use reconcile::{BaselineDiffProvider, DiffProvider, MergeInput, NoProgress, SystemPaths};
//! use std::path::Path;
//!
//! let installation = Path::new("/opt/server");
//! let candidate = Path::new("/tmp/candidate");
//!
//! let diff = BaselineDiffProvider.compute_diff(installation)?;
//! let cand_tree = manifest::snapshot(candidate, reconcile::layout::BOOKKEEPING_DIRS)?;
//! let inst_tree = manifest::snapshot(installation, reconcile::layout::BOOKKEEPING_DIRS)?;
//! let system = SystemPaths::load(candidate)?;
//!
//! let plan = reconcile::plan(
//!     &MergeInput { diff: &diff, candidate: &cand_tree, installation: &inst_tree },
//!     &system,
//! );
//! for conflict in &plan.conflicts {
//!     println!("{conflict}");
//! }
//! reconcile::execute(&plan, installation, candidate, &mut NoProgress)?;
//! # Ok::<(), reconcile::Error>(())
//! ```

pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod layout;
pub mod planner;
pub mod system_paths;
pub mod types;

pub use context::{DiffProvider, NoProgress, NoSystemPaths, PathClassifier, ProgressCallback};
pub use diff::{Baseline, BaselineDiffProvider};
pub use error::{Error, Result};
pub use executor::execute;
pub use planner::{MergeInput, plan};
pub use system_paths::SystemPaths;
pub use types::{
    DiffEntry, ExecuteSummary, FileConflict, FsDiff, MergePlan, PlannedAction, Resolution,
    UpdateChange, UserChange,
};
