//! Candidate validator and merge engine
//!
//! The engine orchestrates:
//! 1. Validation - is the candidate stamped, current, of the right kind?
//! 2. Planning - local drift + both trees -> conflicts and actions
//! 3. Executing - apply the actions, then carry metadata over and record a revision

mod error;
mod merge;
mod validator;

pub use error::{EngineError, Result};
pub use merge::{ApplyOutcome, MergeEngine};
pub use validator::{CandidateStatus, Verification};
