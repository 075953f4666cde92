//! Candidate validation

use reconcile::Baseline;
use serde::Serialize;
use std::fmt;
use std::path::Path;

use super::error::Result;
use crate::candidate::{Marker, OperationKind};
use crate::history::HistoryLog;
use crate::installation::Installation;

/// Whether a candidate may be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateStatus {
    Ok,
    /// No marker; the directory was never stamped
    NotCandidate,
    /// Built against a different installation revision
    Stale,
    /// Stamped for a different operation
    WrongType,
    /// Same components and same content as the installation
    NoChanges,
}

impl CandidateStatus {
    pub fn is_ok(&self) -> bool {
        *self == Self::Ok
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "ok",
            Self::NotCandidate => "not a candidate",
            Self::Stale => "stale",
            Self::WrongType => "wrong operation",
            Self::NoChanges => "no changes",
        })
    }
}

/// Outcome of validation, with what was expected and what was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub status: CandidateStatus,
    pub expected: String,
    pub actual: String,
}

impl Verification {
    fn new(status: CandidateStatus, expected: impl ToString, actual: impl ToString) -> Self {
        Self {
            status,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Check `candidate` against `installation` for `operation`
///
/// Checks run in order: marker present, base revision current, operation
/// matching, content differing. Nothing is modified.
pub fn verify(
    installation: &Installation,
    candidate: &Path,
    operation: OperationKind,
    history: &dyn HistoryLog,
) -> Result<Verification> {
    let Some(marker) = Marker::load(candidate)? else {
        return Ok(Verification::new(
            CandidateStatus::NotCandidate,
            "candidate marker",
            "none",
        ));
    };

    let current = history.current_revision()?;
    if marker.base_revision != current {
        return Ok(Verification::new(
            CandidateStatus::Stale,
            format!("revision {current}"),
            format!("revision {}", marker.base_revision),
        ));
    }

    if marker.operation != operation {
        return Ok(Verification::new(
            CandidateStatus::WrongType,
            operation,
            marker.operation,
        ));
    }

    if same_content(installation, candidate)? {
        return Ok(Verification::new(
            CandidateStatus::NoChanges,
            "changes",
            "identical content",
        ));
    }

    Ok(Verification::new(CandidateStatus::Ok, operation, operation))
}

/// Same component manifest and same recorded baseline
fn same_content(installation: &Installation, candidate: &Path) -> Result<bool> {
    let candidate_tree = Installation::new(candidate);
    if installation.manifest()? != candidate_tree.manifest()? {
        return Ok(false);
    }
    if !Baseline::exists(installation.root()) || !Baseline::exists(candidate) {
        return Ok(false);
    }
    Ok(Baseline::load(installation.root())? == Baseline::load(candidate)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SqliteHistory;
    use crate::test_support::{write, write_manifest};
    use tempfile::TempDir;

    struct Fixture {
        inst: TempDir,
        cand: TempDir,
        history: SqliteHistory,
    }

    fn fixture() -> Fixture {
        let inst = TempDir::new().unwrap();
        let cand = TempDir::new().unwrap();
        write_manifest(inst.path(), &[("g:core", "1.0", None)]);
        write_manifest(cand.path(), &[("g:core", "1.1", None)]);
        write(inst.path(), "a.txt", "old");
        write(cand.path(), "a.txt", "new");
        Baseline::capture(inst.path())
            .unwrap()
            .save(inst.path())
            .unwrap();
        Baseline::capture(cand.path())
            .unwrap()
            .save(cand.path())
            .unwrap();
        Fixture {
            inst,
            cand,
            history: SqliteHistory::open_in_memory().unwrap(),
        }
    }

    fn check(f: &Fixture, op: OperationKind) -> Verification {
        verify(
            &Installation::new(f.inst.path()),
            f.cand.path(),
            op,
            &f.history,
        )
        .unwrap()
    }

    fn mark(f: &Fixture, base_revision: u64, operation: OperationKind) {
        Marker {
            base_revision,
            operation,
        }
        .save(f.cand.path())
        .unwrap();
    }

    #[test]
    fn test_unstamped_is_not_candidate() {
        let f = fixture();
        assert_eq!(
            check(&f, OperationKind::Update).status,
            CandidateStatus::NotCandidate
        );
    }

    #[test]
    fn test_ok() {
        let f = fixture();
        mark(&f, 0, OperationKind::Update);
        assert!(check(&f, OperationKind::Update).status.is_ok());
    }

    #[test]
    fn test_stale_after_revision_advances() {
        let f = fixture();
        mark(&f, 0, OperationKind::Update);
        f.history
            .record_revision(OperationKind::Update, "other")
            .unwrap();
        let v = check(&f, OperationKind::Update);
        assert_eq!(v.status, CandidateStatus::Stale);
        assert_eq!(v.expected, "revision 1");
        assert_eq!(v.actual, "revision 0");
    }

    #[test]
    fn test_wrong_type() {
        let f = fixture();
        mark(&f, 0, OperationKind::Revert);
        let v = check(&f, OperationKind::Update);
        assert_eq!(v.status, CandidateStatus::WrongType);
        assert_eq!(v.expected, "update");
        assert_eq!(v.actual, "revert");
    }

    #[test]
    fn test_stale_checked_before_operation() {
        let f = fixture();
        mark(&f, 7, OperationKind::Revert);
        assert_eq!(check(&f, OperationKind::Update).status, CandidateStatus::Stale);
    }

    #[test]
    fn test_no_changes() {
        let f = fixture();
        write_manifest(f.cand.path(), &[("g:core", "1.0", None)]);
        write(f.cand.path(), "a.txt", "old");
        Baseline::capture(f.cand.path())
            .unwrap()
            .save(f.cand.path())
            .unwrap();
        mark(&f, 0, OperationKind::Update);
        assert_eq!(
            check(&f, OperationKind::Update).status,
            CandidateStatus::NoChanges
        );
    }

    #[test]
    fn test_same_manifest_different_content_is_ok() {
        let f = fixture();
        write_manifest(f.cand.path(), &[("g:core", "1.0", None)]);
        mark(&f, 0, OperationKind::Update);
        assert!(check(&f, OperationKind::Update).status.is_ok());
    }
}
