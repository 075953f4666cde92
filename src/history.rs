//! Revision history of an installation
//!
//! Every successful apply appends one revision. The latest revision id is
//! what candidate markers are checked against.

use chrono::{DateTime, Utc};
use reconcile::layout::{HISTORY_FILE, metadata_dir};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::candidate::OperationKind;

/// Revision id of an installation that has never been updated
pub const INITIAL_REVISION: u64 = 0;

/// Errors raised by a history log
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("history database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt history entry {revision}: {reason}")]
    Corrupt { revision: u64, reason: String },
}

/// One recorded revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedState {
    pub revision: u64,
    pub operation: OperationKind,
    pub recorded_at: DateTime<Utc>,
    pub summary: String,
}

/// Append-only log of installation revisions
pub trait HistoryLog {
    /// Latest revision id, or [`INITIAL_REVISION`] when nothing was recorded
    fn current_revision(&self) -> Result<u64, HistoryError>;

    /// Append a revision and return it
    fn record_revision(
        &self,
        operation: OperationKind,
        summary: &str,
    ) -> Result<SavedState, HistoryError>;

    /// All revisions, newest first
    fn list_revisions(&self) -> Result<Vec<SavedState>, HistoryError>;
}

/// History stored in `.installation/history.db`
pub struct SqliteHistory {
    conn: Connection,
}

impl SqliteHistory {
    /// Open or create the history database of the installation at `root`
    pub fn open(root: &Path) -> Result<Self, HistoryError> {
        let dir = metadata_dir(root);
        fs::create_dir_all(&dir)?;
        let conn = Connection::open(dir.join(HISTORY_FILE))?;
        Self::init(conn)
    }

    /// History kept in memory only
    pub fn open_in_memory() -> Result<Self, HistoryError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, HistoryError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS revisions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                operation TEXT NOT NULL,
                recorded_at TEXT NOT NULL,
                summary TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self { conn })
    }
}

impl HistoryLog for SqliteHistory {
    fn current_revision(&self) -> Result<u64, HistoryError> {
        let latest: Option<i64> = self
            .conn
            .query_row("SELECT MAX(id) FROM revisions", [], |row| row.get(0))
            .optional()?
            .flatten();
        Ok(latest.map_or(INITIAL_REVISION, |id| id as u64))
    }

    fn record_revision(
        &self,
        operation: OperationKind,
        summary: &str,
    ) -> Result<SavedState, HistoryError> {
        let recorded_at = Utc::now();
        self.conn.execute(
            "INSERT INTO revisions (operation, recorded_at, summary) VALUES (?1, ?2, ?3)",
            params![operation.as_str(), recorded_at.to_rfc3339(), summary],
        )?;
        let revision = self.conn.last_insert_rowid() as u64;
        log::info!("Recorded revision {revision} ({operation})");
        Ok(SavedState {
            revision,
            operation,
            recorded_at,
            summary: summary.to_string(),
        })
    }

    fn list_revisions(&self) -> Result<Vec<SavedState>, HistoryError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, operation, recorded_at, summary FROM revisions ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut states = Vec::new();
        for row in rows {
            let (id, operation, recorded_at, summary) = row?;
            let revision = id as u64;
            let corrupt = |reason: String| HistoryError::Corrupt { revision, reason };
            let operation = operation.parse::<OperationKind>().map_err(corrupt)?;
            let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
                .map_err(|e| corrupt(e.to_string()))?
                .with_timezone(&Utc);
            states.push(SavedState {
                revision,
                operation,
                recorded_at,
                summary,
            });
        }
        Ok(states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_history_is_initial() {
        let history = SqliteHistory::open_in_memory().unwrap();
        assert_eq!(history.current_revision().unwrap(), INITIAL_REVISION);
        assert!(history.list_revisions().unwrap().is_empty());
    }

    #[test]
    fn test_revisions_advance_and_list_newest_first() {
        let history = SqliteHistory::open_in_memory().unwrap();
        let first = history
            .record_revision(OperationKind::Update, "first")
            .unwrap();
        let second = history
            .record_revision(OperationKind::Revert, "second")
            .unwrap();

        assert!(second.revision > first.revision);
        assert_eq!(history.current_revision().unwrap(), second.revision);

        let listed = history.list_revisions().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].operation, OperationKind::Revert);
        assert_eq!(listed[1].summary, "first");
    }

    #[test]
    fn test_history_persists_on_disk() {
        let tmp = TempDir::new().unwrap();
        {
            let history = SqliteHistory::open(tmp.path()).unwrap();
            history
                .record_revision(OperationKind::FeatureAdd, "added feature")
                .unwrap();
        }
        assert!(tmp.path().join(".installation/history.db").exists());

        let reopened = SqliteHistory::open(tmp.path()).unwrap();
        assert_eq!(reopened.current_revision().unwrap(), 1);
        assert_eq!(
            reopened.list_revisions().unwrap()[0].operation,
            OperationKind::FeatureAdd
        );
    }
}
