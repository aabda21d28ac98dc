//! Persisted report catalog contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the find/list/write operations the store needs from durable
//!   storage.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Check-then-write sequences run inside one IMMEDIATE transaction, so
//!   concurrent writers of one name cannot lose updates or create
//!   duplicate rows.
//! - A failed write rolls back and leaves the previous row intact.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::record::{ReportRecord, ReportSummary, UpsertOutcome};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for catalog lookups and writes.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    NotFound(String),
    /// A resolved storage location escaped the catalog root.
    OutsideRoot(PathBuf),
    /// The name does not fit the backend's key length limit.
    NameTooLong { name_bytes: usize, limit: usize },
    /// The backend does not support the requested operation.
    Unsupported(&'static str),
    LockPoisoned,
}

impl RepoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "I/O error at {}: {source}", path.display()),
            Self::NotFound(name) => write!(f, "report not persisted: {name}"),
            Self::OutsideRoot(path) => {
                write!(f, "path escapes report catalog root: {}", path.display())
            }
            Self::NameTooLong { name_bytes, limit } => write!(
                f,
                "report name is {name_bytes} bytes; this catalog stores at most {limit}"
            ),
            Self::Unsupported(operation) => {
                write!(f, "operation not supported by this catalog: {operation}")
            }
            Self::LockPoisoned => write!(f, "report catalog lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable, name-indexed collection of user-saved reports.
pub trait ReportRepository: Send + Sync {
    /// Looks up one report by its exact name.
    fn find_report(&self, name: &str) -> RepoResult<Option<ReportRecord>>;

    /// Lists every persisted report, sorted by name.
    fn list_reports(&self) -> RepoResult<Vec<ReportSummary>>;

    /// Inserts a new report (`display_name = name`) or replaces the layout
    /// bytes of the existing one, then commits.
    fn upsert_layout(&self, name: &str, layout_data: &[u8]) -> RepoResult<UpsertOutcome>;

    /// Inserts a new report only when `name` is free.
    ///
    /// Returns `false` without touching storage when the name is taken.
    fn insert_layout(&self, name: &str, layout_data: &[u8]) -> RepoResult<bool>;

    /// Replaces the display name of an existing report.
    fn set_display_name(&self, name: &str, display_name: &str) -> RepoResult<()>;

    fn contains_report(&self, name: &str) -> RepoResult<bool> {
        Ok(self.find_report(name)?.is_some())
    }
}

impl<R: ReportRepository + ?Sized> ReportRepository for Box<R> {
    fn find_report(&self, name: &str) -> RepoResult<Option<ReportRecord>> {
        (**self).find_report(name)
    }

    fn list_reports(&self) -> RepoResult<Vec<ReportSummary>> {
        (**self).list_reports()
    }

    fn upsert_layout(&self, name: &str, layout_data: &[u8]) -> RepoResult<UpsertOutcome> {
        (**self).upsert_layout(name, layout_data)
    }

    fn insert_layout(&self, name: &str, layout_data: &[u8]) -> RepoResult<bool> {
        (**self).insert_layout(name, layout_data)
    }

    fn set_display_name(&self, name: &str, display_name: &str) -> RepoResult<()> {
        (**self).set_display_name(name, display_name)
    }

    fn contains_report(&self, name: &str) -> RepoResult<bool> {
        (**self).contains_report(name)
    }
}

impl<R: ReportRepository + ?Sized> ReportRepository for Arc<R> {
    fn find_report(&self, name: &str) -> RepoResult<Option<ReportRecord>> {
        (**self).find_report(name)
    }

    fn list_reports(&self) -> RepoResult<Vec<ReportSummary>> {
        (**self).list_reports()
    }

    fn upsert_layout(&self, name: &str, layout_data: &[u8]) -> RepoResult<UpsertOutcome> {
        (**self).upsert_layout(name, layout_data)
    }

    fn insert_layout(&self, name: &str, layout_data: &[u8]) -> RepoResult<bool> {
        (**self).insert_layout(name, layout_data)
    }

    fn set_display_name(&self, name: &str, display_name: &str) -> RepoResult<()> {
        (**self).set_display_name(name, display_name)
    }

    fn contains_report(&self, name: &str) -> RepoResult<bool> {
        (**self).contains_report(name)
    }
}

/// SQLite-backed persisted catalog.
///
/// Owns a single migrated connection behind a mutex; the store shares one
/// instance across request threads.
pub struct SqliteReportRepository {
    conn: Mutex<Connection>,
}

impl SqliteReportRepository {
    /// Wraps a connection returned by [`open_db`] or [`open_db_in_memory`].
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens (or creates) a catalog database file.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a private in-memory catalog.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::LockPoisoned)
    }
}

impl ReportRepository for SqliteReportRepository {
    fn find_report(&self, name: &str) -> RepoResult<Option<ReportRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                "SELECT name, display_name, layout_data
                 FROM reports
                 WHERE name = ?1;",
                [name],
                |row| {
                    Ok(ReportRecord {
                        name: row.get("name")?,
                        display_name: row.get("display_name")?,
                        layout_data: row.get("layout_data")?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn list_reports(&self) -> RepoResult<Vec<ReportSummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT name, display_name
             FROM reports
             ORDER BY name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut reports = Vec::new();
        while let Some(row) = rows.next()? {
            reports.push(ReportSummary {
                name: row.get("name")?,
                display_name: row.get("display_name")?,
            });
        }
        Ok(reports)
    }

    fn upsert_layout(&self, name: &str, layout_data: &[u8]) -> RepoResult<UpsertOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<i64> = tx
            .query_row("SELECT id FROM reports WHERE name = ?1;", [name], |row| {
                row.get(0)
            })
            .optional()?;

        let outcome = match existing {
            None => {
                tx.execute(
                    "INSERT INTO reports (name, display_name, layout_data)
                     VALUES (?1, ?1, ?2);",
                    params![name, layout_data],
                )?;
                UpsertOutcome::Created
            }
            Some(id) => {
                tx.execute(
                    "UPDATE reports
                     SET
                        layout_data = ?2,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?1;",
                    params![id, layout_data],
                )?;
                UpsertOutcome::Updated
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn insert_layout(&self, name: &str, layout_data: &[u8]) -> RepoResult<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "INSERT OR IGNORE INTO reports (name, display_name, layout_data)
             VALUES (?1, ?1, ?2);",
            params![name, layout_data],
        )?;
        Ok(changed == 1)
    }

    fn set_display_name(&self, name: &str, display_name: &str) -> RepoResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE reports
             SET
                display_name = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE name = ?1;",
            params![name, display_name],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(name.to_string()));
        }
        Ok(())
    }

    fn contains_report(&self, name: &str) -> RepoResult<bool> {
        let conn = self.lock()?;
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM reports WHERE name = ?1);",
            [name],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}
