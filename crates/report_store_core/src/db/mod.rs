//! Durable storage driver behind the SQLite report catalog.
//!
//! Connections handed out here already carry the `reports` table at the
//! newest schema this build knows; a database written by a newer build is
//! refused rather than read with the wrong shape.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure opening or migrating the report database.
#[derive(Debug)]
pub enum DbError {
    /// The SQLite driver rejected a statement or the file itself.
    Sqlite(rusqlite::Error),
    /// The file's `user_version` is ahead of the migrations compiled in.
    SchemaTooNew { found: u32, supported: u32 },
}

impl DbError {
    /// Stable identifier used as `error_code` in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "db_sqlite_failed",
            Self::SchemaTooNew { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "report database error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "report database uses schema v{found}; this build reads up to v{supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;

    #[test]
    fn schema_error_names_both_versions() {
        let err = DbError::SchemaTooNew {
            found: 4,
            supported: 1,
        };
        assert_eq!(err.code(), "db_schema_too_new");
        assert_eq!(
            err.to_string(),
            "report database uses schema v4; this build reads up to v1"
        );
    }
}
