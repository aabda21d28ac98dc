//! Persisted report catalog backends.
//!
//! # Responsibility
//! - Define the storage contract the report store resolves against first.
//! - Provide SQLite and directory implementations and pick one from config.
//!
//! # Invariants
//! - Backends return transport failures as `RepoError`, never panics.
//! - Writes are atomic per name: a failed write leaves the prior value.

pub mod directory_repo;
pub mod report_repo;

use crate::config::StorageConfig;
use directory_repo::DirectoryReportRepository;
use log::info;
use report_repo::{RepoResult, ReportRepository, SqliteReportRepository};

/// Opens the persisted catalog described by `config`.
pub fn open_repository(config: &StorageConfig) -> RepoResult<Box<dyn ReportRepository>> {
    info!(
        "event=catalog_open module=repo status=start backend={}",
        config.backend_name()
    );
    let repo: Box<dyn ReportRepository> = match config {
        StorageConfig::Sqlite { path } => Box::new(SqliteReportRepository::open(path)?),
        StorageConfig::SqliteInMemory => Box::new(SqliteReportRepository::open_in_memory()?),
        StorageConfig::Directory { path } => Box::new(DirectoryReportRepository::open(path)?),
    };
    info!(
        "event=catalog_open module=repo status=ok backend={}",
        config.backend_name()
    );
    Ok(repo)
}
