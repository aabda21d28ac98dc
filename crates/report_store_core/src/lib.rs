//! Report definition storage for a reporting web application.
//!
//! Resolves report layout bytes by name from a mutable persisted catalog,
//! falling back to immutable code-defined templates, and writes designer
//! saves back to the persisted catalog.

pub mod codec;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod name;
pub mod predefined;
pub mod repo;
pub mod service;

pub use codec::{deserialize_layout, serialize_layout, LayoutError};
pub use config::{load_config, parse_config, ConfigError, LoggingConfig, StorageConfig, StoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::layout::{
    Band, BandKind, Bounds, Control, ControlKind, Margins, PageSettings, PaperKind, ParameterKind,
    ReportLayout, ReportParameter,
};
pub use model::record::{ReportRecord, ReportSummary, UpsertOutcome};
pub use name::is_valid_report_name;
pub use predefined::builtin::{builtin_catalog, BuiltinReport};
pub use predefined::catalog::{PredefinedCatalog, PredefinedCatalogError, ReportTemplate};
pub use repo::directory_repo::DirectoryReportRepository;
pub use repo::open_repository;
pub use repo::report_repo::{RepoError, RepoResult, ReportRepository, SqliteReportRepository};
pub use service::report_store::{
    NewNamePolicy, PersistenceError, ReportStore, StoreError, StorePolicy, StoreResult,
    WritePolicy,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
