//! Store configuration loaded from JSON.
//!
//! ```json
//! {
//!   "storage": { "backend": "sqlite", "path": "/var/lib/reports/reports.db" },
//!   "policy": { "write": "protect_predefined", "new_name": "disambiguate" },
//!   "logging": { "level": "info", "dir": "/var/log/reports" }
//! }
//! ```

use crate::service::report_store::StorePolicy;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Top-level store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    pub storage: StorageConfig,
    #[serde(default)]
    pub policy: StorePolicy,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

/// Persisted catalog backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    Sqlite { path: PathBuf },
    SqliteInMemory,
    Directory { path: PathBuf },
}

impl StorageConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Sqlite { .. } => "sqlite",
            Self::SqliteInMemory => "sqlite_in_memory",
            Self::Directory { .. } => "directory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// Absolute directory for rolling log files.
    pub dir: PathBuf,
}

fn default_level() -> String {
    crate::logging::default_log_level().to_string()
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid store config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

/// Parses a configuration document.
pub fn parse_config(text: &str) -> Result<StoreConfig, ConfigError> {
    serde_json::from_str(text).map_err(ConfigError::Parse)
}

/// Reads and parses a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<StoreConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}
