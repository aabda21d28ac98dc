//! Two-tier report storage resolution.
//!
//! # Responsibility
//! - Gate every request on name validity and, for writes, write policy.
//! - Resolve reads against the persisted catalog first, then the
//!   predefined catalog.
//! - Serialize layouts and upsert them into the persisted catalog.
//!
//! # Invariants
//! - Invalid names never reach either catalog.
//! - Persisted entries shadow predefined entries of the same name for
//!   reads and listings.
//! - Predefined layouts are rebuilt and re-serialized on every read.

use crate::codec::{serialize_layout, LayoutError};
use crate::config::StoreConfig;
use crate::model::layout::ReportLayout;
use crate::name::is_valid_report_name;
use crate::predefined::catalog::PredefinedCatalog;
use crate::repo::open_repository;
use crate::repo::report_repo::{RepoError, RepoResult, ReportRepository};
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// Upper bound on suffixes tried by [`NewNamePolicy::Disambiguate`].
const MAX_DISAMBIGUATION_ATTEMPTS: u32 = 1_000;

/// Which valid names accept writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Every valid name is writable.
    #[default]
    AllowAll,
    /// Names that exist only as predefined templates are read-only. Once a
    /// name is persisted it stays writable.
    ProtectPredefined,
}

/// How "save as" picks the name it writes under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewNamePolicy {
    /// Write under the requested name, overwriting an existing report.
    #[default]
    Keep,
    /// Append `_1`, `_2`, ... until a name free in both catalogs is found.
    Disambiguate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorePolicy {
    pub write: WritePolicy,
    pub new_name: NewNamePolicy,
}

/// Failure while serializing or committing a layout.
#[derive(Debug)]
pub enum PersistenceError {
    Layout(LayoutError),
    Repo(RepoError),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Layout(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// No catalog holds a report with this name.
    NotFound(String),
    Persistence(PersistenceError),
    InvalidName(String),
    WriteDenied(String),
    /// Every disambiguated variant of this name is taken.
    NameUnavailable(String),
}

impl StoreError {
    /// Returns whether the error is a user-facing "report not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "could not find report '{name}'"),
            Self::Persistence(err) => write!(f, "report storage failed: {err}"),
            Self::InvalidName(name) => write!(f, "invalid report name: {name:?}"),
            Self::WriteDenied(name) => write!(f, "report '{name}' is read-only"),
            Self::NameUnavailable(name) => {
                write!(f, "no free report name derived from '{name}'")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LayoutError> for StoreError {
    fn from(value: LayoutError) -> Self {
        Self::Persistence(PersistenceError::Layout(value))
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(name) => Self::NotFound(name),
            other => Self::Persistence(PersistenceError::Repo(other)),
        }
    }
}

/// Report storage facade called by the hosting reporting framework.
pub struct ReportStore<R: ReportRepository> {
    repo: R,
    predefined: Arc<PredefinedCatalog>,
    policy: StorePolicy,
}

impl ReportStore<Box<dyn ReportRepository>> {
    /// Opens the configured backend and applies the configured policy.
    pub fn open(config: &StoreConfig, predefined: Arc<PredefinedCatalog>) -> RepoResult<Self> {
        let repo = open_repository(&config.storage)?;
        Ok(Self::with_policy(repo, predefined, config.policy))
    }
}

impl<R: ReportRepository> ReportStore<R> {
    /// Creates a store with the baseline policy.
    pub fn new(repo: R, predefined: Arc<PredefinedCatalog>) -> Self {
        Self::with_policy(repo, predefined, StorePolicy::default())
    }

    pub fn with_policy(repo: R, predefined: Arc<PredefinedCatalog>, policy: StorePolicy) -> Self {
        Self {
            repo,
            predefined,
            policy,
        }
    }

    pub fn policy(&self) -> StorePolicy {
        self.policy
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn predefined(&self) -> &PredefinedCatalog {
        &self.predefined
    }

    /// Returns whether `name` is a bare report identifier.
    pub fn is_valid_name(&self, name: &str) -> bool {
        is_valid_report_name(name)
    }

    /// Returns whether writes under `name` are permitted.
    ///
    /// Invalid names are never writable. Under
    /// [`WritePolicy::ProtectPredefined`] a catalog lookup failure denies
    /// the write.
    pub fn can_write(&self, name: &str) -> bool {
        if !self.is_valid_name(name) {
            return false;
        }
        match self.policy.write {
            WritePolicy::AllowAll => true,
            WritePolicy::ProtectPredefined => {
                if !self.predefined.contains(name) {
                    return true;
                }
                match self.repo.contains_report(name) {
                    Ok(persisted) => persisted,
                    Err(err) => {
                        warn!(
                            "event=report_write_gate module=store status=error error_code=lookup_failed error={}",
                            err
                        );
                        false
                    }
                }
            }
        }
    }

    /// Returns the layout bytes stored under `name`.
    ///
    /// # Errors
    /// - `InvalidName` when `name` fails validation.
    /// - `NotFound` when neither catalog holds `name`.
    /// - `Persistence` when the persisted lookup or predefined
    ///   serialization fails.
    pub fn get_data(&self, name: &str) -> StoreResult<Vec<u8>> {
        if !self.is_valid_name(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }

        if let Some(record) = self.repo.find_report(name)? {
            debug!(
                "event=report_get module=store status=ok source=persisted bytes={}",
                record.layout_data.len()
            );
            return Ok(record.layout_data);
        }

        if let Some(layout) = self.predefined.produce(name) {
            let bytes = serialize_layout(&layout)?;
            debug!(
                "event=report_get module=store status=ok source=predefined bytes={}",
                bytes.len()
            );
            return Ok(bytes);
        }

        info!("event=report_get module=store status=not_found");
        Err(StoreError::NotFound(name.to_string()))
    }

    /// Lists every report name with its display name.
    ///
    /// Predefined names map to themselves; persisted display names win on
    /// collisions.
    pub fn get_urls(&self) -> StoreResult<BTreeMap<String, String>> {
        let mut urls: BTreeMap<String, String> = self
            .predefined
            .names()
            .map(|name| (name.to_string(), name.to_string()))
            .collect();
        for summary in self.repo.list_reports()? {
            urls.insert(summary.name, summary.display_name);
        }
        Ok(urls)
    }

    /// Serializes `report` and stores it under `name`.
    ///
    /// Creates the record on first write (`display_name = name`); later
    /// writes replace the layout bytes and keep the display name.
    pub fn set_data(&self, report: &ReportLayout, name: &str) -> StoreResult<()> {
        if !self.is_valid_name(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        if !self.can_write(name) {
            return Err(StoreError::WriteDenied(name.to_string()));
        }

        let started_at = Instant::now();
        let bytes = serialize_layout(report)?;
        match self.repo.upsert_layout(name, &bytes) {
            Ok(outcome) => {
                info!(
                    "event=report_save module=store status=ok outcome={} bytes={} duration_ms={}",
                    outcome.as_str(),
                    bytes.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=report_save module=store status=error duration_ms={} error_code=upsert_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Stores `report` under a name derived from an untrusted default.
    ///
    /// Validates `default_name` itself and returns the name actually used.
    pub fn set_new_data(&self, report: &ReportLayout, default_name: &str) -> StoreResult<String> {
        if !self.is_valid_name(default_name) {
            warn!("event=report_save_new module=store status=rejected reason=invalid_name");
            return Err(StoreError::InvalidName(default_name.to_string()));
        }

        match self.policy.new_name {
            NewNamePolicy::Keep => {
                self.set_data(report, default_name)?;
                Ok(default_name.to_string())
            }
            NewNamePolicy::Disambiguate => self.insert_disambiguated(report, default_name),
        }
    }

    /// Replaces the display name of a persisted report.
    pub fn rename_report(&self, name: &str, display_name: &str) -> StoreResult<()> {
        if !self.is_valid_name(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        if !self.can_write(name) {
            return Err(StoreError::WriteDenied(name.to_string()));
        }
        self.repo.set_display_name(name, display_name)?;
        info!("event=report_rename module=store status=ok");
        Ok(())
    }

    fn insert_disambiguated(&self, report: &ReportLayout, default_name: &str) -> StoreResult<String> {
        let bytes = serialize_layout(report)?;
        for attempt in 0..=MAX_DISAMBIGUATION_ATTEMPTS {
            let candidate = if attempt == 0 {
                default_name.to_string()
            } else {
                format!("{default_name}_{attempt}")
            };
            if self.predefined.contains(&candidate) || !self.can_write(&candidate) {
                continue;
            }
            if self.repo.insert_layout(&candidate, &bytes)? {
                info!(
                    "event=report_save_new module=store status=ok outcome=created attempts={} bytes={}",
                    attempt + 1,
                    bytes.len()
                );
                return Ok(candidate);
            }
        }
        error!(
            "event=report_save_new module=store status=error error_code=name_exhausted attempts={}",
            MAX_DISAMBIGUATION_ATTEMPTS + 1
        );
        Err(StoreError::NameUnavailable(default_name.to_string()))
    }
}
