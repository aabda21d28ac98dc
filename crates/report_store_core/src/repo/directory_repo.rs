//! Directory-backed persisted report catalog.
//!
//! # Responsibility
//! - Store each report as `<root>/<name>.repx` holding the canonical
//!   layout bytes.
//!
//! # Invariants
//! - Every resolved path is a direct child of the catalog root.
//! - Writers of the same name are serialized by a per-name lock; writers of
//!   different names proceed in parallel. A lock entry lives only while a
//!   writer holds or waits on it.
//! - Names whose file name would exceed the filesystem limit are absent on
//!   reads and rejected on writes.
//! - Writes land in a temp file that is renamed over the target, so readers
//!   see either the previous bytes or the new bytes.
//! - Display names always equal report names.

use crate::model::record::{ReportRecord, ReportSummary, UpsertOutcome};
use crate::name::is_valid_report_name;
use crate::repo::report_repo::{RepoError, RepoResult, ReportRepository};
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// File extension of stored layouts.
pub const REPORT_FILE_EXTENSION: &str = "repx";

/// Longest file name (in bytes) accepted by common filesystems.
const MAX_FILE_NAME_BYTES: usize = 255;
/// Longest report name that still fits `<name>.repx` in one file name.
pub const MAX_REPORT_NAME_BYTES: usize = MAX_FILE_NAME_BYTES - REPORT_FILE_EXTENSION.len() - 1;

/// Report catalog stored as one file per report in a directory.
pub struct DirectoryReportRepository {
    root: PathBuf,
    name_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DirectoryReportRepository {
    /// Opens a catalog rooted at `root`, creating the directory when missing.
    pub fn open(root: impl Into<PathBuf>) -> RepoResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| RepoError::io(&root, err))?;
        let root = root
            .canonicalize()
            .map_err(|err| RepoError::io(&root, err))?;
        Ok(Self {
            root,
            name_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn report_path(&self, name: &str) -> RepoResult<PathBuf> {
        let path = self
            .root
            .join(format!("{name}.{REPORT_FILE_EXTENSION}"));
        if !is_valid_report_name(name) || path.parent() != Some(self.root.as_path()) {
            return Err(RepoError::OutsideRoot(path));
        }
        if name.len() > MAX_REPORT_NAME_BYTES {
            return Err(RepoError::NameTooLong {
                name_bytes: name.len(),
                limit: MAX_REPORT_NAME_BYTES,
            });
        }
        Ok(path)
    }

    /// Resolves the path for a read; names that can never be stored are
    /// simply absent.
    fn lookup_path(&self, name: &str) -> RepoResult<Option<PathBuf>> {
        match self.report_path(name) {
            Ok(path) => Ok(Some(path)),
            Err(RepoError::NameTooLong { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Runs `write` while holding the lock for `name`, then forgets the lock
    /// entry when no other writer is holding or waiting on it.
    fn with_name_lock<T>(
        &self,
        name: &str,
        write: impl FnOnce() -> RepoResult<T>,
    ) -> RepoResult<T> {
        let lock = {
            let mut locks = self.name_locks.lock().map_err(|_| RepoError::LockPoisoned)?;
            Arc::clone(locks.entry(name.to_string()).or_default())
        };

        let result = match lock.lock() {
            Ok(_guard) => write(),
            Err(_) => Err(RepoError::LockPoisoned),
        };

        let mut locks = self.name_locks.lock().map_err(|_| RepoError::LockPoisoned)?;
        // Clones are only taken under the map lock: a count of two means the
        // map and this writer are the last holders.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(name);
        }
        result
    }

    #[cfg(test)]
    fn tracked_name_locks(&self) -> usize {
        self.name_locks.lock().map_or(0, |locks| locks.len())
    }

    fn stage(&self, layout_data: &[u8]) -> RepoResult<NamedTempFile> {
        let mut staged =
            NamedTempFile::new_in(&self.root).map_err(|err| RepoError::io(&self.root, err))?;
        staged
            .write_all(layout_data)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|err| RepoError::io(staged.path(), err))?;
        Ok(staged)
    }
}

impl ReportRepository for DirectoryReportRepository {
    fn find_report(&self, name: &str) -> RepoResult<Option<ReportRecord>> {
        let Some(path) = self.lookup_path(name)? else {
            return Ok(None);
        };
        match fs::read(&path) {
            Ok(layout_data) => Ok(Some(ReportRecord {
                name: name.to_string(),
                display_name: name.to_string(),
                layout_data,
            })),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(RepoError::io(path, err)),
        }
    }

    fn list_reports(&self) -> RepoResult<Vec<ReportSummary>> {
        let entries = fs::read_dir(&self.root).map_err(|err| RepoError::io(&self.root, err))?;
        let mut reports = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| RepoError::io(&self.root, err))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(REPORT_FILE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if !is_valid_report_name(name) || !path.is_file() {
                continue;
            }
            reports.push(ReportSummary {
                name: name.to_string(),
                display_name: name.to_string(),
            });
        }
        reports.sort();
        Ok(reports)
    }

    fn upsert_layout(&self, name: &str, layout_data: &[u8]) -> RepoResult<UpsertOutcome> {
        let path = self.report_path(name)?;
        self.with_name_lock(name, || {
            let outcome = if path.is_file() {
                UpsertOutcome::Updated
            } else {
                UpsertOutcome::Created
            };
            let staged = self.stage(layout_data)?;
            staged
                .persist(&path)
                .map_err(|err| RepoError::io(&path, err.error))?;
            Ok(outcome)
        })
    }

    fn insert_layout(&self, name: &str, layout_data: &[u8]) -> RepoResult<bool> {
        let path = self.report_path(name)?;
        self.with_name_lock(name, || {
            let staged = self.stage(layout_data)?;
            match staged.persist_noclobber(&path) {
                Ok(_) => Ok(true),
                Err(err) if err.error.kind() == ErrorKind::AlreadyExists => Ok(false),
                Err(err) => Err(RepoError::io(&path, err.error)),
            }
        })
    }

    fn set_display_name(&self, _name: &str, _display_name: &str) -> RepoResult<()> {
        Err(RepoError::Unsupported("set_display_name"))
    }

    fn contains_report(&self, name: &str) -> RepoResult<bool> {
        Ok(self.lookup_path(name)?.is_some_and(|path| path.is_file()))
    }
}

#[cfg(test)]
mod tests {
    use super::DirectoryReportRepository;
    use crate::repo::report_repo::{RepoError, ReportRepository};
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn rejects_names_that_resolve_outside_root() {
        let dir = tempfile::tempdir().expect("temp dir");
        let repo = DirectoryReportRepository::open(dir.path()).expect("open catalog");

        for name in ["../escape", "nested/report", ".."] {
            let err = repo
                .upsert_layout(name, b"{}")
                .expect_err("escaping name must be rejected");
            assert!(matches!(err, RepoError::OutsideRoot(_)), "{name}");
        }
        assert!(!dir.path().parent().expect("parent").join("escape.repx").exists());
    }

    #[test]
    fn staged_temp_files_are_not_listed() {
        let dir = tempfile::tempdir().expect("temp dir");
        let repo = DirectoryReportRepository::open(dir.path()).expect("open catalog");
        std::fs::write(dir.path().join("notes.txt"), b"ignored").expect("write stray file");
        repo.upsert_layout("Kept", b"{}").expect("write report");

        let names: Vec<_> = repo
            .list_reports()
            .expect("list")
            .into_iter()
            .map(|summary| summary.name)
            .collect();
        assert_eq!(names, vec!["Kept".to_string()]);
    }

    #[test]
    fn name_locks_are_released_after_writes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let repo = DirectoryReportRepository::open(dir.path()).expect("open catalog");

        for index in 0..50 {
            let name = format!("Report_{index}");
            repo.upsert_layout(&name, b"{}").expect("upsert");
            repo.insert_layout(&name, b"{}").expect("insert");
        }
        repo.upsert_layout("../escape", b"{}")
            .expect_err("rejected before locking");

        assert_eq!(repo.tracked_name_locks(), 0);
    }

    #[test]
    fn name_locks_do_not_outlive_concurrent_writers() {
        const WRITERS: usize = 8;
        let dir = tempfile::tempdir().expect("temp dir");
        let repo = Arc::new(DirectoryReportRepository::open(dir.path()).expect("open catalog"));
        let barrier = Arc::new(Barrier::new(WRITERS));

        let handles: Vec<_> = (0..WRITERS)
            .map(|writer| {
                let repo = Arc::clone(&repo);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for round in 0..20 {
                        let name = if writer % 2 == 0 {
                            "Shared".to_string()
                        } else {
                            format!("Own_{writer}_{round}")
                        };
                        repo.upsert_layout(&name, b"{}").expect("upsert");
                        assert!(repo.tracked_name_locks() <= WRITERS);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread");
        }

        assert_eq!(repo.tracked_name_locks(), 0);
    }
}
