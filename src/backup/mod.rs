//! Rotating snapshots of the catalog records. Every backup is a standalone sqlite file in the backup directory,
//! named after the time it was taken. A snapshot is fully written to a temporary file before it replaces or
//! prunes anything, so a failed write never costs a valid backup.

use std::backtrace::Backtrace;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::config::CatalogConfig;
use crate::model::error::backup_errors::BackupError;
use crate::repository::backup_repository;
use crate::store::CatalogStore;

static BACKUP_NAME_FORMAT: &str = "catalog_backup_%Y%m%d-%H%M%S";
static BACKUP_EXTENSION: &str = "sqlite";

#[derive(Debug, PartialEq, Clone)]
pub struct BackupFile {
    pub path: PathBuf,
    pub created_at: NaiveDateTime,
}

/// whether a backup write adds a new backup or replaces the most recent one
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BackupOutcome {
    Created,
    Updated,
}

pub struct BackupManager {
    directory: PathBuf,
    backups_to_keep: usize,
    cooldown: Duration,
}

impl BackupManager {
    /// at least 1 backup is always kept
    pub fn new(directory: &Path, backups_to_keep: usize, cooldown: Duration) -> Self {
        Self {
            directory: directory.to_path_buf(),
            backups_to_keep: backups_to_keep.max(1),
            cooldown,
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(
            Path::new(&config.backup.directory),
            config.catalog.backups_to_keep,
            config.catalog.cooldown,
        )
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// every backup in the backup directory, oldest first. Files not named like a backup are ignored
    pub fn list_backups(&self) -> Result<Vec<BackupFile>, BackupError> {
        if !self.directory.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.directory).map_err(|e| {
            log::error!(
                "Failed to read backup directory {}: {e:?}",
                self.directory.display()
            );
            BackupError::FileSystemFailure(format!("{e:?}"))
        })?;
        let mut backups: Vec<BackupFile> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter_map(|path| {
                if path.extension()?.to_str()? != BACKUP_EXTENSION {
                    return None;
                }
                let stem = path.file_stem()?.to_str()?;
                let created_at = NaiveDateTime::parse_from_str(stem, BACKUP_NAME_FORMAT).ok()?;
                Some(BackupFile { path, created_at })
            })
            .collect();
        backups.sort_by_key(|backup| backup.created_at);
        Ok(backups)
    }

    /// a backup is updated if the most recent one is still within the cooldown, otherwise a new one is created
    pub fn planned_outcome(&self, now: NaiveDateTime) -> Result<BackupOutcome, BackupError> {
        let latest = self.list_backups()?.pop();
        Ok(match latest {
            Some(latest) if self.is_within_cooldown(&latest, now) => BackupOutcome::Updated,
            _ => BackupOutcome::Created,
        })
    }

    /// Writes a snapshot of the records in `store`, taken at `now`. When updating, the most recent backup is
    /// removed only once the new snapshot is in place. Old backups beyond the retention count are pruned after a
    /// successful write; if the write fails every existing backup is left untouched
    pub fn write_backup(
        &self,
        store: &CatalogStore,
        now: NaiveDateTime,
    ) -> Result<BackupOutcome, BackupError> {
        self.ensure_directory()?;
        let latest = self.list_backups()?.pop();
        let outcome = match &latest {
            Some(latest) if self.is_within_cooldown(latest, now) => BackupOutcome::Updated,
            _ => BackupOutcome::Created,
        };
        let target = self.backup_path(now);
        let temp = target.with_extension(format!("{BACKUP_EXTENSION}.tmp"));
        if temp.exists() {
            fs::remove_file(&temp).map_err(|e| {
                log::error!(
                    "Failed to remove stale temporary backup {}: {e:?}",
                    temp.display()
                );
                BackupError::FileSystemFailure(format!("{e:?}"))
            })?;
        }
        if let Err(e) = backup_repository::copy_records_into(&temp, store.connection()) {
            log::error!(
                "Failed to write backup to {}: {e:?}\n{}",
                temp.display(),
                Backtrace::force_capture()
            );
            fs::remove_file(&temp).unwrap_or(());
            return Err(BackupError::DbFailure(format!("{e:?}")));
        }
        if let Err(e) = fs::rename(&temp, &target) {
            log::error!(
                "Failed to move backup into place at {}: {e:?}",
                target.display()
            );
            fs::remove_file(&temp).unwrap_or(());
            return Err(BackupError::FileSystemFailure(format!("{e:?}")));
        }
        if let (BackupOutcome::Updated, Some(latest)) = (outcome, latest) {
            if latest.path != target {
                if let Err(e) = fs::remove_file(&latest.path) {
                    log::warn!(
                        "Failed to remove superseded backup {}: {e:?}",
                        latest.path.display()
                    );
                }
            }
        }
        log::info!("Backup written to {} ({outcome:?})", target.display());
        self.prune()?;
        Ok(outcome)
    }

    /// removes the oldest backups until only the configured number remain
    pub fn prune(&self) -> Result<Vec<PathBuf>, BackupError> {
        let backups = self.list_backups()?;
        let excess = backups.len().saturating_sub(self.backups_to_keep);
        let mut removed = Vec::new();
        for backup in backups.into_iter().take(excess) {
            fs::remove_file(&backup.path).map_err(|e| {
                log::error!(
                    "Failed to prune backup {}: {e:?}",
                    backup.path.display()
                );
                BackupError::FileSystemFailure(format!("{e:?}"))
            })?;
            log::debug!("Pruned backup {}", backup.path.display());
            removed.push(backup.path);
        }
        Ok(removed)
    }

    /// replaces the records in `store` with the ones in the backup
    pub fn restore_backup(
        &self,
        backup: &Path,
        store: &mut CatalogStore,
    ) -> Result<(), BackupError> {
        if !backup.is_file() {
            return Err(BackupError::NotFound);
        }
        if let Err(e) = backup_repository::restore_records_from(backup, store.connection()) {
            log::error!(
                "Failed to restore backup {}: {e:?}\n{}",
                backup.display(),
                Backtrace::force_capture()
            );
            return Err(BackupError::DbFailure(format!("{e:?}")));
        }
        store.clear_thumbnail_cache();
        log::info!("Restored catalog from {}", backup.display());
        Ok(())
    }

    fn is_within_cooldown(&self, latest: &BackupFile, now: NaiveDateTime) -> bool {
        let elapsed = (now - latest.created_at).to_std().unwrap_or(Duration::ZERO);
        elapsed < self.cooldown
    }

    fn backup_path(&self, taken_at: NaiveDateTime) -> PathBuf {
        self.directory.join(format!(
            "{}.{BACKUP_EXTENSION}",
            taken_at.format(BACKUP_NAME_FORMAT)
        ))
    }

    fn ensure_directory(&self) -> Result<(), BackupError> {
        if self.directory.exists() {
            return Ok(());
        }
        fs::create_dir_all(&self.directory).map_err(|e| {
            log::error!(
                "Failed to create backup directory {}: {e:?}",
                self.directory.display()
            );
            BackupError::FileSystemFailure(format!("{e:?}"))
        })
    }
}
