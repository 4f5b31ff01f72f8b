//! Drives a cataloging pass over the target directory: every directory below it is compared
//! against the catalog, and the new, updated, and deleted files are written back batch by batch.
//! Progress is published as [`CatalogChangeEvent`]s, the cancellation flag is only checked once a
//! batch has been committed.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime};

use crate::backup::{BackupManager, BackupOutcome};
use crate::config::CatalogConfig;
use crate::diff::{deleted_file_names, new_file_names, updated_file_names};
use crate::model::error::catalog_errors::{CatalogingError, ProcessAssetError};
use crate::model::file_types::{determine_media_type, MediaType};
use crate::model::repository::{Asset, Folder};
use crate::notification::{
    CatalogChangeEvent, CatalogChangeReason, CatalogEventError, CatalogNotifier,
    CataloguedAssetsByPath,
};
use crate::providers::{
    AssetMetadata, DirectoryLister, FileSystemLister, HashProvider, ImageHeaderInspector,
    MetadataProvider, Sha256Hasher, ThumbnailProvider,
};
use crate::store::{AssetWrite, BatchSummary, CatalogStore};

/// what a cataloging pass did
#[derive(Debug, Default, PartialEq, Clone)]
pub struct CatalogRunSummary {
    pub folders_inspected: usize,
    pub folders_created: usize,
    pub folders_deleted: usize,
    pub assets_created: usize,
    pub assets_updated: usize,
    pub assets_deleted: usize,
    /// files that could not be turned into assets
    pub failed_assets: usize,
    pub backup: Option<BackupOutcome>,
    /// the pass was not run because the previous one is still within the cooldown
    pub skipped: bool,
    pub cancelled: bool,
}

impl CatalogRunSummary {
    pub fn has_changes(&self) -> bool {
        self.folders_created
            + self.folders_deleted
            + self.assets_created
            + self.assets_updated
            + self.assets_deleted
            > 0
    }
}

/// a file that needs a write, in the order they get processed
enum PendingChange {
    New(String),
    Updated(Asset),
    Deleted(Asset),
}

pub struct CatalogingService {
    config: CatalogConfig,
    store: CatalogStore,
    backups: BackupManager,
    lister: Box<dyn DirectoryLister>,
    metadata: Box<dyn MetadataProvider>,
    hasher: Box<dyn HashProvider>,
    thumbnails: Option<Box<dyn ThumbnailProvider>>,
    notifier: CatalogNotifier,
}

impl CatalogingService {
    /// uses the file system lister, image header inspector and sha256 hasher.
    /// No thumbnails are rendered unless a provider is set with
    /// [`CatalogingService::with_thumbnail_provider`]
    pub fn new(config: CatalogConfig, store: CatalogStore, notifier: CatalogNotifier) -> Self {
        let backups = BackupManager::from_config(&config);
        Self {
            config,
            store,
            backups,
            lister: Box::new(FileSystemLister),
            metadata: Box::new(ImageHeaderInspector),
            hasher: Box::new(Sha256Hasher),
            thumbnails: None,
            notifier,
        }
    }

    pub fn with_lister(mut self, lister: Box<dyn DirectoryLister>) -> Self {
        self.lister = lister;
        self
    }

    pub fn with_metadata_provider(mut self, metadata: Box<dyn MetadataProvider>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_hash_provider(mut self, hasher: Box<dyn HashProvider>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_thumbnail_provider(mut self, thumbnails: Box<dyn ThumbnailProvider>) -> Self {
        self.thumbnails = Some(thumbnails);
        self
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CatalogStore {
        &mut self.store
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    pub fn catalog_assets(
        &mut self,
        cancel: &AtomicBool,
    ) -> Result<CatalogRunSummary, CatalogingError> {
        self.catalog_assets_at(Local::now().naive_local(), cancel)
    }

    /// runs a cataloging pass as if it were started at `now`
    pub fn catalog_assets_at(
        &mut self,
        now: NaiveDateTime,
        cancel: &AtomicBool,
    ) -> Result<CatalogRunSummary, CatalogingError> {
        let mut summary = CatalogRunSummary::default();
        if self.is_within_cooldown(now) {
            summary.skipped = true;
            self.notify(CatalogChangeEvent::new(
                CatalogChangeReason::ProcessEnded,
                "The previous cataloging pass is too recent, skipping this one",
            ));
            return Ok(summary);
        }
        let target_path = self.config.catalog.target_path.clone();
        if self.store.add_recent_target_path(&target_path, now).is_err() {
            log::warn!("Could not record {target_path} as a recent target path");
        }
        let res = self.catalog_directories(Path::new(&target_path), now, cancel, &mut summary);
        if let Err(e) = res {
            self.notify(
                CatalogChangeEvent::new(
                    CatalogChangeReason::ProcessFailed,
                    format!("Cataloging failed: {e:?}"),
                )
                .with_error(CatalogEventError::Cataloging(e.clone())),
            );
            return Err(e);
        }
        if summary.cancelled {
            return Ok(summary);
        }
        self.run_backup(now, &mut summary)?;
        if self.store.set_last_catalog_time(now).is_err() {
            log::warn!("Could not save the time of this cataloging pass");
        }
        log::info!("Cataloging pass finished: {summary:?}");
        self.notify(CatalogChangeEvent::new(
            CatalogChangeReason::ProcessEnded,
            "Cataloging pass finished",
        ));
        Ok(summary)
    }

    fn is_within_cooldown(&self, now: NaiveDateTime) -> bool {
        if self.config.catalog.cooldown.is_zero() {
            return false;
        }
        match self.store.get_last_catalog_time() {
            Ok(Some(last)) => (now - last)
                .to_std()
                .map(|elapsed| elapsed < self.config.catalog.cooldown)
                .unwrap_or(false),
            _ => false,
        }
    }

    fn catalog_directories(
        &mut self,
        root: &Path,
        now: NaiveDateTime,
        cancel: &AtomicBool,
        summary: &mut CatalogRunSummary,
    ) -> Result<(), CatalogingError> {
        let directories = self.walk(root)?;
        // read once, then kept up to date with every committed write of this pass
        let mut snapshot = self
            .store
            .catalogued_assets_by_path()
            .map_err(|e| CatalogingError::DbFailure(format!("{e:?}")))?;
        let mut inspected: HashSet<String> = HashSet::new();
        for directory in directories {
            let path = directory.to_string_lossy().to_string();
            self.catalog_directory(&directory, now, cancel, &mut snapshot, summary)?;
            inspected.insert(path);
            if summary.cancelled {
                return Ok(());
            }
        }
        self.remove_vanished_folders(&inspected, &mut snapshot, summary)
    }

    /// the root followed by every directory below it, parents before their children
    fn walk(&self, root: &Path) -> Result<Vec<PathBuf>, CatalogingError> {
        let mut directories = Vec::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(directory) = pending.pop() {
            let mut children = self.lister.list_sub_directories(&directory).map_err(|e| {
                log::error!("Failed to list directories in {}: {e:?}", directory.display());
                CatalogingError::ListingFailure(format!("{}: {e}", directory.display()))
            })?;
            // popped from the end, so reverse to visit them in listing order
            children.reverse();
            pending.extend(children);
            directories.push(directory);
        }
        Ok(directories)
    }

    fn catalog_directory(
        &mut self,
        directory: &Path,
        now: NaiveDateTime,
        cancel: &AtomicBool,
        snapshot: &mut CataloguedAssetsByPath,
        summary: &mut CatalogRunSummary,
    ) -> Result<(), CatalogingError> {
        let path = directory.to_string_lossy().to_string();
        summary.folders_inspected += 1;
        self.notify(
            CatalogChangeEvent::new(
                CatalogChangeReason::FolderInspectionInProgress,
                format!("Inspecting folder {path}"),
            )
            .with_folder(Folder::new(&path)),
        );
        let (folder, created) = self
            .store
            .get_or_create_folder(&path)
            .map_err(|e| CatalogingError::DbFailure(format!("{e:?}")))?;
        let folder_id = folder
            .id
            .ok_or_else(|| CatalogingError::DbFailure(format!("folder {path} has no id")))?;
        if created {
            summary.folders_created += 1;
            snapshot.entry(path.clone()).or_default();
            self.notify(
                CatalogChangeEvent::new(
                    CatalogChangeReason::FolderCreated,
                    format!("Folder {path} added"),
                )
                .with_folder(folder.clone()),
            );
        }

        let file_names = self.lister.list_file_names(directory).map_err(|e| {
            log::error!("Failed to list files in {path}: {e:?}");
            CatalogingError::ListingFailure(format!("{path}: {e}"))
        })?;
        let catalogued = self
            .store
            .get_assets(folder_id)
            .map_err(|e| CatalogingError::DbFailure(format!("{e:?}")))?;
        let changes = self.pending_changes(&file_names, catalogued);
        log::debug!("{} changes pending in {path}", changes.len());

        let batch_size = self.store.batch_size();
        let mut remaining = changes;
        while !remaining.is_empty() {
            let rest = remaining.split_off(remaining.len().min(batch_size));
            let writes = self.build_writes(&folder, directory, remaining, now, summary);
            remaining = rest;
            if writes.is_empty() {
                continue;
            }
            let committed = self.store.write_batch(writes)?;
            apply_to_snapshot(snapshot, &path, &committed);
            self.publish_batch(committed, summary);
            if cancel.load(Ordering::Relaxed) {
                summary.cancelled = true;
                log::info!("Cataloging cancelled while inspecting {path}");
                self.notify(CatalogChangeEvent::new(
                    CatalogChangeReason::ProcessCancelled,
                    "Cataloging was cancelled",
                ));
                return Ok(());
            }
        }

        self.notify(
            CatalogChangeEvent::new(
                CatalogChangeReason::FolderInspectionCompleted,
                format!("Folder {} inspected", folder.name()),
            )
            .with_folder(folder)
            .with_snapshot(snapshot.clone()),
        );
        Ok(())
    }

    fn pending_changes(
        &self,
        file_names: &[String],
        catalogued: Vec<Asset>,
    ) -> Vec<PendingChange> {
        let analyse_videos = self.config.catalog.analyse_videos;
        let new_names = new_file_names(file_names, &catalogued)
            .into_iter()
            .filter(|name| analyse_videos || determine_media_type(name) != MediaType::Video);
        let deleted: HashSet<String> = deleted_file_names(file_names, &catalogued)
            .into_iter()
            .collect();
        let updated: HashSet<String> = updated_file_names(&catalogued)
            .into_iter()
            .filter(|name| !deleted.contains(name))
            .collect();

        let mut changes: Vec<PendingChange> = new_names.map(PendingChange::New).collect();
        let mut removed = Vec::new();
        for asset in catalogued {
            if updated.contains(&asset.file_name) {
                changes.push(PendingChange::Updated(asset));
            } else if deleted.contains(&asset.file_name) {
                removed.push(PendingChange::Deleted(asset));
            }
        }
        changes.extend(removed);
        changes
    }

    /// turns a batch of pending changes into writes.
    /// Files that can't be processed are reported and left out
    fn build_writes(
        &self,
        folder: &Folder,
        directory: &Path,
        changes: Vec<PendingChange>,
        now: NaiveDateTime,
        summary: &mut CatalogRunSummary,
    ) -> Vec<AssetWrite> {
        let mut writes = Vec::with_capacity(changes.len());
        for change in changes {
            match change {
                PendingChange::New(name) => match self.build_asset(folder, directory, &name, now) {
                    Ok((asset, thumbnail)) => writes.push(AssetWrite::Create { asset, thumbnail }),
                    Err(e) => {
                        summary.failed_assets += 1;
                        log::warn!("Failed to catalog {name}: {e:?}");
                        self.notify(
                            CatalogChangeEvent::new(
                                CatalogChangeReason::AssetNotCreated,
                                format!("{name} could not be cataloged"),
                            )
                            .with_folder(folder.clone())
                            .with_error(CatalogEventError::Asset(e)),
                        );
                    }
                },
                PendingChange::Updated(existing) => {
                    match self.build_asset(folder, directory, &existing.file_name, now) {
                        Ok((mut asset, thumbnail)) => {
                            asset.id = existing.id;
                            if thumbnail.is_none() {
                                // the stored thumbnail is kept, so are its dimensions
                                asset.thumbnail_pixel_width = existing.thumbnail_pixel_width;
                                asset.thumbnail_pixel_height = existing.thumbnail_pixel_height;
                            }
                            writes.push(AssetWrite::Update { asset, thumbnail });
                        }
                        Err(e) => {
                            summary.failed_assets += 1;
                            log::warn!("Failed to refresh {}: {e:?}", existing.file_name);
                            self.notify(
                                CatalogChangeEvent::new(
                                    CatalogChangeReason::ProcessFailed,
                                    format!("{} could not be refreshed", existing.file_name),
                                )
                                .with_asset(existing)
                                .with_error(CatalogEventError::Asset(e)),
                            );
                        }
                    }
                }
                PendingChange::Deleted(asset) => writes.push(AssetWrite::Delete(asset)),
            }
        }
        writes
    }

    fn build_asset(
        &self,
        folder: &Folder,
        directory: &Path,
        file_name: &str,
        now: NaiveDateTime,
    ) -> Result<(Asset, Option<Vec<u8>>), ProcessAssetError> {
        let folder_id = folder.id.ok_or(ProcessAssetError::FolderNotSaved)?;
        let path = directory.join(file_name);
        let file_metadata = fs::metadata(&path).map_err(|e| {
            ProcessAssetError::FileSystemFailure(format!("{}: {e}", path.display()))
        })?;
        let modified = file_metadata.modified().map(to_local).unwrap_or(now);
        let created = file_metadata.created().map(to_local).unwrap_or(modified);

        let metadata = match determine_media_type(file_name) {
            MediaType::Video => AssetMetadata::default(),
            _ => self.metadata.inspect(&path),
        };
        let hashes = self
            .hasher
            .hash(&path, &self.config.hashing)
            .map_err(|e| ProcessAssetError::HashFailure(format!("{}: {e}", path.display())))?;
        let thumbnail = self
            .thumbnails
            .as_ref()
            .and_then(|provider| provider.thumbnail(&path, &metadata));

        let mut asset = Asset {
            id: None,
            folder_id,
            file_name: file_name.to_string(),
            hash: hashes.hash,
            phash: hashes.phash,
            dhash: hashes.dhash,
            ahash: hashes.ahash,
            pixel_width: metadata.pixel_width,
            pixel_height: metadata.pixel_height,
            rotation: metadata.rotation,
            file_size: file_metadata.len(),
            file_creation_date_time: created,
            file_modification_date_time: modified,
            thumbnail_creation_date_time: now,
            is_corrupted: metadata.is_corrupted,
            corrupted_message: metadata.corrupted_message,
            is_rotated: metadata.is_rotated,
            rotated_message: metadata.rotated_message,
            ..Default::default()
        };
        let contents = thumbnail.map(|thumbnail| {
            asset.thumbnail_pixel_width = thumbnail.pixel_width;
            asset.thumbnail_pixel_height = thumbnail.pixel_height;
            thumbnail.contents
        });
        Ok((asset, contents))
    }

    fn publish_batch(&self, committed: BatchSummary, summary: &mut CatalogRunSummary) {
        summary.assets_created += committed.created.len();
        summary.assets_updated += committed.updated.len();
        summary.assets_deleted += committed.deleted.len();
        let created = committed
            .created
            .into_iter()
            .map(|asset| (CatalogChangeReason::AssetCreated, asset));
        let updated = committed
            .updated
            .into_iter()
            .map(|asset| (CatalogChangeReason::AssetUpdated, asset));
        let deleted = committed
            .deleted
            .into_iter()
            .map(|asset| (CatalogChangeReason::AssetDeleted, asset));
        let events = created.chain(updated).chain(deleted);
        for (reason, asset) in events {
            let message = format!("{:?}: {}", reason, asset.file_name);
            self.notify(CatalogChangeEvent::new(reason, message).with_asset(asset));
        }
    }

    /// removes cataloged folders whose directory no longer exists
    fn remove_vanished_folders(
        &mut self,
        inspected: &HashSet<String>,
        snapshot: &mut CataloguedAssetsByPath,
        summary: &mut CatalogRunSummary,
    ) -> Result<(), CatalogingError> {
        let folders = self
            .store
            .get_folders()
            .map_err(|e| CatalogingError::DbFailure(format!("{e:?}")))?;
        for folder in folders {
            if inspected.contains(&folder.path) || Path::new(&folder.path).exists() {
                continue;
            }
            self.store
                .delete_folder(&folder)
                .map_err(|e| CatalogingError::DbFailure(format!("{e:?}")))?;
            summary.folders_deleted += 1;
            snapshot.remove(&folder.path);
            let message = format!("Folder {} removed", folder.path);
            self.notify(
                CatalogChangeEvent::new(CatalogChangeReason::FolderDeleted, message)
                    .with_folder(folder),
            );
        }
        Ok(())
    }

    fn run_backup(
        &mut self,
        now: NaiveDateTime,
        summary: &mut CatalogRunSummary,
    ) -> Result<(), CatalogingError> {
        if !summary.has_changes() {
            self.notify(CatalogChangeEvent::new(
                CatalogChangeReason::NoBackupChangesDetected,
                "Nothing changed, no backup needed",
            ));
            return Ok(());
        }
        let res = self.backups.planned_outcome(now).and_then(|planned| {
            let reason = match planned {
                BackupOutcome::Created => CatalogChangeReason::BackupCreationStarted,
                BackupOutcome::Updated => CatalogChangeReason::BackupUpdateStarted,
            };
            self.notify(CatalogChangeEvent::new(reason, "Backing up the catalog"));
            self.backups.write_backup(&self.store, now)
        });
        match res {
            Ok(outcome) => {
                summary.backup = Some(outcome);
                self.notify(CatalogChangeEvent::new(
                    CatalogChangeReason::BackupCompleted,
                    format!("Backup {outcome:?}"),
                ));
                Ok(())
            }
            Err(e) => {
                let e = CatalogingError::Backup(e);
                self.notify(
                    CatalogChangeEvent::new(
                        CatalogChangeReason::ProcessFailed,
                        "The catalog could not be backed up",
                    )
                    .with_error(CatalogEventError::Cataloging(e.clone())),
                );
                Err(e)
            }
        }
    }

    fn notify(&self, event: CatalogChangeEvent) {
        self.notifier.notify(event);
    }
}

/// brings the assets of the folder at `path` in line with a committed batch, sorted by file name
fn apply_to_snapshot(snapshot: &mut CataloguedAssetsByPath, path: &str, committed: &BatchSummary) {
    let assets = snapshot.entry(path.to_string()).or_default();
    assets.retain(|asset| {
        !committed
            .deleted
            .iter()
            .any(|deleted| deleted.file_name == asset.file_name)
    });
    for changed in committed.updated.iter().chain(&committed.created) {
        match assets
            .iter_mut()
            .find(|asset| asset.file_name == changed.file_name)
        {
            Some(asset) => *asset = changed.clone(),
            None => assets.push(changed.clone()),
        }
    }
    assets.sort_by(|a, b| a.file_name.cmp(&b.file_name));
}

fn to_local(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}
