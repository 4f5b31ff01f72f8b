//! The persisted catalog: folder and asset records, thumbnail blobs, and the ancillary lists kept
//! alongside them. Asset writes are grouped into batches; each batch is its own transaction, so a
//! failed batch never touches the ones committed before it.

use std::backtrace::Backtrace;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use itertools::Itertools;
use rusqlite::{Connection, Transaction};

use crate::config::CatalogConfig;
use crate::model::error::store_errors::{
    AssetError, BatchError, FolderError, MetadataError, OpenStoreError, ThumbnailError,
};
use crate::model::repository::{Asset, Folder, RecentTargetPath};
use crate::notification::CataloguedAssetsByPath;
use crate::repository::{
    asset_repository, folder_repository, initialize_db, metadata_repository, open_connection,
    recent_path_repository, sync_definition_repository, thumbnail_repository,
};
use crate::sync::SyncDirectoriesDefinition;

pub mod thumbnail_cache;


use thumbnail_cache::{FolderThumbnails, ThumbnailCache};

/// a single change to the asset records of the catalog
#[derive(Debug, Clone, PartialEq)]
pub enum AssetWrite {
    /// adds a new asset, along with its thumbnail if it has one
    Create {
        asset: Asset,
        thumbnail: Option<Vec<u8>>,
    },
    /// overwrites the asset with the same folder and file name. The stored thumbnail is only replaced if one is passed
    Update {
        asset: Asset,
        thumbnail: Option<Vec<u8>>,
    },
    /// removes the asset with the same folder and file name, along with its thumbnail
    Delete(Asset),
}

/// what a committed batch changed
#[derive(Debug, Default, PartialEq, Clone)]
pub struct BatchSummary {
    /// the created assets, with their new ids
    pub created: Vec<Asset>,
    pub updated: Vec<Asset>,
    pub deleted: Vec<Asset>,
}

impl BatchSummary {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.created.len() + self.updated.len() + self.deleted.len()
    }
}

pub struct CatalogStore {
    con: Connection,
    location: PathBuf,
    batch_size: usize,
    recent_target_paths_to_keep: usize,
    thumbnail_cache: ThumbnailCache,
}

impl CatalogStore {
    /// opens the catalog database configured in `config`, creating or upgrading it as needed
    pub fn open(config: &CatalogConfig) -> Result<Self, OpenStoreError> {
        let location = PathBuf::from(&config.database.location);
        if let Some(parent) = location.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    log::error!(
                        "Failed to create catalog directory {}: {e:?}\n{}",
                        parent.display(),
                        Backtrace::force_capture()
                    );
                    return Err(OpenStoreError::FileSystemFailure);
                }
            }
        }
        let con = match open_connection(&location) {
            Ok(con) => con,
            Err(e) => {
                log::error!(
                    "Failed to open catalog database at {}: {e:?}\n{}",
                    location.display(),
                    Backtrace::force_capture()
                );
                return Err(OpenStoreError::DbFailure);
            }
        };
        if let Err(e) = initialize_db(&con) {
            log::error!(
                "Failed to initialize catalog database: {e:?}\n{}",
                Backtrace::force_capture()
            );
            return Err(OpenStoreError::DbFailure);
        }
        Ok(Self {
            con,
            location,
            batch_size: config.catalog.batch_size.max(1),
            recent_target_paths_to_keep: config.catalog.recent_target_paths_to_keep,
            thumbnail_cache: ThumbnailCache::new(
                config.catalog.thumbnails_dictionary_entries_to_keep,
            ),
        })
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.con
    }

    // ------------------------------------------------------------------------ folders

    pub fn get_folder_by_path(&self, path: &str) -> Result<Option<Folder>, FolderError> {
        folder_repository::get_by_path(path, &self.con).map_err(|e| {
            log::error!(
                "Failed to retrieve folder with path {path}: {e:?}\n{}",
                Backtrace::force_capture()
            );
            FolderError::DbFailure
        })
    }

    /// returns the folder with the passed path, creating it first if it isn't cataloged yet.
    /// The boolean is `true` if the folder was created
    pub fn get_or_create_folder(&self, path: &str) -> Result<(Folder, bool), FolderError> {
        if let Some(folder) = self.get_folder_by_path(path)? {
            return Ok((folder, false));
        }
        match folder_repository::create_folder(path, &self.con) {
            Ok(folder) => Ok((folder, true)),
            Err(e) => {
                log::error!(
                    "Failed to create folder with path {path}: {e:?}\n{}",
                    Backtrace::force_capture()
                );
                Err(FolderError::DbFailure)
            }
        }
    }

    pub fn get_folders(&self) -> Result<Vec<Folder>, FolderError> {
        folder_repository::get_all_folders(&self.con).map_err(|e| {
            log::error!(
                "Failed to retrieve folders: {e:?}\n{}",
                Backtrace::force_capture()
            );
            FolderError::DbFailure
        })
    }

    /// the cataloged folders exactly one level below `parent`
    pub fn get_sub_folders(&self, parent: &Folder) -> Result<Vec<Folder>, FolderError> {
        Ok(self
            .get_folders()?
            .into_iter()
            .filter(|folder| parent.is_parent_of(folder))
            .collect())
    }

    /// removes the folder along with every asset and thumbnail in it
    pub fn delete_folder(&mut self, folder: &Folder) -> Result<(), FolderError> {
        let Some(id) = folder.id else {
            return Err(FolderError::NotFound);
        };
        match folder_repository::get_by_id(id, &self.con) {
            Ok(_) => {}
            Err(rusqlite::Error::QueryReturnedNoRows) => return Err(FolderError::NotFound),
            Err(e) => {
                log::error!(
                    "Failed to check folder {id} before deleting it: {e:?}\n{}",
                    Backtrace::force_capture()
                );
                return Err(FolderError::DbFailure);
            }
        }
        if let Err(e) = folder_repository::delete_folder(id, &self.con) {
            log::error!(
                "Failed to delete folder {}: {e:?}\n{}",
                folder.path,
                Backtrace::force_capture()
            );
            return Err(FolderError::DbFailure);
        }
        self.thumbnail_cache.invalidate(id);
        Ok(())
    }

    // ------------------------------------------------------------------------ assets

    pub fn get_assets(&self, folder_id: u32) -> Result<Vec<Asset>, AssetError> {
        asset_repository::get_assets_in_folder(folder_id, &self.con).map_err(|e| {
            log::error!(
                "Failed to retrieve assets in folder {folder_id}: {e:?}\n{}",
                Backtrace::force_capture()
            );
            AssetError::DbFailure
        })
    }

    pub fn get_asset(&self, folder_id: u32, file_name: &str) -> Result<Asset, AssetError> {
        match asset_repository::get_by_name(folder_id, file_name, &self.con) {
            Ok(Some(asset)) => Ok(asset),
            Ok(None) => Err(AssetError::NotFound),
            Err(e) => {
                log::error!(
                    "Failed to retrieve asset {file_name} in folder {folder_id}: {e:?}\n{}",
                    Backtrace::force_capture()
                );
                Err(AssetError::DbFailure)
            }
        }
    }

    pub fn count_assets(&self) -> Result<u64, AssetError> {
        asset_repository::count_assets(&self.con).map_err(|e| {
            log::error!(
                "Failed to count assets: {e:?}\n{}",
                Backtrace::force_capture()
            );
            AssetError::DbFailure
        })
    }

    /// every cataloged asset, grouped by the path of its folder. Folders without assets are included with an empty list
    pub fn catalogued_assets_by_path(&self) -> Result<CataloguedAssetsByPath, AssetError> {
        let folders = self.get_folders().map_err(|_| AssetError::DbFailure)?;
        let assets = asset_repository::get_all_assets(&self.con).map_err(|e| {
            log::error!(
                "Failed to retrieve all assets: {e:?}\n{}",
                Backtrace::force_capture()
            );
            AssetError::DbFailure
        })?;
        let mut by_folder_id: HashMap<u32, Vec<Asset>> = assets
            .into_iter()
            .into_group_map_by(|asset| asset.folder_id);
        Ok(folders
            .into_iter()
            .map(|folder| {
                let folder_assets = folder
                    .id
                    .and_then(|id| by_folder_id.remove(&id))
                    .unwrap_or_default();
                (folder.path, folder_assets)
            })
            .collect())
    }

    /// applies every write in a single transaction. If any write fails nothing in the batch is kept
    pub fn write_batch(&mut self, writes: Vec<AssetWrite>) -> Result<BatchSummary, BatchError> {
        let touched_folders: Vec<u32> = writes
            .iter()
            .map(|write| match write {
                AssetWrite::Create { asset, .. }
                | AssetWrite::Update { asset, .. }
                | AssetWrite::Delete(asset) => asset.folder_id,
            })
            .unique()
            .collect();
        let tx = self.con.transaction().map_err(|e| {
            log::error!(
                "Failed to start batch transaction: {e:?}\n{}",
                Backtrace::force_capture()
            );
            BatchError::DbFailure(format!("{e:?}"))
        })?;
        let summary = match apply_writes(&tx, writes) {
            Ok(summary) => summary,
            Err(e) => {
                log::error!(
                    "Failed to write batch, rolling it back: {e:?}\n{}",
                    Backtrace::force_capture()
                );
                // dropping the transaction rolls it back
                return Err(BatchError::DbFailure(format!("{e:?}")));
            }
        };
        if let Err(e) = tx.commit() {
            log::error!(
                "Failed to commit batch: {e:?}\n{}",
                Backtrace::force_capture()
            );
            return Err(BatchError::DbFailure(format!("{e:?}")));
        }
        for folder_id in touched_folders {
            self.thumbnail_cache.invalidate(folder_id);
        }
        Ok(summary)
    }

    /// splits the writes into batches of the configured batch size and commits them one after the other.
    /// A failed batch does not stop the ones after it
    pub fn write_in_batches(
        &mut self,
        writes: Vec<AssetWrite>,
    ) -> Vec<Result<BatchSummary, BatchError>> {
        let mut results = Vec::new();
        let mut remaining = writes;
        while !remaining.is_empty() {
            let rest = remaining.split_off(remaining.len().min(self.batch_size));
            results.push(self.write_batch(remaining));
            remaining = rest;
        }
        results
    }

    // ------------------------------------------------------------------------ thumbnails

    pub fn get_thumbnail(&self, asset_id: u32) -> Result<Vec<u8>, ThumbnailError> {
        match thumbnail_repository::get_thumbnail(asset_id, &self.con) {
            Ok(contents) => Ok(contents),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(ThumbnailError::NotFound),
            Err(e) => {
                log::error!(
                    "Failed to retrieve thumbnail for asset {asset_id}: {e:?}\n{}",
                    Backtrace::force_capture()
                );
                Err(ThumbnailError::DbFailure)
            }
        }
    }

    /// returns the assets of the folder being viewed, with their thumbnails loaded into `image_data`.
    /// Thumbnails are served from memory for recently viewed folders
    pub fn load_folder_view(&mut self, folder_id: u32) -> Result<Vec<Asset>, AssetError> {
        let mut assets = self.get_assets(folder_id)?;
        if self.thumbnail_cache.get(folder_id).is_none() {
            let mut thumbnails = FolderThumbnails::new();
            for id in assets.iter().filter_map(|asset| asset.id) {
                match self.get_thumbnail(id) {
                    Ok(contents) => {
                        thumbnails.insert(id, contents);
                    }
                    // asset has no thumbnail, nothing to show
                    Err(ThumbnailError::NotFound) => {}
                    Err(ThumbnailError::DbFailure) => return Err(AssetError::DbFailure),
                }
            }
            self.thumbnail_cache.put(folder_id, thumbnails);
        }
        if let Some(thumbnails) = self.thumbnail_cache.get(folder_id) {
            for asset in assets.iter_mut() {
                asset.image_data = asset.id.and_then(|id| thumbnails.get(&id).cloned());
            }
        }
        Ok(assets)
    }

    // ------------------------------------------------------------------------ ancillary lists

    /// records the path as the most recently used target path
    pub fn add_recent_target_path(
        &self,
        path: &str,
        used_at: NaiveDateTime,
    ) -> Result<(), MetadataError> {
        recent_path_repository::add_recent_path(
            path,
            used_at,
            self.recent_target_paths_to_keep,
            &self.con,
        )
        .map_err(|e| {
            log::error!(
                "Failed to save recent target path {path}: {e:?}\n{}",
                Backtrace::force_capture()
            );
            MetadataError::DbFailure
        })
    }

    pub fn get_recent_target_paths(&self) -> Result<Vec<RecentTargetPath>, MetadataError> {
        recent_path_repository::get_recent_paths(&self.con).map_err(|e| {
            log::error!(
                "Failed to retrieve recent target paths: {e:?}\n{}",
                Backtrace::force_capture()
            );
            MetadataError::DbFailure
        })
    }

    /// replaces the stored sync definitions. Returns how many were saved
    pub fn save_sync_definitions(
        &mut self,
        definitions: &[SyncDirectoriesDefinition],
    ) -> Result<usize, MetadataError> {
        let res = self.con.transaction().and_then(|tx| {
            let saved = sync_definition_repository::replace_all(definitions, &tx)?;
            tx.commit()?;
            Ok(saved)
        });
        res.map_err(|e| {
            log::error!(
                "Failed to save sync definitions: {e:?}\n{}",
                Backtrace::force_capture()
            );
            MetadataError::DbFailure
        })
    }

    pub fn get_sync_definitions(&self) -> Result<Vec<SyncDirectoriesDefinition>, MetadataError> {
        sync_definition_repository::get_all(&self.con).map_err(|e| {
            log::error!(
                "Failed to retrieve sync definitions: {e:?}\n{}",
                Backtrace::force_capture()
            );
            MetadataError::DbFailure
        })
    }

    pub fn get_last_catalog_time(&self) -> Result<Option<NaiveDateTime>, MetadataError> {
        metadata_repository::get_last_catalog_time(&self.con).map_err(|e| {
            log::error!(
                "Failed to retrieve last catalog time: {e:?}\n{}",
                Backtrace::force_capture()
            );
            MetadataError::DbFailure
        })
    }

    pub fn set_last_catalog_time(&self, time: NaiveDateTime) -> Result<(), MetadataError> {
        metadata_repository::set_last_catalog_time(time, &self.con).map_err(|e| {
            log::error!(
                "Failed to save last catalog time: {e:?}\n{}",
                Backtrace::force_capture()
            );
            MetadataError::DbFailure
        })
    }

    /// drops every cached thumbnail, used after the records were replaced wholesale
    pub(crate) fn clear_thumbnail_cache(&mut self) {
        self.thumbnail_cache.clear();
    }
}

fn apply_writes(
    tx: &Transaction,
    writes: Vec<AssetWrite>,
) -> Result<BatchSummary, rusqlite::Error> {
    let mut summary = BatchSummary::default();
    let mut deletes: Vec<Asset> = Vec::new();
    for write in writes {
        match write {
            AssetWrite::Create { mut asset, thumbnail } => {
                let id = asset_repository::create_asset(&asset, tx)?;
                if let Some(contents) = &thumbnail {
                    thumbnail_repository::save_thumbnail(id, contents, tx)?;
                }
                asset.id = Some(id);
                summary.created.push(asset);
            }
            AssetWrite::Update { mut asset, thumbnail } => {
                let existing = asset_repository::get_by_name(asset.folder_id, &asset.file_name, tx)?
                    .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
                asset_repository::update_asset(&asset, tx)?;
                let id = existing.id.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
                if let Some(contents) = &thumbnail {
                    thumbnail_repository::save_thumbnail(id, contents, tx)?;
                }
                asset.id = Some(id);
                summary.updated.push(asset);
            }
            AssetWrite::Delete(asset) => deletes.push(asset),
        }
    }
    let by_folder = deletes.into_iter().into_group_map_by(|asset| asset.folder_id);
    for (folder_id, assets) in by_folder {
        let names: Vec<String> = assets.iter().map(|a| a.file_name.clone()).collect();
        asset_repository::delete_by_names(folder_id, &names, tx)?;
        summary.deleted.extend(assets);
    }
    Ok(summary)
}
