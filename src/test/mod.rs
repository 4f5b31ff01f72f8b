use std::fs::remove_dir_all;
use std::io;
use std::path::Path;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::{CatalogConfig, HashingConfig};
use crate::model::repository::Asset;
use crate::providers::{
    AssetHashes, AssetMetadata, HashProvider, MetadataProvider, Thumbnail, ThumbnailProvider,
};
use crate::store::CatalogStore;

pub fn current_thread_name() -> String {
    let current_thread = std::thread::current();
    current_thread.name().unwrap().to_string()
}

/// every file a test writes lives in here, so tests can run in parallel
pub fn test_dir() -> String {
    format!("./{}_catalog", current_thread_name())
}

/// a config pointing the database, backups, and target path into the test's own directory
pub fn test_config() -> CatalogConfig {
    let dir = test_dir();
    let mut config = CatalogConfig::default();
    config.database.location = format!("{dir}/catalog.sqlite");
    config.backup.directory = format!("{dir}/backups");
    config.catalog.target_path = format!("{dir}/photos");
    config.catalog.batch_size = 2;
    config.catalog.cooldown = Duration::ZERO;
    config.catalog.backups_to_keep = 2;
    config.catalog.thumbnails_dictionary_entries_to_keep = 2;
    config
}

/// removes anything left over from a previous run and opens a fresh store
pub fn init_store(config: &CatalogConfig) -> CatalogStore {
    remove_dir_all(Path::new(&test_dir())).unwrap_or(());
    CatalogStore::open(config).unwrap()
}

pub fn cleanup() {
    remove_dir_all(Path::new(&test_dir())).unwrap_or(());
}

pub fn date(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn make_asset(folder_id: u32, name: &str) -> Asset {
    Asset {
        folder_id,
        file_name: name.to_string(),
        hash: format!("hash_of_{name}"),
        pixel_width: 1920,
        pixel_height: 1080,
        thumbnail_pixel_width: 200,
        thumbnail_pixel_height: 112,
        file_size: 1024,
        file_creation_date_time: date(1, 10),
        file_modification_date_time: date(1, 11),
        thumbnail_creation_date_time: date(2, 10),
        ..Default::default()
    }
}

/// creates `path` with the passed files in it
pub fn create_files(path: &str, names: &[&str]) {
    std::fs::create_dir_all(path).unwrap();
    for name in names {
        std::fs::write(format!("{path}/{name}"), name.as_bytes()).unwrap();
    }
}

/// reports every file as a 640x480 image
pub struct FakeMetadata;

impl MetadataProvider for FakeMetadata {
    fn inspect(&self, _: &Path) -> AssetMetadata {
        AssetMetadata {
            pixel_width: 640,
            pixel_height: 480,
            ..Default::default()
        }
    }
}

/// hashes a file to its own contents, and fails for any file whose name contains "unreadable"
pub struct FakeHasher;

impl HashProvider for FakeHasher {
    fn hash(&self, path: &Path, _: &HashingConfig) -> io::Result<AssetHashes> {
        if path.to_string_lossy().contains("unreadable") {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "unreadable"));
        }
        Ok(AssetHashes {
            hash: std::fs::read_to_string(path)?,
            ..Default::default()
        })
    }
}

/// every thumbnail is the file name's bytes
pub struct FakeThumbnails;

impl ThumbnailProvider for FakeThumbnails {
    fn thumbnail(&self, path: &Path, _: &AssetMetadata) -> Option<Thumbnail> {
        let name = path.file_name()?.to_string_lossy().to_string();
        Some(Thumbnail {
            contents: name.into_bytes(),
            pixel_width: 64,
            pixel_height: 48,
        })
    }
}
