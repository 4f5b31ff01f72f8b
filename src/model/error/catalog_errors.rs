use super::backup_errors::BackupError;
use super::store_errors::BatchError;

/// a single file could not be turned into an asset. These never abort the batch the file is in
#[derive(PartialEq, Debug, Clone)]
pub enum ProcessAssetError {
    /// the file could not be read from the disk
    FileSystemFailure(String),
    /// the file could not be hashed
    HashFailure(String),
    /// the asset's folder has no id, meaning it was never saved
    FolderNotSaved,
}

#[derive(PartialEq, Debug, Clone)]
pub enum CatalogingError {
    /// a directory under the target path could not be listed
    ListingFailure(String),
    /// a folder record could not be read or written
    DbFailure(String),
    Batch(BatchError),
    Backup(BackupError),
}

impl From<BatchError> for CatalogingError {
    fn from(value: BatchError) -> Self {
        Self::Batch(value)
    }
}

impl From<BackupError> for CatalogingError {
    fn from(value: BackupError) -> Self {
        Self::Backup(value)
    }
}
