#[derive(PartialEq, Debug)]
pub enum OpenStoreError {
    /// the directory holding the database could not be created
    FileSystemFailure,
    /// the database could not be opened, created, or migrated
    DbFailure,
}

#[derive(PartialEq, Debug)]
pub enum FolderError {
    /// no folder with the passed id or path exists in the catalog
    NotFound,
    DbFailure,
}

#[derive(PartialEq, Debug)]
pub enum AssetError {
    NotFound,
    DbFailure,
}

#[derive(PartialEq, Debug, Clone)]
pub enum BatchError {
    /// the batch was rolled back; batches committed before it are untouched
    DbFailure(String),
}

#[derive(PartialEq, Debug)]
pub enum ThumbnailError {
    NotFound,
    DbFailure,
}

#[derive(PartialEq, Debug)]
pub enum MetadataError {
    DbFailure,
}
