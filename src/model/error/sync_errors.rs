/// a sync definition could not be processed at all. The list of definitions is left untouched when this is returned
#[derive(PartialEq, Debug)]
pub enum SyncDefinitionError {
    /// the definition at the index has no source directory
    MissingSourceDirectory(usize),
    /// the definition at the index has no destination directory
    MissingDestinationDirectory(usize),
}

#[derive(PartialEq, Debug, Clone)]
pub enum SyncAssetsError {
    InvalidDefinition(String),
    /// the source or destination directory could not be listed
    ListingFailure(String),
    FileSystemFailure(String),
}

impl From<SyncDefinitionError> for SyncAssetsError {
    fn from(value: SyncDefinitionError) -> Self {
        Self::InvalidDefinition(format!("{value:?}"))
    }
}
