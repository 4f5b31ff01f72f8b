use serde::Deserialize;

/// a source directory whose files get copied into a destination directory.
/// Either directory can be missing when the definition comes from an incomplete config file
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SyncDirectoriesDefinition {
    #[serde(rename = "sourcedirectory")]
    pub source_directory: Option<String>,
    #[serde(rename = "destinationdirectory")]
    pub destination_directory: Option<String>,
    /// sub directories of the source are synced into matching sub directories of the destination
    #[serde(rename = "includesubfolders")]
    pub include_sub_folders: bool,
    /// files in the destination that are not in the source get deleted
    #[serde(rename = "deleteassetsnotinsource")]
    pub delete_assets_not_in_source: bool,
}

impl SyncDirectoriesDefinition {
    pub fn new(source: &str, destination: &str) -> Self {
        Self {
            source_directory: Some(source.to_string()),
            destination_directory: Some(destination.to_string()),
            ..Default::default()
        }
    }
}

/// the file names to transfer between one source and destination directory
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncPlan {
    /// in the source but not the destination
    pub to_copy: Vec<String>,
    /// in the destination but not the source. Always empty unless the definition deletes assets not in source
    pub to_delete: Vec<String>,
}

/// what syncing one directory pair did
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncAssetsResult {
    pub source_directory: String,
    pub destination_directory: String,
    pub synced_images: usize,
    pub deleted_images: usize,
    pub message: String,
}
