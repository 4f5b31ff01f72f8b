//! Reconciles directory listings against the catalog.
//!
//! Results keep the order of the input they were taken from, and never contain the same name twice.

use std::collections::HashSet;

use itertools::Itertools;

use crate::model::file_types::{determine_media_type, MediaType};
use crate::model::repository::Asset;


/// the media files of a directory listing, split by kind
#[derive(Debug, PartialEq, Default)]
pub struct ClassifiedFileNames {
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

impl ClassifiedFileNames {
    /// every image followed by every video
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.images.iter().chain(self.videos.iter())
    }
}

/// splits the file names into images and videos. Names that are neither are dropped
pub fn classify_media<S: AsRef<str>>(file_names: &[S]) -> ClassifiedFileNames {
    let mut classified = ClassifiedFileNames::default();
    for name in file_names {
        let name = name.as_ref();
        match determine_media_type(name) {
            MediaType::Image => classified.images.push(name.to_string()),
            MediaType::Video => classified.videos.push(name.to_string()),
            MediaType::Unknown => { /* not cataloged */ }
        }
    }
    classified
}

/// media files in `file_names` that are not in the catalog yet
pub fn new_file_names<S: AsRef<str>>(file_names: &[S], catalogued_assets: &[Asset]) -> Vec<String> {
    let catalogued: HashSet<&str> = catalogued_assets
        .iter()
        .map(|asset| asset.file_name.as_str())
        .collect();
    classify_media(file_names)
        .all()
        .filter(|name| !catalogued.contains(name.as_str()))
        .unique()
        .cloned()
        .collect()
}

/// names of catalogued assets whose file is no longer in `file_names`.
/// No media filtering is done, every catalogued name is considered
pub fn deleted_file_names<S: AsRef<str>>(
    file_names: &[S],
    catalogued_assets: &[Asset],
) -> Vec<String> {
    let on_disk: HashSet<&str> = file_names.iter().map(|name| name.as_ref()).collect();
    catalogued_assets
        .iter()
        .map(|asset| asset.file_name.as_str())
        .filter(|name| !on_disk.contains(name))
        .unique()
        .map(str::to_string)
        .collect()
}

/// names in the source directory that are missing from the destination directory
pub fn new_file_names_to_sync<S: AsRef<str>, D: AsRef<str>>(
    source_file_names: &[S],
    destination_file_names: &[D],
) -> Vec<String> {
    difference(source_file_names, destination_file_names)
}

/// names in the destination directory that are no longer in the source directory
pub fn deleted_file_names_to_sync<S: AsRef<str>, D: AsRef<str>>(
    source_file_names: &[S],
    destination_file_names: &[D],
) -> Vec<String> {
    difference(destination_file_names, source_file_names)
}

/// catalogued assets whose thumbnail was generated before the file was last created or modified
pub fn updated_file_names(catalogued_assets: &[Asset]) -> Vec<String> {
    catalogued_assets
        .iter()
        .filter(|asset| asset.thumbnail_creation_date_time < asset.last_file_change())
        .map(|asset| asset.file_name.as_str())
        .unique()
        .map(str::to_string)
        .collect()
}

fn difference<L: AsRef<str>, R: AsRef<str>>(left: &[L], right: &[R]) -> Vec<String> {
    let right: HashSet<&str> = right.iter().map(|name| name.as_ref()).collect();
    left.iter()
        .map(|name| name.as_ref())
        .filter(|name| !right.contains(name))
        .unique()
        .map(str::to_string)
        .collect()
}
