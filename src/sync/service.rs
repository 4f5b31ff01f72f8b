use std::backtrace::Backtrace;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diff::{deleted_file_names_to_sync, new_file_names_to_sync};
use crate::model::error::sync_errors::{SyncAssetsError, SyncDefinitionError};
use crate::providers::{DirectoryLister, FileSystemLister};
use crate::sync::{SyncAssetsResult, SyncDirectoriesDefinition, SyncPlan};

/// `C:\photos\2024`, with an optional trailing separator
static LOCAL_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[a-zA-Z]:\\(?:[^\\/:*?"<>|\r\n]+\\)*[^\\/:*?"<>|\r\n]*$"#).unwrap()
});
/// `\\server\share\photos`, with an optional trailing separator
static UNC_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\\\\[^\\/:*?"<>|\r\n]+(?:\\[^\\/:*?"<>|\r\n]+)*\\?$"#).unwrap()
});
static REPEATED_BACKSLASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\{2,}").unwrap());
static REPEATED_SLASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"/{2,}").unwrap());

/// Collapses repeated path separators in the source and destination of every definition.
/// The leading `\\` of a UNC path is kept. Nothing is changed if any definition is missing a directory
pub fn normalize(definitions: &mut [SyncDirectoriesDefinition]) -> Result<(), SyncDefinitionError> {
    check_directories_present(definitions)?;
    for definition in definitions.iter_mut() {
        if let Some(source) = definition.source_directory.as_mut() {
            *source = normalize_path(source);
        }
        if let Some(destination) = definition.destination_directory.as_mut() {
            *destination = normalize_path(destination);
        }
    }
    Ok(())
}

/// Removes every definition whose source or destination is not a local (`X:\...`) or UNC (`\\server\...`) path.
/// Nothing is removed if any definition is missing a directory
pub fn validate(
    definitions: &mut Vec<SyncDirectoriesDefinition>,
) -> Result<(), SyncDefinitionError> {
    check_directories_present(definitions)?;
    definitions.retain(|definition| {
        let valid = is_valid_path(definition.source_directory.as_deref())
            && is_valid_path(definition.destination_directory.as_deref());
        if !valid {
            log::info!("Skipping invalid sync definition {definition:?}");
        }
        valid
    });
    Ok(())
}

/// works out which files to copy into the destination, and which to delete from it
pub fn plan<S: AsRef<str>, D: AsRef<str>>(
    definition: &SyncDirectoriesDefinition,
    source_file_names: &[S],
    destination_file_names: &[D],
) -> SyncPlan {
    let to_copy = new_file_names_to_sync(source_file_names, destination_file_names);
    let to_delete = if definition.delete_assets_not_in_source {
        deleted_file_names_to_sync(source_file_names, destination_file_names)
    } else {
        Vec::new()
    };
    SyncPlan { to_copy, to_delete }
}

pub fn is_valid_path(path: Option<&str>) -> bool {
    match path {
        Some(path) if !path.trim().is_empty() => {
            LOCAL_PATH.is_match(path) || UNC_PATH.is_match(path)
        }
        _ => false,
    }
}

fn normalize_path(path: &str) -> String {
    let without_leading = path.trim_start_matches('\\');
    // two or more leading separators mark a UNC path, which keeps exactly two
    let (prefix, rest) = if path.len() - without_leading.len() >= 2 {
        (r"\\", without_leading)
    } else {
        ("", path)
    };
    let rest = REPEATED_BACKSLASHES.replace_all(rest, r"\");
    let rest = REPEATED_SLASHES.replace_all(&rest, "/");
    format!("{prefix}{rest}")
}

fn check_directories_present(
    definitions: &[SyncDirectoriesDefinition],
) -> Result<(), SyncDefinitionError> {
    for (index, definition) in definitions.iter().enumerate() {
        if definition.source_directory.is_none() {
            return Err(SyncDefinitionError::MissingSourceDirectory(index));
        }
        if definition.destination_directory.is_none() {
            return Err(SyncDefinitionError::MissingDestinationDirectory(index));
        }
    }
    Ok(())
}

/// copies files from the source to the destination directories of sync definitions
pub struct SyncAssetsService {
    lister: Box<dyn DirectoryLister>,
}

impl Default for SyncAssetsService {
    fn default() -> Self {
        Self::new(Box::new(FileSystemLister))
    }
}

impl SyncAssetsService {
    pub fn new(lister: Box<dyn DirectoryLister>) -> Self {
        Self { lister }
    }

    /// Normalizes and validates `definitions`, then syncs each remaining one. Invalid definitions are skipped;
    /// a definition missing a directory fails the whole call before anything is synced.
    /// A directory pair that fails is reported in its result's message and doesn't stop the others
    pub fn sync(
        &self,
        definitions: &[SyncDirectoriesDefinition],
        cancel: &AtomicBool,
    ) -> Result<Vec<SyncAssetsResult>, SyncAssetsError> {
        let mut definitions = definitions.to_vec();
        normalize(&mut definitions)?;
        validate(&mut definitions)?;
        let mut results = Vec::new();
        for definition in definitions {
            if cancel.load(Ordering::Relaxed) {
                log::info!("Sync cancelled, {} directory pairs synced", results.len());
                break;
            }
            results.extend(self.sync_definition(&definition));
        }
        Ok(results)
    }

    /// syncs a single definition that has already been validated, returning one result per directory pair
    pub fn sync_definition(&self, definition: &SyncDirectoriesDefinition) -> Vec<SyncAssetsResult> {
        let mut results = Vec::new();
        if let (Some(source), Some(destination)) = (
            &definition.source_directory,
            &definition.destination_directory,
        ) {
            let destination = Path::new(destination);
            self.sync_directories(
                definition,
                Path::new(source),
                destination,
                destination,
                &mut results,
            );
        }
        results
    }

    fn sync_directories(
        &self,
        definition: &SyncDirectoriesDefinition,
        source: &Path,
        destination: &Path,
        destination_root: &Path,
        results: &mut Vec<SyncAssetsResult>,
    ) {
        let result = match self.sync_files(definition, source, destination) {
            Ok(result) => result,
            Err(e) => {
                log::error!(
                    "Failed to sync {} into {}: {e:?}",
                    source.display(),
                    destination.display()
                );
                SyncAssetsResult {
                    source_directory: source.display().to_string(),
                    destination_directory: destination.display().to_string(),
                    message: format!("Sync failed: {e:?}"),
                    ..Default::default()
                }
            }
        };
        results.push(result);
        if !definition.include_sub_folders {
            return;
        }
        let sub_directories = match self.lister.list_sub_directories(source) {
            Ok(sub_directories) => sub_directories,
            Err(e) => {
                log::error!("Failed to list sub directories of {}: {e:?}", source.display());
                return;
            }
        };
        // the destination may live inside the source, it must never be synced into itself
        let excluded = canonical(destination_root);
        for sub_directory in sub_directories {
            if canonical(&sub_directory).starts_with(&excluded) {
                log::debug!(
                    "Skipping {}, it is part of the sync destination",
                    sub_directory.display()
                );
                continue;
            }
            if let Some(name) = sub_directory.file_name() {
                let sub_destination = destination.join(name);
                self.sync_directories(
                    definition,
                    &sub_directory,
                    &sub_destination,
                    destination_root,
                    results,
                );
            }
        }
    }

    fn sync_files(
        &self,
        definition: &SyncDirectoriesDefinition,
        source: &Path,
        destination: &Path,
    ) -> Result<SyncAssetsResult, SyncAssetsError> {
        let source_file_names = self.lister.list_file_names(source).map_err(|e| {
            SyncAssetsError::ListingFailure(format!("{}: {e}", source.display()))
        })?;
        if !destination.exists() {
            fs::create_dir_all(destination).map_err(|e| {
                log::error!(
                    "Failed to create sync destination {}: {e:?}\n{}",
                    destination.display(),
                    Backtrace::force_capture()
                );
                SyncAssetsError::FileSystemFailure(format!("{}: {e}", destination.display()))
            })?;
        }
        let destination_file_names = self.lister.list_file_names(destination).map_err(|e| {
            SyncAssetsError::ListingFailure(format!("{}: {e}", destination.display()))
        })?;
        let SyncPlan { to_copy, to_delete } =
            plan(definition, &source_file_names, &destination_file_names);

        let mut synced_images = 0;
        for name in &to_copy {
            match fs::copy(source.join(name), destination.join(name)) {
                Ok(_) => synced_images += 1,
                Err(e) => log::warn!("Failed to copy {name} into {}: {e:?}", destination.display()),
            }
        }
        let mut deleted_images = 0;
        for name in &to_delete {
            match fs::remove_file(destination.join(name)) {
                Ok(_) => deleted_images += 1,
                Err(e) => log::warn!(
                    "Failed to delete {name} from {}: {e:?}",
                    destination.display()
                ),
            }
        }
        let message = format!(
            "{synced_images} files synced, {deleted_images} files deleted from {}",
            destination.display()
        );
        log::info!("{message}");
        Ok(SyncAssetsResult {
            source_directory: source.display().to_string(),
            destination_directory: destination.display().to_string(),
            synced_images,
            deleted_images,
            message,
        })
    }
}

/// the absolute form of `path`, or `path` itself if it can't be resolved
fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
