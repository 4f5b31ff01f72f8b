//! Collaborators the catalog relies on but doesn't own: listing directories, reading image metadata,
//! hashing file contents, and rendering thumbnails. Each has a default implementation except thumbnails,
//! which need an image decoder this crate doesn't ship.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::config::HashingConfig;
use crate::model::repository::Rotation;

/// lists the contents of a directory
pub trait DirectoryLister {
    /// names of the files directly inside `directory`
    fn list_file_names(&self, directory: &Path) -> io::Result<Vec<String>>;

    /// paths of the directories directly inside `directory`
    fn list_sub_directories(&self, directory: &Path) -> io::Result<Vec<PathBuf>>;
}

/// the image properties of a file, as far as they could be read
#[derive(Debug, PartialEq, Clone, Default)]
pub struct AssetMetadata {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub rotation: Rotation,
    pub is_corrupted: bool,
    pub corrupted_message: Option<String>,
    pub is_rotated: bool,
    pub rotated_message: Option<String>,
}

pub trait MetadataProvider {
    /// never fails; files that can't be read are reported as corrupted
    fn inspect(&self, path: &Path) -> AssetMetadata;
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct AssetHashes {
    pub hash: String,
    pub phash: Option<String>,
    pub dhash: Option<String>,
    pub ahash: Option<String>,
}

pub trait HashProvider {
    /// computes the content hash of the file, plus the perceptual hashes enabled in `config`
    fn hash(&self, path: &Path, config: &HashingConfig) -> io::Result<AssetHashes>;
}

/// a rendered thumbnail, ready to be stored in the catalog
#[derive(Debug, PartialEq, Clone)]
pub struct Thumbnail {
    pub contents: Vec<u8>,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

pub trait ThumbnailProvider {
    /// returns `None` if no thumbnail could be made for the file
    fn thumbnail(&self, path: &Path, metadata: &AssetMetadata) -> Option<Thumbnail>;
}

/// lists directories straight from the file system, sorted by name
pub struct FileSystemLister;

impl DirectoryLister for FileSystemLister {
    fn list_file_names(&self, directory: &Path) -> io::Result<Vec<String>> {
        let mut names: Vec<String> = std::fs::read_dir(directory)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    fn list_sub_directories(&self, directory: &Path) -> io::Result<Vec<PathBuf>> {
        let mut directories: Vec<PathBuf> = std::fs::read_dir(directory)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|ft| ft.is_dir()).unwrap_or(false))
            .map(|e| e.path())
            .collect();
        directories.sort();
        Ok(directories)
    }
}

/// reads the pixel dimensions from the image header without decoding the image.
/// Files whose header can't be read are flagged as corrupted
pub struct ImageHeaderInspector;

impl MetadataProvider for ImageHeaderInspector {
    fn inspect(&self, path: &Path) -> AssetMetadata {
        match image::image_dimensions(path) {
            Ok((pixel_width, pixel_height)) => AssetMetadata {
                pixel_width,
                pixel_height,
                ..Default::default()
            },
            Err(e) => {
                log::warn!("Could not read image header of {}: {e:?}", path.display());
                AssetMetadata {
                    is_corrupted: true,
                    corrupted_message: Some(format!("The asset could not be read: {e}")),
                    ..Default::default()
                }
            }
        }
    }
}

/// hashes file contents with sha256. Perceptual hashes need an image decoder, so they are never filled in here
pub struct Sha256Hasher;

impl HashProvider for Sha256Hasher {
    fn hash(&self, path: &Path, config: &HashingConfig) -> io::Result<AssetHashes> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        io::copy(&mut file, &mut hasher)?;
        if config.use_phash || config.use_dhash || config.use_ahash {
            log::debug!(
                "Perceptual hashes are enabled but not supported by the sha256 hasher, skipping them for {}",
                path.display()
            );
        }
        Ok(AssetHashes {
            hash: format!("{:x}", hasher.finalize()),
            ..Default::default()
        })
    }
}
