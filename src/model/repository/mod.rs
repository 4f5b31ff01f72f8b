use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;

/// the orientation an asset must be rotated by to be displayed upright
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Default)]
pub enum Rotation {
    #[default]
    Rotate0,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Rotation {
    pub fn degrees(&self) -> u16 {
        match self {
            Self::Rotate0 => 0,
            Self::Rotate90 => 90,
            Self::Rotate180 => 180,
            Self::Rotate270 => 270,
        }
    }

    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees {
            0 => Some(Self::Rotate0),
            90 => Some(Self::Rotate90),
            180 => Some(Self::Rotate180),
            270 => Some(Self::Rotate270),
            _ => None,
        }
    }
}

impl ToSql for Rotation {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.degrees() as i64))
    }
}

impl FromSql for Rotation {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let degrees = value.as_i64()?;
        Rotation::from_degrees(degrees).ok_or(FromSqlError::OutOfRange(degrees))
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Folder {
    /// will only be populated when pulled from the database
    pub id: Option<u32>,
    /// the absolute path of the directory on disk
    pub path: String,
}

impl Folder {
    pub fn new(path: &str) -> Self {
        Self {
            id: None,
            path: path.to_string(),
        }
    }

    /// two folders point to the same directory only if their paths are non-empty and match exactly
    pub fn is_same_directory(&self, other: &Folder) -> bool {
        !self.path.is_empty() && !other.path.is_empty() && self.path == other.path
    }

    /// checks if `other` is a direct child of this folder, exactly one path segment deeper
    pub fn is_parent_of(&self, other: &Folder) -> bool {
        if self.path.trim().is_empty() {
            return false;
        }
        let parent = self.path.trim_end_matches(is_separator);
        let child = other.path.trim_end_matches(is_separator);
        match child.rfind(is_separator) {
            Some(index) => {
                let (child_parent, last_segment) = (&child[..index], &child[index + 1..]);
                !last_segment.is_empty() && child_parent.trim_end_matches(is_separator) == parent
            }
            None => false,
        }
    }

    /// the last segment of the folder's path
    pub fn name(&self) -> &str {
        let trimmed = self.path.trim_end_matches(is_separator);
        match trimmed.rfind(is_separator) {
            Some(index) => &trimmed[index + 1..],
            None => trimmed,
        }
    }
}

fn is_separator(c: char) -> bool {
    c == '\\' || c == '/'
}

/// a single image or video tracked by the catalog
#[derive(Debug, Clone, Default)]
// the image data is a cache, and is ignored when checking equality
pub struct Asset {
    /// will only be populated when pulled from the database
    pub id: Option<u32>,
    pub folder_id: u32,
    pub file_name: String,
    /// empty until the asset has been hashed
    pub hash: String,
    pub phash: Option<String>,
    pub dhash: Option<String>,
    pub ahash: Option<String>,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub thumbnail_pixel_width: u32,
    pub thumbnail_pixel_height: u32,
    pub rotation: Rotation,
    pub file_size: u64,
    pub file_creation_date_time: NaiveDateTime,
    pub file_modification_date_time: NaiveDateTime,
    pub thumbnail_creation_date_time: NaiveDateTime,
    pub is_corrupted: bool,
    pub corrupted_message: Option<String>,
    pub is_rotated: bool,
    pub rotated_message: Option<String>,
    /// the decoded thumbnail, only populated for assets in the folder currently being viewed
    pub image_data: Option<Vec<u8>>,
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.folder_id == other.folder_id
            && self.file_name == other.file_name
            && self.hash == other.hash
            && self.phash == other.phash
            && self.dhash == other.dhash
            && self.ahash == other.ahash
            && self.pixel_width == other.pixel_width
            && self.pixel_height == other.pixel_height
            && self.thumbnail_pixel_width == other.thumbnail_pixel_width
            && self.thumbnail_pixel_height == other.thumbnail_pixel_height
            && self.rotation == other.rotation
            && self.file_size == other.file_size
            && self.file_creation_date_time == other.file_creation_date_time
            && self.file_modification_date_time == other.file_modification_date_time
            && self.thumbnail_creation_date_time == other.thumbnail_creation_date_time
            && self.is_corrupted == other.is_corrupted
            && self.corrupted_message == other.corrupted_message
            && self.is_rotated == other.is_rotated
            && self.rotated_message == other.rotated_message
    }
}

impl Asset {
    /// the later of the file's creation and modification date
    pub fn last_file_change(&self) -> NaiveDateTime {
        self.file_creation_date_time
            .max(self.file_modification_date_time)
    }
}

/// a target path the user has recently cataloged
#[derive(Debug, PartialEq, Clone)]
pub struct RecentTargetPath {
    pub path: String,
    pub last_used: NaiveDateTime,
}

#[cfg(test)]
mod folder_tests {
    use super::Folder;

    #[test]
    fn same_directory_requires_identical_paths() {
        let a = Folder::new(r"C:\photos\2020");
        assert!(a.is_same_directory(&Folder::new(r"C:\photos\2020")));
        assert!(!a.is_same_directory(&Folder::new(r"c:\photos\2020")));
        assert!(!a.is_same_directory(&Folder::new(r"C:\photos")));
    }

    #[test]
    fn same_directory_false_for_empty_paths() {
        assert!(!Folder::new("").is_same_directory(&Folder::new("")));
    }

    #[test]
    fn is_parent_of_direct_child() {
        let parent = Folder::new(r"C:\photos");
        assert!(parent.is_parent_of(&Folder::new(r"C:\photos\2020")));
        assert!(Folder::new("/home/user").is_parent_of(&Folder::new("/home/user/pictures")));
    }

    #[test]
    fn is_parent_of_rejects_grandchildren_and_prefixes() {
        let parent = Folder::new(r"C:\photos");
        assert!(!parent.is_parent_of(&Folder::new(r"C:\photos\2020\january")));
        assert!(!parent.is_parent_of(&Folder::new(r"C:\photos2020\january")));
        assert!(!parent.is_parent_of(&Folder::new(r"C:\photos")));
    }

    #[test]
    fn blank_folder_is_never_a_parent() {
        assert!(!Folder::new("  ").is_parent_of(&Folder::new(r"  \child")));
        assert!(!Folder::new("").is_parent_of(&Folder::new(r"\child")));
    }

    #[test]
    fn name_is_last_segment() {
        assert_eq!("2020", Folder::new(r"C:\photos\2020").name());
        assert_eq!("pictures", Folder::new("/home/user/pictures/").name());
    }
}
