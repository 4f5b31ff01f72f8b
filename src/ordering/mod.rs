//! Ordering of catalog assets for display.
//!
//! Every comparison goes through one of three primitives: [`compare_by_text`], [`compare_by_integer`],
//! and [`compare_by_timestamp`]. Integer and timestamp comparisons fall back to the file name when their
//! keys are equal, so any key produces a deterministic order.

use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::model::repository::Asset;

/// text fields an asset can be compared on
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum TextKey {
    FileName,
    Hash,
}

/// numeric fields an asset can be compared on
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum IntegerKey {
    FileSize,
    PixelWidth,
    PixelHeight,
    ThumbnailPixelWidth,
    ThumbnailPixelHeight,
}

/// date fields an asset can be compared on
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum TimestampKey {
    FileCreationDateTime,
    FileModificationDateTime,
    ThumbnailCreationDateTime,
}

/// the keys a list of assets can be sorted by
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum SortKey {
    ByFileName,
    ByHash,
    ByFileSize,
    ByPixelWidth,
    ByPixelHeight,
    ByThumbnailPixelWidth,
    ByThumbnailPixelHeight,
    ByFileCreationDateTime,
    ByFileModificationDateTime,
    ByThumbnailCreationDateTime,
}

impl TextKey {
    fn project<'a>(&self, asset: &'a Asset) -> &'a str {
        match self {
            Self::FileName => &asset.file_name,
            Self::Hash => &asset.hash,
        }
    }
}

impl IntegerKey {
    fn project(&self, asset: &Asset) -> i64 {
        match self {
            Self::FileSize => asset.file_size as i64,
            Self::PixelWidth => asset.pixel_width as i64,
            Self::PixelHeight => asset.pixel_height as i64,
            Self::ThumbnailPixelWidth => asset.thumbnail_pixel_width as i64,
            Self::ThumbnailPixelHeight => asset.thumbnail_pixel_height as i64,
        }
    }
}

impl TimestampKey {
    fn project(&self, asset: &Asset) -> NaiveDateTime {
        match self {
            Self::FileCreationDateTime => asset.file_creation_date_time,
            Self::FileModificationDateTime => asset.file_modification_date_time,
            Self::ThumbnailCreationDateTime => asset.thumbnail_creation_date_time,
        }
    }
}

impl SortKey {
    /// compares the two assets on this key
    pub fn compare(&self, a: &Asset, b: &Asset, ascending: bool) -> Ordering {
        match self {
            Self::ByFileName => compare_by_text(a, b, ascending, TextKey::FileName),
            Self::ByHash => compare_by_text(a, b, ascending, TextKey::Hash),
            Self::ByFileSize => compare_by_integer(a, b, ascending, IntegerKey::FileSize),
            Self::ByPixelWidth => compare_by_integer(a, b, ascending, IntegerKey::PixelWidth),
            Self::ByPixelHeight => compare_by_integer(a, b, ascending, IntegerKey::PixelHeight),
            Self::ByThumbnailPixelWidth => {
                compare_by_integer(a, b, ascending, IntegerKey::ThumbnailPixelWidth)
            }
            Self::ByThumbnailPixelHeight => {
                compare_by_integer(a, b, ascending, IntegerKey::ThumbnailPixelHeight)
            }
            Self::ByFileCreationDateTime => {
                compare_by_timestamp(a, b, ascending, TimestampKey::FileCreationDateTime)
            }
            Self::ByFileModificationDateTime => {
                compare_by_timestamp(a, b, ascending, TimestampKey::FileModificationDateTime)
            }
            Self::ByThumbnailCreationDateTime => {
                compare_by_timestamp(a, b, ascending, TimestampKey::ThumbnailCreationDateTime)
            }
        }
    }
}

/// ordinal comparison of the text field, reversed when `ascending` is false
pub fn compare_by_text(a: &Asset, b: &Asset, ascending: bool, key: TextKey) -> Ordering {
    let ordering = key.project(a).cmp(key.project(b));
    if ascending {
        ordering
    } else {
        ordering.reverse()
    }
}

/// compares the numeric field, falling back to the file name when both values are equal.
///
/// The file name fallback uses the same direction as the primary comparison
pub fn compare_by_integer(a: &Asset, b: &Asset, ascending: bool, key: IntegerKey) -> Ordering {
    compare_integers(a, b, key.project(a), key.project(b), ascending)
}

/// compares the date field with the sub-second part dropped, then behaves like [`compare_by_integer`].
/// Two dates within the same second are equal, and fall back to the file name
pub fn compare_by_timestamp(a: &Asset, b: &Asset, ascending: bool, key: TimestampKey) -> Ordering {
    let left = key.project(a).and_utc().timestamp();
    let right = key.project(b).and_utc().timestamp();
    compare_integers(a, b, left, right, ascending)
}

fn compare_integers(a: &Asset, b: &Asset, left: i64, right: i64, ascending: bool) -> Ordering {
    match left.cmp(&right) {
        Ordering::Equal => compare_by_text(a, b, ascending, TextKey::FileName),
        ordering if ascending => ordering,
        ordering => ordering.reverse(),
    }
}

/// sorts the assets in place by the passed key
pub fn sort_assets(assets: &mut [Asset], key: SortKey, ascending: bool) {
    assets.sort_by(|a, b| key.compare(a, b, ascending));
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::model::repository::Asset;

    fn date(h: u32, m: u32, s: u32, milli: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 8, 19)
            .unwrap()
            .and_hms_milli_opt(h, m, s, milli)
            .unwrap()
    }

    fn asset(name: &str, size: u64, created: NaiveDateTime) -> Asset {
        Asset {
            file_name: name.to_string(),
            file_size: size,
            file_creation_date_time: created,
            ..Default::default()
        }
    }

    #[test]
    fn compare_by_text_is_ordinal() {
        let upper = asset("B.jpg", 0, date(0, 0, 0, 0));
        let lower = asset("a.jpg", 0, date(0, 0, 0, 0));
        // uppercase letters sort before lowercase ones in an ordinal comparison
        assert_eq!(
            Ordering::Less,
            compare_by_text(&upper, &lower, true, TextKey::FileName)
        );
        assert_eq!(
            Ordering::Greater,
            compare_by_text(&upper, &lower, false, TextKey::FileName)
        );
    }

    #[test]
    fn compare_by_integer_uses_value_first() {
        let small = asset("z.jpg", 10, date(0, 0, 0, 0));
        let big = asset("a.jpg", 20, date(0, 0, 0, 0));
        assert_eq!(
            Ordering::Less,
            compare_by_integer(&small, &big, true, IntegerKey::FileSize)
        );
        assert_eq!(
            Ordering::Greater,
            compare_by_integer(&small, &big, false, IntegerKey::FileSize)
        );
    }

    #[test]
    fn compare_by_integer_tie_breaks_on_file_name_in_the_same_direction() {
        let a = asset("a.jpg", 10, date(0, 0, 0, 0));
        let b = asset("b.jpg", 10, date(0, 0, 0, 0));
        assert_eq!(
            Ordering::Less,
            compare_by_integer(&a, &b, true, IntegerKey::FileSize)
        );
        assert_eq!(
            Ordering::Greater,
            compare_by_integer(&a, &b, false, IntegerKey::FileSize)
        );
    }

    #[test]
    fn compare_by_timestamp_ignores_sub_second_precision() {
        let a = asset("b.jpg", 0, date(10, 0, 0, 100));
        let b = asset("a.jpg", 0, date(10, 0, 0, 900));
        // same second, so the file name decides
        assert_eq!(
            Ordering::Greater,
            compare_by_timestamp(&a, &b, true, TimestampKey::FileCreationDateTime)
        );
        assert_eq!(
            Ordering::Less,
            compare_by_timestamp(&a, &b, false, TimestampKey::FileCreationDateTime)
        );
    }

    #[test]
    fn compare_by_timestamp_uses_seconds() {
        let earlier = asset("z.jpg", 0, date(10, 0, 0, 999));
        let later = asset("a.jpg", 0, date(10, 0, 1, 0));
        assert_eq!(
            Ordering::Less,
            compare_by_timestamp(&earlier, &later, true, TimestampKey::FileCreationDateTime)
        );
    }

    #[test]
    fn sort_descending_is_reverse_of_ascending() {
        let mut assets = vec![
            asset("image3.jpg", 3000, date(1, 0, 0, 0)),
            asset("image1.jpg", 1000, date(3, 0, 0, 0)),
            asset("image4.jpg", 4000, date(2, 0, 0, 0)),
            asset("image2.jpg", 2000, date(4, 0, 0, 0)),
        ];
        for key in [
            SortKey::ByFileName,
            SortKey::ByFileSize,
            SortKey::ByFileCreationDateTime,
        ] {
            sort_assets(&mut assets, key, true);
            let ascending: Vec<String> = assets.iter().map(|a| a.file_name.clone()).collect();
            sort_assets(&mut assets, key, false);
            let mut descending: Vec<String> = assets.iter().map(|a| a.file_name.clone()).collect();
            descending.reverse();
            assert_eq!(ascending, descending, "{key:?}");
        }
    }

    #[test]
    fn sort_by_file_size_descending() {
        let mut assets = vec![
            asset("image1.jpg", 1000, date(0, 0, 0, 0)),
            asset("image3.jpg", 3000, date(0, 0, 0, 0)),
            asset("image2.jpg", 2000, date(0, 0, 0, 0)),
        ];
        sort_assets(&mut assets, SortKey::ByFileSize, false);
        let names: Vec<&str> = assets.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(vec!["image3.jpg", "image2.jpg", "image1.jpg"], names);
    }

    #[test]
    fn sort_by_creation_date_with_same_second_uses_file_name() {
        let mut assets = vec![
            asset("c.jpg", 0, date(5, 0, 0, 300)),
            asset("a.jpg", 0, date(5, 0, 0, 900)),
            asset("b.jpg", 0, date(4, 0, 0, 0)),
        ];
        sort_assets(&mut assets, SortKey::ByFileCreationDateTime, true);
        let names: Vec<&str> = assets.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(vec!["b.jpg", "a.jpg", "c.jpg"], names);
    }
}
