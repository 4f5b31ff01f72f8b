use std::fmt::{Display, Formatter};

static IMAGE_EXTENSIONS: [&str; 12] = [
    "bmp", "dng", "gif", "heic", "ico", "jfif", "jpeg", "jpg", "png", "tif", "tiff", "webp",
];

static VIDEO_EXTENSIONS: [&str; 15] = [
    "3g2", "3gp", "asf", "av1", "avi", "flv", "m4v", "mkv", "mov", "mp4", "mpeg", "mpg", "ogv",
    "webm", "wmv",
];

#[derive(Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Copy, Clone, Default)]
pub enum MediaType {
    Image,
    Video,
    #[default]
    Unknown,
}

impl From<&str> for MediaType {
    /// determines the media type of a file based on its extension. The extension is matched case-insensitively
    fn from(file_name: &str) -> Self {
        let extension = match file_name.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return Self::Unknown,
        };
        if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Self::Image
        } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
            Self::Video
        } else {
            Self::Unknown
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

pub fn determine_media_type(file_name: &str) -> MediaType {
    MediaType::from(file_name)
}
