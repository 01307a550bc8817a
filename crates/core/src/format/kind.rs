//! Media kind classification by extension.

use serde::{Deserialize, Serialize};
use std::fmt;

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "webp", "gif", "svg", "avif", "bmp", "tiff", "tif", "ico", "heic",
    "jfif", "apng", "jp2",
];

const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "m4a", "ogg", "wma", "opus", "weba", "webma", "ac3", "dts",
    "alac", "ape", "mid", "midi", "aiff", "au", "voc", "speex", "tta", "wv", "wavpack", "vorbis",
];

// webm is listed here only; its audio-only variants are weba/webma.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "webm", "mov", "avi", "mkv", "flv", "wmv", "m4v", "mpeg", "mpg", "ts", "mts", "vob",
    "ogv", "3gp", "f4v", "m2ts", "asf", "divx",
];

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "docx", "doc", "xlsx", "xls", "pptx", "ppt", "csv", "json", "xml", "yaml", "yml",
    "toml", "txt", "html", "htm", "rtf", "odt", "ods", "odp", "tsv", "latex", "tex", "md",
];

const ARCHIVE_EXTENSIONS: &[&str] = &[
    "zip", "tar", "gz", "tgz", "bz2", "rar", "7z", "xz", "lz", "zst", "iso", "dmg", "exe",
];

/// Coarse content category of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    Document,
    Archive,
    Unknown,
}

impl MediaKind {
    /// All kinds, in declaration order.
    pub const ALL: [MediaKind; 6] = [
        Self::Image,
        Self::Audio,
        Self::Video,
        Self::Document,
        Self::Archive,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Document => "document",
            Self::Archive => "archive",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies an extension (with or without a leading dot), case-insensitively.
///
/// Total: anything not in the known tables is [`MediaKind::Unknown`].
pub fn classify(extension: &str) -> MediaKind {
    let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
    let ext = ext.as_str();

    if IMAGE_EXTENSIONS.contains(&ext) {
        MediaKind::Image
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        MediaKind::Video
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        MediaKind::Audio
    } else if DOCUMENT_EXTENSIONS.contains(&ext) {
        MediaKind::Document
    } else if ARCHIVE_EXTENSIONS.contains(&ext) {
        MediaKind::Archive
    } else {
        MediaKind::Unknown
    }
}

/// Returns the text after the last `.` of a file name, if any.
pub fn extension_of(file_name: &str) -> Option<&str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// Returns the file name up to its first `.`.
///
/// `"holiday.photo.png"` gives `"holiday"`.
pub fn file_stem(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Classifies a file by the extension of its name.
pub fn classify_file_name(file_name: &str) -> MediaKind {
    extension_of(file_name)
        .map(classify)
        .unwrap_or(MediaKind::Unknown)
}
