//! Dispatch rules mapping (source kind, target kind) pairs to a strategy.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::format::{classify, MediaKind};

/// How a task gets converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Client-capable re-encode (image to image).
    DirectTranscode,
    /// Audio track extraction from a video container.
    VideoToAudioExtract,
    /// Hand the file to the conversion service.
    ServerDelegate,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Self::DirectTranscode,
        Self::VideoToAudioExtract,
        Self::ServerDelegate,
    ];

    /// Stable label for logs, metrics and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectTranscode => "direct_transcode",
            Self::VideoToAudioExtract => "video_to_audio_extract",
            Self::ServerDelegate => "server_delegate",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves the strategy for a (source, target) pair.
///
/// Rules in priority order:
/// 1. image -> image: [`Strategy::DirectTranscode`]
/// 2. video -> audio: [`Strategy::VideoToAudioExtract`]
/// 3. anything else: [`Strategy::ServerDelegate`]
pub fn resolve(source: MediaKind, target: MediaKind) -> Strategy {
    match (source, target) {
        (MediaKind::Image, MediaKind::Image) => Strategy::DirectTranscode,
        (MediaKind::Video, MediaKind::Audio) => Strategy::VideoToAudioExtract,
        _ => Strategy::ServerDelegate,
    }
}

/// Classifies both format tags and resolves the strategy.
pub fn resolve_formats(source_format: &str, target_format: &str) -> Strategy {
    resolve(classify(source_format), classify(target_format))
}
