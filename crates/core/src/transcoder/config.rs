//! Configuration for the transcoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration shared by the built-in transcoders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscoderConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Directory for spooled input/output files.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Timeout for a single conversion in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Additional global ffmpeg arguments.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,

    /// Quality used for lossy image targets when a task sets none.
    #[serde(default = "default_image_quality")]
    pub default_image_quality: f32,

    /// Largest output image, in pixels, the image transcoder will produce.
    /// Decoding is capped at the same pixel count.
    #[serde(default = "default_max_image_pixels")]
    pub max_image_pixels: u64,

    /// Base URL of an upstream conversion service. When set, delegated
    /// conversions are forwarded there instead of being run locally.
    #[serde(default)]
    pub delegate_url: Option<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("formatshift")
}

fn default_timeout() -> u64 {
    600 // 10 minutes
}

fn default_log_level() -> String {
    "warning".to_string()
}

fn default_image_quality() -> f32 {
    0.85
}

fn default_max_image_pixels() -> u64 {
    100_000_000 // 10000 x 10000
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            temp_dir: default_temp_dir(),
            timeout_secs: default_timeout(),
            ffmpeg_log_level: default_log_level(),
            extra_ffmpeg_args: Vec::new(),
            default_image_quality: default_image_quality(),
            max_image_pixels: default_max_image_pixels(),
            delegate_url: None,
        }
    }
}

impl TranscoderConfig {
    /// Sets the ffmpeg binary path.
    pub fn with_ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.ffmpeg_path = path;
        self
    }

    /// Sets the temp directory.
    pub fn with_temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = temp_dir;
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Forwards delegated conversions to an upstream service.
    pub fn with_delegate_url(mut self, url: impl Into<String>) -> Self {
        self.delegate_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TranscoderConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.timeout_secs, 600);
        assert_eq!(config.default_image_quality, 0.85);
        assert_eq!(config.max_image_pixels, 100_000_000);
        assert!(config.delegate_url.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = TranscoderConfig::default()
            .with_ffmpeg_path(PathBuf::from("/usr/local/bin/ffmpeg"))
            .with_temp_dir(PathBuf::from("/tmp/test"))
            .with_timeout(30)
            .with_delegate_url("http://convert.internal:8080");

        assert_eq!(config.ffmpeg_path, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(config.temp_dir, PathBuf::from("/tmp/test"));
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(
            config.delegate_url.as_deref(),
            Some("http://convert.internal:8080")
        );
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: TranscoderConfig = serde_json::from_str(r#"{"timeout_secs": 5}"#).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.ffmpeg_log_level, "warning");
    }
}
