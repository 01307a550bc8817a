use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::batch::BatchConfig;
use crate::transcoder::TranscoderConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Request and batch size limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Largest accepted single file.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,

    /// Most files accepted in one batch request.
    #[serde(default = "default_max_batch_files")]
    pub max_batch_files: usize,

    /// Largest accepted request body.
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,

    /// Highest concurrency a batch request may ask for.
    #[serde(default = "default_max_batch_concurrency")]
    pub max_batch_concurrency: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size(),
            max_batch_files: default_max_batch_files(),
            max_request_bytes: default_max_request_bytes(),
            max_batch_concurrency: default_max_batch_concurrency(),
        }
    }
}

fn default_max_file_size() -> u64 {
    500 * 1024 * 1024
}

fn default_max_batch_files() -> usize {
    50
}

fn default_max_request_bytes() -> usize {
    1024 * 1024 * 1024
}

fn default_max_batch_concurrency() -> usize {
    8
}

/// Sanitized config for API responses (paths and upstream URL hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub batch: BatchConfig,
    pub transcoder: SanitizedTranscoderConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTranscoderConfig {
    pub timeout_secs: u64,
    pub ffmpeg_log_level: String,
    pub default_image_quality: f32,
    pub max_image_pixels: u64,
    pub delegate_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            batch: config.batch.clone(),
            transcoder: SanitizedTranscoderConfig {
                timeout_secs: config.transcoder.timeout_secs,
                ffmpeg_log_level: config.transcoder.ffmpeg_log_level.clone(),
                default_image_quality: config.transcoder.default_image_quality,
                max_image_pixels: config.transcoder.max_image_pixels,
                delegate_configured: config.transcoder.delegate_url.is_some(),
            },
            limits: config.limits.clone(),
        }
    }
}
