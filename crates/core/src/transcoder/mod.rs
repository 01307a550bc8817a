//! Transcoder module for byte-level format conversion.
//!
//! This module provides the `Transcoder` trait, one implementation per
//! dispatch strategy, and `create_transcoders` to assemble them from config.
//!
//! # Features
//!
//! - Raster image re-encoding with resize (PNG, JPEG, WebP, GIF, BMP, TIFF, ICO, AVIF)
//! - Audio extraction from video via ffmpeg
//! - Local media conversion via ffmpeg
//! - CSV, JSON, YAML and HTML document conversion
//! - Forwarding to a remote conversion server over HTTP
//! - Per-call deadlines
//!
//! # Example
//!
//! ```ignore
//! use formatshift_core::transcoder::{create_transcoders, ConversionOptions, TranscoderConfig};
//! use formatshift_core::dispatch::Strategy;
//!
//! let set = create_transcoders(&TranscoderConfig::default())?;
//!
//! let options = ConversionOptions::new().with("quality", 0.8);
//! let jpeg = set
//!     .for_strategy(Strategy::DirectTranscode)
//!     .transcode(png_bytes, "jpg", &options)
//!     .await?;
//! ```

mod config;
mod document;
mod error;
mod ffmpeg;
mod http;
mod local;
mod options;
mod raster;
mod timeout;
mod traits;

use std::sync::Arc;
use std::time::Duration;

pub use config::TranscoderConfig;
pub use document::DocumentTranscoder;
pub use error::TranscodeError;
pub use ffmpeg::{FfmpegMode, FfmpegTranscoder};
pub use http::HttpDelegateTranscoder;
pub use local::LocalDelegateTranscoder;
pub use options::ConversionOptions;
pub use raster::ImageTranscoder;
pub use timeout::TimeoutTranscoder;
pub use traits::{Transcoder, TranscoderSet};

/// Builds the transcoder for each strategy from config.
///
/// Delegated conversions go to `delegate_url` when one is configured and are
/// otherwise handled in-process by [`LocalDelegateTranscoder`].
pub fn create_transcoders(config: &TranscoderConfig) -> Result<TranscoderSet, TranscodeError> {
    let limit = Duration::from_secs(config.timeout_secs);

    let image: Arc<dyn Transcoder> = Arc::new(TimeoutTranscoder::new(
        ImageTranscoder::new(config.default_image_quality).with_max_pixels(config.max_image_pixels),
        limit,
    ));
    let extract: Arc<dyn Transcoder> = Arc::new(FfmpegTranscoder::audio_extractor(config.clone()));

    let delegate: Arc<dyn Transcoder> = match config.delegate_url.as_deref() {
        Some(url) => Arc::new(HttpDelegateTranscoder::new(url, limit)?),
        None => Arc::new(LocalDelegateTranscoder::new(
            Arc::clone(&image),
            Arc::new(FfmpegTranscoder::media(config.clone())),
            Arc::new(TimeoutTranscoder::new(DocumentTranscoder::new(), limit)),
        )),
    };

    Ok(TranscoderSet::new(image, extract, delegate))
}
