//! In-process raster image re-encoding backed by the `image` crate.

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, Limits};
use std::io::Cursor;

use super::error::TranscodeError;
use super::options::ConversionOptions;
use super::traits::Transcoder;

/// Default pixel cap, 10000 x 10000.
pub const DEFAULT_MAX_PIXELS: u64 = 100_000_000;

/// Decode allocation budget per allowed pixel (16-bit RGBA).
const DECODE_BYTES_PER_PIXEL: u64 = 8;

/// Re-encodes raster images between formats, optionally resizing them.
///
/// Both the decoded input and the resized output are bounded by
/// `max_pixels`; larger requests fail the task instead of allocating.
#[derive(Debug, Clone)]
pub struct ImageTranscoder {
    default_quality: f32,
    max_pixels: u64,
}

impl ImageTranscoder {
    pub fn new(default_quality: f32) -> Self {
        Self {
            default_quality: default_quality.clamp(0.0, 1.0),
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }

    /// Sets the largest image, in pixels, accepted on input or output.
    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    fn check_dimensions(&self, (w, h): (u32, u32)) -> Result<(), TranscodeError> {
        let pixels = u64::from(w) * u64::from(h);
        if pixels > self.max_pixels {
            return Err(TranscodeError::invalid_options(format!(
                "{}x{} exceeds the limit of {} pixels",
                w, h, self.max_pixels
            )));
        }
        Ok(())
    }

    fn decode(&self, source: &[u8]) -> Result<DynamicImage, TranscodeError> {
        let decode_err = |reason: String| TranscodeError::Decode { reason };

        let mut reader = ImageReader::new(Cursor::new(source))
            .with_guessed_format()
            .map_err(|e| decode_err(e.to_string()))?;

        let mut limits = Limits::default();
        limits.max_alloc = Some(self.max_pixels.saturating_mul(DECODE_BYTES_PER_PIXEL));
        reader.limits(limits);

        reader.decode().map_err(|e| decode_err(e.to_string()))
    }

    /// Maps a target tag to an encodable format.
    pub fn output_format(target: &str) -> Option<ImageFormat> {
        match target.trim().to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" | "jfif" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            "gif" => Some(ImageFormat::Gif),
            "bmp" => Some(ImageFormat::Bmp),
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            "ico" => Some(ImageFormat::Ico),
            "avif" => Some(ImageFormat::Avif),
            _ => None,
        }
    }

    /// Computes output dimensions from the requested width/height.
    ///
    /// Both given: exact. One given: the other side scales with it when
    /// `keep_aspect` is set, otherwise it stays at its original value.
    pub fn target_dimensions(
        original: (u32, u32),
        width: Option<u32>,
        height: Option<u32>,
        keep_aspect: bool,
    ) -> (u32, u32) {
        let (ow, oh) = original;
        let scaled = |value: u32, num: u32, den: u32| -> u32 {
            if den == 0 {
                return value;
            }
            ((value as f64 * num as f64 / den as f64).round() as u32).max(1)
        };

        match (width, height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) if keep_aspect => (w, scaled(w, oh, ow)),
            (Some(w), None) => (w, oh),
            (None, Some(h)) if keep_aspect => (scaled(h, ow, oh), h),
            (None, Some(h)) => (ow, h),
            (None, None) => original,
        }
    }

    fn encode(
        &self,
        source: &[u8],
        format: ImageFormat,
        options: &ConversionOptions,
    ) -> Result<Vec<u8>, TranscodeError> {
        let mut img = self.decode(source)?;

        let (w, h) = Self::target_dimensions(
            img.dimensions(),
            options.width(),
            options.height(),
            options.maintain_aspect_ratio(),
        );
        self.check_dimensions((w, h))?;
        if (w, h) != img.dimensions() {
            img = img.resize_exact(w, h, FilterType::Lanczos3);
        }

        let mut buf = Vec::new();
        let encode_err = |e: image::ImageError| TranscodeError::Encode {
            reason: e.to_string(),
        };

        if format == ImageFormat::Jpeg {
            // JPEG has no alpha channel
            let quality = options.quality().unwrap_or(self.default_quality);
            let quality = ((quality * 100.0).round() as u8).clamp(1, 100);
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(encode_err)?;
        } else {
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_to(&mut Cursor::new(&mut buf), format)
                .map_err(encode_err)?;
        }

        Ok(buf)
    }
}

impl Default for ImageTranscoder {
    fn default() -> Self {
        Self::new(0.85)
    }
}

#[async_trait]
impl Transcoder for ImageTranscoder {
    fn name(&self) -> &str {
        "image"
    }

    async fn transcode(
        &self,
        source: Bytes,
        target_format: &str,
        options: &ConversionOptions,
    ) -> Result<Bytes, TranscodeError> {
        let format = Self::output_format(target_format)
            .ok_or_else(|| TranscodeError::unsupported(target_format))?;

        let this = self.clone();
        let options = options.clone();
        let output = tokio::task::spawn_blocking(move || this.encode(&source, format, &options))
            .await
            .map_err(|e| TranscodeError::failed(format!("Image task failed: {}", e)))??;

        Ok(Bytes::from(output))
    }
}
