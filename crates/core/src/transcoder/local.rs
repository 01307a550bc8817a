//! Server-side fallback that converts delegated tasks in-process.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use super::error::TranscodeError;
use super::options::ConversionOptions;
use super::traits::Transcoder;
use crate::format::{classify, MediaKind};

/// Routes a delegated conversion by the kind of its target format.
///
/// Audio and video targets go to the media transcoder, image targets to the
/// image transcoder and text document targets to the document transcoder.
/// Archives and unknown targets are refused.
pub struct LocalDelegateTranscoder {
    image: Arc<dyn Transcoder>,
    media: Arc<dyn Transcoder>,
    document: Arc<dyn Transcoder>,
}

impl LocalDelegateTranscoder {
    pub fn new(
        image: Arc<dyn Transcoder>,
        media: Arc<dyn Transcoder>,
        document: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            image,
            media,
            document,
        }
    }
}

#[async_trait]
impl Transcoder for LocalDelegateTranscoder {
    fn name(&self) -> &str {
        "local-delegate"
    }

    async fn transcode(
        &self,
        source: Bytes,
        target_format: &str,
        options: &ConversionOptions,
    ) -> Result<Bytes, TranscodeError> {
        match classify(target_format) {
            MediaKind::Audio | MediaKind::Video => {
                self.media.transcode(source, target_format, options).await
            }
            MediaKind::Image => self.image.transcode(source, target_format, options).await,
            MediaKind::Document => self.document.transcode(source, target_format, options).await,
            MediaKind::Archive | MediaKind::Unknown => {
                Err(TranscodeError::unsupported(target_format))
            }
        }
    }
}
