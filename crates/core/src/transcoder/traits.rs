//! Trait definitions for the transcoder module.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

use super::error::TranscodeError;
use super::options::ConversionOptions;
use crate::dispatch::Strategy;

/// A capability that converts one input into a target format.
///
/// Implementations must return `Err` with a descriptive message on failure,
/// never a sentinel payload.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Converts `source` into `target_format`.
    async fn transcode(
        &self,
        source: Bytes,
        target_format: &str,
        options: &ConversionOptions,
    ) -> Result<Bytes, TranscodeError>;
}

#[async_trait]
impl<T: Transcoder + ?Sized> Transcoder for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn transcode(
        &self,
        source: Bytes,
        target_format: &str,
        options: &ConversionOptions,
    ) -> Result<Bytes, TranscodeError> {
        (**self).transcode(source, target_format, options).await
    }
}

/// One transcoder per dispatch strategy.
#[derive(Clone)]
pub struct TranscoderSet {
    direct: Arc<dyn Transcoder>,
    extract: Arc<dyn Transcoder>,
    delegate: Arc<dyn Transcoder>,
}

impl TranscoderSet {
    pub fn new(
        direct: Arc<dyn Transcoder>,
        extract: Arc<dyn Transcoder>,
        delegate: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            direct,
            extract,
            delegate,
        }
    }

    /// Uses the same transcoder for every strategy.
    pub fn uniform(transcoder: Arc<dyn Transcoder>) -> Self {
        Self::new(
            Arc::clone(&transcoder),
            Arc::clone(&transcoder),
            transcoder,
        )
    }

    pub fn for_strategy(&self, strategy: Strategy) -> &Arc<dyn Transcoder> {
        match strategy {
            Strategy::DirectTranscode => &self.direct,
            Strategy::VideoToAudioExtract => &self.extract,
            Strategy::ServerDelegate => &self.delegate,
        }
    }
}

impl fmt::Debug for TranscoderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscoderSet")
            .field("direct", &self.direct.name())
            .field("extract", &self.extract.name())
            .field("delegate", &self.delegate.name())
            .finish()
    }
}
