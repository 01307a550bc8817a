//! Per-call deadline decorator.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use super::error::TranscodeError;
use super::options::ConversionOptions;
use super::traits::Transcoder;

/// Fails a conversion with [`TranscodeError::Timeout`] once `limit` elapses.
pub struct TimeoutTranscoder<T> {
    inner: T,
    limit: Duration,
}

impl<T: Transcoder> TimeoutTranscoder<T> {
    pub fn new(inner: T, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transcoder> Transcoder for TimeoutTranscoder<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn transcode(
        &self,
        source: Bytes,
        target_format: &str,
        options: &ConversionOptions,
    ) -> Result<Bytes, TranscodeError> {
        tokio::time::timeout(
            self.limit,
            self.inner.transcode(source, target_format, options),
        )
        .await
        .map_err(|_| TranscodeError::Timeout {
            timeout_ms: self.limit.as_millis() as u64,
        })?
    }
}
