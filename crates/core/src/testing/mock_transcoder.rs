//! Mock transcoder for testing.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::transcoder::{ConversionOptions, TranscodeError, Transcoder};

/// A recorded transcode call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTranscode {
    /// Input bytes.
    pub source: Bytes,
    /// Requested target format.
    pub target_format: String,
    /// Options passed with the call.
    pub options: ConversionOptions,
    /// Whether the call succeeded.
    pub success: bool,
}

/// Mock implementation of the Transcoder trait.
///
/// Provides controllable behavior for testing:
/// - Track calls for assertions
/// - Simulate failures (one-shot, permanent, or per input)
/// - Simulate conversion time, globally or per input
/// - Observe how many calls overlap
///
/// Successful output is the input followed by `->` and the target format.
/// Clones share state, so a test can keep a handle after moving one into a
/// `TranscoderSet`.
///
/// # Example
///
/// ```rust,ignore
/// use formatshift_core::testing::MockTranscoder;
///
/// let transcoder = MockTranscoder::new();
/// transcoder.set_transcode_duration(Duration::from_millis(10)).await;
///
/// let out = transcoder.transcode(Bytes::from_static(b"a"), "png", &opts).await?;
/// assert_eq!(&out[..], b"a->png");
///
/// assert_eq!(transcoder.recorded_calls().await.len(), 1);
/// assert_eq!(transcoder.max_in_flight(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockTranscoder {
    name: String,
    /// Recorded calls, in completion order.
    calls: Arc<RwLock<Vec<RecordedTranscode>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<TranscodeError>>>,
    /// If set, every call fails with this message.
    always_fail: Arc<RwLock<Option<String>>>,
    /// Failure messages keyed by input bytes.
    source_failures: Arc<RwLock<HashMap<Bytes, String>>>,
    /// Simulated conversion duration in milliseconds.
    duration_ms: Arc<RwLock<u64>>,
    /// Simulated conversion duration keyed by input bytes.
    source_delays: Arc<RwLock<HashMap<Bytes, Duration>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    /// Create a new mock transcoder named `mock`.
    pub fn new() -> Self {
        Self::with_name("mock")
    }

    /// Create a new mock transcoder with a custom name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            always_fail: Arc::new(RwLock::new(None)),
            source_failures: Arc::new(RwLock::new(HashMap::new())),
            duration_ms: Arc::new(RwLock::new(0)),
            source_delays: Arc::new(RwLock::new(HashMap::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedTranscode> {
        self.calls.read().await.clone()
    }

    /// Get the number of calls performed.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: TranscodeError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every call fail with `message`.
    pub async fn set_always_fail(&self, message: impl Into<String>) {
        *self.always_fail.write().await = Some(message.into());
    }

    /// Make calls whose input equals `source` fail with `message`.
    pub async fn set_failure_for_source(&self, source: Bytes, message: impl Into<String>) {
        self.source_failures
            .write()
            .await
            .insert(source, message.into());
    }

    /// Set the simulated conversion duration.
    pub async fn set_transcode_duration(&self, duration: Duration) {
        *self.duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Set the simulated duration for calls whose input equals `source`.
    pub async fn set_delay_for_source(&self, source: Bytes, delay: Duration) {
        self.source_delays.write().await.insert(source, delay);
    }

    /// Calls currently executing.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of overlapping calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn failure_for(&self, source: &Bytes) -> Option<TranscodeError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Some(err);
        }
        if let Some(message) = self.always_fail.read().await.as_ref() {
            return Some(TranscodeError::failed(message.clone()));
        }
        self.source_failures
            .read()
            .await
            .get(source)
            .map(|message| TranscodeError::failed(message.clone()))
    }

    async fn delay_for(&self, source: &Bytes) -> Duration {
        if let Some(delay) = self.source_delays.read().await.get(source) {
            return *delay;
        }
        Duration::from_millis(*self.duration_ms.read().await)
    }

    async fn run(&self, source: &Bytes, target_format: &str) -> Result<Bytes, TranscodeError> {
        // Always suspend once so concurrent callers interleave.
        tokio::task::yield_now().await;

        let delay = self.delay_for(source).await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.failure_for(source).await {
            return Err(err);
        }

        let mut out = source.to_vec();
        out.extend_from_slice(b"->");
        out.extend_from_slice(target_format.as_bytes());
        Ok(Bytes::from(out))
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        &self.name
    }

    async fn transcode(
        &self,
        source: Bytes,
        target_format: &str,
        options: &ConversionOptions,
    ) -> Result<Bytes, TranscodeError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = self.run(&source, target_format).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.calls.write().await.push(RecordedTranscode {
            source,
            target_format: target_format.to_string(),
            options: options.clone(),
            success: result.is_ok(),
        });

        result
    }
}
