//! Testing utilities and mock implementations.
//!
//! This module provides a mock of the Transcoder trait and fixtures for
//! building batches, allowing orchestrator and API tests without ffmpeg or a
//! remote conversion server.
//!
//! # Example
//!
//! ```rust,ignore
//! use formatshift_core::testing::{fixtures, MockTranscoder};
//!
//! let image = MockTranscoder::with_name("image");
//! let extract = MockTranscoder::with_name("extract");
//! let delegate = MockTranscoder::with_name("delegate");
//!
//! // Configure mock behavior
//! extract.set_always_fail("no audio stream").await;
//!
//! let converter = BulkConverter::with_defaults(fixtures::transcoder_set(&image, &extract, &delegate));
//! ```

mod mock_transcoder;

pub use mock_transcoder::{MockTranscoder, RecordedTranscode};

/// Test fixtures and helper functions.
pub mod fixtures {
    use bytes::Bytes;
    use std::sync::Arc;

    use super::MockTranscoder;
    use crate::batch::ConversionTask;
    use crate::transcoder::TranscoderSet;

    /// Build a set from three mocks, one per strategy.
    pub fn transcoder_set(
        direct: &MockTranscoder,
        extract: &MockTranscoder,
        delegate: &MockTranscoder,
    ) -> TranscoderSet {
        TranscoderSet::new(
            Arc::new(direct.clone()),
            Arc::new(extract.clone()),
            Arc::new(delegate.clone()),
        )
    }

    /// Create a task whose source bytes are its file name.
    pub fn task(name: &str, target_format: &str) -> ConversionTask {
        ConversionTask::new(name, Bytes::from(name.to_string()), target_format)
    }

    /// Create `count` image tasks named `image-<i>.png` targeting webp.
    pub fn image_tasks(count: usize) -> Vec<ConversionTask> {
        (0..count)
            .map(|i| task(&format!("image-{}.png", i), "webp"))
            .collect()
    }
}
