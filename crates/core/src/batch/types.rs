//! Types for the batch module.

use bytes::Bytes;
use serde::Serialize;

use crate::dispatch::{resolve, Strategy};
use crate::format::{classify, classify_file_name, file_stem, MediaKind};
use crate::transcoder::ConversionOptions;

/// One file to convert.
#[derive(Debug, Clone)]
pub struct ConversionTask {
    /// Input file name.
    pub name: String,
    /// Input bytes. Cloning shares the buffer.
    pub source: Bytes,
    /// Declared kind of the input.
    pub source_kind: MediaKind,
    /// Requested output format tag (e.g. "webp", "mp3").
    pub target_format: String,
    /// Passed verbatim to the transcoder.
    pub options: ConversionOptions,
}

impl ConversionTask {
    /// Creates a task, classifying the source from its file name.
    pub fn new(name: impl Into<String>, source: Bytes, target_format: impl Into<String>) -> Self {
        let name = name.into();
        let source_kind = classify_file_name(&name);
        Self {
            name,
            source,
            source_kind,
            target_format: target_format.into(),
            options: ConversionOptions::default(),
        }
    }

    /// Overrides the declared source kind.
    pub fn with_source_kind(mut self, kind: MediaKind) -> Self {
        self.source_kind = kind;
        self
    }

    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn target_kind(&self) -> MediaKind {
        classify(&self.target_format)
    }

    /// Strategy this task dispatches to.
    pub fn strategy(&self) -> Strategy {
        resolve(self.source_kind, self.target_kind())
    }

    /// `<stem>_converted.<target>`, where the stem ends at the first dot.
    pub fn output_name(&self) -> String {
        format!("{}_converted.{}", file_stem(&self.name), self.target_format)
    }
}

/// Outcome of one task. Exactly one of payload or reason exists.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Converted { payload: Bytes },
    Failed { reason: String },
}

/// Result for one task, aligned by index with the submitted batch.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// Position of the originating task.
    pub index: usize,
    pub output_name: String,
    pub strategy: Strategy,
    pub outcome: ConversionOutcome,
    /// Transcode time only; queue wait is excluded.
    pub elapsed_millis: u64,
}

impl ConversionResult {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, ConversionOutcome::Converted { .. })
    }

    pub fn payload(&self) -> Option<&Bytes> {
        match &self.outcome {
            ConversionOutcome::Converted { payload } => Some(payload),
            ConversionOutcome::Failed { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.outcome {
            ConversionOutcome::Converted { .. } => None,
            ConversionOutcome::Failed { reason } => Some(reason),
        }
    }

    pub fn into_payload(self) -> Option<Bytes> {
        match self.outcome {
            ConversionOutcome::Converted { payload } => Some(payload),
            ConversionOutcome::Failed { .. } => None,
        }
    }
}

/// Aggregate progress of a running batch.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub completed_count: usize,
    pub total_count: usize,
    /// Name of the task the reporting worker starts next, empty when the
    /// queue is drained.
    pub in_flight_label: String,
    /// Results completed so far, in completion order.
    pub results_so_far: Vec<ConversionResult>,
}

impl ProgressSnapshot {
    pub fn is_complete(&self) -> bool {
        self.completed_count == self.total_count
    }

    /// Completion in percent. An empty batch counts as complete.
    pub fn percent(&self) -> f32 {
        if self.total_count == 0 {
            100.0
        } else {
            self.completed_count as f32 / self.total_count as f32 * 100.0
        }
    }
}

/// Totals over a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub output_bytes: u64,
    pub elapsed_millis: u64,
}

impl BatchSummary {
    pub fn from_results(results: &[ConversionResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Self::default()
            },
            |mut acc, r| {
                match r.payload() {
                    Some(payload) => {
                        acc.succeeded += 1;
                        acc.output_bytes += payload.len() as u64;
                    }
                    None => acc.failed += 1,
                }
                acc.elapsed_millis += r.elapsed_millis;
                acc
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(index: usize, outcome: ConversionOutcome, elapsed_millis: u64) -> ConversionResult {
        ConversionResult {
            index,
            output_name: format!("f{}_converted.png", index),
            strategy: Strategy::DirectTranscode,
            outcome,
            elapsed_millis,
        }
    }

    #[test]
    fn test_task_classifies_from_name() {
        let task = ConversionTask::new("clip.MP4", Bytes::new(), "mp3");
        assert_eq!(task.source_kind, MediaKind::Video);
        assert_eq!(task.target_kind(), MediaKind::Audio);
        assert_eq!(task.strategy(), Strategy::VideoToAudioExtract);

        let task = task.with_source_kind(MediaKind::Audio);
        assert_eq!(task.strategy(), Strategy::ServerDelegate);
    }

    #[test]
    fn test_output_name_uses_first_dot() {
        let task = ConversionTask::new("photo.png", Bytes::new(), "webp");
        assert_eq!(task.output_name(), "photo_converted.webp");

        let task = ConversionTask::new("archive.tar.gz", Bytes::new(), "zip");
        assert_eq!(task.output_name(), "archive_converted.zip");

        let task = ConversionTask::new("README", Bytes::new(), "pdf");
        assert_eq!(task.output_name(), "README_converted.pdf");
    }

    #[test]
    fn test_result_accessors() {
        let ok = result(
            0,
            ConversionOutcome::Converted {
                payload: Bytes::from_static(b"abc"),
            },
            5,
        );
        assert!(ok.succeeded());
        assert_eq!(ok.payload().map(|p| p.len()), Some(3));
        assert_eq!(ok.failure_reason(), None);

        let failed = result(
            1,
            ConversionOutcome::Failed {
                reason: "boom".to_string(),
            },
            2,
        );
        assert!(!failed.succeeded());
        assert_eq!(failed.failure_reason(), Some("boom"));
        assert!(failed.into_payload().is_none());
    }

    #[test]
    fn test_summary() {
        let results = vec![
            result(
                0,
                ConversionOutcome::Converted {
                    payload: Bytes::from_static(b"1234"),
                },
                10,
            ),
            result(
                1,
                ConversionOutcome::Failed {
                    reason: "x".to_string(),
                },
                3,
            ),
        ];
        let summary = BatchSummary::from_results(&results);
        assert_eq!(
            summary,
            BatchSummary {
                total: 2,
                succeeded: 1,
                failed: 1,
                output_bytes: 4,
                elapsed_millis: 13,
            }
        );
        assert_eq!(BatchSummary::from_results(&[]), BatchSummary::default());
    }

    #[test]
    fn test_snapshot_percent() {
        let snapshot = ProgressSnapshot {
            completed_count: 1,
            total_count: 4,
            in_flight_label: String::new(),
            results_so_far: Vec::new(),
        };
        assert_eq!(snapshot.percent(), 25.0);
        assert!(!snapshot.is_complete());
    }
}
