//! Batch module for bulk, concurrent conversion.
//!
//! This module provides the `BulkConverter`, which:
//! - Resolves a dispatch strategy for every task
//! - Runs at most N transcodes at a time from one FIFO queue
//! - Keeps going when individual tasks fail
//! - Reports progress after every completed task
//!
//! # Example
//!
//! ```ignore
//! use formatshift_core::batch::{BulkConverter, BatchConfig, ConversionTask};
//! use formatshift_core::transcoder::{create_transcoders, TranscoderConfig};
//!
//! let transcoders = create_transcoders(&TranscoderConfig::default())?;
//! let converter = BulkConverter::new(transcoders, BatchConfig::default());
//!
//! let tasks = vec![
//!     ConversionTask::new("photo.png", png_bytes, "webp"),
//!     ConversionTask::new("clip.mp4", mp4_bytes, "mp3"),
//! ];
//!
//! let results = converter
//!     .run_batch(tasks, |p| println!("{}/{}", p.completed_count, p.total_count), 3)
//!     .await?;
//!
//! for result in &results {
//!     match result.failure_reason() {
//!         None => println!("{} ok", result.output_name),
//!         Some(reason) => println!("{} failed: {}", result.output_name, reason),
//!     }
//! }
//! ```

mod config;
mod orchestrator;
mod types;

pub use config::BatchConfig;
pub use orchestrator::{BatchError, BulkConverter};
pub use types::{
    BatchSummary, ConversionOutcome, ConversionResult, ConversionTask, ProgressSnapshot,
};
