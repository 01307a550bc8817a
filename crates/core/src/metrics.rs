//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Batches (runs, size, duration)
//! - Tasks (outcomes and duration per strategy, tasks in flight)

use once_cell::sync::Lazy;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
};

// =============================================================================
// Batch Metrics
// =============================================================================

/// Batches run total.
pub static BATCHES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("formatshift_batches_total", "Total batches run").unwrap()
});

/// Tasks per batch.
pub static BATCH_SIZE: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("formatshift_batch_size", "Number of tasks per batch")
            .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
    )
    .unwrap()
});

/// Batch duration in seconds.
pub static BATCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("formatshift_batch_duration_seconds", "Duration of whole batches")
            .buckets(vec![0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0, 600.0]),
    )
    .unwrap()
});

// =============================================================================
// Task Metrics
// =============================================================================

/// Tasks total by strategy and result.
pub static TASKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("formatshift_tasks_total", "Total conversion tasks"),
        &["strategy", "result"], // result: "success", "failed"
    )
    .unwrap()
});

/// Task transcode duration in seconds.
pub static TASK_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "formatshift_task_duration_seconds",
            "Duration of a single transcode",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0]),
        &["strategy"],
    )
    .unwrap()
});

/// Tasks currently being transcoded.
pub static TASKS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "formatshift_tasks_in_flight",
        "Conversion tasks currently executing",
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Batches
        Box::new(BATCHES_TOTAL.clone()),
        Box::new(BATCH_SIZE.clone()),
        Box::new(BATCH_DURATION.clone()),
        // Tasks
        Box::new(TASKS_TOTAL.clone()),
        Box::new(TASK_DURATION.clone()),
        Box::new(TASKS_IN_FLIGHT.clone()),
    ]
}
