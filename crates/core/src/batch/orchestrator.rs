//! Bulk conversion orchestrator.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::config::BatchConfig;
use super::types::{ConversionOutcome, ConversionResult, ConversionTask, ProgressSnapshot};
use crate::metrics;
use crate::transcoder::TranscoderSet;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Errors from the orchestrator itself. Per-task failures are reported in
/// the results, never here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    /// A batch needs at least one worker.
    #[error("Concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),
}

/// State shared by the workers of one batch.
struct BatchState {
    pending: VecDeque<(usize, ConversionTask)>,
    /// Result per task index.
    slots: Vec<Option<ConversionResult>>,
    /// Results in completion order.
    completed: Vec<ConversionResult>,
}

fn lock(state: &Mutex<BatchState>) -> MutexGuard<'_, BatchState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs batches of conversion tasks with bounded concurrency.
///
/// Workers are futures joined inside the calling task, so a batch never runs
/// two transcodes in parallel on different threads; they interleave at the
/// transcoders' await points. The shared state lock is never held across an
/// await.
#[derive(Debug, Clone)]
pub struct BulkConverter {
    transcoders: TranscoderSet,
    config: BatchConfig,
}

impl BulkConverter {
    pub fn new(transcoders: TranscoderSet, config: BatchConfig) -> Self {
        Self {
            transcoders,
            config,
        }
    }

    pub fn with_defaults(transcoders: TranscoderSet) -> Self {
        Self::new(transcoders, BatchConfig::default())
    }

    pub fn transcoders(&self) -> &TranscoderSet {
        &self.transcoders
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Runs a batch at the configured default concurrency.
    pub async fn run<F>(
        &self,
        tasks: Vec<ConversionTask>,
        on_progress: F,
    ) -> Result<Vec<ConversionResult>, BatchError>
    where
        F: Fn(ProgressSnapshot) + Send + Sync,
    {
        self.run_batch(tasks, on_progress, self.config.default_concurrency)
            .await
    }

    /// Converts every task, at most `concurrency` at a time.
    ///
    /// The returned vector is aligned with `tasks`: element `i` is the result
    /// of `tasks[i]`. `on_progress` is called once per completed task, and
    /// once with 0/0 for an empty batch.
    pub async fn run_batch<F>(
        &self,
        tasks: Vec<ConversionTask>,
        on_progress: F,
        concurrency: usize,
    ) -> Result<Vec<ConversionResult>, BatchError>
    where
        F: Fn(ProgressSnapshot) + Send + Sync,
    {
        if concurrency == 0 {
            return Err(BatchError::InvalidConcurrency(concurrency));
        }

        let total = tasks.len();
        metrics::BATCHES_TOTAL.inc();
        metrics::BATCH_SIZE.observe(total as f64);

        if total == 0 {
            on_progress(ProgressSnapshot {
                completed_count: 0,
                total_count: 0,
                in_flight_label: String::new(),
                results_so_far: Vec::new(),
            });
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let workers = concurrency.min(total);
        info!(total, workers, "Starting batch");

        let state = Mutex::new(BatchState {
            pending: tasks.into_iter().enumerate().collect(),
            slots: (0..total).map(|_| None).collect(),
            completed: Vec::with_capacity(total),
        });

        join_all((0..workers).map(|worker| self.worker(worker, &state, total, &on_progress)))
            .await;

        let state = state.into_inner().unwrap_or_else(PoisonError::into_inner);
        let results: Vec<ConversionResult> = state.slots.into_iter().flatten().collect();
        debug_assert_eq!(results.len(), total);

        let elapsed = start.elapsed();
        metrics::BATCH_DURATION.observe(elapsed.as_secs_f64());

        let failed = results.iter().filter(|r| !r.succeeded()).count();
        info!(
            total,
            failed,
            duration_ms = elapsed.as_millis() as u64,
            "Batch finished"
        );

        Ok(results)
    }

    async fn worker<F>(
        &self,
        worker: usize,
        state: &Mutex<BatchState>,
        total: usize,
        on_progress: &F,
    ) where
        F: Fn(ProgressSnapshot) + Send + Sync,
    {
        let mut next = lock(state).pending.pop_front();

        while let Some((index, task)) = next {
            let result = self.execute(worker, index, task).await;

            let snapshot = {
                let mut guard = lock(state);
                guard.completed.push(result.clone());
                guard.slots[index] = Some(result);
                next = guard.pending.pop_front();

                ProgressSnapshot {
                    completed_count: guard.completed.len(),
                    total_count: total,
                    in_flight_label: next
                        .as_ref()
                        .map(|(_, task)| task.name.clone())
                        .unwrap_or_default(),
                    results_so_far: guard.completed.clone(),
                }
            };

            on_progress(snapshot);
        }
    }

    /// Dispatches one task and records its outcome.
    async fn execute(&self, worker: usize, index: usize, task: ConversionTask) -> ConversionResult {
        let strategy = task.strategy();
        let output_name = task.output_name();
        let transcoder = self.transcoders.for_strategy(strategy);

        debug!(
            worker,
            index,
            name = %task.name,
            strategy = %strategy,
            transcoder = transcoder.name(),
            "Starting task"
        );

        metrics::TASKS_IN_FLIGHT.inc();
        let start = Instant::now();
        let result = transcoder
            .transcode(task.source, &task.target_format, &task.options)
            .await;
        let elapsed = start.elapsed();
        metrics::TASKS_IN_FLIGHT.dec();
        metrics::TASK_DURATION
            .with_label_values(&[strategy.as_str()])
            .observe(elapsed.as_secs_f64());

        let outcome = match result {
            Ok(payload) => {
                metrics::TASKS_TOTAL
                    .with_label_values(&[strategy.as_str(), "success"])
                    .inc();
                debug!(index, name = %task.name, bytes = payload.len(), "Task converted");
                ConversionOutcome::Converted { payload }
            }
            Err(e) => {
                metrics::TASKS_TOTAL
                    .with_label_values(&[strategy.as_str(), "failed"])
                    .inc();
                let reason = e.to_string();
                let reason = if reason.is_empty() {
                    UNKNOWN_ERROR.to_string()
                } else {
                    reason
                };
                warn!(index, name = %task.name, error = %reason, "Task failed");
                ConversionOutcome::Failed { reason }
            }
        };

        ConversionResult {
            index,
            output_name,
            strategy,
            outcome,
            elapsed_millis: elapsed.as_millis() as u64,
        }
    }
}
