//! Configuration for the batch module.

use serde::{Deserialize, Serialize};

/// Configuration for bulk conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Concurrency used by `BulkConverter::run`.
    #[serde(default = "default_concurrency")]
    pub default_concurrency: usize,
}

fn default_concurrency() -> usize {
    3
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            default_concurrency: default_concurrency(),
        }
    }
}

impl BatchConfig {
    /// Sets the default concurrency.
    pub fn with_default_concurrency(mut self, concurrency: usize) -> Self {
        self.default_concurrency = concurrency;
        self
    }
}
