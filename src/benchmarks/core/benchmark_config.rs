use std::time::Duration;

use crate::identity::{DEFAULT_LABEL_KEY, DEFAULT_RESOURCE_SUFFIX};
use crate::{LoadgenError, Result};

/// Upper bound on a single iteration, regardless of the run's duration.
pub const DEFAULT_ITERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for benchmark execution
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Tag used to derive the run label and resource names
    pub name: String,
    /// Number of parallel workers
    pub concurrency: usize,
    /// Wall-clock budget for the whole run
    pub duration: Duration,
    pub iteration_timeout: Duration,
    pub resource_suffix: String,
    pub label_key: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            name: "benchmark".to_string(),
            concurrency: 1,
            duration: Duration::from_secs(60),
            iteration_timeout: DEFAULT_ITERATION_TIMEOUT,
            resource_suffix: DEFAULT_RESOURCE_SUFFIX.to_string(),
            label_key: DEFAULT_LABEL_KEY.to_string(),
        }
    }
}

impl BenchmarkConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_iteration_timeout(mut self, timeout: Duration) -> Self {
        self.iteration_timeout = timeout;
        self
    }

    pub fn with_resource_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.resource_suffix = suffix.into();
        self
    }

    pub fn with_label_key(mut self, key: impl Into<String>) -> Self {
        self.label_key = key.into();
        self
    }

    /// Rejects configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(LoadgenError::Configuration(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.duration.is_zero() {
            return Err(LoadgenError::Configuration(
                "duration must be greater than zero".to_string(),
            ));
        }
        if self.iteration_timeout.is_zero() {
            return Err(LoadgenError::Configuration(
                "iteration timeout must be greater than zero".to_string(),
            ));
        }
        if self.name.is_empty() {
            return Err(LoadgenError::Configuration(
                "benchmark name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
