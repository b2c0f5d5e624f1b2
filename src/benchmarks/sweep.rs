use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::{LoadgenError, Result};
use crate::benchmarks::{Benchmark, BenchmarkConfig, BenchmarkResult, Workload};

/// Runs the same workload at a series of concurrency levels.
///
/// Each level gets its own [`Benchmark`], and so its own label. The sweep stops
/// at the first level that fails and returns that error. A sweep without levels
/// is a configuration error.
#[derive(Debug, Clone)]
pub struct ConcurrencySweep {
    base: BenchmarkConfig,
    levels: Vec<usize>,
}

impl ConcurrencySweep {
    /// Levels 1, 2, 4, ... up to and including `max` when it is a power of two.
    pub fn doubling(base: BenchmarkConfig, max: usize) -> Self {
        let levels = std::iter::successors(Some(1usize), |c| c.checked_mul(2))
            .take_while(|c| *c <= max)
            .collect();
        Self { base, levels }
    }

    pub fn with_levels(base: BenchmarkConfig, levels: Vec<usize>) -> Self {
        Self { base, levels }
    }

    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    pub async fn run<W: Workload>(
        &self,
        workload: Arc<W>,
        root: &CancellationToken,
    ) -> Result<Vec<BenchmarkResult>> {
        if self.levels.is_empty() {
            return Err(LoadgenError::Configuration(
                "concurrency sweep has no levels".to_string(),
            ));
        }

        let overall_start = Instant::now();
        let mut results = Vec::with_capacity(self.levels.len());

        tracing::info!(
            target: "loadgen::benchmarks::sweep",
            "=== Running concurrency sweep for {} over {:?} ===",
            self.base.name,
            self.levels
        );

        for &concurrency in &self.levels {
            let config = self.base.clone().with_concurrency(concurrency);
            let benchmark = Benchmark::with_shared_workload(config, workload.clone());

            match benchmark.run(root).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!(
                        target: "loadgen::benchmarks::sweep",
                        "Benchmark at concurrency {} failed: {}",
                        concurrency,
                        e
                    );
                    log_summary(&results, overall_start.elapsed());
                    return Err(e);
                }
            }
        }

        log_summary(&results, overall_start.elapsed());
        Ok(results)
    }
}

pub fn log_summary(results: &[BenchmarkResult], overall_duration: Duration) {
    if results.is_empty() {
        return;
    }

    tracing::info!("=== Benchmark Results Summary ===");
    tracing::info!("");

    for result in results {
        tracing::info!("Benchmark: {}", result.name);
        tracing::info!("  Label:       {}", result.label);
        tracing::info!("  Concurrency: {}", result.concurrency);
        tracing::info!("  Iterations:  {}", result.iterations);
        tracing::info!("  Elapsed:     {:?}", result.elapsed);
        tracing::info!("  Throughput:  {:.2} ops/sec", result.throughput);
        tracing::info!("---");
    }

    tracing::info!("");
    tracing::info!("Total Benchmarks: {}", results.len());
    tracing::info!("Overall Duration: {:?}", overall_duration);
}
