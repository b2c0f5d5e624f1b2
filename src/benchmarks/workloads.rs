use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::benchmarks::{IterationContext, Workload};
use crate::error::WorkError;

/// Synthetic workload that simulates a remote call of fixed latency.
///
/// Optionally fails on the N-th call counted across all workers, which is
/// handy for exercising the abort path of a run.
#[derive(Debug)]
pub struct SleepWorkload {
    latency: Duration,
    fail_on_call: Option<u64>,
    message: String,
    calls: AtomicU64,
}

impl SleepWorkload {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            fail_on_call: None,
            message: "simulated failure".to_string(),
            calls: AtomicU64::new(0),
        }
    }

    pub fn failing_on_call(mut self, call: u64, message: impl Into<String>) -> Self {
        self.fail_on_call = Some(call);
        self.message = message.into();
        self
    }

    /// Calls started so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Workload for SleepWorkload {
    async fn run_iteration(&self, ctx: IterationContext) -> Result<(), WorkError> {
        let call = self.calls.fetch_add(1, Ordering::AcqRel) + 1;
        if self.fail_on_call == Some(call) {
            return Err(WorkError::failed(&self.message));
        }

        ctx.run_until(tokio::time::sleep(self.latency)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LoadgenError;
    use crate::benchmarks::{Benchmark, BenchmarkConfig};
    use tokio_util::sync::CancellationToken;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sleep_workload_throughput() {
        let config = BenchmarkConfig::new("sleep")
            .with_concurrency(4)
            .with_duration(Duration::from_millis(500));
        let benchmark = Benchmark::new(config, SleepWorkload::new(Duration::from_millis(10)));

        let result = benchmark.run(&CancellationToken::new()).await.unwrap();

        // 4 workers at roughly 10ms per call: about 400 ops/sec.
        assert!(result.throughput > 100.0, "throughput {}", result.throughput);
        assert!(result.throughput < 500.0, "throughput {}", result.throughput);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sleep_workload_failure() {
        let config = BenchmarkConfig::new("sleep")
            .with_concurrency(2)
            .with_duration(Duration::from_secs(1));
        let workload = SleepWorkload::new(Duration::from_millis(1)).failing_on_call(3, "boom");
        let benchmark = Benchmark::new(config, workload);

        let start = std::time::Instant::now();
        let err = benchmark.run(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, LoadgenError::Worker(_)));
        assert!(err.to_string().contains("boom"));
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_calls_cut_off_at_run_end() {
        let config = BenchmarkConfig::new("sleep")
            .with_concurrency(2)
            .with_duration(Duration::from_millis(100));
        let benchmark = Benchmark::new(config, SleepWorkload::new(Duration::from_secs(10)));

        let result = benchmark.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(result.iterations, 0);
        assert!(result.elapsed < Duration::from_secs(2));
    }
}
