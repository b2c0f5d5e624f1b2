use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::benchmark_config::BenchmarkConfig;
use super::benchmark_result::BenchmarkResult;
use super::context::IterationContext;
use super::failure_scope::FailureScope;
use super::workload::Workload;
use crate::identity::RunIdentity;
use crate::{LoadgenError, Result};

/// Stand-in deadline for iteration timeouts too large to add to `Instant::now()`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// A workload bound to a configuration, ready to be run once.
///
/// Every worker calls the workload in a loop until the configured duration
/// elapses. The first non-expiry error reported by any worker aborts the run
/// and becomes its result.
pub struct Benchmark<W: Workload> {
    config: BenchmarkConfig,
    identity: Arc<RunIdentity>,
    workload: Arc<W>,
}

impl<W: Workload> std::fmt::Debug for Benchmark<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Benchmark")
            .field("config", &self.config)
            .field("identity", &self.identity)
            .field("workload", &std::any::type_name::<W>())
            .finish()
    }
}

impl<W: Workload> Benchmark<W> {
    pub fn new(config: BenchmarkConfig, workload: W) -> Self {
        Self::with_shared_workload(config, Arc::new(workload))
    }

    pub fn with_shared_workload(config: BenchmarkConfig, workload: Arc<W>) -> Self {
        let identity = Arc::new(RunIdentity::new(
            config.name.clone(),
            config.resource_suffix.clone(),
            config.label_key.clone(),
        ));
        Self {
            config,
            identity,
            workload,
        }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    pub fn label(&self) -> &str {
        self.identity.label()
    }

    pub fn resource_name(&self) -> String {
        self.identity.resource_name()
    }

    pub fn label_selector(&self) -> String {
        self.identity.label_selector()
    }

    pub fn apply_label(&self, labels: &mut BTreeMap<String, String>) {
        self.identity.apply_label(labels)
    }

    /// Runs the workload from `concurrency` workers for the configured duration.
    ///
    /// `root` bounds the whole call: cancelling it stops every worker at its
    /// next check and the run returns [`LoadgenError::Cancelled`]. The run's
    /// own duration timer is independent of `root`.
    ///
    /// Dropping the returned future aborts the timer and every worker.
    pub async fn run(&self, root: &CancellationToken) -> Result<BenchmarkResult> {
        self.config.validate()?;

        let concurrency = self.config.concurrency;
        // Fixed before any worker can race on it.
        let label = self.identity.label().to_string();

        tracing::info!(
            target: "loadgen::benchmarks::run",
            "Starting benchmark {}: {} workers for {:?} (label {})",
            self.config.name,
            concurrency,
            self.config.duration,
            label
        );

        let failure = Arc::new(FailureScope::new(root));
        let expiry = CancellationToken::new();
        let completed = Arc::new(AtomicU64::new(0));

        let started_at = Utc::now();
        let start = Instant::now();

        // Owned by this future: dropping it aborts whatever is still running.
        let mut timer = JoinSet::new();
        {
            let expiry = expiry.clone();
            let duration = self.config.duration;
            timer.spawn(async move {
                tokio::time::sleep(duration).await;
                expiry.cancel();
            });
        }
        let _expire_on_drop = expiry.clone().drop_guard();

        #[cfg(feature = "progress")]
        let progress = crate::benchmarks::progress::RunProgress::start(
            &self.config.name,
            self.config.duration,
            completed.clone(),
        );

        let mut workers = JoinSet::new();
        let mut indices = HashMap::with_capacity(concurrency);
        for index in 0..concurrency {
            let worker = Worker {
                index,
                workload: self.workload.clone(),
                identity: self.identity.clone(),
                failure: failure.clone(),
                expiry: expiry.clone(),
                completed: completed.clone(),
                iteration_timeout: self.config.iteration_timeout,
            };
            let handle = workers.spawn(worker.run());
            indices.insert(handle.id(), index);
        }

        while let Some(joined) = workers.join_next_with_id().await {
            if let Err(e) = joined {
                let index = indices.get(&e.id()).copied().unwrap_or_default();
                failure.fail(format!("worker {} did not finish: {}", index, e));
            }
        }

        let elapsed = start.elapsed();
        timer.abort_all();
        expiry.cancel();

        #[cfg(feature = "progress")]
        progress.finish();

        if let Some(cause) = failure.cause() {
            tracing::error!(
                target: "loadgen::benchmarks::run",
                "Benchmark {} failed after {:?}: {}",
                self.config.name,
                elapsed,
                cause
            );
            return Err(LoadgenError::Worker(cause.to_string()));
        }

        if root.is_cancelled() {
            tracing::warn!(
                target: "loadgen::benchmarks::run",
                "Benchmark {} cancelled after {:?}",
                self.config.name,
                elapsed
            );
            return Err(LoadgenError::Cancelled);
        }

        let result = BenchmarkResult::new(
            self.config.name.clone(),
            label,
            concurrency,
            completed.load(Ordering::Acquire),
            elapsed,
            started_at,
        );

        tracing::info!(
            target: "loadgen::benchmarks::run",
            "Benchmark {} complete: {} iterations in {:?} ({:.2} ops/sec)",
            result.name,
            result.iterations,
            result.elapsed,
            result.throughput
        );

        Ok(result)
    }
}

struct Worker<W: Workload> {
    index: usize,
    workload: Arc<W>,
    identity: Arc<RunIdentity>,
    failure: Arc<FailureScope>,
    expiry: CancellationToken,
    completed: Arc<AtomicU64>,
    iteration_timeout: Duration,
}

impl<W: Workload> Worker<W> {
    async fn run(self) {
        let mut iterations = 0u64;

        loop {
            if self.expiry.is_cancelled() || self.failure.is_cancelled() {
                break;
            }

            let iteration = self.expiry.child_token();
            let _release = iteration.clone().drop_guard();
            let ctx = IterationContext::new(
                iteration,
                deadline_after(self.iteration_timeout),
                self.identity.clone(),
                self.index,
            );
            let call = AssertUnwindSafe(self.workload.run_iteration(ctx)).catch_unwind();

            // Iterations still in flight when the run ends are dropped uncounted.
            let outcome = tokio::select! {
                biased;
                _ = self.failure.cancelled() => break,
                _ = self.expiry.cancelled() => break,
                outcome = tokio::time::timeout(self.iteration_timeout, call) => outcome,
            };

            match outcome {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(e))) if e.is_expiry() => {
                    tracing::trace!(
                        target: "loadgen::benchmarks::worker",
                        "Worker {} iteration expired: {}",
                        self.index,
                        e
                    );
                }
                Ok(Ok(Err(e))) => {
                    if self.failure.fail(&e) {
                        tracing::warn!(
                            target: "loadgen::benchmarks::worker",
                            "Worker {} failed, aborting run: {}",
                            self.index,
                            e
                        );
                    }
                }
                Ok(Err(panic)) => {
                    let cause = format!(
                        "worker {} panicked: {}",
                        self.index,
                        panic_message(&*panic)
                    );
                    if self.failure.fail(&cause) {
                        tracing::warn!(target: "loadgen::benchmarks::worker", "{}", cause);
                    }
                }
                Err(_) => {
                    tracing::debug!(
                        target: "loadgen::benchmarks::worker",
                        "Worker {} iteration exceeded {:?}",
                        self.index,
                        self.iteration_timeout
                    );
                }
            }

            self.completed.fetch_add(1, Ordering::AcqRel);
            iterations += 1;
        }

        tracing::debug!(
            target: "loadgen::benchmarks::worker",
            "Worker {} stopped after {} iterations",
            self.index,
            iterations
        );
    }
}

fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
