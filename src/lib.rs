pub use crate::benchmarks::{
    Benchmark, BenchmarkConfig, BenchmarkResult, ConcurrencySweep, IterationContext, Workload,
    workload_fn,
};
pub use crate::error::{LoadgenError, Result, WorkError};
pub use crate::identity::{RunIdentity, random_id};

pub use tokio_util::sync::CancellationToken;

use std::path::Path;
use std::sync::{Mutex, OnceLock};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt::Layer, prelude::*, registry::Registry};

pub mod benchmarks;
mod error;
pub mod identity;

static TRACING_GUARDS: OnceLock<Mutex<Option<(WorkerGuard, WorkerGuard)>>> = OnceLock::new();
static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Installs the global subscriber: ANSI output on stdout plus a daily rolling
/// file under `logs_dir`. Filtering follows `RUST_LOG`, defaulting to `info`.
///
/// Only the first call has any effect.
pub fn init_tracing(logs_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(logs_dir)?;

    if TRACING_INIT.get().is_some() {
        return Ok(());
    }

    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix("loadgen")
        .filename_suffix("log")
        .build(logs_dir)
        .map_err(|e| LoadgenError::LoggingSetup(e.to_string()))?;

    TRACING_INIT.get_or_init(|| {
        let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);
        let (non_blocking_stdout, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());

        TRACING_GUARDS
            .set(Mutex::new(Some((file_guard, stdout_guard))))
            .ok();

        let stdout_layer = Layer::new()
            .with_writer(non_blocking_stdout)
            .with_ansi(true)
            .with_target(true);

        let file_layer = Layer::new()
            .with_writer(non_blocking_file)
            .with_ansi(false)
            .with_target(true);

        // Another subscriber may already be installed, e.g. by a test harness.
        let _ = Registry::default()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with(stdout_layer)
            .with(file_layer)
            .try_init();
    });

    Ok(())
}

/// Flushes buffered log lines. Call before the process exits.
pub fn flush_tracing() {
    if let Some(guards) = TRACING_GUARDS.get()
        && let Ok(mut guards) = guards.lock()
    {
        guards.take();
    }
}
