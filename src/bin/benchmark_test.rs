use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use ::loadgen::benchmarks::sweep::log_summary;
use ::loadgen::benchmarks::workloads::SleepWorkload;
use ::loadgen::*;

/// Drives a synthetic workload through the load-generation harness
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Name used to derive the run label and resource names (random if omitted)
    #[clap(long, env = "LOADGEN_NAME")]
    name: Option<String>,

    /// Number of parallel workers
    #[clap(long, env = "LOADGEN_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Length of each run in seconds
    #[clap(long, env = "LOADGEN_DURATION_SECS", default_value_t = 10)]
    duration_secs: u64,

    /// Sweep concurrency 1, 2, 4, ... up to this value instead of a single run
    #[clap(long, env = "LOADGEN_SWEEP_MAX")]
    sweep_max: Option<usize>,

    /// Simulated latency of one call in milliseconds
    #[clap(long, env = "LOADGEN_LATENCY_MS", default_value_t = 1)]
    latency_ms: u64,

    /// Make the N-th call fail, aborting the run
    #[clap(long, env = "LOADGEN_FAIL_ON_CALL")]
    fail_on_call: Option<u64>,

    /// Upper bound on a single call in seconds
    #[clap(long, env = "LOADGEN_ITERATION_TIMEOUT_SECS", default_value_t = 60)]
    iteration_timeout_secs: u64,

    /// Directory for log files
    #[clap(long, value_name = "PATH", env = "LOADGEN_LOGS_DIR", default_value = "logs")]
    logs_dir: PathBuf,

    /// Write the results as JSON to this file
    #[clap(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(&args.logs_dir)?;

    let outcome = run(args).await;
    if let Err(e) = &outcome {
        tracing::error!("Benchmark failed: {}", e);
    }

    flush_tracing();
    outcome
}

async fn run(args: Args) -> Result<()> {
    let name = args
        .name
        .unwrap_or_else(|| petname::petname(2, "-").unwrap_or_else(|| "benchmark".to_string()));

    let config = BenchmarkConfig::new(name)
        .with_concurrency(args.concurrency)
        .with_duration(Duration::from_secs(args.duration_secs))
        .with_iteration_timeout(Duration::from_secs(args.iteration_timeout_secs));
    config.validate()?;

    let mut workload = SleepWorkload::new(Duration::from_millis(args.latency_ms));
    if let Some(call) = args.fail_on_call {
        workload = workload.failing_on_call(call, format!("simulated failure on call {}", call));
    }
    let workload = Arc::new(workload);

    let root = CancellationToken::new();
    {
        let root = root.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, stopping workers...");
                root.cancel();
            }
        });
    }

    tracing::info!("=== Starting Loadgen Benchmark ===");

    let results = match args.sweep_max {
        Some(max) => {
            ConcurrencySweep::doubling(config, max)
                .run(workload.clone(), &root)
                .await?
        }
        None => {
            let started = std::time::Instant::now();
            let benchmark = Benchmark::with_shared_workload(config, workload.clone());
            tracing::info!("Cleanup selector: {}", benchmark.label_selector());
            let result = benchmark.run(&root).await?;
            log_summary(std::slice::from_ref(&result), started.elapsed());
            vec![result]
        }
    };

    tracing::info!("Calls started: {}", workload.calls());

    if let Some(path) = args.output {
        let file = std::fs::File::create(&path)?;
        serde_json::to_writer_pretty(file, &results)?;
        tracing::info!("Results written to {}", path.display());
    }

    tracing::info!("=== Benchmark Completed Successfully ===");

    Ok(())
}
