pub mod benchmark;
pub mod benchmark_config;
pub mod benchmark_result;
pub mod context;
mod failure_scope;
pub mod workload;

pub use benchmark::Benchmark;
pub use benchmark_config::{BenchmarkConfig, DEFAULT_ITERATION_TIMEOUT};
pub use benchmark_result::BenchmarkResult;
pub use context::IterationContext;
pub use workload::{FnWorkload, Workload, workload_fn};
