pub mod core;
#[cfg(feature = "progress")]
mod progress;
pub mod stats;
pub mod sweep;
pub mod workloads;

// Re-export commonly used items for convenience
pub use core::{
    Benchmark, BenchmarkConfig, BenchmarkResult, IterationContext, Workload, workload_fn,
};
pub use sweep::ConcurrencySweep;
