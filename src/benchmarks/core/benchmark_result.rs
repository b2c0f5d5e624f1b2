use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::benchmarks::stats;

/// Results from running a benchmark
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    pub name: String,
    pub label: String,
    pub concurrency: usize,
    /// Iterations whose work function returned
    pub iterations: u64,
    pub elapsed: Duration,
    pub throughput: f64, // operations per second
    pub started_at: DateTime<Utc>,
}

impl BenchmarkResult {
    pub fn new(
        name: String,
        label: String,
        concurrency: usize,
        iterations: u64,
        elapsed: Duration,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            label,
            concurrency,
            iterations,
            elapsed,
            throughput: stats::calculate_throughput(iterations, elapsed),
            started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput_from_observed_span() {
        let result = BenchmarkResult::new(
            "create".to_string(),
            "create-abc".to_string(),
            4,
            500,
            Duration::from_millis(2500),
            Utc::now(),
        );
        assert_eq!(result.throughput, 200.0);
    }

    #[test]
    fn test_serializes_to_json() {
        let result = BenchmarkResult::new(
            "create".to_string(),
            "create-abc".to_string(),
            2,
            10,
            Duration::from_secs(1),
            Utc::now(),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["name"], "create");
        assert_eq!(json["concurrency"], 2);
        assert_eq!(json["iterations"], 10);
        assert_eq!(json["throughput"], 10.0);
    }
}
