use std::time::Duration;

/// Calculate throughput (operations per second) given iterations and elapsed time
pub fn calculate_throughput(iterations: u64, elapsed: Duration) -> f64 {
    if elapsed.is_zero() {
        return 0.0;
    }

    iterations as f64 / elapsed.as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_throughput() {
        let throughput = calculate_throughput(100, Duration::from_secs(10));
        assert_eq!(throughput, 10.0);
    }

    #[test]
    fn test_calculate_throughput_zero_duration() {
        assert_eq!(calculate_throughput(100, Duration::ZERO), 0.0);
    }

    #[test]
    fn test_calculate_throughput_fractional() {
        let throughput = calculate_throughput(100, Duration::from_millis(2500));
        assert_eq!(throughput, 40.0);
    }

    #[test]
    fn test_calculate_throughput_no_iterations() {
        assert_eq!(calculate_throughput(0, Duration::from_secs(3)), 0.0);
    }
}
