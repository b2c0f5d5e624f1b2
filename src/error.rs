use thiserror::Error;

pub type Result<T> = core::result::Result<T, LoadgenError>;

#[derive(Error, Debug)]
pub enum LoadgenError {
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Logging setup error: {0}")]
    LoggingSetup(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("worker received following error: {0}")]
    Worker(String),

    #[error("Benchmark cancelled by caller")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Outcome of a single failed iteration.
///
/// `Cancelled` and `DeadlineExceeded` mean the iteration ran out of time or was
/// told to stop; the harness swallows them. Anything else ends the whole run.
#[derive(Error, Debug)]
pub enum WorkError {
    #[error("iteration cancelled")]
    Cancelled,

    #[error("iteration deadline exceeded")]
    DeadlineExceeded,

    #[error("{0}")]
    Failed(anyhow::Error),
}

impl WorkError {
    pub fn failed(message: impl std::fmt::Display) -> Self {
        WorkError::Failed(anyhow::anyhow!("{}", message))
    }

    /// True for the benign expiry kinds.
    pub fn is_expiry(&self) -> bool {
        matches!(self, WorkError::Cancelled | WorkError::DeadlineExceeded)
    }
}

impl From<anyhow::Error> for WorkError {
    fn from(err: anyhow::Error) -> Self {
        WorkError::Failed(err)
    }
}

impl From<tokio::time::error::Elapsed> for WorkError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        WorkError::DeadlineExceeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_classification() {
        assert!(WorkError::Cancelled.is_expiry());
        assert!(WorkError::DeadlineExceeded.is_expiry());
        assert!(!WorkError::failed("boom").is_expiry());
    }

    #[test]
    fn test_anyhow_conversion_is_fatal() {
        let err: WorkError = anyhow::anyhow!("connection refused").into();
        assert!(!err.is_expiry());
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn test_worker_error_display() {
        let err = LoadgenError::Worker("boom".to_string());
        assert_eq!(err.to_string(), "worker received following error: boom");
    }
}
