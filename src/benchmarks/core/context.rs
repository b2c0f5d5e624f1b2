use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::WorkError;
use crate::identity::RunIdentity;

/// Cancellable scope handed to the work function for one iteration.
///
/// The scope ends when the run's duration elapses, when the run is aborted by
/// another worker's failure, or when the per-iteration deadline passes.
#[derive(Debug, Clone)]
pub struct IterationContext {
    token: CancellationToken,
    deadline: Instant,
    identity: Arc<RunIdentity>,
    worker: usize,
}

impl IterationContext {
    pub(crate) fn new(
        token: CancellationToken,
        deadline: Instant,
        identity: Arc<RunIdentity>,
        worker: usize,
    ) -> Self {
        Self {
            token,
            deadline,
            identity,
            worker,
        }
    }

    /// Index of the worker running this iteration
    pub fn worker(&self) -> usize {
        self.worker
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Completes once the scope is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        tokio::select! {
            _ = self.token.cancelled() => {}
            _ = tokio::time::sleep_until(self.deadline) => {}
        }
    }

    /// Drives `fut` until it completes or the scope ends, whichever is first.
    pub async fn run_until<F, T>(&self, fut: F) -> Result<T, WorkError>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(WorkError::Cancelled),
            _ = tokio::time::sleep_until(self.deadline) => Err(WorkError::DeadlineExceeded),
            value = fut => Ok(value),
        }
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

    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }
}
