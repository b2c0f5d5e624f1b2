use std::future::Future;

use async_trait::async_trait;

use super::context::IterationContext;
use crate::error::WorkError;

/// Unit of work executed repeatedly by every worker of a benchmark.
///
/// Implementations should return promptly once `ctx` is cancelled, and report
/// running out of time as [`WorkError::Cancelled`] or
/// [`WorkError::DeadlineExceeded`] so the harness does not treat it as a failure.
#[async_trait]
pub trait Workload: Send + Sync + 'static {
    async fn run_iteration(&self, ctx: IterationContext) -> Result<(), WorkError>;
}

/// Adapter running a closure as a [`Workload`].
pub struct FnWorkload<F> {
    f: F,
}

/// Wraps `f` so it can be handed to a benchmark.
pub fn workload_fn<F, Fut>(f: F) -> FnWorkload<F>
where
    F: Fn(IterationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WorkError>> + Send + 'static,
{
    FnWorkload { f }
}

#[async_trait]
impl<F, Fut> Workload for FnWorkload<F>
where
    F: Fn(IterationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WorkError>> + Send + 'static,
{
    async fn run_iteration(&self, ctx: IterationContext) -> Result<(), WorkError> {
        (self.f)(ctx).await
    }
}
