//! Deferred work units and per-item retry state.

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::time::Instant;

use crate::error::BoxError;

/// A single deferred, retryable unit of work.
///
/// The scheduler invokes `attempt` once per attempt, so implementations must
/// tolerate re-invocation after a failure. Items are dropped as soon as the
/// batch completes.
#[async_trait]
pub trait WorkItem: Send + Sync {
    /// The value produced on success.
    type Output: Send;

    /// Run one attempt.
    async fn attempt(&self) -> Result<Self::Output, BoxError>;
}

/// A [`WorkItem`] built from a closure returning a future.
pub struct FnWorkItem<T> {
    factory: Box<dyn Fn() -> BoxFuture<'static, Result<T, BoxError>> + Send + Sync>,
}

#[async_trait]
impl<T: Send + 'static> WorkItem for FnWorkItem<T> {
    type Output = T;

    async fn attempt(&self) -> Result<T, BoxError> {
        (self.factory)().await
    }
}

/// Box a closure as a work item: `work_fn(|| async { Ok(value) })`.
///
/// The closure runs once per attempt and must therefore be `Fn`, not
/// `FnOnce`; clone captured handles inside it.
pub fn work_fn<T, F, Fut>(factory: F) -> Box<dyn WorkItem<Output = T>>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<T, BoxError>> + Send + 'static,
{
    Box::new(FnWorkItem {
        factory: Box::new(move || Box::pin(factory())),
    })
}

/// Retry state of one item while the batch runs.
pub(crate) enum ItemState<T> {
    /// First attempt not yet made.
    Pending,
    /// Waiting out the delay before retry `attempt` (0-based).
    Retrying { attempt: u32, not_before: Instant },
    /// Permanently settled; no further attempts.
    Settled(Result<T, BoxError>),
}
