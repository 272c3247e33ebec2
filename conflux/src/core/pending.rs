//! Single-resolution deferred values.

use crate::errors::Failure;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;

/// A deferred computation producing exactly one value or failure.
///
/// The wrapped future runs at most once, no matter how many observers await
/// the same `PendingValue`: every clone shares the underlying future, and all
/// observers (including late ones) see the cached terminal outcome.
///
/// The default constructors are lazy — work starts on the first await. Use
/// [`PendingValue::spawn`] for sources that should start immediately in the
/// background.
pub struct PendingValue<T> {
    inner: Shared<BoxFuture<'static, Result<T, Failure>>>,
}

impl<T> Clone for PendingValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for PendingValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PendingValue")
    }
}

impl<T> PendingValue<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wraps a future; it runs once, on first await.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, Failure>> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }

    /// An already-resolved successful value.
    pub fn ready(value: T) -> Self {
        Self::new(futures::future::ready(Ok(value)))
    }

    /// An already-resolved failure.
    pub fn failed(failure: Failure) -> Self {
        Self::new(futures::future::ready(Err(failure)))
    }

    /// Starts the future immediately on the runtime.
    ///
    /// The result is cached exactly as with [`PendingValue::new`]; only the
    /// start time differs.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, Failure>> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        Self::new(async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => Err(Failure::msg(format!(
                    "pending task aborted: {join_error}"
                ))),
            }
        })
    }

    /// Awaits the terminal outcome.
    ///
    /// Safe to call from any number of observers; the underlying work is not
    /// re-triggered.
    pub async fn resolve(&self) -> Result<T, Failure> {
        self.inner.clone().await
    }

    /// Returns the terminal outcome if already resolved, without awaiting.
    #[must_use]
    pub fn peek(&self) -> Option<Result<T, Failure>> {
        self.inner.peek().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn resolves_ready_value() {
        let pending = PendingValue::ready(21);
        assert_eq!(tokio_test::block_on(pending.resolve()).ok(), Some(21));
    }

    #[tokio::test]
    async fn resolves_failure() {
        let pending: PendingValue<u32> = PendingValue::failed(Failure::msg("down"));
        let failure = pending.resolve().await.err();
        assert_eq!(failure.map(|f| f.to_string()), Some("down".to_string()));
    }

    #[tokio::test]
    async fn underlying_work_runs_once() {
        let executions = Arc::new(AtomicUsize::new(0));
        let counter = executions.clone();
        let pending = PendingValue::new(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("value".to_string())
        });

        let first = pending.resolve().await;
        let second = pending.resolve().await;
        let third = pending.clone().resolve().await;

        assert!(first.is_ok() && second.is_ok() && third.is_ok());
        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn peek_reports_resolution() {
        let pending = PendingValue::new(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(5)
        });
        assert!(pending.peek().is_none());
        let _ = pending.resolve().await;
        assert!(matches!(pending.peek(), Some(Ok(5))));
    }

    #[tokio::test]
    async fn spawn_starts_work_before_await() {
        let executions = Arc::new(AtomicUsize::new(0));
        let counter = executions.clone();
        let pending = PendingValue::spawn(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        // Yield so the spawned task gets a chance to run before any observer.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert!(pending.resolve().await.is_ok());
    }
}
