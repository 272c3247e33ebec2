//! Fixtures for exercising the engine in tests.

use crate::core::PendingValue;
use crate::errors::Failure;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Pending values that resolve immediately to the given items.
pub fn ready_values<T, I>(values: I) -> Vec<PendingValue<T>>
where
    T: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = T>,
{
    values.into_iter().map(PendingValue::ready).collect()
}

/// A pending value that resolves to `value` after `delay`.
pub fn delayed_value<T>(value: T, delay: Duration) -> PendingValue<T>
where
    T: Clone + Send + Sync + 'static,
{
    PendingValue::new(async move {
        tokio::time::sleep(delay).await;
        Ok(value)
    })
}

/// A pending value that fails with the given message.
pub fn failing_value<T>(message: &str) -> PendingValue<T>
where
    T: Clone + Send + Sync + 'static,
{
    PendingValue::failed(Failure::msg(message))
}

/// A shareable invocation counter for call-count assertions.
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    hits: Arc<AtomicUsize>,
}

impl CallCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one call.
    pub fn bump(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }

    /// Calls recorded so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixtures_resolve_as_described() {
        let ready = ready_values(vec![1, 2]);
        assert_eq!(ready.len(), 2);
        assert_eq!(ready[0].resolve().await.ok(), Some(1));

        let delayed = delayed_value(9, Duration::from_millis(5));
        assert_eq!(delayed.resolve().await.ok(), Some(9));

        let failing: PendingValue<u8> = failing_value("nope");
        assert!(failing.resolve().await.is_err());
    }

    #[test]
    fn counter_counts() {
        let counter = CallCounter::new();
        let clone = counter.clone();
        clone.bump();
        clone.bump();
        assert_eq!(counter.count(), 2);
    }
}
