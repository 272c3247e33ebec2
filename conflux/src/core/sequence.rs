//! Push-based value sequences.

use crate::core::PendingValue;
use crate::errors::Failure;
use futures::stream::{self, BoxStream, FuturesUnordered, Stream, StreamExt};
use std::fmt;
use tokio::sync::mpsc;

/// An ordered, potentially unbounded, push-based stream of values.
///
/// A sequence terminates either by completing (no more items) or by carrying
/// a terminal failure. Consumers treat the first `Err` entry as terminal and
/// stop pulling; items still in flight behind it are discarded.
pub struct Sequence<T> {
    inner: BoxStream<'static, Result<T, Failure>>,
}

impl<T> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sequence")
    }
}

impl<T> Sequence<T>
where
    T: Send + 'static,
{
    /// Wraps an existing stream of outcomes.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<T, Failure>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
        }
    }

    /// A sequence that completes immediately.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(stream::empty())
    }

    /// A sequence yielding the given items, then completing.
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        Self::new(stream::iter(items).map(Ok))
    }

    /// A sequence that terminates immediately with a failure.
    #[must_use]
    pub fn failed(failure: Failure) -> Self {
        Self::new(stream::once(futures::future::ready(Err(failure))))
    }

    /// Merges a set of pending values into one sequence.
    ///
    /// Items are emitted in completion order, not in the order the pending
    /// values were supplied. A failed pending value terminates the merged
    /// sequence.
    pub fn merge(sources: Vec<PendingValue<T>>) -> Self
    where
        T: Clone + Sync,
    {
        let resolving: FuturesUnordered<_> = sources
            .into_iter()
            .map(|source| async move { source.resolve().await })
            .collect();
        Self::new(resolving)
    }

    /// Creates a push channel and the sequence draining it.
    ///
    /// The sequence completes once every [`SequenceSender`] clone has been
    /// dropped.
    #[must_use]
    pub fn channel() -> (SequenceSender<T>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let drained = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|entry| (entry, rx))
        });
        (SequenceSender { tx }, Self::new(drained))
    }

    /// Pulls the next entry, or `None` once the sequence has completed.
    pub async fn next(&mut self) -> Option<Result<T, Failure>> {
        self.inner.next().await
    }

    /// Drains the sequence into a list.
    ///
    /// Returns the terminal failure if the sequence fails before completing;
    /// items emitted before the failure are discarded.
    pub async fn collect(mut self) -> Result<Vec<T>, Failure> {
        let mut items = Vec::new();
        while let Some(entry) = self.inner.next().await {
            match entry {
                Ok(item) => items.push(item),
                Err(failure) => return Err(failure),
            }
        }
        Ok(items)
    }

    /// Unwraps into the underlying boxed stream.
    #[must_use]
    pub fn into_inner(self) -> BoxStream<'static, Result<T, Failure>> {
        self.inner
    }
}

/// Push handle feeding a channel-backed [`Sequence`].
///
/// Completion is signalled by dropping every sender clone; failure by
/// [`SequenceSender::fail`].
pub struct SequenceSender<T> {
    tx: mpsc::UnboundedSender<Result<T, Failure>>,
}

impl<T> Clone for SequenceSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> fmt::Debug for SequenceSender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SequenceSender")
    }
}

impl<T> SequenceSender<T> {
    /// Pushes an item downstream. Returns false if the consumer is gone.
    pub fn emit(&self, value: T) -> bool {
        self.tx.send(Ok(value)).is_ok()
    }

    /// Pushes a terminal failure downstream.
    pub fn fail(&self, failure: Failure) -> bool {
        self.tx.send(Err(failure)).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn from_items_yields_in_order() {
        let sequence = Sequence::from_items(vec![1, 2, 3]);
        assert_eq!(sequence.collect().await.ok(), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn empty_completes_immediately() {
        let sequence: Sequence<String> = Sequence::empty();
        assert_eq!(sequence.collect().await.ok(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn failed_terminates_with_cause() {
        let sequence: Sequence<u8> = Sequence::failed(Failure::msg("torn down"));
        let failure = sequence.collect().await.err();
        assert_eq!(failure.map(|f| f.to_string()), Some("torn down".to_string()));
    }

    #[tokio::test]
    async fn merge_emits_in_completion_order() {
        let slow = PendingValue::new(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok("slow")
        });
        let fast = PendingValue::ready("fast");

        let items = Sequence::merge(vec![slow, fast]).collect().await;
        assert_eq!(items.ok(), Some(vec!["fast", "slow"]));
    }

    #[tokio::test]
    async fn channel_completes_when_senders_drop() {
        let (sender, sequence) = Sequence::channel();
        let extra = sender.clone();

        assert!(sender.emit(10));
        assert!(extra.emit(20));
        drop(sender);
        drop(extra);

        assert_eq!(sequence.collect().await.ok(), Some(vec![10, 20]));
    }

    #[tokio::test]
    async fn channel_failure_is_terminal() {
        let (sender, mut sequence): (SequenceSender<u8>, Sequence<u8>) = Sequence::channel();
        sender.fail(Failure::msg("producer died"));
        drop(sender);

        let entry = sequence.next().await;
        assert!(matches!(entry, Some(Err(_))));
    }
}
