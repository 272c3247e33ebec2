//! Execution-context selection for dispatched work.
//!
//! A [`Scheduler`] is a named strategy for where a unit of work runs: a
//! bounded pool for blocking or I/O-heavy transforms, an unbounded pool for
//! short callbacks, or inline on the calling task for trivial ones. The
//! engine consumes schedulers through the trait; it never assumes a concrete
//! implementation.

mod pools;
mod registry;

pub use pools::{BoundedPool, Inline, UnboundedPool};
pub use registry::SchedulerRegistry;

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use tokio::sync::oneshot;

/// A named execution context for dispatched units of work.
///
/// Implementations must be safe for concurrent submission from many
/// invocations sharing one instance. `dispatch` waits only for *admission*
/// (for a bounded pool, a free slot); the returned handle resolves when the
/// work itself finishes.
///
/// Pool schedulers isolate panicking work (the panicked task simply never
/// completes its contribution); [`Inline`] runs work on the caller's task,
/// so a panic there propagates to the caller.
#[async_trait]
pub trait Scheduler: Send + Sync + fmt::Debug {
    /// The scheduler's name, used in logs and registries.
    fn name(&self) -> &str;

    /// Admits a unit of work onto this execution context.
    async fn dispatch(&self, work: BoxFuture<'static, ()>) -> DispatchHandle;
}

/// Completion handle for a dispatched unit of work.
///
/// Resolves when the work finishes, whether it ran to completion or
/// panicked. Dropping the handle never cancels the work.
#[derive(Debug)]
pub struct DispatchHandle {
    done: oneshot::Receiver<()>,
}

impl DispatchHandle {
    /// A handle for work that already finished (inline execution).
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(());
        Self { done: rx }
    }

    /// A handle resolving when the paired sender fires or is dropped.
    #[must_use]
    pub fn from_receiver(done: oneshot::Receiver<()>) -> Self {
        Self { done }
    }

    /// Waits until the work has finished.
    pub async fn finished(self) {
        // A dropped sender means the work ended without signalling (panic);
        // either way it is no longer running.
        let _ = self.done.await;
    }

    /// Releases the handle without waiting.
    pub fn detach(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completed_handle_resolves() {
        DispatchHandle::completed().finished().await;
    }

    #[tokio::test]
    async fn handle_resolves_when_sender_dropped() {
        let (tx, rx) = oneshot::channel();
        let handle = DispatchHandle::from_receiver(rx);
        drop(tx);
        handle.finished().await;
    }
}
