//! Built-in scheduler implementations.

use super::{DispatchHandle, Scheduler};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::{oneshot, Semaphore};

/// Spawns every unit of work as its own task, without an admission limit.
///
/// Suited to short, CPU-light callbacks where queueing would cost more than
/// it saves.
#[derive(Debug, Clone, Default)]
pub struct UnboundedPool;

impl UnboundedPool {
    /// Creates a new unbounded pool handle.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Scheduler for UnboundedPool {
    fn name(&self) -> &str {
        "unbounded-pool"
    }

    async fn dispatch(&self, work: BoxFuture<'static, ()>) -> DispatchHandle {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            work.await;
            let _ = tx.send(());
        });
        DispatchHandle::from_receiver(rx)
    }
}

/// Admits at most `capacity` units of work at a time.
///
/// Admission waits for a free slot, which gives natural backpressure to
/// dispatch loops. Sized for blocking or I/O-bound transforms.
#[derive(Debug, Clone)]
pub struct BoundedPool {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl BoundedPool {
    /// Creates a pool admitting up to `capacity` concurrent units of work.
    ///
    /// A capacity of zero is clamped to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// The admission limit.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[async_trait]
impl Scheduler for BoundedPool {
    fn name(&self) -> &str {
        "bounded-pool"
    }

    async fn dispatch(&self, work: BoxFuture<'static, ()>) -> DispatchHandle {
        let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
            // The semaphore is owned by this pool and never closed; if it
            // ever were, running inline keeps the work from being lost.
            work.await;
            return DispatchHandle::completed();
        };
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let _permit = permit;
            work.await;
            let _ = tx.send(());
        });
        DispatchHandle::from_receiver(rx)
    }
}

/// Runs work directly on the dispatching task.
///
/// Dispatch returns only after the work has finished, so concurrent mapping
/// degrades to sequential execution. Meant for trivial transforms and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl Inline {
    /// Creates an inline scheduler handle.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Scheduler for Inline {
    fn name(&self) -> &str {
        "inline"
    }

    async fn dispatch(&self, work: BoxFuture<'static, ()>) -> DispatchHandle {
        work.await;
        DispatchHandle::completed()
    }
}
