//! Named scheduler lookup.

use super::{BoundedPool, Inline, Scheduler, UnboundedPool};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// An explicitly-owned map from scheduler names to shared handles.
///
/// The registry is a plain value: create it where the schedulers should
/// live, share it by reference or `Arc`, and let it drop with its owner.
/// There is deliberately no global instance.
#[derive(Default)]
pub struct SchedulerRegistry {
    entries: DashMap<String, Arc<dyn Scheduler>>,
}

impl SchedulerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the built-in schedulers.
    ///
    /// Registers `inline`, `unbounded-pool`, and a `bounded-pool` sized to
    /// the machine's available parallelism.
    #[must_use]
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        let parallelism = std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get);
        registry.register(Arc::new(Inline::new()));
        registry.register(Arc::new(UnboundedPool::new()));
        registry.register(Arc::new(BoundedPool::new(parallelism)));
        registry
    }

    /// Registers a scheduler under its own name, replacing any previous
    /// holder of that name.
    pub fn register(&self, scheduler: Arc<dyn Scheduler>) {
        self.entries
            .insert(scheduler.name().to_string(), scheduler);
    }

    /// Looks up a scheduler by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Scheduler>> {
        self.entries.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns the scheduler under `name`, creating it atomically if absent.
    pub fn get_or_insert_with<F>(&self, name: &str, create: F) -> Arc<dyn Scheduler>
    where
        F: FnOnce() -> Arc<dyn Scheduler>,
    {
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(occupied) => Arc::clone(occupied.get()),
            Entry::Vacant(vacant) => {
                let scheduler = create();
                vacant.insert(Arc::clone(&scheduler));
                scheduler
            }
        }
    }

    /// Names currently registered, in no particular order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of registered schedulers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for SchedulerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerRegistry")
            .field("names", &self.names())
            .finish()
    }
}
