//! Per-run configuration.

use crate::events::{EventSink, NoOpEventSink};
use crate::scheduler::{Scheduler, UnboundedPool};
use crate::utils::correlation_token;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for one batch or stream run.
///
/// Collapses the scheduler, the optional timeout (batch only), the optional
/// correlation id, and the event sink into one value. Defaults: unbounded
/// pool, no timeout, generated correlation token, no-op sink.
#[derive(Clone)]
pub struct RunConfig {
    scheduler: Arc<dyn Scheduler>,
    timeout: Option<Duration>,
    correlation_id: Option<String>,
    event_sink: Arc<dyn EventSink>,
}

impl RunConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scheduler: Arc::new(UnboundedPool::new()),
            timeout: None,
            correlation_id: None,
            event_sink: Arc::new(NoOpEventSink),
        }
    }

    /// Creates a configuration running on the given scheduler.
    #[must_use]
    pub fn on(scheduler: Arc<dyn Scheduler>) -> Self {
        Self::new().with_scheduler(scheduler)
    }

    /// Selects the scheduler.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Bounds the time from batch start to aggregate resolution.
    ///
    /// Ignored by stream runs, which have no overall deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the correlation id used in logs and events.
    ///
    /// Blank values are treated as unset and replaced by a generated token.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Installs an event sink.
    #[must_use]
    pub fn with_event_sink(mut self, event_sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    /// The selected scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }

    /// The configured timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The installed event sink.
    #[must_use]
    pub fn event_sink(&self) -> &Arc<dyn EventSink> {
        &self.event_sink
    }

    /// The effective correlation token for a run.
    ///
    /// Returns the configured id, or a generated token when the id is unset
    /// or blank.
    #[must_use]
    pub fn correlation_token(&self) -> String {
        match &self.correlation_id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => correlation_token(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("scheduler", &self.scheduler.name())
            .field("timeout", &self.timeout)
            .field("correlation_id", &self.correlation_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Inline;

    #[test]
    fn defaults_use_unbounded_pool() {
        let config = RunConfig::new();
        assert_eq!(config.scheduler().name(), "unbounded-pool");
        assert!(config.timeout().is_none());
    }

    #[test]
    fn builder_overrides() {
        let config = RunConfig::on(Arc::new(Inline::new()))
            .with_timeout(Duration::from_secs(5))
            .with_correlation_id("ingest-42");

        assert_eq!(config.scheduler().name(), "inline");
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.correlation_token(), "ingest-42");
    }

    #[test]
    fn blank_correlation_id_is_replaced() {
        let config = RunConfig::new().with_correlation_id("   ");
        let token = config.correlation_token();
        assert!(!token.trim().is_empty());
        assert_ne!(token, "   ");
    }

    #[test]
    fn unset_correlation_id_generates_fresh_tokens() {
        let config = RunConfig::new();
        assert_ne!(config.correlation_token(), config.correlation_token());
    }
}
