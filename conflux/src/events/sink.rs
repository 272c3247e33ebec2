//! Event sink trait and implementations.

use super::EngineEvent;
use tracing::info;

/// Receives engine events.
///
/// Sinks must never block the engine; emission is synchronous and errors are
/// the sink's own problem to swallow.
pub trait EventSink: Send + Sync {
    /// Accepts one event.
    fn emit(&self, event: &EngineEvent);
}

/// Discards every event. The default when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event: &EngineEvent) {}
}

/// Forwards events to the `tracing` subscriber as structured records.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

impl LoggingEventSink {
    /// Creates a logging sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LoggingEventSink {
    fn emit(&self, event: &EngineEvent) {
        let payload = serde_json::to_value(event).unwrap_or_default();
        info!(kind = event.kind(), %payload, "engine event");
    }
}

/// Buffers events for inspection. Test support.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<EngineEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events seen so far.
    #[must_use]
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.read().clone()
    }

    /// Events whose kind starts with `prefix` (e.g. `"batch."`).
    #[must_use]
    pub fn of_kind(&self, prefix: &str) -> Vec<EngineEvent> {
        self.events
            .read()
            .iter()
            .filter(|event| event.kind().starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events were seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Drops all buffered events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, event: &EngineEvent) {
        self.events.write().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dropped(id: &str) -> EngineEvent {
        EngineEvent::BatchItemDropped {
            correlation_id: id.to_string(),
            reason: "boom".to_string(),
        }
    }

    #[test]
    fn noop_discards() {
        NoOpEventSink.emit(&dropped("c-1"));
    }

    #[test]
    fn logging_sink_does_not_panic() {
        LoggingEventSink::new().emit(&dropped("c-2"));
    }

    #[test]
    fn collecting_sink_buffers_and_filters() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit(&dropped("c-3"));
        sink.emit(&EngineEvent::StageStarted {
            run_id: "r-1".to_string(),
            stage: 0,
            inputs: 2,
        });

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.of_kind("batch.").len(), 1);
        assert_eq!(sink.of_kind("stage.").len(), 1);

        sink.clear();
        assert!(sink.is_empty());
    }
}
