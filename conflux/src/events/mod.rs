//! Engine observability events.
//!
//! Batch, stream, and pipeline execution report progress through an
//! [`EventSink`]. Emission is observability only: sinks cannot influence
//! execution, and the engine never awaits them.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use serde::Serialize;

/// A structured engine event.
///
/// All variants carry the correlation token (or pipeline run id) they belong
/// to; counts and elapsed times mirror what the engine logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A batch was received for processing.
    BatchStarted {
        /// Correlation token for this batch.
        correlation_id: String,
        /// Number of pending sources.
        tasks: usize,
        /// Name of the selected scheduler.
        scheduler: String,
        /// ISO-8601 start timestamp.
        at: String,
    },
    /// One batch item finished and contributed its output.
    BatchItemCompleted {
        /// Correlation token for this batch.
        correlation_id: String,
        /// Items the transform produced for this source.
        produced: usize,
    },
    /// One batch item was dropped (transform or source failure).
    BatchItemDropped {
        /// Correlation token for this batch.
        correlation_id: String,
        /// Failure description.
        reason: String,
    },
    /// The batch aggregate resolved successfully.
    BatchCompleted {
        /// Correlation token for this batch.
        correlation_id: String,
        /// Size of the aggregated result list.
        results: usize,
        /// Items dropped by per-item isolation.
        dropped: usize,
        /// Wall time from start to resolution.
        elapsed_ms: u64,
    },
    /// The batch failed to resolve within its timeout.
    BatchTimedOut {
        /// Correlation token for this batch.
        correlation_id: String,
        /// Items finished before expiry.
        completed: usize,
        /// Total items in the batch.
        expected: usize,
    },
    /// A stream item was dropped (transform failure).
    StreamItemDropped {
        /// Correlation token for this stream.
        correlation_id: String,
        /// Failure description.
        reason: String,
    },
    /// The upstream sequence failed; the stream terminated.
    StreamFailed {
        /// Correlation token for this stream.
        correlation_id: String,
        /// Failure description.
        reason: String,
    },
    /// A chain stage began executing.
    StageStarted {
        /// Pipeline run id.
        run_id: String,
        /// Stage index in registration order.
        stage: usize,
        /// Size of the stage's input list.
        inputs: usize,
    },
    /// A chain stage produced its output.
    StageCompleted {
        /// Pipeline run id.
        run_id: String,
        /// Stage index in registration order.
        stage: usize,
        /// Size of the stage's output list.
        produced: usize,
    },
    /// A chain stage failed; the run stopped short.
    ChainFailed {
        /// Pipeline run id.
        run_id: String,
        /// Index of the failing stage.
        stage: usize,
        /// Failure description.
        reason: String,
    },
    /// The whole chain resolved and delivered its aggregate.
    ChainCompleted {
        /// Pipeline run id.
        run_id: String,
        /// Number of stages executed.
        stages: usize,
        /// Size of the delivered aggregate.
        aggregate: usize,
        /// Wall time from start to delivery.
        elapsed_ms: u64,
    },
}

impl EngineEvent {
    /// Dotted event kind, stable across payload changes.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BatchStarted { .. } => "batch.started",
            Self::BatchItemCompleted { .. } => "batch.item_completed",
            Self::BatchItemDropped { .. } => "batch.item_dropped",
            Self::BatchCompleted { .. } => "batch.completed",
            Self::BatchTimedOut { .. } => "batch.timed_out",
            Self::StreamItemDropped { .. } => "stream.item_dropped",
            Self::StreamFailed { .. } => "stream.failed",
            Self::StageStarted { .. } => "stage.started",
            Self::StageCompleted { .. } => "stage.completed",
            Self::ChainFailed { .. } => "chain.failed",
            Self::ChainCompleted { .. } => "chain.completed",
        }
    }
}
