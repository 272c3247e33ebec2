//! Error types for the conflux engine.
//!
//! The taxonomy separates item-level failures, which are always recovered
//! locally (logged and dropped), from the three fatal classes that surface
//! to callers: batch timeout, chain stage failure, and stream terminal
//! failure.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// A cloneable, shareable failure cause.
///
/// Pending values and sequences can be observed by multiple subscribers, so
/// their terminal error must be cheap to clone. `Failure` wraps the original
/// error behind an `Arc` and preserves it as the error source.
#[derive(Clone)]
pub struct Failure {
    inner: Arc<dyn std::error::Error + Send + Sync + 'static>,
}

impl Failure {
    /// Wraps a concrete error.
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(error),
        }
    }

    /// Creates a failure from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(MessageError(message.into())),
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(error: anyhow::Error) -> Self {
        let boxed: Box<dyn std::error::Error + Send + Sync + 'static> = error.into();
        Self {
            inner: Arc::from(boxed),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Failure").field(&self.inner).finish()
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MessageError {}

/// A failure confined to a single item of a batch or stream.
///
/// Item failures never surface as the operation's own error: the item simply
/// contributes nothing (batch) or is dropped (stream). They are reported
/// through logs and event sinks only.
#[derive(Debug, Clone, Error)]
pub enum ItemFailure {
    /// The caller-supplied transform failed for this item.
    #[error("item transform failed: {0}")]
    Transform(#[source] Failure),

    /// The pending source failed before reaching the transform.
    #[error("pending source failed: {0}")]
    Source(#[source] Failure),
}

impl ItemFailure {
    /// Returns the underlying cause.
    #[must_use]
    pub fn cause(&self) -> &Failure {
        match self {
            Self::Transform(failure) | Self::Source(failure) => failure,
        }
    }
}

/// Fatal errors surfaced by batch and pipeline execution.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The batch did not resolve within the configured duration.
    ///
    /// Work already admitted to a scheduler keeps running; its late results
    /// are discarded.
    #[error(
        "batch '{correlation_id}' timed out after {timeout:?} with {completed} of {expected} tasks complete"
    )]
    Timeout {
        /// Correlation token of the timed-out batch.
        correlation_id: String,
        /// The configured limit.
        timeout: Duration,
        /// Items that finished (successfully or dropped) before expiry.
        completed: usize,
        /// Total items in the batch.
        expected: usize,
    },

    /// A chain stage's pending output failed; later stages never ran.
    #[error("chain stage {stage} failed: {source}")]
    StageChain {
        /// Zero-based index of the failing stage, in registration order.
        stage: usize,
        /// The stage's terminal failure.
        #[source]
        source: Failure,
    },

    /// An upstream sequence (not an individual item) failed.
    #[error("upstream sequence failed: {source}")]
    StreamTerminal {
        /// The sequence's terminal failure.
        #[source]
        source: Failure,
    },
}

impl EngineError {
    /// Returns true for the batch timeout class.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true for the chain stage failure class.
    #[must_use]
    pub fn is_stage_chain(&self) -> bool {
        matches!(self, Self::StageChain { .. })
    }

    /// Returns true for the stream terminal failure class.
    #[must_use]
    pub fn is_stream_terminal(&self) -> bool {
        matches!(self, Self::StreamTerminal { .. })
    }
}

impl From<Failure> for EngineError {
    fn from(source: Failure) -> Self {
        Self::StreamTerminal { source }
    }
}
