//! Multi-stage pipeline composition.
//!
//! A [`Pipeline`] holds an ordered list of stages and drives them in one of
//! two modes: chain mode collects each stage's full output before advancing
//! and delivers the accumulated aggregate; stream mode composes the stages
//! into one continuous sequence transformation.

#[cfg(test)]
mod integration_tests;

use crate::core::{PendingValue, Sequence};
use crate::errors::EngineError;
use crate::events::{EngineEvent, EventSink, NoOpEventSink};
use crate::utils::correlation_token;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

type ChainStageFn<T> = Box<dyn Fn(Vec<T>) -> PendingValue<Vec<T>> + Send + Sync>;
type StreamStageFn<T> = Box<dyn Fn(Sequence<T>) -> Sequence<T> + Send + Sync>;

/// Ephemeral state for one chain execution: the run id and the aggregate
/// accreted across stages.
struct PipelineRun<T> {
    run_id: String,
    aggregate: Vec<T>,
    started: Instant,
}

impl<T: Clone> PipelineRun<T> {
    fn new(correlation_id: Option<&str>, initial: &[T]) -> Self {
        let run_id = match correlation_id {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => correlation_token(),
        };
        Self {
            run_id,
            aggregate: initial.to_vec(),
            started: Instant::now(),
        }
    }

    fn absorb(&mut self, output: &[T]) {
        self.aggregate.extend_from_slice(output);
    }
}

/// An ordered list of stages over lists (chain mode) and sequences (stream
/// mode).
///
/// Stage registration performs no compatibility validation; wiring stages
/// whose outputs make sense as the next stage's inputs is the caller's
/// construction-time contract. The composer itself never retries: retry, if
/// wanted, belongs inside a stage.
pub struct Pipeline<T> {
    chain_stages: Vec<ChainStageFn<T>>,
    stream_stages: Vec<StreamStageFn<T>>,
    correlation_id: Option<String>,
    event_sink: Arc<dyn EventSink>,
}

impl<T> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("chain_stages", &self.chain_stages.len())
            .field("stream_stages", &self.stream_stages.len())
            .field("correlation_id", &self.correlation_id)
            .finish_non_exhaustive()
    }
}

impl<T> Default for Pipeline<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pipeline<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chain_stages: Vec::new(),
            stream_stages: Vec::new(),
            correlation_id: None,
            event_sink: Arc::new(NoOpEventSink),
        }
    }

    /// Appends a chain stage; stages run in registration order.
    #[must_use]
    pub fn add_chain_stage<F>(mut self, stage: F) -> Self
    where
        F: Fn(Vec<T>) -> PendingValue<Vec<T>> + Send + Sync + 'static,
    {
        self.chain_stages.push(Box::new(stage));
        self
    }

    /// Appends a stream stage; stages compose in registration order.
    #[must_use]
    pub fn add_stream_stage<F>(mut self, stage: F) -> Self
    where
        F: Fn(Sequence<T>) -> Sequence<T> + Send + Sync + 'static,
    {
        self.stream_stages.push(Box::new(stage));
        self
    }

    /// Fixes the run id used in logs and events for every execution.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Installs an event sink for stage lifecycle events.
    #[must_use]
    pub fn with_event_sink(mut self, event_sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    /// Number of registered chain stages.
    #[must_use]
    pub fn chain_stage_count(&self) -> usize {
        self.chain_stages.len()
    }

    /// Number of registered stream stages.
    #[must_use]
    pub fn stream_stage_count(&self) -> usize {
        self.stream_stages.len()
    }

    /// Runs the chain stages left to right and delivers the aggregate.
    ///
    /// Stage `i` receives stage `i-1`'s output (stage 0 receives
    /// `initial`), while the delivered aggregate is `initial` plus every
    /// stage's output, concatenated in stage order.
    ///
    /// The first stage failure fails the whole chain with
    /// [`EngineError::StageChain`]; later stages are never invoked.
    pub async fn execute_chain(&self, initial: Vec<T>) -> Result<Vec<T>, EngineError> {
        let mut run = PipelineRun::new(self.correlation_id.as_deref(), &initial);
        info!(
            run_id = %run.run_id,
            stages = self.chain_stages.len(),
            initial = initial.len(),
            "chain started"
        );

        let mut current = initial;
        for (index, stage) in self.chain_stages.iter().enumerate() {
            self.event_sink.emit(&EngineEvent::StageStarted {
                run_id: run.run_id.clone(),
                stage: index,
                inputs: current.len(),
            });
            let output = match stage(current).resolve().await {
                Ok(output) => output,
                Err(failure) => {
                    warn!(run_id = %run.run_id, stage = index, %failure, "chain stage failed");
                    self.event_sink.emit(&EngineEvent::ChainFailed {
                        run_id: run.run_id.clone(),
                        stage: index,
                        reason: failure.to_string(),
                    });
                    return Err(EngineError::StageChain {
                        stage: index,
                        source: failure,
                    });
                }
            };
            debug!(
                run_id = %run.run_id,
                stage = index,
                produced = output.len(),
                "chain stage completed"
            );
            self.event_sink.emit(&EngineEvent::StageCompleted {
                run_id: run.run_id.clone(),
                stage: index,
                produced: output.len(),
            });
            run.absorb(&output);
            current = output;
        }

        let elapsed_ms = run.started.elapsed().as_millis() as u64;
        info!(
            run_id = %run.run_id,
            aggregate = run.aggregate.len(),
            elapsed_ms,
            "chain completed"
        );
        self.event_sink.emit(&EngineEvent::ChainCompleted {
            run_id: run.run_id.clone(),
            stages: self.chain_stages.len(),
            aggregate: run.aggregate.len(),
            elapsed_ms,
        });
        Ok(run.aggregate)
    }

    /// Composes the stream stages over `input` and returns the resulting
    /// sequence.
    ///
    /// Stages may drop, filter, or buffer items. There is no per-stage
    /// isolation here: a failure of any intermediate sequence propagates to
    /// the returned sequence and terminates it. Isolation, where wanted, is
    /// the business of stages built on [`crate::engine::run_stream`].
    #[must_use]
    pub fn execute_stream(&self, input: Sequence<T>) -> Sequence<T> {
        let run_id = match &self.correlation_id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => correlation_token(),
        };
        debug!(
            run_id = %run_id,
            stages = self.stream_stages.len(),
            "stream pipeline composed"
        );
        let mut current = input;
        for stage in &self.stream_stages {
            current = stage(current);
        }
        current
    }
}
