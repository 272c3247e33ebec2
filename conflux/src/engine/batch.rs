//! Batch execution: fan out pending sources, fan results back in.

use super::RunConfig;
use crate::core::PendingValue;
use crate::errors::{EngineError, Failure, ItemFailure};
use crate::events::{EngineEvent, EventSink};
use crate::scheduler::Scheduler;
use crate::utils::iso_timestamp;
use futures::FutureExt;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Phases of a single batch invocation, for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchPhase {
    Created,
    Dispatching,
    Aggregating,
    Resolved,
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            Self::Created => "created",
            Self::Dispatching => "dispatching",
            Self::Aggregating => "aggregating",
            Self::Resolved => "resolved",
        };
        f.write_str(phase)
    }
}

enum ItemOutcome<R> {
    Produced(Vec<R>),
    Dropped(ItemFailure),
}

/// Runs a batch of independently-pending sources through `transform`,
/// aggregating every produced item into one list.
///
/// Each source is dispatched onto the configured scheduler as its own unit
/// of work. A failing transform or a failed source drops that item's
/// contribution and the batch continues — only a timeout fails the call.
///
/// The aggregate flattens results in **completion order**; no relationship
/// to the order of `sources` is guaranteed, and callers must not rely on
/// one.
///
/// When the configured timeout expires the call fails with
/// [`EngineError::Timeout`], but work already admitted to the scheduler is
/// not cancelled; late results are discarded with the aggregation channel.
///
/// An empty `sources` list resolves immediately without touching the
/// scheduler.
pub async fn run_batch<T, R, F>(
    sources: Vec<PendingValue<T>>,
    transform: F,
    config: &RunConfig,
) -> Result<Vec<R>, EngineError>
where
    T: Clone + Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(T) -> Result<Vec<R>, anyhow::Error> + Send + Sync + 'static,
{
    let correlation_id = config.correlation_token();
    let expected = sources.len();
    let started = Instant::now();
    let scheduler = Arc::clone(config.scheduler());
    let sink = Arc::clone(config.event_sink());

    info!(
        correlation_id = %correlation_id,
        tasks = expected,
        scheduler = scheduler.name(),
        phase = %BatchPhase::Created,
        "batch received"
    );
    sink.emit(&EngineEvent::BatchStarted {
        correlation_id: correlation_id.clone(),
        tasks: expected,
        scheduler: scheduler.name().to_string(),
        at: iso_timestamp(),
    });

    // Degenerate batch: the dispatch phase is entered and immediately
    // exhausted without invoking the scheduler.
    if expected == 0 {
        debug!(correlation_id = %correlation_id, phase = %BatchPhase::Dispatching, "no sources");
        info!(correlation_id = %correlation_id, results = 0, phase = %BatchPhase::Resolved, "batch completed");
        sink.emit(&EngineEvent::BatchCompleted {
            correlation_id,
            results: 0,
            dropped: 0,
            elapsed_ms: 0,
        });
        return Ok(Vec::new());
    }

    let transform = Arc::new(transform);
    let (tx, mut rx) = mpsc::unbounded_channel::<ItemOutcome<R>>();
    let completed = Arc::new(AtomicUsize::new(0));

    // The driver runs detached so that an expired timeout abandons the
    // batch without cancelling admitted work or items still queued for
    // admission on a bounded pool.
    {
        let correlation_id = correlation_id.clone();
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move {
            debug!(
                correlation_id = %correlation_id,
                outstanding = expected,
                phase = %BatchPhase::Dispatching,
                "dispatching sources"
            );
            for (index, source) in sources.into_iter().enumerate() {
                let tx = tx.clone();
                let transform = Arc::clone(&transform);
                let correlation_id = correlation_id.clone();
                let work = async move {
                    let item_started = Instant::now();
                    let outcome = match source.resolve().await {
                        Ok(item) => match transform(item) {
                            Ok(produced) => ItemOutcome::Produced(produced),
                            Err(error) => {
                                ItemOutcome::Dropped(ItemFailure::Transform(Failure::from(error)))
                            }
                        },
                        Err(failure) => ItemOutcome::Dropped(ItemFailure::Source(failure)),
                    };
                    match &outcome {
                        ItemOutcome::Produced(produced) => debug!(
                            correlation_id = %correlation_id,
                            index,
                            produced = produced.len(),
                            elapsed_ms = item_started.elapsed().as_millis() as u64,
                            "item completed"
                        ),
                        ItemOutcome::Dropped(failure) => warn!(
                            correlation_id = %correlation_id,
                            index,
                            %failure,
                            "item dropped"
                        ),
                    }
                    let _ = tx.send(outcome);
                }
                .boxed();
                scheduler.dispatch(work).await.detach();
            }
        });
    }

    let aggregate = {
        let correlation_id = correlation_id.clone();
        let completed = Arc::clone(&completed);
        let sink = Arc::clone(&sink);
        async move {
            debug!(correlation_id = %correlation_id, phase = %BatchPhase::Aggregating, "collecting results");
            let mut results = Vec::new();
            let mut dropped = 0usize;
            while let Some(outcome) = rx.recv().await {
                completed.fetch_add(1, Ordering::SeqCst);
                match outcome {
                    ItemOutcome::Produced(mut produced) => {
                        sink.emit(&EngineEvent::BatchItemCompleted {
                            correlation_id: correlation_id.clone(),
                            produced: produced.len(),
                        });
                        results.append(&mut produced);
                    }
                    ItemOutcome::Dropped(failure) => {
                        dropped += 1;
                        sink.emit(&EngineEvent::BatchItemDropped {
                            correlation_id: correlation_id.clone(),
                            reason: failure.to_string(),
                        });
                    }
                }
            }
            (results, dropped)
        }
    };

    let (results, dropped) = match config.timeout() {
        Some(limit) => match tokio::time::timeout(limit, aggregate).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let finished = completed.load(Ordering::SeqCst);
                warn!(
                    correlation_id = %correlation_id,
                    completed = finished,
                    expected,
                    timeout_ms = limit.as_millis() as u64,
                    "batch timed out"
                );
                sink.emit(&EngineEvent::BatchTimedOut {
                    correlation_id: correlation_id.clone(),
                    completed: finished,
                    expected,
                });
                return Err(EngineError::Timeout {
                    correlation_id,
                    timeout: limit,
                    completed: finished,
                    expected,
                });
            }
        },
        None => aggregate.await,
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    info!(
        correlation_id = %correlation_id,
        results = results.len(),
        dropped,
        elapsed_ms,
        phase = %BatchPhase::Resolved,
        "batch completed"
    );
    sink.emit(&EngineEvent::BatchCompleted {
        correlation_id,
        results: results.len(),
        dropped,
        elapsed_ms,
    });
    Ok(results)
}

/// Single-output convenience over [`run_batch`].
///
/// Each source contributes exactly one transformed item; the isolation,
/// ordering, and timeout semantics are those of [`run_batch`].
pub async fn run_batch_map<T, R, F>(
    sources: Vec<PendingValue<T>>,
    transform: F,
    config: &RunConfig,
) -> Result<Vec<R>, EngineError>
where
    T: Clone + Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(T) -> Result<R, anyhow::Error> + Send + Sync + 'static,
{
    run_batch(
        sources,
        move |item| transform(item).map(|value| vec![value]),
        config,
    )
    .await
}
