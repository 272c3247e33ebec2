//! Stream execution: continuous per-item mapping with isolation.

use super::RunConfig;
use crate::core::Sequence;
use crate::events::{EngineEvent, EventSink};
use crate::scheduler::Scheduler;
use futures::FutureExt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Maps every item of `source` through `transform`, emitting results as a
/// new sequence.
///
/// Items are dispatched onto the configured scheduler as they arrive, so
/// concurrency — and therefore output ordering — is bounded only by the
/// scheduler itself. `transform` is invoked at most once per source item.
///
/// A failing transform drops that item (logged as a warning); the sequence
/// continues. Only a failure of `source` itself terminates the output
/// sequence, forwarding the original cause downstream. Results still in
/// flight at that point are discarded by the terminated consumer.
pub fn run_stream<T, R, F>(source: Sequence<T>, transform: F, config: &RunConfig) -> Sequence<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Result<R, anyhow::Error> + Send + Sync + 'static,
{
    let correlation_id = config.correlation_token();
    let scheduler = Arc::clone(config.scheduler());
    let sink = Arc::clone(config.event_sink());
    let transform = Arc::new(transform);
    let (sender, output) = Sequence::channel();

    tokio::spawn(async move {
        let mut upstream = source;
        debug!(
            correlation_id = %correlation_id,
            scheduler = scheduler.name(),
            "stream started"
        );
        while let Some(entry) = upstream.next().await {
            match entry {
                Ok(item) => {
                    let sender = sender.clone();
                    let transform = Arc::clone(&transform);
                    let correlation_id = correlation_id.clone();
                    let sink = Arc::clone(&sink);
                    let work = async move {
                        match transform(item) {
                            Ok(result) => {
                                sender.emit(result);
                            }
                            Err(error) => {
                                warn!(
                                    correlation_id = %correlation_id,
                                    %error,
                                    "stream item dropped"
                                );
                                sink.emit(&EngineEvent::StreamItemDropped {
                                    correlation_id,
                                    reason: error.to_string(),
                                });
                            }
                        }
                    }
                    .boxed();
                    scheduler.dispatch(work).await.detach();
                }
                Err(failure) => {
                    warn!(correlation_id = %correlation_id, %failure, "upstream sequence failed");
                    sink.emit(&EngineEvent::StreamFailed {
                        correlation_id: correlation_id.clone(),
                        reason: failure.to_string(),
                    });
                    sender.fail(failure);
                    break;
                }
            }
        }
    });

    output
}
