//! End-to-end tests wiring engine-backed stages into pipelines.

use crate::core::{PendingValue, Sequence};
use crate::engine::{run_batch, run_stream, RunConfig};
use crate::errors::Failure;
use crate::pipeline::Pipeline;
use crate::testing::{delayed_value, failing_value, ready_values, CallCounter};
use std::time::Duration;

#[tokio::test]
async fn chain_of_engine_batches_aggregates_across_stages() {
    let config = RunConfig::new().with_timeout(Duration::from_secs(2));

    let stage_one_config = config.clone();
    let stage_two_config = config.clone();
    let pipeline = Pipeline::new()
        .add_chain_stage(move |_input: Vec<String>| {
            let config = stage_one_config.clone();
            PendingValue::new(async move {
                run_batch(
                    ready_values(vec!["a".to_string()]),
                    |item: String| Ok(vec![format!("{item}1")]),
                    &config,
                )
                .await
                .map_err(Failure::new)
            })
        })
        .add_chain_stage(move |_input: Vec<String>| {
            let config = stage_two_config.clone();
            PendingValue::new(async move {
                run_batch(
                    ready_values(vec!["b".to_string()]),
                    |item: String| Ok(vec![format!("{item}2")]),
                    &config,
                )
                .await
                .map_err(Failure::new)
            })
        });

    let aggregate = pipeline.execute_chain(Vec::new()).await.unwrap();
    assert!(aggregate.contains(&"a1".to_string()));
    assert!(aggregate.contains(&"b2".to_string()));
}

#[tokio::test]
async fn chain_stage_excludes_failed_sources_but_still_succeeds() {
    let pipeline = Pipeline::new().add_chain_stage(|_input: Vec<String>| {
        let config = RunConfig::new();
        PendingValue::new(async move {
            let batch = vec![
                failing_value::<String>("upstream fetch failed"),
                PendingValue::ready("pear".to_string()),
            ];
            run_batch(
                batch,
                |item: String| Ok(vec![item.to_uppercase()]),
                &config,
            )
            .await
            .map_err(Failure::new)
        })
    });

    let aggregate = pipeline.execute_chain(Vec::new()).await.unwrap();
    assert_eq!(aggregate, vec!["PEAR".to_string()]);
}

#[tokio::test]
async fn chain_stage_timeout_fails_the_whole_chain() {
    let later_stage_calls = CallCounter::new();
    let observer = later_stage_calls.clone();

    let pipeline = Pipeline::new()
        .add_chain_stage(|_input: Vec<String>| {
            let config = RunConfig::new().with_timeout(Duration::from_millis(10));
            PendingValue::new(async move {
                let batch = vec![delayed_value("slow".to_string(), Duration::from_millis(200))];
                run_batch(batch, |item: String| Ok(vec![item]), &config)
                    .await
                    .map_err(Failure::new)
            })
        })
        .add_chain_stage(move |input: Vec<String>| {
            observer.bump();
            PendingValue::ready(input)
        });

    let error = pipeline.execute_chain(Vec::new()).await.unwrap_err();
    assert!(error.is_stage_chain());
    assert!(error.to_string().contains("timed out"));
    assert_eq!(later_stage_calls.count(), 0);
}

#[tokio::test]
async fn stream_pipeline_runs_engine_stages_back_to_back() {
    let trim_config = RunConfig::new();
    let upper_config = RunConfig::new();

    let pipeline = Pipeline::new()
        .add_stream_stage(move |_input: Sequence<String>| {
            // Ignores its input and feeds merged source responses, like an
            // ingest stage at the head of a pipeline.
            let merged = Sequence::merge(ready_values(vec![
                "   apple   ".to_string(),
                "banana ".to_string(),
                "   cherry".to_string(),
            ]));
            run_stream(
                merged,
                |item: String| Ok(item.trim().to_string()),
                &trim_config,
            )
        })
        .add_stream_stage(move |input: Sequence<String>| {
            run_stream(input, |item: String| Ok(item.to_uppercase()), &upper_config)
        });

    let output = pipeline.execute_stream(Sequence::empty());
    let mut items = output.collect().await.unwrap();
    items.sort();
    assert_eq!(
        items,
        vec![
            "APPLE".to_string(),
            "BANANA".to_string(),
            "CHERRY".to_string()
        ]
    );
}

#[tokio::test]
async fn stream_pipeline_keeps_going_past_item_failures() {
    let config = RunConfig::new();
    let pipeline = Pipeline::new().add_stream_stage(move |input: Sequence<String>| {
        run_stream(
            input,
            |item: String| {
                if item == "bad" {
                    anyhow::bail!("cannot process");
                }
                Ok(format!("{item}_ok"))
            },
            &config,
        )
    });

    let output = pipeline.execute_stream(Sequence::from_items(vec![
        "good".to_string(),
        "bad".to_string(),
    ]));
    let items = output.collect().await.unwrap();
    assert_eq!(items, vec!["good_ok".to_string()]);
}
