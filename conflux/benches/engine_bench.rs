//! Benchmarks for batch execution.

use conflux::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn batch_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");

    c.bench_function("run_batch_ready_16", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let sources: Vec<PendingValue<u64>> =
                    (0..16).map(PendingValue::ready).collect();
                let config = RunConfig::new();
                let results = run_batch(sources, |n| Ok(vec![n * 2]), &config)
                    .await
                    .expect("batch");
                black_box(results)
            })
        })
    });
}

criterion_group!(benches, batch_benchmark);
criterion_main!(benches);
