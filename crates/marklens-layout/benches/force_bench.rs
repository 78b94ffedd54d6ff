//! Benchmarks for the force-directed layout.
//!
//! Run with: cargo bench -p marklens-layout --bench force_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use marklens_core::{BookmarkRecord, Dataset};
use marklens_layout::{Canvas, ForceParams, ForceSimulation, GraphModel};
use std::hint::black_box;

fn dataset(categories: usize, per_category: usize) -> Dataset {
    let mut records = Vec::with_capacity(categories * per_category);
    for c in 0..categories {
        for i in 0..per_category {
            records.push(BookmarkRecord::new(
                format!("bookmark {c}/{i}"),
                format!("https://c{c}.example/{i}"),
                format!("c{c}.example"),
                format!("Category {c}"),
            ));
        }
    }
    Dataset::from_records(records)
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("force/tick");

    for categories in [5, 20, 40] {
        let graph = GraphModel::from_dataset(&dataset(categories, 10), 3);
        group.throughput(Throughput::Elements(graph.nodes().len() as u64));
        let sim = ForceSimulation::new(graph, Canvas::default(), ForceParams::default());
        group.bench_with_input(
            BenchmarkId::new("single", categories),
            &sim,
            |b, sim| {
                b.iter_batched(
                    || sim.clone(),
                    |mut s| {
                        s.tick();
                        black_box(s)
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

fn bench_settle(c: &mut Criterion) {
    let mut group = c.benchmark_group("force/settle");
    group.sample_size(20);

    for categories in [5, 20] {
        let ds = dataset(categories, 10);
        group.bench_with_input(BenchmarkId::new("run", categories), &ds, |b, ds| {
            b.iter(|| {
                let graph = GraphModel::from_dataset(ds, 3);
                let mut s = ForceSimulation::new(graph, Canvas::default(), ForceParams::default());
                black_box(s.run(1000))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tick, bench_settle);
criterion_main!(benches);
