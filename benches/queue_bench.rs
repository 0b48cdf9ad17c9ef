//! Benchmarks for the order admission scheduler.
//!
//! Benchmarks cover:
//! - Admission queue selection (linear re-rank on every pick)
//! - Queue snapshots
//! - Manually driven scheduling cycles against the in-memory store

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;

use order_admission::builders::SchedulerBuilder;
use order_admission::config::SchedulerConfig;
use order_admission::core::{AdmissionQueue, CustomerRef, OrderRequest, ProductRef, Tier};
use order_admission::infra::InMemoryStore;
use order_admission::util::{Clock, ManualClock};

const T0: u128 = 1_700_000_000_000;

// ============================================================================
// Helper Functions
// ============================================================================

fn build_request(id: u64, enqueued_at_ms: u128) -> OrderRequest {
    OrderRequest::new(
        CustomerRef {
            id: id % 10 + 1,
            name: format!("customer-{}", id % 10),
            tier: if id % 3 == 0 {
                Tier::Premium
            } else {
                Tier::Standard
            },
        },
        ProductRef {
            id: 1,
            name: "Sneakers".into(),
            unit_price: 1.0,
        },
        1,
        enqueued_at_ms,
    )
    .expect("valid bench request")
}

fn filled_queue(size: u64) -> AdmissionQueue {
    let queue = AdmissionQueue::new();
    for i in 0..size {
        queue.enqueue(build_request(i, T0 + u128::from(i) * 37));
    }
    queue
}

// ============================================================================
// Queue Benchmarks
// ============================================================================

fn bench_select_highest_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("admission_select_highest_drain");

    for size in [100u64, 1_000, 5_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || filled_queue(size),
                |queue| {
                    let now = T0 + 60_000;
                    while let Some(request) = queue.select_highest(now) {
                        black_box(request);
                    }
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("admission_snapshot");

    for size in [100u64, 1_000, 10_000] {
        let queue = filled_queue(size);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(queue.snapshot(T0 + 60_000)));
        });
    }
    group.finish();
}

// ============================================================================
// Scheduler Benchmarks
// ============================================================================

fn bench_process_cycle(c: &mut Criterion) {
    let store = Arc::new(InMemoryStore::new());
    for i in 0..10 {
        store.add_customer(format!("customer-{i}"), 1e12, Tier::Standard, 0.0);
    }
    store.insert_product("Sneakers", u32::MAX, 1.0, "Shoes");
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let scheduler = SchedulerBuilder::new(Arc::clone(&store))
        .config(
            SchedulerConfig::default()
                .with_work_latency_ms(0)
                .with_promotion_threshold(f64::MAX),
        )
        .clock(Arc::clone(&clock) as Arc<dyn Clock>)
        .build()
        .expect("valid bench config");

    let mut next_id = 0u64;
    c.bench_function("scheduler_process_cycle", |b| {
        b.iter(|| {
            scheduler.enqueue(build_request(next_id, clock.now_ms()));
            next_id += 1;
            black_box(scheduler.process_next());
        });
    });
}

criterion_group!(queue_benches, bench_select_highest_drain, bench_snapshot);
criterion_group!(scheduler_benches, bench_process_cycle);
criterion_main!(queue_benches, scheduler_benches);
