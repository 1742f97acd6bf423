//! Criterion micro-benchmarks for the bump path, the reuse path, and the
//! coalescer.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use heapward_arena::CursorPolicy;
use heapward_bench::{bench_heap, exhausted_heap, fragmented_heap, BENCH_CAPACITY};
use heapward_test_utils::{ChurnWorkload, Replay};

/// Benchmark: 1000 fresh 64-byte bump allocations.
fn bench_bump_1k(c: &mut Criterion) {
    c.bench_function("bump_1k", |b| {
        b.iter_batched(
            || bench_heap(BENCH_CAPACITY, CursorPolicy::Retain),
            |mut heap| {
                for _ in 0..1000 {
                    black_box(heap.allocate(64));
                }
                heap
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark: release then reallocate one block in an exhausted arena,
/// so every allocation goes through coalesce and first fit.
fn bench_reuse_after_exhaustion(c: &mut Criterion) {
    let (mut heap, live) = exhausted_heap(1 << 20, 256);
    let victim = live[live.len() / 2];
    c.bench_function("reuse_after_exhaustion", |b| {
        b.iter(|| {
            heap.release(Some(victim)).ok();
            black_box(heap.allocate(256));
        });
    });
}

/// Benchmark: first reuse on a heap of 4096 uncoalesced neighbours.
fn bench_coalesce_4k_regions(c: &mut Criterion) {
    c.bench_function("coalesce_4k_regions", |b| {
        b.iter_batched(
            || fragmented_heap(4096 * 64, 64),
            |mut heap| {
                black_box(heap.allocate(4096 * 64));
                heap
            },
            BatchSize::LargeInput,
        );
    });
}

/// Benchmark: 10K seeded churn ops on a 1 MiB arena, per cursor policy.
fn bench_seeded_churn(c: &mut Criterion) {
    let ops = ChurnWorkload::new(42, 4096, 45).ops(10_000);
    for (name, policy) in [
        ("churn_10k_retain", CursorPolicy::Retain),
        ("churn_10k_frontier", CursorPolicy::Frontier),
    ] {
        c.bench_function(name, |b| {
            b.iter_batched(
                || bench_heap(1 << 20, policy),
                |mut heap| {
                    let mut replay = Replay::new();
                    replay.run(&mut heap, &ops);
                    black_box(replay.successes);
                    heap
                },
                BatchSize::SmallInput,
            );
        });
    }
}

criterion_group!(
    benches,
    bench_bump_1k,
    bench_reuse_after_exhaustion,
    bench_coalesce_4k_regions,
    bench_seeded_churn
);
criterion_main!(benches);
