//! Criterion micro-benchmarks for buffer construction, copy, resize, and comparison.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use tessel_bench::{random_values, reference_buffer, resize_schedule, REFERENCE_LEN};
use tessel_buffer::DynamicBuffer;
use tessel_test_utils::TrackingAlloc;

/// Benchmark: Build a 10K-element buffer from a slice.
fn bench_from_slice_10k(c: &mut Criterion) {
    let values = random_values(REFERENCE_LEN, 1);
    c.bench_function("from_slice_10k", |b| {
        b.iter(|| {
            let buffer = DynamicBuffer::from_slice(black_box(&values)).unwrap();
            black_box(buffer);
        });
    });
}

/// Benchmark: Default-construct 10K elements.
fn bench_with_len_10k(c: &mut Criterion) {
    c.bench_function("with_len_10k", |b| {
        b.iter(|| {
            let buffer: DynamicBuffer<u64> =
                DynamicBuffer::with_len(black_box(REFERENCE_LEN)).unwrap();
            black_box(buffer);
        });
    });
}

/// Benchmark: Fill 10K raw slots through the uninitialized builder.
fn bench_uninit_fill_10k(c: &mut Criterion) {
    c.bench_function("uninit_fill_10k", |b| {
        b.iter(|| {
            let mut slots = DynamicBuffer::uninit(black_box(REFERENCE_LEN)).unwrap();
            slots.fill_with(|i| i as u64);
            black_box(slots.finish().unwrap());
        });
    });
}

/// Benchmark: Clone a 10K-element buffer.
fn bench_clone_10k(c: &mut Criterion) {
    let buffer = reference_buffer(2);
    c.bench_function("clone_10k", |b| {
        b.iter(|| black_box(buffer.clone()));
    });
}

/// Benchmark: Take the block out of a buffer (O(1) regardless of length).
fn bench_take_10k(c: &mut Criterion) {
    c.bench_function("take_10k", |b| {
        b.iter_batched(
            || reference_buffer(3),
            |mut buffer| black_box(buffer.take()),
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark: Follow a seeded grow/shrink schedule; every step reallocates.
fn bench_resize_schedule(c: &mut Criterion) {
    let schedule = resize_schedule(64, REFERENCE_LEN, 4);
    c.bench_function("resize_schedule_64", |b| {
        b.iter(|| {
            let mut buffer: DynamicBuffer<u64> = DynamicBuffer::new();
            for &n in &schedule {
                buffer.resize(n).unwrap();
            }
            black_box(buffer.len());
        });
    });
}

/// Benchmark: Same schedule through an instrumented policy.
fn bench_resize_schedule_tracked(c: &mut Criterion) {
    let schedule = resize_schedule(64, REFERENCE_LEN, 4);
    c.bench_function("resize_schedule_64_tracked", |b| {
        b.iter(|| {
            let alloc = TrackingAlloc::new();
            let mut buffer: DynamicBuffer<u64, _> = DynamicBuffer::new_in(alloc.clone());
            for &n in &schedule {
                buffer.resize(n).unwrap();
            }
            black_box(alloc.ledger().allocations());
        });
    });
}

/// Benchmark: Equal-length comparison that must scan every element.
fn bench_compare_equal_10k(c: &mut Criterion) {
    let left = reference_buffer(5);
    let right = left.clone();
    c.bench_function("compare_equal_10k", |b| {
        b.iter(|| black_box(black_box(&left).partial_cmp(black_box(&right))));
    });
}

criterion_group!(
    benches,
    bench_from_slice_10k,
    bench_with_len_10k,
    bench_uninit_fill_10k,
    bench_clone_10k,
    bench_take_10k,
    bench_resize_schedule,
    bench_resize_schedule_tracked,
    bench_compare_equal_10k,
);
criterion_main!(benches);
