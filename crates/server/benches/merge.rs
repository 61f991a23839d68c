//! Benchmarks for the positional merge step
//!
//! Run with: cargo bench --package server

use catalog_types::{CatalogError, Item, Rating};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use server::{FailurePolicy, merge_positional};

fn build_inputs(len: usize, failing_every: usize) -> (Vec<Rating>, Vec<Result<Item, CatalogError>>) {
    let ratings: Vec<Rating> = (0..len)
        .map(|i| Rating::new(format!("m{i}"), (i % 5) as i32 + 1))
        .collect();
    let lookups = (0..len)
        .map(|i| {
            if failing_every > 0 && i % failing_every == 0 {
                Err(CatalogError::unavailable("MOVIE-INFO-SERVICE", "timed out"))
            } else {
                Ok(Item::new(format!("m{i}"), format!("Title {i}")))
            }
        })
        .collect();
    (ratings, lookups)
}

fn bench_merge_all_found(c: &mut Criterion) {
    let (ratings, lookups) = build_inputs(500, 0);

    c.bench_function("merge_positional_500_fail_fast", |b| {
        b.iter(|| {
            let catalog = merge_positional(
                black_box(&ratings),
                black_box(lookups.clone()),
                FailurePolicy::FailFast,
            );
            black_box(catalog)
        })
    });
}

fn bench_merge_with_placeholders(c: &mut Criterion) {
    let (ratings, lookups) = build_inputs(500, 7);

    c.bench_function("merge_positional_500_placeholder", |b| {
        b.iter(|| {
            let catalog = merge_positional(
                black_box(&ratings),
                black_box(lookups.clone()),
                FailurePolicy::Placeholder,
            );
            black_box(catalog)
        })
    });
}

criterion_group!(benches, bench_merge_all_found, bench_merge_with_placeholders);
criterion_main!(benches);
