//! Single-item query benchmarks
//!
//! # Test Scenarios
//!
//! 1. **Hit vs Miss**: lookups of stored and absent keys, per filter type
//! 2. **By Load Factor**: quotient filter lookups as clusters grow
//! 3. **Chain Length**: scalable cuckoo lookups scan every sub-filter
//!
//! Miss queries also report the measured false positive rate once per setup.

use amqcraft::{AmqFilter, CountingFilter, CuckooFilter, QuotientFilter, ScalableCuckooFilter};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

mod common;
use common::*;

fn fill(filter: &mut dyn AmqFilter, items: &[String]) {
    for item in items {
        let _ = filter.try_insert(item.as_bytes());
    }
}

// BENCHMARK 1: Hit vs Miss

fn bench_query_hit_vs_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_hit_vs_miss");
    let size = 10_000;
    let (inserted, absent) = create_disjoint_sets(size, 32);

    let mut filters: Vec<Box<dyn AmqFilter>> = vec![
        Box::new(QuotientFilter::new_for_capacity(size, 0.01).unwrap()),
        Box::new(CuckooFilter::new(size)),
        Box::new(ScalableCuckooFilter::with_capacity(size / 8)),
        Box::new(CountingFilter::new_for_capacity(size).unwrap()),
    ];

    for filter in &mut filters {
        fill(filter.as_mut(), &inserted);

        let misses: Vec<bool> = absent.iter().map(|k| filter.contains(k.as_bytes())).collect();
        eprintln!("{}: measured fpr {:.5}", filter.name(), measure_fpr(&misses));

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::new(filter.name(), "hit"), |b| {
            b.iter(|| {
                for item in &inserted {
                    black_box(filter.contains(black_box(item.as_bytes())));
                }
            });
        });
        group.bench_function(BenchmarkId::new(filter.name(), "miss"), |b| {
            b.iter(|| {
                for item in &absent {
                    black_box(filter.contains(black_box(item.as_bytes())));
                }
            });
        });
    }

    group.finish();
}

// BENCHMARK 2: Quotient Query by Load Factor

fn bench_quotient_query_by_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("quotient_query_by_load");
    let q_bits = 14;
    let capacity = 1usize << q_bits;
    let items = generate_strings(capacity, 32);
    let probe = generate_strings(1_000, 32);

    for &load in LOAD_FACTORS {
        let mut filter = QuotientFilter::new(q_bits, 10).unwrap();
        for item in &items[..capacity * load / 100] {
            let _ = filter.add(item);
        }

        group.throughput(Throughput::Elements(probe.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(load), &load, |b, _| {
            b.iter(|| {
                for item in &probe {
                    black_box(filter.contains(black_box(item)));
                }
            });
        });
    }

    group.finish();
}

// BENCHMARK 3: Scalable Chain Length

fn bench_scalable_chain_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalable_query_by_chain");
    let items = generate_u64s(50_000);
    let probe: Vec<[u8; 8]> = generate_u64s(1_000).iter().map(|v| v.to_le_bytes()).collect();

    for &initial in &[50_000usize, 5_000, 500] {
        let mut filter = ScalableCuckooFilter::with_capacity(initial);
        for item in &items {
            filter.insert(&item.to_le_bytes());
        }

        group.throughput(Throughput::Elements(probe.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(filter.filter_count()),
            &filter,
            |b, filter| {
                b.iter(|| {
                    for item in &probe {
                        black_box(filter.lookup(black_box(item)));
                    }
                });
            },
        );
    }

    group.finish();
}

// CRITERION CONFIGURATION

criterion_group!(
    benches,
    bench_query_hit_vs_miss,
    bench_quotient_query_by_load,
    bench_scalable_chain_length,
);

criterion_main!(benches);
