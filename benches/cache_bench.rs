//! Benchmarks for the cache.
//!
//! Run with: cargo bench

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use lru_ttl_cache::Cache;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(300);

fn populated(max_size: usize, ttl: Duration, count: u64) -> Cache<u64, u64> {
    let cache = Cache::new(max_size, ttl).expect("valid config");
    for i in 0..count {
        cache.put(i, i);
    }
    cache
}

/// Reads that promote, and puts that refresh, on a cache that never evicts.
fn bench_recency(c: &mut Criterion) {
    let mut group = c.benchmark_group("recency");

    let cache = populated(10_000, TTL, 10_000);

    // Stride through the keys so every read moves a different slot to the tail.
    group.bench_function("get_promotes", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(cache.get(&((i * 7919) % 10_000)));
            i += 1;
        });
    });

    group.bench_function("contains_no_promotion", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(cache.contains(&((i * 7919) % 10_000)));
            i += 1;
        });
    });

    group.bench_function("put_refreshes", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(cache.put(i % 10_000, i));
            i += 1;
        });
    });

    group.finish();
}

/// Capacity pressure: every put evicts, with and without an eviction hook.
fn bench_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("eviction");

    for max_size in [64usize, 4096] {
        // Keep the oldest key hot so the victim is always the second oldest.
        group.bench_with_input(
            BenchmarkId::new("promote_then_evict", max_size),
            &max_size,
            |b, &max_size| {
                let cache = populated(max_size, TTL, max_size as u64);
                let mut next = max_size as u64;
                b.iter(|| {
                    black_box(cache.get(&0));
                    black_box(cache.put(next, next));
                    next += 1;
                });
            },
        );
    }

    group.bench_function("evict_with_hook", |b| {
        let cache: Cache<u64, u64> = Cache::builder()
            .max_size(1024)
            .ttl(TTL)
            .on_evict(|key: &u64, value: &u64| {
                black_box((key, value));
            })
            .build()
            .expect("valid config");
        let mut next = 0u64;
        b.iter(|| {
            cache.put(next, next);
            next += 1;
        });
    });

    group.bench_function("evict_lru_drain", |b| {
        b.iter_batched(
            || populated(1024, TTL, 1024),
            |cache| while black_box(cache.evict_lru()).is_some() {},
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Lazy expiry: reads that find a stale entry remove it and fire the hook.
fn bench_expiry(c: &mut Criterion) {
    let mut group = c.benchmark_group("expiry");
    let ttl = Duration::from_millis(1);

    group.bench_function("get_expired", |b| {
        b.iter_batched(
            || {
                let cache = populated(1024, ttl, 1024);
                thread::sleep(Duration::from_millis(2));
                cache
            },
            |cache| {
                for i in 0..1024u64 {
                    black_box(cache.get(&i));
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("with_cache_recompute_stale", |b| {
        b.iter_batched(
            || {
                let cache = populated(1024, ttl, 1024);
                thread::sleep(Duration::from_millis(2));
                cache
            },
            |cache| {
                for i in 0..1024u64 {
                    black_box(cache.with_cache(i, || Some(i + 1)));
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Compute-on-miss, memoized and under contention on a few keys.
fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute");

    let cache: Cache<u64, u64> = Cache::new(1024, TTL).expect("valid config");
    group.bench_function("with_cache_memoized", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = i % 1024;
            black_box(cache.with_cache(key, || Some(key * key)));
            i += 1;
        });
    });

    for num_threads in [2usize, 4, 8] {
        group.throughput(Throughput::Elements(num_threads as u64 * 16));
        group.bench_with_input(
            BenchmarkId::new("single_flight_contended", num_threads),
            &num_threads,
            |b, &num_threads| {
                b.iter_batched(
                    || Cache::<u64, u64>::new(64, TTL).expect("valid config"),
                    |cache| {
                        let barrier = Arc::new(Barrier::new(num_threads));
                        let handles: Vec<_> = (0..num_threads)
                            .map(|_| {
                                let cache = cache.clone();
                                let barrier = Arc::clone(&barrier);
                                thread::spawn(move || {
                                    barrier.wait();
                                    for key in 0..16u64 {
                                        black_box(cache.with_cache_single_flight(key, || {
                                            thread::sleep(Duration::from_micros(50));
                                            Some(key)
                                        }));
                                    }
                                })
                            })
                            .collect();

                        for handle in handles {
                            handle.join().unwrap();
                        }
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_recency,
    bench_eviction,
    bench_expiry,
    bench_compute,
);
criterion_main!(benches);
