use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use prime_cache::search::floor_search;
use prime_cache::segment::extend;
use prime_cache::sieve::sieve;
use prime_cache::PrimeCache;

// Helper to build a cache already holding every prime up to `bound`
fn make_cache(bound: u64) -> PrimeCache {
    let mut cache = PrimeCache::new();
    cache.prefill(bound).unwrap();
    cache
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Full Sieve");
    for n in [10_000i64, 100_000, 1_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(sieve(black_box(n))));
        });
    }
    group.finish();

    let mut group = c.benchmark_group("Segment Extension");
    let prefix = sieve(500_000);
    for n in [510_000u64, 600_000, 1_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(extend(black_box(n), &prefix)));
        });
    }
    group.finish();

    let mut group = c.benchmark_group("Cache Queries");

    // Hits: every bound is already inside the cached range
    group.bench_function("hit", |b| {
        let mut cache = make_cache(1_000_000);
        let mut n = 0i64;
        b.iter(|| {
            n = (n + 7_919) % 1_000_000;
            black_box(cache.query(black_box(n)).unwrap());
        });
    });

    // Extensions: the frontier creeps forward by a small step each time
    group.bench_function("extend", |b| {
        let mut cache = make_cache(100_000);
        let mut n = 100_000i64;
        b.iter(|| {
            n += 100;
            black_box(cache.query(black_box(n)).unwrap());
        });
    });

    // Same growing workload answered by a fresh sieve each time
    group.bench_function("one-shot", |b| {
        let mut n = 100_000i64;
        b.iter(|| {
            n += 100;
            black_box(sieve(black_box(n)));
        });
    });

    group.bench_function("floor_search", |b| {
        let primes = sieve(1_000_000);
        let mut target = 0u64;
        b.iter(|| {
            target = (target + 7_919) % 1_000_000;
            black_box(floor_search(black_box(target), &primes));
        });
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
