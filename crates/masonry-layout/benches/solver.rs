use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use masonry_layout::{solve_layout, ColumnSpec, LayoutStrategy, MeasurementCache};

fn populated_cache(count: u64) -> (Vec<u64>, MeasurementCache) {
    let mut cache = MeasurementCache::new();
    let keys: Vec<u64> = (0..count).collect();
    for &key in &keys {
        cache.set(key, 120.0 + ((key * 7919) % 400) as f32);
    }
    (keys, cache)
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_layout");
    let spec = ColumnSpec::new(228.0, 14.0, 3);
    for count in [1_000u64, 10_000, 100_000] {
        let (keys, cache) = populated_cache(count);
        for strategy in [LayoutStrategy::Basic, LayoutStrategy::UniformRow] {
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), count),
                &keys,
                |b, keys| {
                    b.iter(|| {
                        solve_layout(
                            black_box(keys),
                            &cache,
                            &spec,
                            strategy,
                            black_box(Some(1440.0)),
                        )
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_partially_measured(c: &mut Criterion) {
    let spec = ColumnSpec::new(228.0, 14.0, 3);
    let (keys, mut cache) = populated_cache(10_000);
    cache.retain_keys(|key| key % 3 != 0);
    c.bench_function("solve_layout_partially_measured_10k", |b| {
        b.iter(|| solve_layout(black_box(&keys), &cache, &spec, LayoutStrategy::Basic, Some(1440.0)))
    });
}

criterion_group!(benches, bench_solve, bench_partially_measured);
criterion_main!(benches);
