use banditsim::detect::{AnyDetector, ChangeDetector};
use banditsim::{toy_data, ToyConfig};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

fn bench_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_scan");

    for &horizon in &[500usize, 2_000usize] {
        // Stationary stream: every test scans the whole prefix without stopping early.
        let toy = ToyConfig {
            first_mean: 0.3,
            second_mean: 0.3,
            horizon,
            ..ToyConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let data = toy_data(&toy, &mut rng).unwrap();

        for det in AnyDetector::all_defaults() {
            group.bench_with_input(BenchmarkId::new(det.name(), horizon), &horizon, |b, &t| {
                b.iter(|| black_box(det.scan(black_box(&data), t)))
            });
        }
    }
    group.finish();

    // Online use: one call per step, as the detection-delay measure does.
    let mut group = c.benchmark_group("detect_online");
    let mut rng = StdRng::seed_from_u64(1);
    let data = toy_data(
        &ToyConfig {
            horizon: 400,
            ..ToyConfig::default()
        },
        &mut rng,
    )
    .unwrap();
    for det in AnyDetector::all_defaults() {
        group.bench_function(det.name(), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for t in 0..=data.len() {
                    hits += usize::from(det.detect(&data, t));
                }
                black_box(hits);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_detect);
criterion_main!(benches);
