//! Veto throughput benchmarks
//!
//! Measures the two end-to-end runs without figure rendering.
//!
//! ```bash
//! cargo bench --bench veto_throughput
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parallax_veto::simulation::{run_simulation, SimulationConfig};
use parallax_veto::stress::{run_stress_test, StressConfig};
use parallax_veto::window::ShellGeometry;

/// Benchmark: default stress test (5000 spurious tracklets)
fn bench_stress_default(c: &mut Criterion) {
    let config = StressConfig::default();

    c.bench_function("stress_test_default", |b| {
        b.iter(|| run_stress_test(black_box(&config)));
    });
}

/// Benchmark: stress test at increasing tracklet counts
fn bench_stress_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("stress_test_n_artifacts");

    for n in [1_000, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let config = StressConfig {
                n_artifacts: n,
                ..StressConfig::default()
            };
            b.iter(|| run_stress_test(black_box(&config)));
        });
    }

    group.finish();
}

/// Benchmark: default baseline simulation (8000 objects)
fn bench_simulation_default(c: &mut Criterion) {
    let config = SimulationConfig::default();

    c.bench_function("simulation_default", |b| {
        b.iter(|| run_simulation(black_box(&config)));
    });
}

/// Benchmark: window test on a pre-drawn population
fn bench_window_count(c: &mut Criterion) {
    let window = ShellGeometry::default().window().unwrap();
    let report = run_stress_test(&StressConfig {
        n_artifacts: 100_000,
        ..StressConfig::default()
    })
    .unwrap();

    c.bench_function("window_count_accepted_100k", |b| {
        b.iter(|| window.count_accepted(black_box(&report.displacements)));
    });
}

criterion_group!(
    benches,
    bench_stress_default,
    bench_stress_scaling,
    bench_simulation_default,
    bench_window_count
);
criterion_main!(benches);
