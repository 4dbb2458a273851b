use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dietrs::{predict_weight, to_kg, weight_over_time, ActivityFactor, ActivityLevel, BodyProfile};

/// Trajectory benchmarks
///
/// Compare the day-by-day simulation with the closed-form projection over
/// increasing horizons.

fn bench_trajectories(c: &mut Criterion) {
    let profile = BodyProfile::reference();
    let activity: ActivityFactor = ActivityLevel::Sedentary.into();
    let wt0 = to_kg(222.0);

    let mut group = c.benchmark_group("Weight Trajectory");

    for &days in &[30usize, 365, 1095, 10_000] {
        group.throughput(Throughput::Elements(days as u64));

        group.bench_with_input(BenchmarkId::new("discrete", days), &days, |b, &days| {
            b.iter(|| predict_weight(black_box(days), black_box(2100.0), &profile, wt0, activity));
        });

        group.bench_with_input(BenchmarkId::new("closed_form", days), &days, |b, &days| {
            b.iter(|| weight_over_time(black_box(days), black_box(2100.0), &profile, wt0, activity));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_trajectories);
criterion_main!(benches);
