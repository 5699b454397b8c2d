use criterion::{criterion_group, criterion_main, Criterion};
use justice::linear::Matrix;
use justice::scoregrid;
use justice::xp::XpCalculator;

fn criterion_benchmark(c: &mut Criterion) {
    {
        let mut grid = Matrix::allocate(11, 11);
        c.bench_function("cri_scoregrid_poisson_10", |b| {
            b.iter(|| scoregrid::from_univariate_poisson(1.6, 0.9, &mut grid));
        });
    }
    {
        let calculator = XpCalculator::default();
        c.bench_function("cri_xp_compute_10", |b| {
            b.iter(|| calculator.compute(1.6, 0.9));
        });
    }
    {
        let calculator = XpCalculator::new(20).unwrap();
        c.bench_function("cri_xp_compute_20", |b| {
            b.iter(|| calculator.compute(1.6, 0.9));
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
