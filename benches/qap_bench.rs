//! Criterion benchmarks for u-qap.
//!
//! Uses random dense instances to measure neighborhood evaluation, the
//! lower bound, and end-to-end solves.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_qap::bound::{BoundConfig, BoundEstimator};
use u_qap::neighborhood::{resolve_backend, BackendChoice, NeighborhoodBackend, SwapDeltas};
use u_qap::problem::{AssignmentProblem, Permutation};
use u_qap::solver::{solve, SolverConfig};

// ===========================================================================
// Instances
// ===========================================================================

fn random_matrix(n: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if i == j { 0.0 } else { rng.random_range(0..100) as f64 })
                .collect()
        })
        .collect()
}

fn random_problem(n: usize) -> AssignmentProblem {
    let mut rng = StdRng::seed_from_u64(n as u64);
    let d = random_matrix(n, &mut rng);
    let f = random_matrix(n, &mut rng);
    AssignmentProblem::new(d, f).expect("valid random instance")
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_neighborhood(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighborhood");

    for &n in &[16usize, 64, 128] {
        let problem = random_problem(n);
        let perm = Permutation::identity(n);
        for choice in [
            BackendChoice::Sequential,
            BackendChoice::Parallel,
            BackendChoice::Batched,
        ] {
            let Ok(backend) = resolve_backend(choice, n) else {
                continue;
            };
            let mut out = SwapDeltas::new(n);
            group.bench_with_input(BenchmarkId::new(backend.name(), n), &n, |b, _| {
                b.iter(|| {
                    backend.evaluate(black_box(&problem), black_box(&perm), &mut out);
                    black_box(out.as_slice()[0])
                })
            });
        }
    }
    group.finish();
}

fn bench_lower_bound(c: &mut Criterion) {
    let mut group = c.benchmark_group("lower_bound");
    group.sample_size(10);

    for &n in &[8usize, 12, 16] {
        let problem = random_problem(n);
        let upper = problem.cost(&Permutation::identity(n));
        let config = BoundConfig::default().with_max_iterations(10);
        group.bench_with_input(BenchmarkId::from_parameter(n), &problem, |b, p| {
            b.iter(|| {
                let mut estimator = BoundEstimator::new(p, config.clone());
                black_box(estimator.estimate(p, upper, 0))
            })
        });
    }
    group.finish();
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    group.sample_size(10);

    for &n in &[12usize, 30, 60] {
        let problem = random_problem(n);
        let config = SolverConfig::default()
            .with_max_iterations(500)
            .with_bound_check_interval(0)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(problem, config),
            |b, (p, c)| {
                b.iter(|| {
                    let solution = solve(black_box(p), black_box(c));
                    black_box(solution)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_neighborhood, bench_lower_bound, bench_solve);
criterion_main!(benches);
