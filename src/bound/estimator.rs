//! Gilmore–Lawler bound with Lagrangian subgradient ascent.
//!
//! # Relaxation
//!
//! Write the objective in Lawler form, `Σ c[a,k,b,l]·y[a,k,b,l]` with
//! `y[a,k,b,l] = x[a,k]·x[b,l]` and `c[a,k,b,l]` the cost of agents `a`, `b`
//! sitting in slots `k`, `l`. For any multipliers `λ`, the costs
//!
//! ```text
//! c'[a,k,b,l] = c[a,k,b,l] + λ[a,k,b,l] − λ[b,l,a,k]
//! ```
//!
//! give every permutation the same objective, because a permutation's `y`
//! is symmetric. The Gilmore–Lawler bound of `c'` is therefore a valid lower
//! bound for every `λ`: each `(a,k)` gets the cheapest completion of row
//! `a` (an (n−1)-sized linear assignment over `(b,l)`), and one outer linear
//! assignment over those values gives the bound. Relaxing the symmetry
//! constraints this way is a Lagrangian dual, maximized here by subgradient
//! ascent with a Polyak step towards the incumbent.
//!
//! # References
//!
//! - Gilmore, P. C. (1962). "Optimal and suboptimal algorithms for the
//!   quadratic assignment problem", *J. SIAM* 10, 305-313.
//! - Lawler, E. L. (1963). "The quadratic assignment problem",
//!   *Management Science* 9, 586-599.
//! - Frieze, A. M., Yadegar, J. (1983). "On the quadratic assignment
//!   problem", *Discrete Applied Mathematics* 5, 89-98.
//! - Adams, W. P., Johnson, T. A. (1994). "Improved linear
//!   programming-based lower bounds for the quadratic assignment problem",
//!   *DIMACS Series* 16, 43-75.

use std::collections::HashSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::BoundConfig;
use super::lap;
use super::{BoundMethod, LowerBound};
use crate::interrupt::Interrupt;
use crate::problem::AssignmentProblem;
use crate::tabu::SearchState;

/// One-shot bound for `problem`, using the state's incumbent as the target.
pub fn estimate_bound(
    problem: &AssignmentProblem,
    state: &SearchState,
    config: &BoundConfig,
) -> LowerBound {
    BoundEstimator::new(problem, config.clone()).estimate(problem, state.best_cost, state.iteration)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relaxation {
    Lagrangian,
    ProductGilmoreLawler,
    Unavailable,
}

/// Outcome of one Gilmore–Lawler evaluation under the current multipliers.
struct Dual {
    value: f64,
    /// Outer assignment: agent → slot.
    outer: Vec<usize>,
    /// Inner assignment of every `(a, k)` cell: agent → slot.
    inner: Vec<Vec<usize>>,
}

/// Stateful lower-bound estimator, warm-started across calls of one solve.
#[derive(Debug, Clone)]
pub struct BoundEstimator {
    config: BoundConfig,
    n: usize,
    relaxation: Relaxation,
    multipliers: Vec<f64>,
    velocity: Vec<f64>,
    step_scale: f64,
    stall: u32,
    best: Option<LowerBound>,
    diverged: bool,
}

impl BoundEstimator {
    /// Prepares an estimator for `problem`.
    pub fn new(problem: &AssignmentProblem, config: BoundConfig) -> Self {
        let n = problem.size();
        let relaxation = if n <= config.max_lagrangian_size {
            Relaxation::Lagrangian
        } else if problem.interaction().is_none() {
            Relaxation::ProductGilmoreLawler
        } else {
            Relaxation::Unavailable
        };

        let tensor = if relaxation == Relaxation::Lagrangian {
            n.pow(4)
        } else {
            0
        };
        let velocity = if config.momentum > 0.0 { tensor } else { 0 };

        Self {
            step_scale: config.initial_step,
            config,
            n,
            relaxation,
            multipliers: vec![0.0; tensor],
            velocity: vec![0.0; velocity],
            stall: 0,
            best: None,
            diverged: false,
        }
    }

    /// Best bound found so far, if any.
    pub fn best(&self) -> Option<LowerBound> {
        self.best
    }

    /// Improves the bound, using `upper_bound` (the incumbent cost) as the
    /// subgradient target.
    ///
    /// Returns the best bound found over all calls, or a bound with
    /// [`BoundMethod::None`] if the relaxation is unavailable or diverged.
    pub fn estimate(
        &mut self,
        problem: &AssignmentProblem,
        upper_bound: f64,
        iteration: u64,
    ) -> LowerBound {
        self.estimate_within(problem, upper_bound, iteration, Interrupt::none())
    }

    /// Like [`estimate`](Self::estimate), but gives up between subgradient
    /// rounds once `interrupt` triggers, returning the best bound so far.
    ///
    /// An interrupted call does not count as divergence; the next call
    /// resumes from the current multipliers.
    pub fn estimate_within(
        &mut self,
        problem: &AssignmentProblem,
        upper_bound: f64,
        iteration: u64,
        interrupt: Interrupt<'_>,
    ) -> LowerBound {
        if self.diverged {
            return LowerBound::none(iteration);
        }
        match self.relaxation {
            Relaxation::Unavailable => {
                tracing::debug!(n = self.n, "no lower bound for large instance with synergy/conflict");
                LowerBound::none(iteration)
            }
            Relaxation::ProductGilmoreLawler => {
                if let Some(best) = self.best {
                    return best;
                }
                if interrupt.is_triggered() {
                    return LowerBound::none(iteration);
                }
                let value = product_gilmore_lawler(problem);
                self.accept(value, upper_bound, iteration, BoundMethod::GilmoreLawler)
                    .unwrap_or_else(|| self.diverge(iteration, value, upper_bound))
            }
            Relaxation::Lagrangian => self.ascend(problem, upper_bound, iteration, interrupt),
        }
    }

    fn ascend(
        &mut self,
        problem: &AssignmentProblem,
        upper_bound: f64,
        iteration: u64,
        interrupt: Interrupt<'_>,
    ) -> LowerBound {
        let tolerance = 1e-9 * upper_bound.abs().max(1.0);
        let factor = self.config.divergence_factor;
        let mut previous: Option<f64> = None;

        for round in 0..self.config.max_iterations {
            if interrupt.is_triggered() {
                tracing::debug!(round, "lagrangian ascent interrupted");
                break;
            }
            let dual = self.gilmore_lawler(problem);

            if let Some(p) = previous {
                let scale = upper_bound.abs().max(p.abs()).max(1.0);
                if (dual.value - p).abs() > factor * scale {
                    return self.diverge(iteration, dual.value, upper_bound);
                }
            }
            previous = Some(dual.value);

            let before = self.best.map(|b| b.value);
            if self
                .accept(dual.value, upper_bound, iteration, BoundMethod::LinearRelaxation)
                .is_none()
            {
                return self.diverge(iteration, dual.value, upper_bound);
            }
            if self.best.map(|b| b.value) > before {
                self.stall = 0;
            } else {
                self.stall += 1;
                if self.stall >= self.config.patience {
                    self.step_scale *= 0.5;
                    self.stall = 0;
                }
            }

            let gap = upper_bound - dual.value;
            if gap <= tolerance {
                break;
            }
            if !self.step(&dual, gap) {
                // Symmetric relaxed solution: the bound cannot move further.
                break;
            }
        }

        let best = self.best.unwrap_or_else(|| LowerBound::none(iteration));
        tracing::debug!(
            value = best.value,
            upper_bound,
            step_scale = self.step_scale,
            "lagrangian bound"
        );
        best
    }

    /// Records `value` if it is sound against `upper_bound`.
    ///
    /// Returns `None` when the value cannot be a valid bound.
    fn accept(
        &mut self,
        value: f64,
        upper_bound: f64,
        iteration: u64,
        method: BoundMethod,
    ) -> Option<LowerBound> {
        let tolerance = 1e-9 * upper_bound.abs().max(1.0);
        if !value.is_finite() || value > upper_bound + tolerance {
            return None;
        }
        let value = value.min(upper_bound);
        if self.best.is_none_or(|b| value > b.value) {
            self.best = Some(LowerBound {
                value,
                iteration_computed: iteration,
                method,
            });
        }
        self.best
    }

    fn diverge(&mut self, iteration: u64, value: f64, upper_bound: f64) -> LowerBound {
        tracing::warn!(
            value,
            upper_bound,
            "lower bound estimation diverged; continuing without a bound"
        );
        self.diverged = true;
        self.best = None;
        LowerBound::none(iteration)
    }

    #[inline]
    fn index(&self, a: usize, k: usize, b: usize, l: usize) -> usize {
        let n = self.n;
        ((a * n + k) * n + b) * n + l
    }

    #[inline]
    fn reduced_cost(&self, problem: &AssignmentProblem, a: usize, k: usize, b: usize, l: usize) -> f64 {
        problem.pair_cost(a, b, k, l) + self.multipliers[self.index(a, k, b, l)]
            - self.multipliers[self.index(b, l, a, k)]
    }

    fn gilmore_lawler(&self, problem: &AssignmentProblem) -> Dual {
        let n = self.n;
        let m = n - 1;

        let cells = map_cells(n * n, |cell| {
            let (a, k) = (cell / n, cell % n);
            let mut costs = Vec::with_capacity(m * m);
            for b in (0..n).filter(|&b| b != a) {
                for l in (0..n).filter(|&l| l != k) {
                    costs.push(self.reduced_cost(problem, a, k, b, l));
                }
            }
            let (assignment, value) = lap::solve(&costs, m);

            let mut inner = vec![k; n];
            for (row, &col) in assignment.iter().enumerate() {
                inner[skip(row, a)] = skip(col, k);
            }
            (problem.pair_cost(a, a, k, k) + value, inner)
        });

        let outer_costs: Vec<f64> = cells.iter().map(|(v, _)| *v).collect();
        let (outer, value) = lap::solve(&outer_costs, n);
        let inner = cells.into_iter().map(|(_, inner)| inner).collect();
        Dual {
            value,
            outer,
            inner,
        }
    }

    /// Applies one subgradient step. Returns `false` if the subgradient is zero.
    fn step(&mut self, dual: &Dual, gap: f64) -> bool {
        let n = self.n;
        let mut chosen = HashSet::with_capacity(n * n);
        let mut entries = Vec::with_capacity(n * n);
        for (a, &k) in dual.outer.iter().enumerate() {
            let inner = &dual.inner[a * n + k];
            for (b, &l) in inner.iter().enumerate() {
                if b == a {
                    continue;
                }
                let e = self.index(a, k, b, l);
                chosen.insert(e);
                entries.push((e, self.index(b, l, a, k)));
            }
        }

        let asymmetric: Vec<(usize, usize)> = entries
            .into_iter()
            .filter(|(_, sym)| !chosen.contains(sym))
            .collect();
        if asymmetric.is_empty() {
            return false;
        }

        let norm_sq = 2.0 * asymmetric.len() as f64;
        let t = self.step_scale * gap / norm_sq;

        if self.velocity.is_empty() {
            for (e, sym) in asymmetric {
                self.multipliers[e] += t;
                self.multipliers[sym] -= t;
            }
        } else {
            let mu = self.config.momentum;
            self.velocity.iter_mut().for_each(|v| *v *= mu);
            for (e, sym) in asymmetric {
                self.velocity[e] += t;
                self.velocity[sym] -= t;
            }
            for (lambda, v) in self.multipliers.iter_mut().zip(&self.velocity) {
                *lambda += v;
            }
        }
        true
    }
}

/// Product-form Gilmore–Lawler bound for instances without synergy/conflict.
///
/// With `c[a,k,b,l] = F[a][b]·D[k][l]`, the cheapest completion of a cell is
/// a minimal scalar product: ascending flows against descending distances.
pub fn product_gilmore_lawler(problem: &AssignmentProblem) -> f64 {
    let n = problem.size();
    let (flow, dist) = (problem.flow(), problem.distance());

    let off_diagonal = |row: &[f64], skip_at: usize| -> Vec<f64> {
        let mut v: Vec<f64> = row
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != skip_at)
            .map(|(_, &x)| x)
            .collect();
        v.sort_by(f64::total_cmp);
        v
    };
    let flow_rows: Vec<Vec<f64>> = (0..n).map(|a| off_diagonal(flow.row(a), a)).collect();
    let dist_rows: Vec<Vec<f64>> = (0..n)
        .map(|k| {
            let mut v = off_diagonal(dist.row(k), k);
            v.reverse();
            v
        })
        .collect();

    let costs: Vec<f64> = (0..n * n)
        .map(|cell| {
            let (a, k) = (cell / n, cell % n);
            let completion: f64 = flow_rows[a]
                .iter()
                .zip(&dist_rows[k])
                .map(|(f, d)| f * d)
                .sum();
            flow.get(a, a) * dist.get(k, k) + completion
        })
        .collect();
    lap::solve(&costs, n).1
}

/// Maps a reduced index (one row/column removed at `removed`) back.
#[inline]
fn skip(index: usize, removed: usize) -> usize {
    if index < removed {
        index
    } else {
        index + 1
    }
}

fn map_cells<T, F>(count: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        (0..count).into_par_iter().map(f).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..count).map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exhaustive::enumerate_optimum;
    use crate::problem::RawProblem;
    use proptest::prelude::*;

    fn lcg_matrix(n: usize, seed: u64, modulo: u64, zero_diagonal: bool) -> Vec<Vec<f64>> {
        let mut x = seed.wrapping_add(0x9E3779B97F4A7C15);
        (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                        if zero_diagonal && i == j {
                            0.0
                        } else {
                            ((x >> 33) % modulo) as f64
                        }
                    })
                    .collect()
            })
            .collect()
    }

    fn scenario_n3() -> AssignmentProblem {
        AssignmentProblem::new(
            vec![
                vec![0.0, 1.0, 2.0],
                vec![1.0, 0.0, 1.0],
                vec![2.0, 1.0, 0.0],
            ],
            vec![
                vec![0.0, 5.0, 3.0],
                vec![5.0, 0.0, 2.0],
                vec![3.0, 2.0, 0.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_first_iterate_is_product_gilmore_lawler() {
        let problem = AssignmentProblem::new(
            lcg_matrix(6, 1, 10, true),
            lcg_matrix(6, 2, 10, true),
        )
        .unwrap();
        let config = BoundConfig::default().with_max_iterations(1);
        let mut estimator = BoundEstimator::new(&problem, config);
        let lb = estimator.estimate(&problem, 1e9, 0);
        assert_eq!(lb.method, BoundMethod::LinearRelaxation);
        assert!((lb.value - product_gilmore_lawler(&problem)).abs() < 1e-9);
    }

    #[test]
    fn test_ascent_never_below_gilmore_lawler() {
        let problem = AssignmentProblem::new(
            lcg_matrix(7, 3, 20, true),
            lcg_matrix(7, 4, 20, true),
        )
        .unwrap();
        let optimum = enumerate_optimum(&problem).cost;
        let glb = product_gilmore_lawler(&problem);
        let mut estimator = BoundEstimator::new(&problem, BoundConfig::default());
        let lb = estimator.estimate(&problem, optimum, 0);
        assert!(lb.value >= glb - 1e-9, "{} < {}", lb.value, glb);
        assert!(lb.value <= optimum + 1e-9, "{} > {}", lb.value, optimum);
    }

    #[test]
    fn test_scenario_n3_bound_sound() {
        let problem = scenario_n3();
        let optimum = enumerate_optimum(&problem).cost;
        let mut estimator = BoundEstimator::new(&problem, BoundConfig::default());
        let lb = estimator.estimate(&problem, optimum, 0);
        assert!(lb.value().is_some());
        assert!(lb.value <= optimum);
    }

    #[test]
    fn test_single_agent_bound_is_exact() {
        let problem = AssignmentProblem::new(vec![vec![3.0]], vec![vec![2.0]]).unwrap();
        let mut estimator = BoundEstimator::new(&problem, BoundConfig::default());
        let lb = estimator.estimate(&problem, 6.0, 0);
        assert_eq!(lb.value, 6.0);
    }

    #[test]
    fn test_inconsistent_incumbent_yields_none() {
        // A non-negative instance cannot have an incumbent of -1e6: the dual
        // value lands above it and must not be trusted.
        let problem = scenario_n3();
        let mut estimator = BoundEstimator::new(&problem, BoundConfig::default());
        let lb = estimator.estimate(&problem, -1e6, 0);
        assert_eq!(lb.method, BoundMethod::None);
        assert!(lb.value().is_none());
        // Divergence is sticky for the rest of the solve.
        let again = estimator.estimate(&problem, 1e9, 10);
        assert_eq!(again.method, BoundMethod::None);
    }

    #[test]
    fn test_large_instance_uses_product_bound() {
        let n = 8;
        let problem = AssignmentProblem::new(
            lcg_matrix(n, 5, 9, true),
            lcg_matrix(n, 6, 9, true),
        )
        .unwrap();
        let config = BoundConfig::default().with_max_lagrangian_size(4);
        let mut estimator = BoundEstimator::new(&problem, config);
        let lb = estimator.estimate(&problem, 1e9, 3);
        assert_eq!(lb.method, BoundMethod::GilmoreLawler);
        assert_eq!(lb.iteration_computed, 3);
        assert!((lb.value - product_gilmore_lawler(&problem)).abs() < 1e-9);
    }

    #[test]
    fn test_large_instance_with_synergy_has_no_bound() {
        let n = 6;
        let problem = RawProblem::new(lcg_matrix(n, 7, 9, true), lcg_matrix(n, 8, 9, true))
            .with_synergy(lcg_matrix(n, 9, 3, true))
            .validate()
            .unwrap();
        let config = BoundConfig::default().with_max_lagrangian_size(4);
        let mut estimator = BoundEstimator::new(&problem, config);
        assert_eq!(estimator.estimate(&problem, 1e9, 0).method, BoundMethod::None);
    }

    #[test]
    fn test_warm_start_keeps_best() {
        let problem = AssignmentProblem::new(
            lcg_matrix(6, 11, 15, true),
            lcg_matrix(6, 12, 15, true),
        )
        .unwrap();
        let optimum = enumerate_optimum(&problem).cost;
        let config = BoundConfig::default().with_max_iterations(3);
        let mut estimator = BoundEstimator::new(&problem, config);
        let first = estimator.estimate(&problem, optimum, 0);
        let second = estimator.estimate(&problem, optimum, 100);
        assert!(second.value >= first.value);
        assert!(second.value <= optimum + 1e-9);
    }

    #[test]
    fn test_estimate_bound_reads_search_state() {
        let problem = scenario_n3();
        let exact = enumerate_optimum(&problem);
        let state = SearchState::new(exact.permutation, exact.cost, 5);
        let lb = estimate_bound(&problem, &state, &BoundConfig::default());
        assert!(lb.value <= exact.cost);
        assert_eq!(lb.iteration_computed, 0);
    }

    #[test]
    fn test_oscillating_dual_diverges() {
        // A huge incumbent makes the Polyak step huge; with a tiny swing
        // tolerance the second dual value counts as divergence.
        let problem = AssignmentProblem::new(
            lcg_matrix(6, 21, 15, false),
            lcg_matrix(6, 22, 15, false),
        )
        .unwrap();
        let config = BoundConfig::default()
            .with_max_iterations(10)
            .with_divergence_factor(1e-12);
        let mut estimator = BoundEstimator::new(&problem, config);
        let lb = estimator.estimate(&problem, 1e9, 4);
        assert_eq!(lb.method, BoundMethod::None);
        assert_eq!(lb.iteration_computed, 4);
        assert!(estimator.best().is_none());

        let again = estimator.estimate(&problem, enumerate_optimum(&problem).cost, 8);
        assert_eq!(again.method, BoundMethod::None);
    }

    #[test]
    fn test_expired_deadline_stops_before_first_round() {
        let problem = scenario_n3();
        let optimum = enumerate_optimum(&problem).cost;
        let mut estimator = BoundEstimator::new(&problem, BoundConfig::default());

        let past = Interrupt::new(Some(std::time::Instant::now()), None);
        let lb = estimator.estimate_within(&problem, optimum, 0, past);
        assert_eq!(lb.method, BoundMethod::None);

        // Not a divergence: the next unrestricted call still yields a bound.
        let lb = estimator.estimate(&problem, optimum, 1);
        assert_eq!(lb.method, BoundMethod::LinearRelaxation);
        assert!(lb.value <= optimum);
    }

    #[test]
    fn test_cancelled_ascent_keeps_best_so_far() {
        let problem = AssignmentProblem::new(
            lcg_matrix(6, 31, 15, true),
            lcg_matrix(6, 32, 15, true),
        )
        .unwrap();
        let optimum = enumerate_optimum(&problem).cost;
        let mut estimator = BoundEstimator::new(&problem, BoundConfig::default().with_max_iterations(2));
        let first = estimator.estimate(&problem, optimum, 0);

        let flag = std::sync::atomic::AtomicBool::new(true);
        let lb = estimator.estimate_within(&problem, optimum, 5, Interrupt::new(None, Some(&flag)));
        assert_eq!(lb, first);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_bound_is_sound(
            n in 2usize..6,
            seed in any::<u64>(),
            momentum in prop_oneof![Just(0.0), Just(0.5)],
            biased in any::<bool>(),
        ) {
            let mut raw = RawProblem::new(
                lcg_matrix(n, seed, 12, false),
                lcg_matrix(n, seed ^ 0x5555, 12, false),
            );
            if biased {
                raw = raw
                    .with_synergy(lcg_matrix(n, seed ^ 0x7777, 6, false))
                    .with_conflict(lcg_matrix(n, seed ^ 0x3333, 6, false));
            }
            let problem = raw.validate().unwrap();
            let optimum = enumerate_optimum(&problem).cost;

            let config = BoundConfig::default().with_momentum(momentum);
            let mut estimator = BoundEstimator::new(&problem, config);
            let lb = estimator.estimate(&problem, optimum, 0);
            if let Some(value) = lb.value() {
                prop_assert!(value <= optimum + 1e-6 * optimum.abs().max(1.0),
                    "bound {} exceeds optimum {}", value, optimum);
            }
        }
    }
}
