//! Tabu search execution engine.
//!
//! # Algorithm
//!
//! 1. Start from the constructed permutation
//! 2. At each iteration, depending on the phase:
//!    - `Searching`: evaluate every swap, take the best non-tabu move (or a
//!      tabu move that beats the global best), forbid its pair for `tenure`
//!      iterations, update the global best
//!    - `Diversifying`: apply random swaps regardless of tabu status,
//!      forbidding them for a boosted tenure, then resume searching with the
//!      base tenure
//! 3. Every `K` iterations adapt the tenure; every `bound_check_interval`
//!    iterations refresh the lower bound
//! 4. Stop on the iteration budget, the time limit, cancellation, or when the
//!    bound closes the gap. The bound itself polls the deadline and the
//!    cancellation flag, so a refresh never outlives the time limit
//!
//! # References
//!
//! - Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! - Taillard, É. (1991). "Robust taboo search for the quadratic assignment
//!   problem", *Parallel Computing* 17, 443-455.

use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{SearchPhase, SearchState, TabuList};
use crate::bound::{BoundEstimator, LowerBound};
use crate::interrupt::Interrupt;
use crate::neighborhood::{swap_delta, NeighborhoodBackend, SwapDeltas, SwapPair};
use crate::problem::{AssignmentProblem, Permutation};
use crate::solver::{SolveStatus, SolverConfig};
use crate::tabu::TenurePolicy;

/// Iterations between sweeps of expired tabu entries.
const TABU_PRUNE_INTERVAL: u64 = 64;

/// Snapshot handed to a [`SearchObserver`] after every iteration.
#[derive(Debug, Clone, Copy)]
pub struct IterationEvent<'a> {
    /// Completed iterations (0 for the starting point).
    pub iteration: u64,
    /// Phase the search will run next.
    pub phase: SearchPhase,
    pub permutation: &'a Permutation,
    /// Incrementally tracked cost of `permutation`.
    pub current_cost: f64,
    pub best_cost: f64,
    pub tenure: u32,
}

/// Receives every visited permutation.
pub trait SearchObserver {
    fn on_iteration(&mut self, event: &IterationEvent<'_>);
}

impl<F> SearchObserver for F
where
    F: FnMut(&IterationEvent<'_>),
{
    fn on_iteration(&mut self, event: &IterationEvent<'_>) {
        self(event)
    }
}

/// Result of a tabu search run.
#[derive(Debug, Clone)]
pub struct TabuResult {
    /// Final search state; `best`/`best_cost` hold the answer.
    pub state: SearchState,
    pub status: SolveStatus,
    /// Best sound lower bound, if bounds were enabled and available.
    pub lower_bound: Option<LowerBound>,
    pub elapsed: Duration,
}

/// Tabu search runner.
pub struct TabuRunner;

impl TabuRunner {
    /// Runs the search from `initial`.
    ///
    /// `config` is expected to be valid (see [`SolverConfig::validate`]).
    pub fn run<B, O>(
        problem: &AssignmentProblem,
        config: &SolverConfig,
        backend: &B,
        initial: Permutation,
        cancel: Option<&AtomicBool>,
        observer: &mut O,
    ) -> TabuResult
    where
        B: NeighborhoodBackend + ?Sized,
        O: SearchObserver + ?Sized,
    {
        let start = Instant::now();
        let interrupt = Interrupt::new(config.time_limit.map(|limit| start + limit), cancel);
        let n = problem.size();
        let policy = config.tenure_policy();

        let initial_cost = problem.cost(&initial);
        let mut state = SearchState::new(initial, initial_cost, config.initial_tenure);
        let mut tabu = TabuList::new();
        let mut deltas = SwapDeltas::new(n);
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut estimator = (config.bound_check_interval > 0)
            .then(|| BoundEstimator::new(problem, config.bound.clone()));
        let mut bound: Option<LowerBound> = None;

        notify(observer, &state);

        let mut status = if n < 2 {
            Some(SolveStatus::Optimal)
        } else {
            None
        };
        if status.is_none() {
            if let Some(est) = estimator.as_mut() {
                bound = refresh_bound(est, problem, &state, interrupt);
                status = bound.and_then(|lb| gap_status(state.best_cost, lb.value, config.epsilon));
            }
        }

        while status.is_none() {
            if interrupt.is_cancelled() {
                status = Some(SolveStatus::Cancelled);
                break;
            }
            if state.iteration >= config.max_iterations {
                status = Some(SolveStatus::IterationLimit);
                break;
            }
            if interrupt.is_expired() {
                status = Some(SolveStatus::TimeLimit);
                break;
            }

            match state.phase {
                SearchPhase::Diversifying => {
                    diversify(problem, config, &policy, &mut state, &mut tabu, &mut rng)
                }
                _ => step(problem, config, backend, &mut state, &mut tabu, &mut deltas),
            }
            state.iteration += 1;

            state.window_iterations += 1;
            if state.window_iterations >= policy.interval {
                state.tenure = policy.adapt(state.tenure, state.window_improvements);
                state.window_iterations = 0;
                state.window_improvements = 0;
            }

            if state.phase == SearchPhase::Searching
                && state.stagnation_counter > config.diversification_threshold
            {
                state.phase = SearchPhase::Diversifying;
            }

            if state.iteration % TABU_PRUNE_INTERVAL == 0 {
                tabu.prune(state.iteration);
            }

            notify(observer, &state);

            if let Some(est) = estimator.as_mut() {
                if state.iteration % config.bound_check_interval == 0 {
                    bound = refresh_bound(est, problem, &state, interrupt);
                }
            }
            status = bound.and_then(|lb| gap_status(state.best_cost, lb.value, config.epsilon));
        }

        state.phase = SearchPhase::Terminated;
        TabuResult {
            state,
            status: status.unwrap_or(SolveStatus::IterationLimit),
            lower_bound: bound,
            elapsed: start.elapsed(),
        }
    }
}

fn notify<O: SearchObserver + ?Sized>(observer: &mut O, state: &SearchState) {
    observer.on_iteration(&IterationEvent {
        iteration: state.iteration,
        phase: state.phase,
        permutation: &state.current,
        current_cost: state.current_cost,
        best_cost: state.best_cost,
        tenure: state.tenure,
    });
}

/// One regular tabu iteration.
fn step<B: NeighborhoodBackend + ?Sized>(
    problem: &AssignmentProblem,
    config: &SolverConfig,
    backend: &B,
    state: &mut SearchState,
    tabu: &mut TabuList,
    deltas: &mut SwapDeltas,
) {
    backend.evaluate(problem, &state.current, deltas);
    let now = state.iteration;

    // Strict comparisons over lexicographic pair order: ties go to the lowest pair.
    let mut admissible: Option<(SwapPair, f64)> = None;
    let mut least_bad: Option<(SwapPair, f64)> = None;
    for (pair, delta) in deltas.iter() {
        if least_bad.is_none_or(|(_, d)| delta < d) {
            least_bad = Some((pair, delta));
        }
        let aspirates = config.aspiration && state.current_cost + delta < state.best_cost;
        if tabu.is_tabu(pair, now) && !aspirates {
            continue;
        }
        if admissible.is_none_or(|(_, d)| delta < d) {
            admissible = Some((pair, delta));
        }
    }

    // Every move tabu and none aspirating: take the least bad one.
    let Some((pair, delta)) = admissible.or(least_bad) else {
        return;
    };
    state.apply_swap(pair, delta);
    tabu.forbid(pair, now + 1 + u64::from(state.tenure));
}

/// Applies random swaps regardless of tabu status.
///
/// The perturbed pairs stay forbidden for the boosted tenure; the regular
/// tenure is left untouched.
fn diversify(
    problem: &AssignmentProblem,
    config: &SolverConfig,
    policy: &TenurePolicy,
    state: &mut SearchState,
    tabu: &mut TabuList,
    rng: &mut StdRng,
) {
    let n = problem.size();
    let now = state.iteration;
    let boosted = policy.boosted(state.tenure);

    for _ in 0..config.perturbation_moves {
        let i = rng.random_range(0..n);
        let mut j = rng.random_range(0..n - 1);
        if j >= i {
            j += 1;
        }
        let pair = SwapPair::new(i, j);
        let delta = swap_delta(problem, state.current.as_slice(), pair.i, pair.j);
        state.apply_swap(pair, delta);
        tabu.forbid(pair, now + 1 + u64::from(boosted));
    }

    tracing::trace!(
        iteration = now,
        tenure = boosted,
        current_cost = state.current_cost,
        best_cost = state.best_cost,
        "diversified"
    );
    state.stagnation_counter = 0;
    state.phase = SearchPhase::Searching;
}

/// Refreshes the bound and checks it against the incumbent.
///
/// A bound above the incumbent is a computation bug; it is logged and dropped.
/// An interrupted refresh yields the best bound computed so far, if any.
fn refresh_bound(
    estimator: &mut BoundEstimator,
    problem: &AssignmentProblem,
    state: &SearchState,
    interrupt: Interrupt<'_>,
) -> Option<LowerBound> {
    let lb = estimator.estimate_within(problem, state.best_cost, state.iteration, interrupt);
    let value = lb.value()?;
    let tolerance = 1e-9 * state.best_cost.abs().max(1.0);
    if value > state.best_cost + tolerance {
        tracing::error!(
            bound = value,
            best_cost = state.best_cost,
            iteration = state.iteration,
            "lower bound exceeds incumbent; discarding it"
        );
        return None;
    }
    Some(lb)
}

/// Termination status implied by the gap between `best` and `bound`, if any.
fn gap_status(best: f64, bound: f64, epsilon: f64) -> Option<SolveStatus> {
    let gap = best - bound;
    if gap <= 1e-9 * best.abs().max(1.0) {
        Some(SolveStatus::Optimal)
    } else if gap <= epsilon * bound.abs() {
        Some(SolveStatus::BoundConverged)
    } else {
        None
    }
}
