//! Exact enumeration for tiny instances.
//!
//! Visits all `n!` permutations with Heap's algorithm. Consecutive
//! permutations differ by one swap, so each step is priced with the O(n)
//! swap delta instead of a full re-evaluation.
//!
//! # Reference
//!
//! Heap, B. R. (1963). "Permutations by Interchanges", *The Computer
//! Journal* 6(3), 293-294.

use crate::interrupt::Interrupt;
use crate::neighborhood::swap_delta;
use crate::problem::{AssignmentProblem, Permutation};

/// Largest size accepted by [`SolverConfig::exhaustive_limit`](crate::solver::SolverConfig).
pub const EXHAUSTIVE_MAX_SIZE: usize = 10;

/// Permutations visited between interrupt polls.
const POLL_INTERVAL: u64 = 4096;

/// Result of an exhaustive enumeration.
#[derive(Debug, Clone)]
pub struct ExhaustiveResult {
    /// An optimal permutation (the first one met in enumeration order).
    pub permutation: Permutation,
    /// Its objective value, recomputed from scratch.
    pub cost: f64,
    /// Number of permutations visited (`n!` when complete).
    pub visited: u64,
    /// `false` if the enumeration was interrupted; the result is then only
    /// the best of the visited prefix.
    pub complete: bool,
}

/// Enumerates every permutation of `problem` and returns an optimum.
///
/// Runs in O(n!·n); keep `n` at or below [`EXHAUSTIVE_MAX_SIZE`].
pub fn enumerate_optimum(problem: &AssignmentProblem) -> ExhaustiveResult {
    enumerate_optimum_within(problem, Interrupt::none())
}

/// Like [`enumerate_optimum`], polling `interrupt` every few thousand
/// permutations.
pub fn enumerate_optimum_within(problem: &AssignmentProblem, interrupt: Interrupt<'_>) -> ExhaustiveResult {
    let n = problem.size();
    let mut perm = Permutation::identity(n);
    let mut cost = problem.cost(&perm);
    let mut best = perm.clone();
    let mut best_cost = cost;
    let mut visited = 1u64;

    let mut complete = true;
    let mut counters = vec![0usize; n];
    let mut i = 1;
    while i < n {
        if visited % POLL_INTERVAL == 0 && interrupt.is_triggered() {
            complete = false;
            break;
        }
        if counters[i] < i {
            let r = if i % 2 == 0 { 0 } else { counters[i] };
            cost += swap_delta(problem, perm.as_slice(), r, i);
            perm.swap(r, i);
            visited += 1;
            if cost < best_cost {
                best_cost = cost;
                best.clone_from(&perm);
            }
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }

    let cost = problem.cost(&best);
    ExhaustiveResult {
        permutation: best,
        cost,
        visited,
        complete,
    }
}
