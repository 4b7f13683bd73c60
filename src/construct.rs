//! Greedy construction of the initial assignment.
//!
//! Repeatedly places the unassigned agent/slot pair whose marginal cost
//! against the pairs already placed is smallest. Marginal costs are kept in
//! an `n × n` table and updated after every placement, so the whole
//! construction is O(n³).
//!
//! Ties go to the lowest agent index, then the lowest slot index, which makes
//! the result a pure function of the problem.

use crate::problem::{AssignmentProblem, Permutation};

/// Builds a greedy initial permutation.
///
/// # Examples
///
/// ```
/// use u_qap::construct::construct_initial;
/// use u_qap::problem::AssignmentProblem;
///
/// let problem = AssignmentProblem::new(
///     vec![vec![0.0, 1.0], vec![1.0, 0.0]],
///     vec![vec![0.0, 2.0], vec![2.0, 0.0]],
/// ).unwrap();
/// let perm = construct_initial(&problem);
/// assert!(perm.is_valid());
/// ```
pub fn construct_initial(problem: &AssignmentProblem) -> Permutation {
    let n = problem.size();
    let mut slots = vec![usize::MAX; n];
    let mut agent_free = vec![true; n];
    let mut slot_free = vec![true; n];

    // marginal[a * n + k]: cost of placing a in k given everything placed so far.
    let mut marginal: Vec<f64> = (0..n * n)
        .map(|idx| {
            let (a, k) = (idx / n, idx % n);
            problem.pair_cost(a, a, k, k)
        })
        .collect();

    for _ in 0..n {
        let mut chosen: Option<(usize, usize, f64)> = None;
        for a in (0..n).filter(|&a| agent_free[a]) {
            for k in (0..n).filter(|&k| slot_free[k]) {
                let value = marginal[a * n + k];
                if chosen.is_none_or(|(_, _, best)| value < best) {
                    chosen = Some((a, k, value));
                }
            }
        }

        let Some((agent, slot, _)) = chosen else {
            break;
        };
        slots[agent] = slot;
        agent_free[agent] = false;
        slot_free[slot] = false;

        for a in (0..n).filter(|&a| agent_free[a]) {
            for k in (0..n).filter(|&k| slot_free[k]) {
                marginal[a * n + k] +=
                    problem.pair_cost(a, agent, k, slot) + problem.pair_cost(agent, a, slot, k);
            }
        }
    }

    Permutation::from_vec_unchecked(slots)
}
