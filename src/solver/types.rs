//! Solver output.

use std::time::Duration;

use super::strategy::SearchMode;
use crate::problem::Permutation;

/// Why the search stopped.
///
/// None of these is an error: every status carries the best solution found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SolveStatus {
    /// Proven optimal: enumerated exactly, or matched by the lower bound.
    Optimal,
    /// Within `epsilon` of the lower bound.
    BoundConverged,
    IterationLimit,
    TimeLimit,
    Cancelled,
}

/// Result of a [`solve`](super::solve) call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Best assignment found (agent → slot).
    pub permutation: Permutation,
    /// Objective of `permutation`.
    pub objective_value: f64,
    /// Best valid lower bound, if one was computed.
    pub lower_bound: Option<f64>,
    pub iterations_run: u64,
    pub elapsed: Duration,
    pub status: SolveStatus,
    /// Neighborhood backend the search ran with.
    pub backend: String,
    /// Concrete strategy mode, when the solve was configured from one.
    pub mode: Option<SearchMode>,
}

impl Solution {
    /// Relative gap to the lower bound, `(objective − bound) / |bound|`.
    pub fn gap(&self) -> Option<f64> {
        self.lower_bound
            .map(|lb| (self.objective_value - lb) / lb.abs().max(f64::EPSILON))
    }
}
