//! Serializable solve request for embedding hosts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::SolverConfig;
use super::facade::solve;
use super::strategy::SearchMode;
use super::types::Solution;
use crate::error::SolverError;
use crate::problem::{AssignmentProblem, RawProblem};

/// A self-contained solve request, as decoded from JSON or similar.
///
/// ```
/// use u_qap::solver::SolveRequest;
///
/// let request: SolveRequest = serde_json::from_str(r#"{
///     "distance_matrix": [[0, 1], [1, 0]],
///     "flow_matrix": [[0, 3], [3, 0]],
///     "mode": "hybrid"
/// }"#).unwrap();
/// let solution = request.solve().unwrap();
/// assert_eq!(solution.objective_value, 6.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub distance_matrix: Vec<Vec<f64>>,
    pub flow_matrix: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synergy_matrix: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_matrix: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub mode: SearchMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SolveRequest {
    /// Validates the matrices and builds the configuration for the
    /// requested mode, resolved against the instance size.
    pub fn into_parts(self) -> Result<(AssignmentProblem, SolverConfig, SearchMode), SolverError> {
        let mut raw = RawProblem::new(self.distance_matrix, self.flow_matrix);
        raw.synergy_matrix = self.synergy_matrix;
        raw.conflict_matrix = self.conflict_matrix;
        let problem = raw.validate()?;

        let n = problem.size();
        let mode = self.mode.resolve(n);
        let mut config = SolverConfig::for_mode(mode, n);
        if let Some(ms) = self.time_limit_ms {
            config = config.with_time_limit(Duration::from_millis(ms));
        }
        if let Some(iterations) = self.max_iterations {
            config = config.with_max_iterations(iterations);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config.validate().map_err(SolverError::InvalidConfig)?;
        Ok((problem, config, mode))
    }

    /// Validates and solves the request.
    pub fn solve(self) -> Result<Solution, SolverError> {
        let (problem, config, mode) = self.into_parts()?;
        let mut solution = solve(&problem, &config)?;
        solution.mode = Some(mode);
        Ok(solution)
    }
}
