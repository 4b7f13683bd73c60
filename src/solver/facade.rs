//! Solve entry points.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use super::config::SolverConfig;
use super::types::{SolveStatus, Solution};
use crate::construct::construct_initial;
use crate::error::SolverError;
use crate::exhaustive::enumerate_optimum_within;
use crate::interrupt::Interrupt;
use crate::neighborhood::{resolve_backend, NeighborhoodBackend};
use crate::problem::AssignmentProblem;
use crate::tabu::{IterationEvent, SearchObserver, TabuRunner};

/// Solves `problem` under `config`.
///
/// Budget exhaustion is not an error: the best permutation found is returned
/// with a status saying why the search stopped.
///
/// # Errors
///
/// [`SolverError::InvalidConfig`] if `config` fails validation,
/// [`SolverError::BackendUnavailable`] if the requested backend is not
/// available in this build.
///
/// # Examples
///
/// ```
/// use u_qap::problem::AssignmentProblem;
/// use u_qap::solver::{solve, SolveStatus, SolverConfig};
///
/// let problem = AssignmentProblem::new(
///     vec![vec![0.0, 1.0, 2.0], vec![1.0, 0.0, 1.0], vec![2.0, 1.0, 0.0]],
///     vec![vec![0.0, 5.0, 3.0], vec![5.0, 0.0, 2.0], vec![3.0, 2.0, 0.0]],
/// )
/// .unwrap();
/// let solution = solve(&problem, &SolverConfig::default()).unwrap();
/// assert_eq!(solution.objective_value, 24.0);
/// assert_eq!(solution.status, SolveStatus::Optimal);
/// ```
pub fn solve(problem: &AssignmentProblem, config: &SolverConfig) -> Result<Solution, SolverError> {
    solve_with_cancel(problem, config, None)
}

/// Like [`solve`], but stops early once `cancel` is set.
///
/// The flag is checked once per iteration, and periodically inside the lower
/// bound and exact enumeration; a cancelled run returns its best permutation
/// with [`SolveStatus::Cancelled`].
pub fn solve_with_cancel(
    problem: &AssignmentProblem,
    config: &SolverConfig,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<Solution, SolverError> {
    solve_observed(
        problem,
        config,
        cancel.as_deref(),
        &mut |_: &IterationEvent<'_>| {},
    )
}

/// Like [`solve_with_cancel`], reporting every visited permutation to
/// `observer`.
///
/// Instances small enough for exact enumeration never reach the tabu
/// search, so the observer sees no events for them. Enumeration honors the
/// time limit and `cancel` but not `max_iterations`; an interrupted
/// enumeration returns the best permutation seen, without a lower bound.
#[tracing::instrument(level = "debug", skip_all, fields(n = problem.size()))]
pub fn solve_observed<O>(
    problem: &AssignmentProblem,
    config: &SolverConfig,
    cancel: Option<&AtomicBool>,
    observer: &mut O,
) -> Result<Solution, SolverError>
where
    O: SearchObserver + ?Sized,
{
    config.validate().map_err(SolverError::InvalidConfig)?;
    let n = problem.size();
    let backend = resolve_backend(config.backend, n)?;
    let start = Instant::now();

    if n <= config.exhaustive_limit {
        let interrupt = Interrupt::new(config.time_limit.map(|limit| start + limit), cancel);
        let exact = enumerate_optimum_within(problem, interrupt);
        let status = if exact.complete {
            SolveStatus::Optimal
        } else if interrupt.is_cancelled() {
            SolveStatus::Cancelled
        } else {
            SolveStatus::TimeLimit
        };
        tracing::debug!(visited = exact.visited, complete = exact.complete, "enumeration finished");
        let solution = Solution {
            permutation: exact.permutation,
            objective_value: exact.cost,
            lower_bound: exact.complete.then_some(exact.cost),
            iterations_run: 0,
            elapsed: start.elapsed(),
            status,
            backend: backend.name().to_string(),
            mode: None,
        };
        log_solution(&solution);
        return Ok(solution);
    }

    let initial = construct_initial(problem);
    let result = TabuRunner::run(problem, config, &backend, initial, cancel, observer);

    let objective_value = problem.cost(&result.state.best);
    let lower_bound = match (result.status, result.lower_bound) {
        (_, Some(lb)) => lb.value(),
        (SolveStatus::Optimal, None) => Some(objective_value),
        (_, None) => None,
    };
    let solution = Solution {
        permutation: result.state.best,
        objective_value,
        lower_bound,
        iterations_run: result.state.iteration,
        elapsed: start.elapsed(),
        status: result.status,
        backend: backend.name().to_string(),
        mode: None,
    };
    log_solution(&solution);
    Ok(solution)
}

fn log_solution(solution: &Solution) {
    tracing::info!(
        objective = solution.objective_value,
        lower_bound = ?solution.lower_bound,
        status = ?solution.status,
        iterations = solution.iterations_run,
        elapsed_ms = solution.elapsed.as_millis() as u64,
        backend = %solution.backend,
        "solve finished"
    );
}
