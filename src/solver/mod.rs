//! Solver facade.
//!
//! [`solve`] validates the configuration, resolves the neighborhood backend
//! once, builds a greedy starting permutation and runs the tabu search,
//! refreshing the lower bound periodically. Instances with at most
//! [`SolverConfig::exhaustive_limit`] agents are enumerated exactly instead.
//!
//! Every call is independent: the problem is shared read-only, all mutable
//! search state lives inside the call, and [`SolverConfig`] is the only
//! source of parameters.

mod config;
mod facade;
#[cfg(feature = "serde")]
mod request;
mod strategy;
mod types;

pub use config::SolverConfig;
pub use facade::{solve, solve_observed, solve_with_cancel};
#[cfg(feature = "serde")]
pub use request::SolveRequest;
pub use strategy::SearchMode;
pub use types::{Solution, SolveStatus};
