//! Quadratic assignment optimization kernel.
//!
//! Places `n` agents onto `n` slots so that the total pairwise cost is
//! minimized. The cost of a pair of agents is their flow times the distance
//! between their slots, optionally adjusted by agent synergy (a bonus for
//! being close) and conflict (a penalty for being close).
//!
//! - **Problem model** ([`problem`]): validated matrices, permutations, the
//!   objective, and a QAPLIB reader.
//! - **Construction** ([`construct`]): greedy starting permutation.
//! - **Neighborhood** ([`neighborhood`]): O(n) swap deltas, evaluated
//!   sequentially or on the rayon pool behind one backend trait.
//! - **Lower bounds** ([`bound`]): Gilmore–Lawler bound tightened by
//!   Lagrangian subgradient ascent.
//! - **Tabu search** ([`tabu`]): adaptive tenure, aspiration and seeded
//!   diversification.
//! - **Solver** ([`solver`]): `solve(problem, config)`, strategy modes, and
//!   a serializable request (with the `serde` feature).
//!
//! # Example
//!
//! ```
//! use u_qap::problem::RawProblem;
//! use u_qap::solver::{solve, SolverConfig};
//!
//! let problem = RawProblem::new(
//!     vec![vec![0.0, 1.0, 2.0], vec![1.0, 0.0, 1.0], vec![2.0, 1.0, 0.0]],
//!     vec![vec![0.0, 5.0, 3.0], vec![5.0, 0.0, 2.0], vec![3.0, 2.0, 0.0]],
//! )
//! .validate()
//! .unwrap();
//!
//! let solution = solve(&problem, &SolverConfig::default()).unwrap();
//! assert!(solution.permutation.is_valid());
//! assert_eq!(solution.objective_value, problem.cost(&solution.permutation));
//! ```
//!
//! # Features
//!
//! - `parallel` (default): rayon-backed neighborhood and bound evaluation.
//! - `serde`: serialization of inputs, configs and solutions.
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod bound;
pub mod construct;
pub mod error;
pub mod exhaustive;
pub mod interrupt;
pub mod neighborhood;
pub mod problem;
pub mod solver;
pub mod tabu;

pub use error::{InvalidProblem, MatrixKind, ParseError, SolverError};
pub use problem::{AssignmentProblem, Permutation, RawProblem};
pub use solver::{solve, SearchMode, Solution, SolveStatus, SolverConfig};
