//! Error types.
//!
//! Only structural problems are errors. Running out of iterations or time,
//! cancellation and bound divergence are reported through
//! [`SolveStatus`](crate::solver::SolveStatus) and
//! [`LowerBound`](crate::bound::LowerBound) instead.

use std::fmt;

use thiserror::Error;

use crate::neighborhood::BackendChoice;

/// Identifies one of the input matrices in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatrixKind {
    Distance,
    Flow,
    Synergy,
    Conflict,
}

impl fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatrixKind::Distance => "distance",
            MatrixKind::Flow => "flow",
            MatrixKind::Synergy => "synergy",
            MatrixKind::Conflict => "conflict",
        };
        f.write_str(name)
    }
}

/// Rejected problem input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidProblem {
    #[error("problem size must be at least 1")]
    Empty,

    #[error("{matrix} matrix is not square: row {row} has {found} entries, expected {expected}")]
    NotSquare {
        matrix: MatrixKind,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{matrix} matrix has dimension {found}, expected {expected}")]
    DimensionMismatch {
        matrix: MatrixKind,
        expected: usize,
        found: usize,
    },

    #[error("{matrix} matrix entry ({row}, {col}) is not finite")]
    NonFinite {
        matrix: MatrixKind,
        row: usize,
        col: usize,
    },
}

/// Error returned by [`solve`](crate::solver::solve).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("invalid problem: {0}")]
    InvalidProblem(#[from] InvalidProblem),

    /// No feasible assignment exists. Not produced by the unconstrained
    /// model; kept for forbidden-assignment constraints.
    #[error("infeasible problem: {0}")]
    Infeasible(String),

    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),

    #[error("neighborhood backend {0:?} is not available in this build")]
    BackendUnavailable(BackendChoice),
}

/// Error produced while reading a QAPLIB instance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing problem size")]
    MissingSize,

    #[error("invalid number {token:?} at token {position}")]
    InvalidNumber { token: String, position: usize },

    #[error("expected {expected} matrix entries, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("problem size {size} is too large")]
    SizeTooLarge { size: usize },
}
