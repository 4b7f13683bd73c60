//! Problem model.
//!
//! [`RawProblem`] is what callers hand in; [`validate`] turns it into the
//! immutable [`AssignmentProblem`] every other component reads from.
//! Solutions are [`Permutation`]s mapping agents to slots.

mod matrix;
mod model;
mod permutation;
pub mod qaplib;

pub use matrix::SquareMatrix;
pub use model::{validate, AssignmentProblem, Interaction, RawProblem};
pub use permutation::Permutation;
