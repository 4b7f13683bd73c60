//! Tabu search over the swap neighborhood.
//!
//! A single-solution trajectory metaheuristic that uses short-term memory
//! (the tabu list) to forbid recently applied swaps, preventing cycling and
//! pushing the search out of local optima. The tenure adapts to the rate of
//! improvement, and stagnation triggers a seeded random perturbation.
//!
//! # References
//!
//! - Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! - Glover, F. (1990). "Tabu Search—Part II", *ORSA Journal on Computing* 2(1), 4-32.
//! - Battiti, R. & Tecchiolli, G. (1994). "The reactive tabu search",
//!   *ORSA Journal on Computing* 6(2), 126-140.

mod runner;
mod tenure;
mod types;

pub use runner::{IterationEvent, SearchObserver, TabuResult, TabuRunner};
pub use tenure::TenurePolicy;
pub use types::{SearchPhase, SearchState, TabuList};
