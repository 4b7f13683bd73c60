//! Lower bounds.
//!
//! A valid lower bound lets the search stop once the incumbent is provably
//! within `epsilon` of optimal. [`BoundEstimator`] computes the
//! Gilmore–Lawler bound and tightens it with Lagrangian subgradient ascent;
//! see [`estimator`] for the relaxation.
//!
//! A bound whose computation went numerically wrong is never returned: the
//! estimator reports [`BoundMethod::None`] instead, which callers must read
//! as "no bound", not as zero.

mod config;
pub mod estimator;
mod lap;

pub use config::BoundConfig;
pub use estimator::{estimate_bound, product_gilmore_lawler, BoundEstimator};

/// How a [`LowerBound`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum BoundMethod {
    /// Lagrangian dual of the linearized problem (subgradient ascent).
    LinearRelaxation,
    /// Plain product-form Gilmore–Lawler bound.
    GilmoreLawler,
    /// No bound available.
    None,
}

/// A lower bound on the optimal objective.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LowerBound {
    /// Bound value; `-inf` when `method` is [`BoundMethod::None`].
    pub value: f64,
    /// Search iteration at which the value was obtained.
    pub iteration_computed: u64,
    pub method: BoundMethod,
}

impl LowerBound {
    /// The "no bound" marker.
    pub fn none(iteration: u64) -> Self {
        Self {
            value: f64::NEG_INFINITY,
            iteration_computed: iteration,
            method: BoundMethod::None,
        }
    }

    /// The bound value, or `None` if no bound is available.
    pub fn value(&self) -> Option<f64> {
        (self.method != BoundMethod::None).then_some(self.value)
    }

    pub fn is_available(&self) -> bool {
        self.method != BoundMethod::None
    }
}
