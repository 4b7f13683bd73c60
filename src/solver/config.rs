//! Solver configuration.

use std::time::Duration;

use super::strategy::SearchMode;
use crate::bound::BoundConfig;
use crate::exhaustive::EXHAUSTIVE_MAX_SIZE;
use crate::neighborhood::BackendChoice;
use crate::tabu::TenurePolicy;

/// Every parameter of one [`solve`](super::solve) call.
///
/// There is no global configuration: two solves with equal problems and
/// equal configs (same `seed`) visit the same permutations and return the
/// same solution.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_qap::solver::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_max_iterations(5_000)
///     .with_time_limit(Duration::from_secs(2))
///     .with_tenure_range(3, 15)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Iteration budget (each step or perturbation counts as one).
    pub max_iterations: u64,
    /// Wall-clock budget, checked once per iteration. `None` disables it.
    pub time_limit: Option<Duration>,
    /// Tenure at the start of the search.
    pub initial_tenure: u32,
    pub tenure_min: u32,
    pub tenure_max: u32,
    /// Amount the tenure controller adds or removes per adjustment.
    pub tenure_step: u32,
    /// Iterations between tenure adjustments.
    pub tenure_adapt_interval: u32,
    /// Improvements in more than this fraction of a window shorten the tenure.
    pub intensify_fraction: f64,
    /// Allow tabu moves that produce a new best.
    pub aspiration: bool,
    /// Non-improving iterations tolerated before diversifying.
    pub diversification_threshold: u32,
    /// Random swaps applied when diversifying.
    pub perturbation_moves: u32,
    /// Iterations between lower-bound refreshes; 0 disables bounds.
    pub bound_check_interval: u64,
    pub bound: BoundConfig,
    /// Stop once `best − bound <= epsilon · |bound|`.
    pub epsilon: f64,
    pub backend: BackendChoice,
    /// Seed for the perturbation RNG.
    pub seed: u64,
    /// Instances with `n <= exhaustive_limit` are enumerated exactly.
    pub exhaustive_limit: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            time_limit: None,
            initial_tenure: 8,
            tenure_min: 2,
            tenure_max: 24,
            tenure_step: 2,
            tenure_adapt_interval: 50,
            intensify_fraction: 0.1,
            aspiration: true,
            diversification_threshold: 200,
            perturbation_moves: 1,
            bound_check_interval: 1_000,
            bound: BoundConfig::default(),
            epsilon: 1e-6,
            backend: BackendChoice::Auto,
            seed: 42,
            exhaustive_limit: 4,
        }
    }
}

impl SolverConfig {
    /// Default configuration tuned by `mode` for an instance of size `n`.
    pub fn for_mode(mode: SearchMode, n: usize) -> Self {
        mode.configure(Self::default(), n)
    }

    pub fn with_max_iterations(mut self, n: u64) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets the initial tenure.
    pub fn with_initial_tenure(mut self, tenure: u32) -> Self {
        self.initial_tenure = tenure;
        self
    }

    /// Sets the tenure bounds, moving the initial tenure inside them.
    pub fn with_tenure_range(mut self, min: u32, max: u32) -> Self {
        self.tenure_min = min;
        self.tenure_max = max;
        self.initial_tenure = self.initial_tenure.clamp(min, max.max(min));
        self
    }

    /// Fixes the tenure: no adaptation, no boost while diversifying.
    pub fn with_fixed_tenure(mut self, tenure: u32) -> Self {
        self.initial_tenure = tenure;
        self.tenure_min = tenure;
        self.tenure_max = tenure;
        self
    }

    pub fn with_tenure_step(mut self, step: u32) -> Self {
        self.tenure_step = step;
        self
    }

    pub fn with_tenure_adapt_interval(mut self, interval: u32) -> Self {
        self.tenure_adapt_interval = interval;
        self
    }

    /// Sets the intensification fraction, clamped to `[0, 1]`.
    pub fn with_intensify_fraction(mut self, fraction: f64) -> Self {
        self.intensify_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn with_aspiration(mut self, aspiration: bool) -> Self {
        self.aspiration = aspiration;
        self
    }

    pub fn with_diversification_threshold(mut self, threshold: u32) -> Self {
        self.diversification_threshold = threshold;
        self
    }

    pub fn with_perturbation_moves(mut self, moves: u32) -> Self {
        self.perturbation_moves = moves;
        self
    }

    pub fn with_bound_check_interval(mut self, interval: u64) -> Self {
        self.bound_check_interval = interval;
        self
    }

    pub fn with_bound(mut self, bound: BoundConfig) -> Self {
        self.bound = bound;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_backend(mut self, backend: BackendChoice) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_exhaustive_limit(mut self, limit: usize) -> Self {
        self.exhaustive_limit = limit;
        self
    }

    /// Tenure controller derived from this configuration.
    pub fn tenure_policy(&self) -> TenurePolicy {
        TenurePolicy {
            min: self.tenure_min,
            max: self.tenure_max,
            step: self.tenure_step,
            interval: self.tenure_adapt_interval,
            intensify_fraction: self.intensify_fraction,
        }
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_iterations == 0 {
            return Err("max_iterations must be at least 1".into());
        }
        if self.time_limit == Some(Duration::ZERO) {
            return Err("time_limit must be positive or None".into());
        }
        if self.tenure_min > self.tenure_max {
            return Err("tenure_min must not exceed tenure_max".into());
        }
        if !(self.tenure_min..=self.tenure_max).contains(&self.initial_tenure) {
            return Err("initial_tenure must lie within [tenure_min, tenure_max]".into());
        }
        if self.tenure_adapt_interval == 0 {
            return Err("tenure_adapt_interval must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.intensify_fraction) {
            return Err("intensify_fraction must be in [0, 1]".into());
        }
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err("epsilon must be finite and non-negative".into());
        }
        if self.exhaustive_limit > EXHAUSTIVE_MAX_SIZE {
            return Err(format!(
                "exhaustive_limit must not exceed {EXHAUSTIVE_MAX_SIZE}"
            ));
        }
        self.bound.validate().map_err(|e| format!("bound: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert_eq!(config.max_iterations, 10_000);
        assert_eq!(config.initial_tenure, 8);
        assert_eq!(config.tenure_adapt_interval, 50);
        assert!(config.aspiration);
        assert_eq!(config.backend, BackendChoice::Auto);
        assert!(config.time_limit.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SolverConfig::default()
            .with_max_iterations(99)
            .with_initial_tenure(4)
            .with_tenure_range(1, 9)
            .with_diversification_threshold(30)
            .with_bound_check_interval(0)
            .with_seed(123);
        assert_eq!(config.max_iterations, 99);
        assert_eq!(config.initial_tenure, 4);
        assert_eq!((config.tenure_min, config.tenure_max), (1, 9));
        assert_eq!(config.diversification_threshold, 30);
        assert_eq!(config.bound_check_interval, 0);
        assert_eq!(config.seed, 123);
    }

    #[test]
    fn test_tenure_range_moves_initial_inside() {
        let config = SolverConfig::default().with_tenure_range(10, 20);
        assert_eq!(config.initial_tenure, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fixed_tenure_zero() {
        let config = SolverConfig::default().with_fixed_tenure(0);
        assert_eq!(config.tenure_policy().adapt(0, 0), 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_iterations() {
        assert!(SolverConfig::default().with_max_iterations(0).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_time_limit() {
        let config = SolverConfig::default().with_time_limit(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_initial_outside_range() {
        let mut config = SolverConfig::default();
        config.initial_tenure = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_large_exhaustive_limit() {
        let config = SolverConfig::default().with_exhaustive_limit(EXHAUSTIVE_MAX_SIZE + 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_reports_bound_errors() {
        let config = SolverConfig::default().with_bound(BoundConfig::default().with_patience(0));
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("bound:"), "{err}");
    }
}
