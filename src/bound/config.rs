//! Lower-bound estimator configuration.

/// Parameters of the Lagrangian subgradient ascent.
///
/// # Examples
///
/// ```
/// use u_qap::bound::BoundConfig;
///
/// let config = BoundConfig::default()
///     .with_max_iterations(40)
///     .with_momentum(0.5);
/// assert_eq!(config.max_iterations, 40);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundConfig {
    /// Subgradient iterations per estimator call.
    pub max_iterations: u32,
    /// Initial Polyak step factor θ, in (0, 2].
    pub initial_step: f64,
    /// Non-improving iterations before θ is halved.
    pub patience: u32,
    /// Momentum applied to the multiplier updates (0 = plain subgradient).
    pub momentum: f64,
    /// Largest instance that gets the full Lagrangian relaxation.
    ///
    /// Memory grows as n⁴; larger instances fall back to the product-form
    /// Gilmore–Lawler bound, or to no bound when synergy/conflict is present.
    pub max_lagrangian_size: usize,
    /// A dual value swing larger than `divergence_factor · max(|incumbent|, 1)`
    /// between consecutive iterations counts as numerical divergence.
    pub divergence_factor: f64,
}

impl Default for BoundConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            initial_step: 2.0,
            patience: 5,
            momentum: 0.0,
            max_lagrangian_size: 24,
            divergence_factor: 10.0,
        }
    }
}

impl BoundConfig {
    pub fn with_max_iterations(mut self, n: u32) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    pub fn with_patience(mut self, patience: u32) -> Self {
        self.patience = patience;
        self
    }

    /// Sets the momentum, clamped to `[0, 1)`.
    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum.clamp(0.0, 0.99);
        self
    }

    pub fn with_max_lagrangian_size(mut self, n: usize) -> Self {
        self.max_lagrangian_size = n;
        self
    }

    pub fn with_divergence_factor(mut self, factor: f64) -> Self {
        self.divergence_factor = factor;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.initial_step > 0.0 && self.initial_step <= 2.0) {
            return Err("initial_step must be in (0, 2]".into());
        }
        if self.patience == 0 {
            return Err("patience must be at least 1".into());
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err("momentum must be in [0, 1)".into());
        }
        if !(self.divergence_factor > 0.0) {
            return Err("divergence_factor must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(BoundConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_step() {
        assert!(BoundConfig::default().with_initial_step(0.0).validate().is_err());
        assert!(BoundConfig::default().with_initial_step(2.5).validate().is_err());
    }

    #[test]
    fn test_momentum_clamped() {
        let config = BoundConfig::default().with_momentum(3.0);
        assert!(config.momentum < 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_patience() {
        assert!(BoundConfig::default().with_patience(0).validate().is_err());
    }
}
