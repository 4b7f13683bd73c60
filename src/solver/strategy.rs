//! Strategy modes.
//!
//! A [`SearchMode`] is a named tuning of [`SolverConfig`]. Modes only pick
//! parameter values; every mode runs the same tabu search.

use std::fmt;
use std::str::FromStr;

use super::config::SolverConfig;
use crate::neighborhood::BackendChoice;

/// Named search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SearchMode {
    /// Balanced tenure with periodic bound checks.
    Hybrid,
    /// Throughput profile: batched neighborhood, no bounds.
    Fft,
    /// Wider tenure, earlier and stronger diversification, tighter bounds.
    Enhanced,
    /// `Hybrid` with momentum in the bound's subgradient ascent.
    Nesterov,
    /// Parameters scaled with the instance size.
    InstanceAdaptive,
    /// Short tenure, frequent and strong perturbation.
    Aggressive,
    /// Picks one of the above from the instance size.
    #[default]
    Auto,
}

impl SearchMode {
    /// Concrete mode used for an instance of size `n`.
    ///
    /// Only [`SearchMode::Auto`] depends on `n`.
    pub fn resolve(self, n: usize) -> SearchMode {
        match self {
            SearchMode::Auto if n < 20 => SearchMode::Hybrid,
            SearchMode::Auto if n < 60 => SearchMode::InstanceAdaptive,
            SearchMode::Auto => SearchMode::Fft,
            mode => mode,
        }
    }

    /// Tunes `base` for this mode and instance size `n`.
    ///
    /// Fields a mode does not mention keep their value from `base`
    /// (iteration budget, time limit, seed, epsilon).
    pub fn configure(self, base: SolverConfig, n: usize) -> SolverConfig {
        let n32 = u32::try_from(n).unwrap_or(u32::MAX);
        match self.resolve(n) {
            SearchMode::Hybrid => base
                .with_tenure_range(2, 24)
                .with_initial_tenure(8)
                .with_bound_check_interval(100)
                .with_backend(BackendChoice::Auto),
            SearchMode::Fft => {
                let backend = if cfg!(feature = "parallel") {
                    BackendChoice::Batched
                } else {
                    BackendChoice::Sequential
                };
                base.with_bound_check_interval(0).with_backend(backend)
            }
            SearchMode::Enhanced => {
                let bound = base.bound.clone().with_max_iterations(60).with_patience(8);
                base.with_tenure_range(4, 40)
                    .with_initial_tenure(12)
                    .with_diversification_threshold(100)
                    .with_perturbation_moves(2)
                    .with_bound_check_interval(250)
                    .with_bound(bound)
            }
            SearchMode::Nesterov => {
                let bound = base.bound.clone().with_momentum(0.5);
                SearchMode::Hybrid.configure(base, n).with_bound(bound)
            }
            SearchMode::InstanceAdaptive => {
                let min = (n32 / 10).max(2);
                let max = (n32 / 2).max(min + 4);
                base.with_tenure_range(min, max)
                    .with_initial_tenure((n32 / 4).clamp(min, max))
                    .with_tenure_step((n32 / 20).max(1))
                    .with_diversification_threshold(n32.saturating_mul(10).clamp(50, 500))
                    .with_perturbation_moves((n32 / 20).max(1))
                    .with_bound_check_interval(u64::from(n32).saturating_mul(50).max(100))
            }
            SearchMode::Aggressive => base
                .with_tenure_range(1, 8)
                .with_initial_tenure(3)
                .with_tenure_step(1)
                .with_tenure_adapt_interval(20)
                .with_intensify_fraction(0.05)
                .with_diversification_threshold(30)
                .with_perturbation_moves((n32 / 8).max(2)),
            // resolve() never returns Auto
            SearchMode::Auto => base,
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            SearchMode::Hybrid => "hybrid",
            SearchMode::Fft => "fft",
            SearchMode::Enhanced => "enhanced",
            SearchMode::Nesterov => "nesterov",
            SearchMode::InstanceAdaptive => "instance_adaptive",
            SearchMode::Aggressive => "aggressive",
            SearchMode::Auto => "auto",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hybrid" => Ok(SearchMode::Hybrid),
            "fft" => Ok(SearchMode::Fft),
            "enhanced" => Ok(SearchMode::Enhanced),
            "nesterov" => Ok(SearchMode::Nesterov),
            "instance_adaptive" => Ok(SearchMode::InstanceAdaptive),
            "aggressive" => Ok(SearchMode::Aggressive),
            "auto" => Ok(SearchMode::Auto),
            other => Err(format!("unknown search mode '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SearchMode; 7] = [
        SearchMode::Hybrid,
        SearchMode::Fft,
        SearchMode::Enhanced,
        SearchMode::Nesterov,
        SearchMode::InstanceAdaptive,
        SearchMode::Aggressive,
        SearchMode::Auto,
    ];

    #[test]
    fn test_auto_resolution() {
        assert_eq!(SearchMode::Auto.resolve(5), SearchMode::Hybrid);
        assert_eq!(SearchMode::Auto.resolve(19), SearchMode::Hybrid);
        assert_eq!(SearchMode::Auto.resolve(20), SearchMode::InstanceAdaptive);
        assert_eq!(SearchMode::Auto.resolve(59), SearchMode::InstanceAdaptive);
        assert_eq!(SearchMode::Auto.resolve(60), SearchMode::Fft);
        assert_eq!(SearchMode::Aggressive.resolve(5), SearchMode::Aggressive);
    }

    #[test]
    fn test_every_mode_yields_valid_config() {
        for mode in ALL {
            for n in [1, 3, 12, 30, 75, 256] {
                let config = SolverConfig::for_mode(mode, n);
                assert!(
                    config.validate().is_ok(),
                    "{mode} n={n}: {:?}",
                    config.validate()
                );
            }
        }
    }

    #[test]
    fn test_mode_keeps_budget_and_seed() {
        let base = SolverConfig::default().with_max_iterations(77).with_seed(5);
        for mode in ALL {
            let config = mode.configure(base.clone(), 30);
            assert_eq!(config.max_iterations, 77);
            assert_eq!(config.seed, 5);
        }
    }

    #[test]
    fn test_fft_disables_bounds() {
        let config = SolverConfig::for_mode(SearchMode::Fft, 100);
        assert_eq!(config.bound_check_interval, 0);
        #[cfg(feature = "parallel")]
        assert_eq!(config.backend, BackendChoice::Batched);
    }

    #[test]
    fn test_nesterov_adds_momentum() {
        let hybrid = SolverConfig::for_mode(SearchMode::Hybrid, 10);
        let nesterov = SolverConfig::for_mode(SearchMode::Nesterov, 10);
        assert_eq!(hybrid.bound.momentum, 0.0);
        assert_eq!(nesterov.bound.momentum, 0.5);
        assert_eq!(nesterov.bound_check_interval, hybrid.bound_check_interval);
    }

    #[test]
    fn test_instance_adaptive_scales_with_n() {
        let small = SolverConfig::for_mode(SearchMode::InstanceAdaptive, 20);
        let large = SolverConfig::for_mode(SearchMode::InstanceAdaptive, 200);
        assert!(large.tenure_max > small.tenure_max);
        assert!(large.diversification_threshold >= small.diversification_threshold);
    }

    #[test]
    fn test_parse_names() {
        for mode in ALL {
            assert_eq!(mode.name().parse::<SearchMode>(), Ok(mode));
        }
        assert_eq!(" Hybrid ".parse::<SearchMode>(), Ok(SearchMode::Hybrid));
        assert!("gpu".parse::<SearchMode>().is_err());
    }
}
