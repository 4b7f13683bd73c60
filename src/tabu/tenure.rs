//! Adaptive tabu tenure.
//!
//! Every `interval` iterations the tenure is adjusted from the number of
//! best-cost improvements seen in that window: no improvement lengthens the
//! tenure (diversify), frequent improvement shortens it (intensify).
//! Only iteration counters feed the rule, so a fixed iteration budget gives
//! a reproducible tenure schedule.

/// Bounds and step sizes of the tenure controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TenurePolicy {
    pub min: u32,
    pub max: u32,
    pub step: u32,
    /// Window length `K` in iterations.
    pub interval: u32,
    /// Improvements in more than this fraction of the window shorten the tenure.
    pub intensify_fraction: f64,
}

impl TenurePolicy {
    /// Next tenure after a window with `improvements` improving iterations.
    pub fn adapt(&self, tenure: u32, improvements: u32) -> u32 {
        let next = if improvements == 0 {
            tenure.saturating_add(self.step)
        } else if f64::from(improvements) > self.intensify_fraction * f64::from(self.interval) {
            tenure.saturating_sub(self.step)
        } else {
            tenure
        };
        next.clamp(self.min, self.max)
    }

    /// Tenure used while diversifying.
    pub fn boosted(&self, tenure: u32) -> u32 {
        tenure.saturating_add(self.step).clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> TenurePolicy {
        TenurePolicy {
            min: 2,
            max: 12,
            step: 3,
            interval: 50,
            intensify_fraction: 0.1,
        }
    }

    #[test]
    fn test_no_improvement_increases() {
        assert_eq!(policy().adapt(5, 0), 8);
    }

    #[test]
    fn test_increase_bounded_above() {
        assert_eq!(policy().adapt(11, 0), 12);
        assert_eq!(policy().adapt(12, 0), 12);
    }

    #[test]
    fn test_frequent_improvement_decreases() {
        // 6 > 0.1 * 50
        assert_eq!(policy().adapt(8, 6), 5);
        assert_eq!(policy().adapt(3, 6), 2);
    }

    #[test]
    fn test_moderate_improvement_keeps() {
        assert_eq!(policy().adapt(8, 5), 8);
        assert_eq!(policy().adapt(8, 1), 8);
    }

    #[test]
    fn test_boosted() {
        assert_eq!(policy().boosted(4), 7);
        assert_eq!(policy().boosted(11), 12);
    }

    #[test]
    fn test_zero_range_stays_zero() {
        let p = TenurePolicy {
            min: 0,
            max: 0,
            ..policy()
        };
        assert_eq!(p.adapt(0, 0), 0);
        assert_eq!(p.boosted(0), 0);
    }
}
