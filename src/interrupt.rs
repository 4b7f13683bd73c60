//! Early-stop signal shared by long-running computations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Deadline and cancellation flag a computation polls between work units.
///
/// Both parts are optional; [`Interrupt::none`] never triggers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interrupt<'a> {
    pub deadline: Option<Instant>,
    pub cancel: Option<&'a AtomicBool>,
}

impl<'a> Interrupt<'a> {
    pub fn new(deadline: Option<Instant>, cancel: Option<&'a AtomicBool>) -> Self {
        Self { deadline, cancel }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Whether the computation should stop now.
    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.is_cancelled() || self.is_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_none_never_triggers() {
        assert!(!Interrupt::none().is_triggered());
    }

    #[test]
    fn test_past_deadline_triggers() {
        let past = Instant::now();
        let interrupt = Interrupt::new(Some(past), None);
        assert!(interrupt.is_expired());
        assert!(!interrupt.is_cancelled());
        assert!(interrupt.is_triggered());
    }

    #[test]
    fn test_future_deadline_and_flag() {
        let flag = AtomicBool::new(false);
        let interrupt = Interrupt::new(Some(Instant::now() + Duration::from_secs(3600)), Some(&flag));
        assert!(!interrupt.is_triggered());
        flag.store(true, Ordering::Relaxed);
        assert!(interrupt.is_cancelled());
        assert!(interrupt.is_triggered());
    }
}
