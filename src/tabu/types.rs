//! Search state and tabu memory.

use std::collections::HashMap;

use crate::neighborhood::SwapPair;
use crate::problem::Permutation;

/// Phase of the tabu state machine.
///
/// `Searching` and `Diversifying` alternate; `Terminated` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchPhase {
    Searching,
    Diversifying,
    Terminated,
}

/// Mutable state of one tabu search run.
///
/// Owned by the search thread; backends only see `&current`.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub current: Permutation,
    pub current_cost: f64,
    pub best: Permutation,
    pub best_cost: f64,
    /// Completed iterations.
    pub iteration: u64,
    pub tenure: u32,
    /// Iterations since the last best-cost improvement.
    pub stagnation_counter: u32,
    pub phase: SearchPhase,
    /// Iteration at which `best` was found.
    pub best_iteration: u64,
    /// Improvements counted in the current tenure-adaptation window.
    pub window_improvements: u32,
    /// Iterations counted in the current tenure-adaptation window.
    pub window_iterations: u32,
}

impl SearchState {
    /// Starts a search at `initial`, whose objective is `cost`.
    pub fn new(initial: Permutation, cost: f64, tenure: u32) -> Self {
        Self {
            best: initial.clone(),
            current: initial,
            current_cost: cost,
            best_cost: cost,
            iteration: 0,
            tenure,
            stagnation_counter: 0,
            phase: SearchPhase::Searching,
            best_iteration: 0,
            window_improvements: 0,
            window_iterations: 0,
        }
    }

    /// Applies the swap `pair` whose cost change is `delta`.
    ///
    /// Returns `true` if the move produced a new best.
    pub fn apply_swap(&mut self, pair: SwapPair, delta: f64) -> bool {
        self.current.swap(pair.i, pair.j);
        self.current_cost += delta;
        if self.current_cost < self.best_cost {
            self.best.clone_from(&self.current);
            self.best_cost = self.current_cost;
            self.best_iteration = self.iteration + 1;
            self.stagnation_counter = 0;
            self.window_improvements += 1;
            true
        } else {
            self.stagnation_counter = self.stagnation_counter.saturating_add(1);
            false
        }
    }
}

/// Swap pairs that may not be applied, keyed by the iteration at which the
/// ban expires.
///
/// Expired entries stay in the map until [`prune`](Self::prune) runs; lookups
/// ignore them.
#[derive(Debug, Clone, Default)]
pub struct TabuList {
    expiry: HashMap<SwapPair, u64>,
}

impl TabuList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forbids `pair` while the iteration counter is below `expires_at`.
    pub fn forbid(&mut self, pair: SwapPair, expires_at: u64) {
        self.expiry.insert(pair, expires_at);
    }

    /// Whether `pair` is forbidden at `iteration`.
    #[inline]
    pub fn is_tabu(&self, pair: SwapPair, iteration: u64) -> bool {
        self.expiry.get(&pair).is_some_and(|&e| iteration < e)
    }

    /// Drops entries that have expired by `iteration`.
    pub fn prune(&mut self, iteration: u64) {
        self.expiry.retain(|_, &mut e| iteration < e);
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.expiry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabu_expiry() {
        let mut list = TabuList::new();
        let pair = SwapPair::new(3, 1);
        list.forbid(pair, 10);
        assert!(list.is_tabu(SwapPair::new(1, 3), 9));
        assert!(!list.is_tabu(pair, 10));
        assert!(!list.is_tabu(SwapPair::new(0, 1), 0));
    }

    #[test]
    fn test_prune_is_lazy() {
        let mut list = TabuList::new();
        list.forbid(SwapPair::new(0, 1), 5);
        list.forbid(SwapPair::new(0, 2), 8);
        assert_eq!(list.len(), 2);
        list.prune(6);
        assert_eq!(list.len(), 1);
        assert!(list.is_tabu(SwapPair::new(0, 2), 6));
        list.prune(8);
        assert!(list.is_empty());
    }

    #[test]
    fn test_apply_swap_tracks_best() {
        let mut state = SearchState::new(Permutation::identity(3), 10.0, 2);
        assert!(!state.apply_swap(SwapPair::new(0, 1), 1.0));
        assert_eq!(state.stagnation_counter, 1);
        assert_eq!(state.current.as_slice(), &[1, 0, 2]);

        state.iteration = 1;
        assert!(state.apply_swap(SwapPair::new(1, 2), -3.0));
        assert_eq!(state.best_cost, 8.0);
        assert_eq!(state.best.as_slice(), &[1, 2, 0]);
        assert_eq!(state.best_iteration, 2);
        assert_eq!(state.stagnation_counter, 0);
        assert_eq!(state.window_improvements, 1);
    }
}
