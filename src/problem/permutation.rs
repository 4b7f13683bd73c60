//! Agent-to-slot permutation.

use std::ops::Index;

/// A bijection mapping agent index to slot index.
///
/// Every slot in `0..n` is used exactly once. The type only hands out
/// operations that preserve this (construction is checked, mutation is
/// limited to swaps), so a broken bijection is a bug in this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<usize>", into = "Vec<usize>")
)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// The identity assignment: agent `i` sits in slot `i`.
    pub fn identity(n: usize) -> Self {
        Self((0..n).collect())
    }

    /// Wraps `slots` if it is a bijection on `0..slots.len()`.
    ///
    /// ```
    /// use u_qap::problem::Permutation;
    ///
    /// assert!(Permutation::from_vec(vec![2, 0, 1]).is_some());
    /// assert!(Permutation::from_vec(vec![0, 0, 1]).is_none());
    /// ```
    pub fn from_vec(slots: Vec<usize>) -> Option<Self> {
        if is_bijection(&slots) {
            Some(Self(slots))
        } else {
            None
        }
    }

    /// Wraps `slots` built by code that guarantees the bijection.
    pub(crate) fn from_vec_unchecked(slots: Vec<usize>) -> Self {
        debug_assert!(is_bijection(&slots), "not a permutation: {slots:?}");
        Self(slots)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Slot assigned to `agent`.
    #[inline]
    pub fn slot(&self, agent: usize) -> usize {
        self.0[agent]
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Exchanges the slots of agents `i` and `j`.
    #[inline]
    pub fn swap(&mut self, i: usize, j: usize) {
        self.0.swap(i, j);
    }

    /// Slot-to-agent view of the same assignment.
    pub fn inverse(&self) -> Self {
        let mut inv = vec![0; self.0.len()];
        for (agent, &slot) in self.0.iter().enumerate() {
            inv[slot] = agent;
        }
        Self(inv)
    }

    /// Re-checks the bijection invariant.
    pub fn is_valid(&self) -> bool {
        is_bijection(&self.0)
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

impl Index<usize> for Permutation {
    type Output = usize;

    #[inline]
    fn index(&self, agent: usize) -> &usize {
        &self.0[agent]
    }
}

impl TryFrom<Vec<usize>> for Permutation {
    type Error = &'static str;

    fn try_from(slots: Vec<usize>) -> Result<Self, Self::Error> {
        Self::from_vec(slots).ok_or("not a permutation of 0..n")
    }
}

impl From<Permutation> for Vec<usize> {
    fn from(p: Permutation) -> Self {
        p.0
    }
}

fn is_bijection(slots: &[usize]) -> bool {
    let n = slots.len();
    let mut seen = vec![false; n];
    for &s in slots {
        if s >= n || seen[s] {
            return false;
        }
        seen[s] = true;
    }
    true
}
