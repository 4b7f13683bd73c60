//! Incremental swap deltas.
//!
//! Swapping the slots of agents `r` and `s` only changes terms that touch
//! `r` or `s`, so the cost change of one swap costs O(n) instead of the
//! O(n²) of a full re-evaluation. The formula below is the general
//! (asymmetric) Koopmans–Beckmann swap delta, applied once to the
//! flow/distance term and once to the interaction/proximity term.
//!
//! # Reference
//!
//! Taillard, É. (1991). "Robust taboo search for the quadratic assignment
//! problem", *Parallel Computing* 17, 443-455.

use crate::problem::{AssignmentProblem, SquareMatrix};

/// Unordered swap pair, stored with `i < j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SwapPair {
    pub i: usize,
    pub j: usize,
}

impl SwapPair {
    /// Normalizes the order of `a` and `b`.
    ///
    /// # Panics
    /// Debug builds panic if `a == b`.
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        debug_assert_ne!(a, b, "swap pair needs two distinct agents");
        if a < b {
            Self { i: a, j: b }
        } else {
            Self { i: b, j: a }
        }
    }
}

/// Cost change of swapping the slots of agents `r` and `s` in `perm`.
#[inline]
pub fn swap_delta(problem: &AssignmentProblem, perm: &[usize], r: usize, s: usize) -> f64 {
    let mut delta = kb_swap_delta(problem.flow(), problem.distance(), perm, r, s);
    if let Some(it) = problem.interaction() {
        delta += kb_swap_delta(it.weights(), it.proximity(), perm, r, s);
    }
    delta
}

/// Delta of `Σ A[a][b]·B[p[a]][p[b]]` when `p[r]` and `p[s]` are exchanged.
fn kb_swap_delta(a: &SquareMatrix, b: &SquareMatrix, p: &[usize], r: usize, s: usize) -> f64 {
    let (pr, ps) = (p[r], p[s]);
    let mut delta = (a.get(r, r) - a.get(s, s)) * (b.get(ps, ps) - b.get(pr, pr))
        + (a.get(r, s) - a.get(s, r)) * (b.get(ps, pr) - b.get(pr, ps));

    let (a_r, a_s) = (a.row(r), a.row(s));
    let (b_pr, b_ps) = (b.row(pr), b.row(ps));
    for (k, &pk) in p.iter().enumerate() {
        if k == r || k == s {
            continue;
        }
        let b_pk = b.row(pk);
        delta += (a.get(k, r) - a.get(k, s)) * (b_pk[ps] - b_pk[pr])
            + (a_r[k] - a_s[k]) * (b_ps[pk] - b_pr[pk]);
    }
    delta
}

/// Deltas for every swap pair, in lexicographic `(i, j)` order.
///
/// The buffer is the strict upper triangle of an `n × n` matrix, flattened
/// row by row: row `i` holds pairs `(i, i+1) .. (i, n-1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapDeltas {
    n: usize,
    values: Vec<f64>,
}

impl SwapDeltas {
    /// Zeroed buffer for an instance of size `n`.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            values: vec![0.0; pair_count(n)],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    /// Number of swap pairs, `n(n-1)/2`.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Delta of swapping `pair`.
    #[inline]
    pub fn get(&self, pair: SwapPair) -> f64 {
        self.values[pair_index(self.n, pair)]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Iterates `(pair, delta)` in lexicographic pair order.
    pub fn iter(&self) -> impl Iterator<Item = (SwapPair, f64)> + '_ {
        let n = self.n;
        (0..n)
            .flat_map(move |i| ((i + 1)..n).map(move |j| SwapPair { i, j }))
            .zip(self.values.iter().copied())
    }
}

/// `n(n-1)/2`.
#[inline]
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Position of `pair` in the flattened triangle.
#[inline]
pub fn pair_index(n: usize, pair: SwapPair) -> usize {
    let SwapPair { i, j } = pair;
    debug_assert!(i < j && j < n);
    i * (2 * n - i - 1) / 2 + (j - i - 1)
}

/// Inverse of [`pair_index`].
pub fn pair_at(n: usize, mut index: usize) -> SwapPair {
    for i in 0..n {
        let row_len = n - i - 1;
        if index < row_len {
            return SwapPair {
                i,
                j: i + 1 + index,
            };
        }
        index -= row_len;
    }
    panic!("pair index out of range for n = {n}");
}
