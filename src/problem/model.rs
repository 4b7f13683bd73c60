//! Problem input, validation and the objective function.

use super::matrix::SquareMatrix;
use super::permutation::Permutation;
use crate::error::{InvalidProblem, MatrixKind};

/// Unvalidated problem input, as received from a caller.
///
/// # Examples
///
/// ```
/// use u_qap::problem::RawProblem;
///
/// let raw = RawProblem::new(
///     vec![vec![0.0, 1.0], vec![1.0, 0.0]],
///     vec![vec![0.0, 3.0], vec![3.0, 0.0]],
/// );
/// let problem = raw.validate().unwrap();
/// assert_eq!(problem.size(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawProblem {
    /// Slot × slot interaction weights.
    pub distance_matrix: Vec<Vec<f64>>,
    /// Agent × agent interaction weights.
    pub flow_matrix: Vec<Vec<f64>>,
    /// Agent × agent bonus for being placed close together.
    #[cfg_attr(feature = "serde", serde(default))]
    pub synergy_matrix: Option<Vec<Vec<f64>>>,
    /// Agent × agent penalty for being placed close together.
    #[cfg_attr(feature = "serde", serde(default))]
    pub conflict_matrix: Option<Vec<Vec<f64>>>,
}

impl RawProblem {
    pub fn new(distance_matrix: Vec<Vec<f64>>, flow_matrix: Vec<Vec<f64>>) -> Self {
        Self {
            distance_matrix,
            flow_matrix,
            synergy_matrix: None,
            conflict_matrix: None,
        }
    }

    pub fn with_synergy(mut self, synergy: Vec<Vec<f64>>) -> Self {
        self.synergy_matrix = Some(synergy);
        self
    }

    pub fn with_conflict(mut self, conflict: Vec<Vec<f64>>) -> Self {
        self.conflict_matrix = Some(conflict);
        self
    }

    /// Validates the input. See [`validate`].
    pub fn validate(&self) -> Result<AssignmentProblem, InvalidProblem> {
        validate(self)
    }
}

/// Checks shapes and values and builds the immutable problem.
///
/// Rejects `n == 0`, non-square matrices, dimensions that differ between
/// matrices, and non-finite entries. The distance matrix fixes `n`.
pub fn validate(raw: &RawProblem) -> Result<AssignmentProblem, InvalidProblem> {
    let n = raw.distance_matrix.len();
    if n == 0 {
        return Err(InvalidProblem::Empty);
    }

    let distance = SquareMatrix::from_rows(&raw.distance_matrix, n, MatrixKind::Distance)?;
    let flow = SquareMatrix::from_rows(&raw.flow_matrix, n, MatrixKind::Flow)?;
    let synergy = raw
        .synergy_matrix
        .as_deref()
        .map(|rows| SquareMatrix::from_rows(rows, n, MatrixKind::Synergy))
        .transpose()?;
    let conflict = raw
        .conflict_matrix
        .as_deref()
        .map(|rows| SquareMatrix::from_rows(rows, n, MatrixKind::Conflict))
        .transpose()?;

    Ok(AssignmentProblem::from_parts(distance, flow, synergy, conflict))
}

/// Synergy and conflict folded into one quadratic term.
///
/// `weights = conflict − synergy` (agent × agent) is multiplied by the slot
/// proximity `d_max − distance` (zero on the diagonal).
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    weights: SquareMatrix,
    proximity: SquareMatrix,
}

impl Interaction {
    #[inline]
    pub fn weights(&self) -> &SquareMatrix {
        &self.weights
    }

    #[inline]
    pub fn proximity(&self) -> &SquareMatrix {
        &self.proximity
    }
}

/// A validated, immutable assignment instance.
///
/// Assigning agent `a` to slot `p[a]`, the objective is
///
/// ```text
/// cost(p) = Σ_{a,b} F[a][b]·D[p[a]][p[b]]
///         − Σ_{a,b} S[a][b]·Q[p[a]][p[b]]
///         + Σ_{a,b} C[a][b]·Q[p[a]][p[b]]
/// ```
///
/// with `Q[k][l] = d_max − D[k][l]` for `k ≠ l` and `Q[k][k] = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentProblem {
    distance: SquareMatrix,
    flow: SquareMatrix,
    synergy: Option<SquareMatrix>,
    conflict: Option<SquareMatrix>,
    interaction: Option<Interaction>,
}

impl AssignmentProblem {
    /// Validates and builds a plain QAP instance (no synergy or conflict).
    pub fn new(
        distance_matrix: Vec<Vec<f64>>,
        flow_matrix: Vec<Vec<f64>>,
    ) -> Result<Self, InvalidProblem> {
        RawProblem::new(distance_matrix, flow_matrix).validate()
    }

    fn from_parts(
        distance: SquareMatrix,
        flow: SquareMatrix,
        synergy: Option<SquareMatrix>,
        conflict: Option<SquareMatrix>,
    ) -> Self {
        let n = distance.dim();
        let weights = match (&synergy, &conflict) {
            (None, None) => None,
            _ => {
                let w = SquareMatrix::from_fn(n, |a, b| {
                    let s = synergy.as_ref().map_or(0.0, |m| m.get(a, b));
                    let c = conflict.as_ref().map_or(0.0, |m| m.get(a, b));
                    c - s
                });
                (!w.is_zero()).then_some(w)
            }
        };
        let interaction = weights.map(|weights| {
            let d_max = distance.max_off_diagonal();
            let proximity = SquareMatrix::from_fn(n, |k, l| {
                if k == l {
                    0.0
                } else {
                    d_max - distance.get(k, l)
                }
            });
            Interaction { weights, proximity }
        });

        Self {
            distance,
            flow,
            synergy,
            conflict,
            interaction,
        }
    }

    /// Number of agents (and slots).
    #[inline]
    pub fn size(&self) -> usize {
        self.distance.dim()
    }

    #[inline]
    pub fn distance(&self) -> &SquareMatrix {
        &self.distance
    }

    #[inline]
    pub fn flow(&self) -> &SquareMatrix {
        &self.flow
    }

    pub fn synergy(&self) -> Option<&SquareMatrix> {
        self.synergy.as_ref()
    }

    pub fn conflict(&self) -> Option<&SquareMatrix> {
        self.conflict.as_ref()
    }

    /// The combined synergy/conflict term, `None` when it is identically zero.
    #[inline]
    pub fn interaction(&self) -> Option<&Interaction> {
        self.interaction.as_ref()
    }

    /// Cost contributed by agents `a`, `b` placed in slots `k`, `l`.
    #[inline]
    pub fn pair_cost(&self, a: usize, b: usize, k: usize, l: usize) -> f64 {
        let base = self.flow.get(a, b) * self.distance.get(k, l);
        match &self.interaction {
            Some(it) => base + it.weights.get(a, b) * it.proximity.get(k, l),
            None => base,
        }
    }

    /// Full O(n²) objective of `perm`.
    pub fn cost(&self, perm: &Permutation) -> f64 {
        debug_assert_eq!(perm.len(), self.size());
        let p = perm.as_slice();
        let n = self.size();
        let mut total = 0.0;
        for a in 0..n {
            let flow_row = self.flow.row(a);
            let dist_row = self.distance.row(p[a]);
            for b in 0..n {
                total += flow_row[b] * dist_row[p[b]];
            }
        }
        if let Some(it) = &self.interaction {
            for a in 0..n {
                let w_row = it.weights.row(a);
                let q_row = it.proximity.row(p[a]);
                for b in 0..n {
                    total += w_row[b] * q_row[p[b]];
                }
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d3() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 1.0],
            vec![2.0, 1.0, 0.0],
        ]
    }

    fn f3() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 5.0, 3.0],
            vec![5.0, 0.0, 2.0],
            vec![3.0, 2.0, 0.0],
        ]
    }

    #[test]
    fn test_validate_empty() {
        let raw = RawProblem::new(vec![], vec![]);
        assert_eq!(raw.validate().unwrap_err(), InvalidProblem::Empty);
    }

    #[test]
    fn test_validate_dimension_mismatch() {
        let raw = RawProblem::new(d3(), vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        assert_eq!(
            raw.validate().unwrap_err(),
            InvalidProblem::DimensionMismatch {
                matrix: MatrixKind::Flow,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_validate_non_square_distance() {
        let mut d = d3();
        d[2].push(7.0);
        let err = RawProblem::new(d, f3()).validate().unwrap_err();
        assert!(matches!(
            err,
            InvalidProblem::NotSquare {
                matrix: MatrixKind::Distance,
                row: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_conflict_mismatch() {
        let raw = RawProblem::new(d3(), f3()).with_conflict(vec![vec![0.0]]);
        assert!(matches!(
            raw.validate().unwrap_err(),
            InvalidProblem::DimensionMismatch {
                matrix: MatrixKind::Conflict,
                ..
            }
        ));
    }

    #[test]
    fn test_cost_textbook_qap() {
        let problem = AssignmentProblem::new(d3(), f3()).unwrap();
        let p = Permutation::from_vec(vec![1, 0, 2]).unwrap();
        // 2 * (5·D[1][0] + 3·D[1][2] + 2·D[0][2])
        assert_eq!(problem.cost(&p), 2.0 * (5.0 + 3.0 + 4.0));
    }

    #[test]
    fn test_zero_synergy_and_conflict_is_neutral() {
        let zeros = vec![vec![0.0; 3]; 3];
        let plain = AssignmentProblem::new(d3(), f3()).unwrap();
        let biased = RawProblem::new(d3(), f3())
            .with_synergy(zeros.clone())
            .with_conflict(zeros)
            .validate()
            .unwrap();
        assert!(biased.interaction().is_none());
        let p = Permutation::from_vec(vec![2, 0, 1]).unwrap();
        assert_eq!(plain.cost(&p), biased.cost(&p));
    }

    #[test]
    fn test_synergy_rewards_proximity() {
        // Agents 0 and 1 cooperate; placing them in adjacent slots (distance 1)
        // earns more than placing them at distance 2.
        let mut synergy = vec![vec![0.0; 3]; 3];
        synergy[0][1] = 10.0;
        synergy[1][0] = 10.0;
        let problem = RawProblem::new(d3(), vec![vec![0.0; 3]; 3])
            .with_synergy(synergy)
            .validate()
            .unwrap();
        let close = Permutation::from_vec(vec![0, 1, 2]).unwrap();
        let far = Permutation::from_vec(vec![0, 2, 1]).unwrap();
        // d_max = 2, so Q = 1 for adjacent slots and 0 for the far pair.
        assert_eq!(problem.cost(&close), -20.0);
        assert_eq!(problem.cost(&far), 0.0);
    }

    #[test]
    fn test_cost_matches_pair_cost_sum() {
        let mut conflict = vec![vec![0.0; 3]; 3];
        conflict[0][2] = 4.0;
        conflict[2][1] = 1.5;
        let problem = RawProblem::new(d3(), f3())
            .with_conflict(conflict)
            .validate()
            .unwrap();
        let p = Permutation::from_vec(vec![2, 1, 0]).unwrap();
        let mut expected = 0.0;
        for a in 0..3 {
            for b in 0..3 {
                expected += problem.pair_cost(a, b, p[a], p[b]);
            }
        }
        assert!((problem.cost(&p) - expected).abs() < 1e-12);
    }
}
