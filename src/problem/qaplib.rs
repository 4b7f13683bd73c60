//! Reader for the QAPLIB instance format.
//!
//! A QAPLIB `.dat` file holds the size `n` followed by two `n × n` matrices
//! `A` and `B`, all whitespace-separated. QAPLIB scores a permutation `p` as
//! `Σ A[i][j]·B[p(i)][p(j)]`, so `A` becomes the flow matrix and `B` the
//! distance matrix; published QAPLIB solutions (1-based) then map directly
//! onto [`Permutation`](super::Permutation) after subtracting one.
//!
//! # Reference
//!
//! Burkard, R. E., Karisch, S. E., Rendl, F. (1997). "QAPLIB – A Quadratic
//! Assignment Problem Library", *Journal of Global Optimization* 10, 391-403.

use super::model::RawProblem;
use crate::error::ParseError;

/// Parses QAPLIB text into a [`RawProblem`].
///
/// ```
/// use u_qap::problem::qaplib;
///
/// let raw = qaplib::parse("2\n0 1\n1 0\n\n0 4\n4 0\n").unwrap();
/// assert_eq!(raw.flow_matrix, vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
/// assert_eq!(raw.distance_matrix, vec![vec![0.0, 4.0], vec![4.0, 0.0]]);
/// ```
pub fn parse(text: &str) -> Result<RawProblem, ParseError> {
    let mut tokens = text.split_whitespace().enumerate();

    let (_, size_token) = tokens.next().ok_or(ParseError::MissingSize)?;
    let n: usize = size_token
        .parse()
        .map_err(|_| ParseError::InvalidNumber {
            token: size_token.to_string(),
            position: 0,
        })?;

    // Entries are only allocated as they are read, so a huge header fails
    // as truncated rather than reserving memory up front.
    let expected = n
        .checked_mul(n)
        .and_then(|cells| cells.checked_mul(2))
        .ok_or(ParseError::SizeTooLarge { size: n })?;
    let mut values = Vec::new();
    for (position, token) in tokens.take(expected) {
        let v: f64 = token.parse().map_err(|_| ParseError::InvalidNumber {
            token: token.to_string(),
            position,
        })?;
        values.push(v);
    }
    if values.len() < expected {
        return Err(ParseError::Truncated {
            expected,
            found: values.len(),
        });
    }

    let (a, b) = values.split_at(n * n);
    Ok(RawProblem::new(to_rows(b, n), to_rows(a, n)))
}

fn to_rows(flat: &[f64], n: usize) -> Vec<Vec<f64>> {
    if n == 0 {
        return Vec::new();
    }
    flat.chunks(n).map(<[f64]>::to_vec).collect()
}
