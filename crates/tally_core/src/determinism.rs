//! Determinism utilities: ordered summation and matrix reshaping.
//!
//! Every accumulation in the engine is a left fold in input order, so the
//! same input always produces bit-identical floats.

/// Left-fold sum in iteration order.
#[inline]
pub fn ordered_sum<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values.into_iter().fold(0.0, |acc, v| acc + v)
}

/// `rows × cols` matrix of zeros.
pub fn zero_matrix(rows: usize, cols: usize) -> Vec<Vec<f64>> {
    vec![vec![0.0; cols]; rows]
}

/// Row-major flattening.
pub fn flatten(matrix: &[Vec<f64>]) -> Vec<f64> {
    matrix.iter().flat_map(|row| row.iter().copied()).collect()
}

/// Rebuild rows with the widths of `shape`, consuming `flat` in row-major order.
/// Cells past the end of `flat` are zero.
pub fn reshape_like(flat: &[f64], shape: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let mut it = flat.iter().copied();
    shape
        .iter()
        .map(|row| row.iter().map(|_| it.next().unwrap_or(0.0)).collect())
        .collect()
}
