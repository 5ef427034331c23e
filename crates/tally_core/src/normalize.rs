//! Normalization utility shared by every voting method.
//!
//! - One fixed epsilon (`1e-7`, absolute) decides "is zero" everywhere.
//! - `percentage_of_sum` is total: a zero value or a near-zero pool yields
//!   `0`, never a division. Only the pool is held to the epsilon; a tiny
//!   non-zero value keeps its share.
//! - `redistribute` rescales a pool so it sums to `total` (when the pool is
//!   non-zero); `redistribute_matrix` does the same with percentages taken
//!   against the flattened matrix.

use crate::determinism::{flatten, ordered_sum, reshape_like};

/// Absolute tolerance for zero/equality decisions.
pub const EPSILON: f64 = 1e-7;

#[inline]
pub fn is_zero(x: f64) -> bool {
    x.abs() < EPSILON
}

#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    is_zero(a - b)
}

#[inline]
fn share(value: f64, sum: f64) -> f64 {
    if value == 0.0 || is_zero(sum) {
        0.0
    } else {
        value / sum
    }
}

/// `value / Σ values`, or `0` for a zero value or a near-zero Σ. Σ is taken in slice order.
pub fn percentage_of_sum(value: f64, values: &[f64]) -> f64 {
    share(value, ordered_sum(values.iter().copied()))
}

/// Elementwise `p * total`.
pub fn reduced_scores(total: f64, percentages: &[f64]) -> Vec<f64> {
    percentages.iter().map(|p| p * total).collect()
}

/// Each element's percentage of the pool, reduced against `total`.
pub fn redistribute(pool: &[f64], total: f64) -> Vec<f64> {
    let sum = ordered_sum(pool.iter().copied());
    let pct: Vec<f64> = pool.iter().map(|v| share(*v, sum)).collect();
    reduced_scores(total, &pct)
}

/// Like `redistribute`, pooling every cell of the matrix together.
pub fn redistribute_matrix(matrix: &[Vec<f64>], total: f64) -> Vec<Vec<f64>> {
    let flat = flatten(matrix);
    reshape_like(&redistribute(&flat, total), matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_basic() {
        assert!(approx_eq(percentage_of_sum(1.0, &[1.0, 3.0]), 0.25));
        assert!(approx_eq(percentage_of_sum(3.0, &[1.0, 3.0]), 0.75));
    }

    #[test]
    fn zero_value_or_zero_sum_gives_zero() {
        assert_eq!(percentage_of_sum(0.0, &[1.0, 3.0]), 0.0);
        assert_eq!(percentage_of_sum(5e-8, &[5e-8, 4e-8]), 0.0);
        assert_eq!(percentage_of_sum(2.0, &[]), 0.0);
        assert_eq!(percentage_of_sum(2.0, &[1.0, -1.0]), 0.0);
    }

    #[test]
    fn tiny_value_keeps_its_share() {
        assert_eq!(percentage_of_sum(5e-8, &[1.0]), 5e-8);
        assert!(approx_eq(percentage_of_sum(5e-8, &[5e-8, 5e-8, 5e-8]), 1.0 / 3.0));
    }

    #[test]
    fn redistribute_keeps_small_entries() {
        let out = redistribute(&[7.5e-8; 4], 3e-7);
        assert!(out.iter().all(|&x| x > 0.0));
        let sum: f64 = out.iter().sum();
        assert!((sum / 3e-7 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn reduced_is_elementwise_product() {
        assert_eq!(reduced_scores(10.0, &[0.25, 0.75]), vec![2.5, 7.5]);
        assert!(reduced_scores(10.0, &[]).is_empty());
    }

    #[test]
    fn redistribute_conserves_total() {
        let out = redistribute(&[1.0, 2.0, 5.0], 4.0);
        assert!(approx_eq(out.iter().sum::<f64>(), 4.0));
        assert!(approx_eq(out[2], 2.5));
        assert_eq!(redistribute(&[0.0, 0.0], 4.0), vec![0.0, 0.0]);
    }

    #[test]
    fn matrix_pools_all_cells() {
        let m = vec![vec![1.0, 1.0], vec![2.0, 0.0]];
        let out = redistribute_matrix(&m, 8.0);
        assert_eq!(out.len(), 2);
        assert!(approx_eq(out[0][0], 2.0));
        assert!(approx_eq(out[1][0], 4.0));
        assert_eq!(out[1][1], 0.0);
        let total: f64 = out.iter().flatten().sum();
        assert!(approx_eq(total, 8.0));
    }

    #[test]
    fn epsilon_boundaries() {
        assert!(is_zero(9.9e-8));
        assert!(!is_zero(1e-7));
        assert!(approx_eq(1.0, 1.0 + 5e-8));
        assert!(!approx_eq(1.0, 1.0 + 2e-7));
    }
}
