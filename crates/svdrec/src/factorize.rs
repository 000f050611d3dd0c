//! Full SVD factorization and top-K truncation.
//!
//! The decomposition itself is delegated to nalgebra's dense SVD kernel; this
//! module owns the truncation policy. Singular values coming back from the
//! kernel are re-sorted here rather than trusted: ordering guarantees differ
//! across numeric libraries and versions, and the top-K-by-magnitude policy
//! must stay reproducible.

use crate::error::{Result, SvdError};
use nalgebra::DMatrix;
use ndarray::Array2;
use tracing::debug;

/// The truncated factors of a normalized rating matrix.
///
/// Column `j` of each matrix corresponds to the `j`-th largest singular
/// value; `feature_weights` is diagonal with those values on the diagonal,
/// non-increasing.
#[derive(Debug, Clone)]
pub struct TruncatedFactors {
    /// `users × K`
    pub user_features: Array2<f64>,
    /// `items × K`
    pub item_features: Array2<f64>,
    /// `K × K` diagonal
    pub feature_weights: Array2<f64>,
}

/// Rank singular values descending by magnitude, stable on ties.
///
/// Returns `(original_index, value)` pairs; equal values keep their original
/// relative order so truncation is deterministic given a deterministic kernel.
pub(crate) fn rank_singular_values(values: &[f64]) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// Factorize `matrix` and truncate to the top `feature_count` components.
pub fn factorize(matrix: &Array2<f64>, feature_count: usize) -> Result<TruncatedFactors> {
    let (num_users, num_items) = matrix.dim();
    let rank_bound = num_users.min(num_items);
    if feature_count > rank_bound {
        return Err(SvdError::InsufficientRank {
            requested: feature_count,
            available: rank_bound,
        });
    }

    // Hand the dense matrix to the kernel. ndarray iterates row-major, which
    // is what from_row_iterator expects.
    let dense = DMatrix::from_row_iterator(num_users, num_items, matrix.iter().copied());
    let svd = nalgebra::SVD::try_new(dense, true, true, f64::EPSILON, 0).ok_or_else(|| {
        SvdError::InternalConsistency("svd kernel failed to converge".to_string())
    })?;

    let u = svd
        .u
        .ok_or_else(|| SvdError::InternalConsistency("svd kernel produced no U".to_string()))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| SvdError::InternalConsistency("svd kernel produced no V".to_string()))?;

    let singular_values: Vec<f64> = svd.singular_values.iter().copied().collect();
    let ranked = rank_singular_values(&singular_values);
    debug!(
        "factorized {}x{} matrix, keeping {} of {} components",
        num_users,
        num_items,
        feature_count,
        ranked.len()
    );

    let mut user_features = Array2::<f64>::zeros((num_users, feature_count));
    let mut item_features = Array2::<f64>::zeros((num_items, feature_count));
    let mut feature_weights = Array2::<f64>::zeros((feature_count, feature_count));

    for (target, &(source, value)) in ranked.iter().take(feature_count).enumerate() {
        for row in 0..num_users {
            user_features[[row, target]] = u[(row, source)];
        }
        // v_t rows are components; column i of v_t is item i's loading.
        for row in 0..num_items {
            item_features[[row, target]] = v_t[(source, row)];
        }
        feature_weights[[target, target]] = value;
    }

    Ok(TruncatedFactors {
        user_features,
        item_features,
        feature_weights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_rank_sorts_descending() {
        let ranked = rank_singular_values(&[1.0, 3.0, 2.0]);
        assert_eq!(ranked, vec![(1, 3.0), (2, 2.0), (0, 1.0)]);
    }

    #[test]
    fn test_rank_ties_keep_original_order() {
        let ranked = rank_singular_values(&[2.0, 5.0, 2.0, 5.0]);
        assert_eq!(ranked, vec![(1, 5.0), (3, 5.0), (0, 2.0), (2, 2.0)]);
    }

    #[test]
    fn test_weights_are_non_increasing() {
        let matrix = array![
            [1.0, 0.0, 0.0],
            [0.0, 3.0, 0.0],
            [0.0, 0.0, 2.0],
        ];
        let factors = factorize(&matrix, 3).unwrap();

        let w0 = factors.feature_weights[[0, 0]];
        let w1 = factors.feature_weights[[1, 1]];
        let w2 = factors.feature_weights[[2, 2]];
        assert!((w0 - 3.0).abs() < 1e-9);
        assert!((w1 - 2.0).abs() < 1e-9);
        assert!((w2 - 1.0).abs() < 1e-9);
        assert!(w0 >= w1 && w1 >= w2);

        // Off-diagonal entries stay zero.
        assert_eq!(factors.feature_weights[[0, 1]], 0.0);
        assert_eq!(factors.feature_weights[[2, 0]], 0.0);
    }

    #[test]
    fn test_truncation_dimensions() {
        let matrix = array![
            [2.0, 0.0, 1.0],
            [1.0, 1.0, 0.0],
        ];
        let factors = factorize(&matrix, 1).unwrap();

        assert_eq!(factors.user_features.dim(), (2, 1));
        assert_eq!(factors.item_features.dim(), (3, 1));
        assert_eq!(factors.feature_weights.dim(), (1, 1));
        assert!(factors.feature_weights[[0, 0]] >= 0.0);
    }

    #[test]
    fn test_feature_count_beyond_rank_bound_fails() {
        let matrix = array![[2.0, 0.0], [1.0, 0.0]];
        match factorize(&matrix, 3) {
            Err(SvdError::InsufficientRank {
                requested,
                available,
            }) => {
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected InsufficientRank, got {other:?}"),
        }
    }

    #[test]
    fn test_full_rank_reconstruction() {
        let matrix = array![
            [2.0, 0.0],
            [1.0, 0.0],
            [0.0, -1.5],
        ];
        let factors = factorize(&matrix, 2).unwrap();

        let reconstructed = factors
            .user_features
            .dot(&factors.feature_weights)
            .dot(&factors.item_features.t());

        for ((row, col), &expected) in matrix.indexed_iter() {
            assert!(
                (reconstructed[[row, col]] - expected).abs() < 1e-6,
                "cell ({row}, {col}): {} vs {expected}",
                reconstructed[[row, col]]
            );
        }
    }
}
