//! The immutable truncated-SVD model produced by a build.

use crate::error::{Result, SvdError};
use crate::index::IdIndexMapping;
use ndarray::{Array2, ArrayView1};

/// Latent-factor model: user/item index mappings plus the truncated
/// `U`, `V` and weight matrices. Read-only after assembly; downstream
/// scoring approximates a user's baseline-adjusted affinity for an item as
/// `user_vector · weights · item_vector`.
#[derive(Debug, Clone)]
pub struct SvdModel {
    user_mapping: IdIndexMapping,
    item_mapping: IdIndexMapping,
    user_features: Array2<f64>,
    item_features: Array2<f64>,
    feature_weights: Array2<f64>,
}

impl SvdModel {
    /// Package mappings and factor matrices into a model, validating that
    /// their dimensions agree. A mismatch here means a defect in the build
    /// pipeline itself, never bad input data.
    pub(crate) fn assemble(
        user_mapping: IdIndexMapping,
        item_mapping: IdIndexMapping,
        user_features: Array2<f64>,
        item_features: Array2<f64>,
        feature_weights: Array2<f64>,
    ) -> Result<Self> {
        let k = user_features.ncols();

        if user_features.nrows() != user_mapping.len() {
            return Err(SvdError::InternalConsistency(format!(
                "user feature rows {} != user count {}",
                user_features.nrows(),
                user_mapping.len()
            )));
        }
        if item_features.nrows() != item_mapping.len() {
            return Err(SvdError::InternalConsistency(format!(
                "item feature rows {} != item count {}",
                item_features.nrows(),
                item_mapping.len()
            )));
        }
        if item_features.ncols() != k {
            return Err(SvdError::InternalConsistency(format!(
                "item feature columns {} != user feature columns {k}",
                item_features.ncols()
            )));
        }
        if feature_weights.dim() != (k, k) {
            return Err(SvdError::InternalConsistency(format!(
                "weight matrix is {:?}, expected ({k}, {k})",
                feature_weights.dim()
            )));
        }

        Ok(Self {
            user_mapping,
            item_mapping,
            user_features,
            item_features,
            feature_weights,
        })
    }

    /// Number of latent features retained by truncation.
    pub fn feature_count(&self) -> usize {
        self.user_features.ncols()
    }

    pub fn user_count(&self) -> usize {
        self.user_mapping.len()
    }

    pub fn item_count(&self) -> usize {
        self.item_mapping.len()
    }

    pub fn lookup_user_index(&self, user_id: i64) -> Result<usize> {
        self.user_mapping.index_of(user_id)
    }

    pub fn lookup_item_index(&self, item_id: i64) -> Result<usize> {
        self.item_mapping.index_of(item_id)
    }

    pub fn user_mapping(&self) -> &IdIndexMapping {
        &self.user_mapping
    }

    pub fn item_mapping(&self) -> &IdIndexMapping {
        &self.item_mapping
    }

    /// Feature vector for the user at `index`.
    ///
    /// Panics if `index >= user_count()`.
    pub fn user_feature_vector(&self, index: usize) -> ArrayView1<'_, f64> {
        self.user_features.row(index)
    }

    /// Feature vector for the item at `index`.
    ///
    /// Panics if `index >= item_count()`.
    pub fn item_feature_vector(&self, index: usize) -> ArrayView1<'_, f64> {
        self.item_features.row(index)
    }

    /// Weight (singular value) of the feature at `index`.
    ///
    /// Panics if `index >= feature_count()`.
    pub fn feature_weight(&self, index: usize) -> f64 {
        self.feature_weights[[index, index]]
    }
}
