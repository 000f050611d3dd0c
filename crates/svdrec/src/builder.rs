//! Orchestration of a full model build.
//!
//! The build is a single synchronous batch computation: index the user and
//! item universes, populate the normalized rating matrix from the history
//! stream, factorize, truncate, assemble. Every stage failure is fatal; the
//! caller either gets one complete model or an error.

use crate::data::{BaselineScorer, ItemIdSource, RatingHistorySource, UserIdSource};
use crate::error::{IdKind, Result, SvdError};
use crate::factorize::factorize;
use crate::index::IdIndexMapping;
use crate::matrix::build_rating_matrix;
use crate::model::SvdModel;
use tracing::debug;

/// Builds [`SvdModel`]s from injected data-access and baseline collaborators.
///
/// Holds no state between builds; each [`build`](Self::build) call allocates
/// its own mappings and matrices, so concurrent builds from separate builder
/// instances never alias.
pub struct SvdModelBuilder<'a> {
    user_source: &'a dyn UserIdSource,
    item_source: &'a dyn ItemIdSource,
    history_source: &'a dyn RatingHistorySource,
    baseline: &'a dyn BaselineScorer,
    feature_count: usize,
}

impl<'a> SvdModelBuilder<'a> {
    pub fn new(
        user_source: &'a dyn UserIdSource,
        item_source: &'a dyn ItemIdSource,
        history_source: &'a dyn RatingHistorySource,
        baseline: &'a dyn BaselineScorer,
        feature_count: usize,
    ) -> Self {
        Self {
            user_source,
            item_source,
            history_source,
            baseline,
            feature_count,
        }
    }

    /// Run the build end to end.
    pub fn build(&self) -> Result<SvdModel> {
        if self.feature_count == 0 {
            return Err(SvdError::InvalidFeatureCount);
        }

        let user_mapping = IdIndexMapping::from_ids(IdKind::User, self.user_source.all_user_ids()?)?;
        debug!("indexed {} users", user_mapping.len());
        let item_mapping = IdIndexMapping::from_ids(IdKind::Item, self.item_source.all_item_ids()?)?;
        debug!("indexed {} items", item_mapping.len());

        // The cursor lives only for this block, so the underlying data-access
        // handle is released on every exit path, error or not.
        let matrix = {
            let mut cursor = self.history_source.stream_histories_by_user()?;
            build_rating_matrix(&user_mapping, &item_mapping, cursor.as_mut(), self.baseline)?
        };

        let factors = factorize(&matrix, self.feature_count)?;
        debug!("truncated to {} latent features", self.feature_count);

        SvdModel::assemble(
            user_mapping,
            item_mapping,
            factors.user_features,
            factors.item_features,
            factors.feature_weights,
        )
    }
}
