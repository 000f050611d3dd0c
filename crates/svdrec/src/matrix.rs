//! Dense, baseline-normalized rating matrix construction.
//!
//! Each user's ratings are normalized by subtracting the baseline estimate
//! before being written into the matrix; cells for unrated (user, item)
//! pairs stay at `0.0`. An exact-zero normalized rating is therefore
//! indistinguishable from no rating at all, which is an accepted
//! approximation of the sparse structure.

use crate::data::{BaselineScorer, Event, HistoryCursor};
use crate::error::{Result, SvdError};
use crate::index::IdIndexMapping;
use anyhow::anyhow;
use ndarray::Array2;
use std::collections::HashMap;
use tracing::info;

/// Build the `users × items` normalized rating matrix from a history stream.
///
/// Any lookup or collaborator failure aborts the whole build; the matrix is
/// never returned partially populated.
pub fn build_rating_matrix(
    users: &IdIndexMapping,
    items: &IdIndexMapping,
    cursor: &mut dyn HistoryCursor,
    baseline: &dyn BaselineScorer,
) -> Result<Array2<f64>> {
    let num_users = users.len();
    let num_items = items.len();

    info!("creating {} by {} rating matrix", num_users, num_items);
    let mut matrix = Array2::<f64>::zeros((num_users, num_items));

    while let Some(history) = cursor.next_history()? {
        let row = users.index_of(history.user_id)?;

        // Rating events only; a later rating of the same item wins.
        let mut ratings: HashMap<i64, f64> = HashMap::new();
        for event in &history.events {
            if let Event::Rating { item_id, value, .. } = event {
                ratings.insert(*item_id, *value);
            }
        }
        if ratings.is_empty() {
            continue;
        }

        let rated_items: Vec<i64> = ratings.keys().copied().collect();
        let baselines = baseline.score(history.user_id, &rated_items)?;

        for (&item_id, &raw) in &ratings {
            let base = baselines.get(&item_id).copied().ok_or_else(|| {
                SvdError::Upstream(anyhow!(
                    "baseline scorer omitted item {} for user {}",
                    item_id,
                    history.user_id
                ))
            })?;
            let col = items.index_of(item_id)?;
            matrix[[row, col]] = raw - base;
        }
    }

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ConstantBaseline, RatingHistorySource, UserHistory, VecRatingData};
    use crate::error::IdKind;
    use std::collections::HashMap as StdHashMap;

    fn rating(item_id: i64, value: f64, timestamp: i64) -> Event {
        Event::Rating {
            item_id,
            value,
            timestamp,
        }
    }

    fn mappings(users: Vec<i64>, items: Vec<i64>) -> (IdIndexMapping, IdIndexMapping) {
        (
            IdIndexMapping::from_ids(IdKind::User, users).unwrap(),
            IdIndexMapping::from_ids(IdKind::Item, items).unwrap(),
        )
    }

    #[test]
    fn test_normalized_matrix_matches_spec_scenario() {
        let (users, items) = mappings(vec![1, 2], vec![10, 20]);
        let data = VecRatingData::new(
            vec![1, 2],
            vec![10, 20],
            vec![
                UserHistory::new(1, vec![rating(10, 5.0, 0), rating(20, 3.0, 1)]),
                UserHistory::new(2, vec![rating(10, 4.0, 0)]),
            ],
        );

        let mut cursor = data.stream_histories_by_user().unwrap();
        let matrix =
            build_rating_matrix(&users, &items, cursor.as_mut(), &ConstantBaseline(3.0)).unwrap();

        assert_eq!(matrix.dim(), (2, 2));
        assert_eq!(matrix[[0, 0]], 2.0);
        assert_eq!(matrix[[0, 1]], 0.0);
        assert_eq!(matrix[[1, 0]], 1.0);
        assert_eq!(matrix[[1, 1]], 0.0);
    }

    #[test]
    fn test_unrated_user_leaves_zero_row() {
        let (users, items) = mappings(vec![1, 2], vec![10]);
        let data = VecRatingData::new(
            vec![1, 2],
            vec![10],
            vec![
                UserHistory::new(1, vec![rating(10, 4.0, 0)]),
                UserHistory::new(
                    2,
                    vec![Event::View {
                        item_id: 10,
                        timestamp: 0,
                    }],
                ),
            ],
        );

        let mut cursor = data.stream_histories_by_user().unwrap();
        let matrix =
            build_rating_matrix(&users, &items, cursor.as_mut(), &ConstantBaseline(3.0)).unwrap();

        assert_eq!(matrix[[1, 0]], 0.0);
    }

    #[test]
    fn test_duplicate_rating_last_write_wins() {
        let (users, items) = mappings(vec![1], vec![10]);
        let data = VecRatingData::new(
            vec![1],
            vec![10],
            vec![UserHistory::new(
                1,
                vec![rating(10, 2.0, 0), rating(10, 5.0, 1)],
            )],
        );

        let mut cursor = data.stream_histories_by_user().unwrap();
        let matrix =
            build_rating_matrix(&users, &items, cursor.as_mut(), &ConstantBaseline(3.0)).unwrap();

        assert_eq!(matrix[[0, 0]], 2.0);
    }

    #[test]
    fn test_unknown_item_aborts_build() {
        let (users, items) = mappings(vec![1], vec![10]);
        let data = VecRatingData::new(
            vec![1],
            vec![10],
            vec![UserHistory::new(1, vec![rating(99, 4.0, 0)])],
        );

        let mut cursor = data.stream_histories_by_user().unwrap();
        let result =
            build_rating_matrix(&users, &items, cursor.as_mut(), &ConstantBaseline(3.0));

        match result {
            Err(SvdError::UnknownId { kind, id }) => {
                assert_eq!(kind, IdKind::Item);
                assert_eq!(id, 99);
            }
            other => panic!("expected UnknownId, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_user_aborts_build() {
        let (users, items) = mappings(vec![1], vec![10]);
        let data = VecRatingData::new(
            vec![1],
            vec![10],
            vec![UserHistory::new(7, vec![rating(10, 4.0, 0)])],
        );

        let mut cursor = data.stream_histories_by_user().unwrap();
        let result =
            build_rating_matrix(&users, &items, cursor.as_mut(), &ConstantBaseline(3.0));

        assert!(matches!(
            result,
            Err(SvdError::UnknownId {
                kind: IdKind::User,
                id: 7
            })
        ));
    }

    /// Baseline that silently drops one of the requested items.
    struct IncompleteBaseline;

    impl BaselineScorer for IncompleteBaseline {
        fn score(&self, _user_id: i64, item_ids: &[i64]) -> anyhow::Result<StdHashMap<i64, f64>> {
            Ok(item_ids
                .iter()
                .skip(1)
                .map(|&item| (item, 0.0))
                .collect())
        }
    }

    #[test]
    fn test_baseline_omitting_an_item_is_upstream_error() {
        let (users, items) = mappings(vec![1], vec![10, 20]);
        let data = VecRatingData::new(
            vec![1],
            vec![10, 20],
            vec![UserHistory::new(
                1,
                vec![rating(10, 4.0, 0), rating(20, 2.0, 1)],
            )],
        );

        let mut cursor = data.stream_histories_by_user().unwrap();
        let result = build_rating_matrix(&users, &items, cursor.as_mut(), &IncompleteBaseline);

        assert!(matches!(result, Err(SvdError::Upstream(_))));
    }
}
