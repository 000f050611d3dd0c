//! Collaborator contracts the model builder consumes.
//!
//! The core never talks to storage directly; it depends on these traits and
//! on a baseline scorer. Concrete backends (database-backed, service-backed)
//! live with the caller. In-memory implementations are provided here both as
//! reference wiring and as test fixtures.

use anyhow::Result;
use std::collections::HashMap;

/// A single event in a user's history, in stream order.
///
/// Only `Rating` events participate in model building; other kinds are
/// filtered out by the rating-matrix builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Rating {
        item_id: i64,
        value: f64,
        timestamp: i64,
    },
    View {
        item_id: i64,
        timestamp: i64,
    },
}

/// One user's complete event history, events in stream order.
#[derive(Debug, Clone)]
pub struct UserHistory {
    pub user_id: i64,
    pub events: Vec<Event>,
}

impl UserHistory {
    pub fn new(user_id: i64, events: Vec<Event>) -> Self {
        Self { user_id, events }
    }
}

/// Enumerates the complete user ID universe.
pub trait UserIdSource {
    /// Ordered sequence of unique user IDs.
    fn all_user_ids(&self) -> Result<Vec<i64>>;
}

/// Enumerates the complete item ID universe.
pub trait ItemIdSource {
    /// Ordered sequence of unique item IDs.
    fn all_item_ids(&self) -> Result<Vec<i64>>;
}

/// Single-pass cursor over per-user histories.
///
/// The cursor is a scoped resource: dropping it releases any underlying
/// data-access handle, so consumers get close-on-every-exit-path for free by
/// keeping it inside one scope.
pub trait HistoryCursor {
    /// The next user's history, or `None` when the stream is exhausted.
    fn next_history(&mut self) -> Result<Option<UserHistory>>;
}

/// Opens lazy, finite streams of rating histories, one entry per user.
pub trait RatingHistorySource {
    fn stream_histories_by_user(&self) -> Result<Box<dyn HistoryCursor + '_>>;
}

/// Supplies a per-item baseline estimate (typically a mean) used to
/// normalize raw ratings before factorization.
pub trait BaselineScorer {
    /// Score exactly the requested item set for `user_id`. The returned map
    /// must cover every requested item.
    fn score(&self, user_id: i64, item_ids: &[i64]) -> Result<HashMap<i64, f64>>;
}

/// In-memory data source backing all three data-access traits.
///
/// Histories are returned in insertion order; each call to
/// [`RatingHistorySource::stream_histories_by_user`] opens a fresh pass.
#[derive(Debug, Clone, Default)]
pub struct VecRatingData {
    pub user_ids: Vec<i64>,
    pub item_ids: Vec<i64>,
    pub histories: Vec<UserHistory>,
}

impl VecRatingData {
    pub fn new(user_ids: Vec<i64>, item_ids: Vec<i64>, histories: Vec<UserHistory>) -> Self {
        Self {
            user_ids,
            item_ids,
            histories,
        }
    }
}

impl UserIdSource for VecRatingData {
    fn all_user_ids(&self) -> Result<Vec<i64>> {
        Ok(self.user_ids.clone())
    }
}

impl ItemIdSource for VecRatingData {
    fn all_item_ids(&self) -> Result<Vec<i64>> {
        Ok(self.item_ids.clone())
    }
}

struct VecHistoryCursor<'a> {
    remaining: std::slice::Iter<'a, UserHistory>,
}

impl HistoryCursor for VecHistoryCursor<'_> {
    fn next_history(&mut self) -> Result<Option<UserHistory>> {
        Ok(self.remaining.next().cloned())
    }
}

impl RatingHistorySource for VecRatingData {
    fn stream_histories_by_user(&self) -> Result<Box<dyn HistoryCursor + '_>> {
        Ok(Box::new(VecHistoryCursor {
            remaining: self.histories.iter(),
        }))
    }
}

/// Baseline scorer returning the same value for every (user, item) pair.
#[derive(Debug, Clone, Copy)]
pub struct ConstantBaseline(pub f64);

impl BaselineScorer for ConstantBaseline {
    fn score(&self, _user_id: i64, item_ids: &[i64]) -> Result<HashMap<i64, f64>> {
        Ok(item_ids.iter().map(|&item| (item, self.0)).collect())
    }
}

/// Per-user mean-rating baseline with a global-mean fallback for users
/// without ratings.
#[derive(Debug, Clone)]
pub struct UserMeanBaseline {
    user_means: HashMap<i64, f64>,
    global_mean: f64,
}

impl UserMeanBaseline {
    /// Precompute means from the given histories. Users whose history holds
    /// no rating events fall back to the global mean; with no ratings at all
    /// the global mean is `0.0`.
    pub fn from_histories(histories: &[UserHistory]) -> Self {
        let mut user_means = HashMap::new();
        let mut global_sum = 0.0;
        let mut global_count = 0usize;

        for history in histories {
            let mut sum = 0.0;
            let mut count = 0usize;
            for event in &history.events {
                if let Event::Rating { value, .. } = event {
                    sum += value;
                    count += 1;
                }
            }
            if count > 0 {
                user_means.insert(history.user_id, sum / count as f64);
                global_sum += sum;
                global_count += count;
            }
        }

        let global_mean = if global_count > 0 {
            global_sum / global_count as f64
        } else {
            0.0
        };

        Self {
            user_means,
            global_mean,
        }
    }

    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }
}

impl BaselineScorer for UserMeanBaseline {
    fn score(&self, user_id: i64, item_ids: &[i64]) -> Result<HashMap<i64, f64>> {
        let mean = self
            .user_means
            .get(&user_id)
            .copied()
            .unwrap_or(self.global_mean);
        Ok(item_ids.iter().map(|&item| (item, mean)).collect())
    }
}
