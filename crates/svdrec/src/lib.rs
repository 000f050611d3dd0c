//! # svdrec
//!
//! Truncated-SVD latent-factor recommendation model builder.
//!
//! Given sparse per-user rating histories, the builder produces a compact
//! model mapping every user and item to a low-dimensional feature vector
//! plus a diagonal weighting of feature importance, such that
//! `user · weights · item` approximates the user's baseline-adjusted
//! affinity for the item.
//!
//! ## Modules
//!
//! - `index`: dense ID-to-index mappings for the user and item universes
//! - `matrix`: baseline-normalized dense rating matrix construction
//! - `factorize`: SVD factorization and top-K truncation
//! - `model`: the immutable model aggregate
//! - `builder`: end-to-end build orchestration
//! - `data`: collaborator traits (ID sources, history stream, baseline scorer)
//! - `error`: the build failure taxonomy
//!
//! ## Example
//!
//! ```
//! use svdrec::{ConstantBaseline, Event, SvdModelBuilder, UserHistory, VecRatingData};
//!
//! let data = VecRatingData::new(
//!     vec![1, 2],
//!     vec![10, 20],
//!     vec![
//!         UserHistory::new(1, vec![
//!             Event::Rating { item_id: 10, value: 5.0, timestamp: 0 },
//!             Event::Rating { item_id: 20, value: 3.0, timestamp: 1 },
//!         ]),
//!         UserHistory::new(2, vec![
//!             Event::Rating { item_id: 10, value: 4.0, timestamp: 0 },
//!         ]),
//!     ],
//! );
//! let baseline = ConstantBaseline(3.0);
//!
//! let model = SvdModelBuilder::new(&data, &data, &data, &baseline, 1)
//!     .build()
//!     .unwrap();
//! assert_eq!(model.feature_count(), 1);
//! ```

pub mod builder;
pub mod data;
pub mod error;
pub mod factorize;
pub mod index;
pub mod matrix;
pub mod model;

// Re-export key types
pub use builder::SvdModelBuilder;
pub use data::{
    BaselineScorer, ConstantBaseline, Event, HistoryCursor, ItemIdSource, RatingHistorySource,
    UserHistory, UserIdSource, UserMeanBaseline, VecRatingData,
};
pub use error::{IdKind, Result, SvdError};
pub use factorize::{factorize, TruncatedFactors};
pub use index::IdIndexMapping;
pub use matrix::build_rating_matrix;
pub use model::SvdModel;
