use std::fmt;

pub type Result<T> = std::result::Result<T, SvdError>;

/// Which ID universe a lookup failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    User,
    Item,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdKind::User => write!(f, "user"),
            IdKind::Item => write!(f, "item"),
        }
    }
}

/// Failures a model build can surface. All of these are fatal to the build:
/// no retries happen and no partial model is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum SvdError {
    #[error("duplicate {kind} id in enumeration: {id}")]
    DuplicateId { kind: IdKind, id: i64 },

    #[error("feature count must be at least 1")]
    InvalidFeatureCount,

    #[error("unknown {kind} id: {id}")]
    UnknownId { kind: IdKind, id: i64 },

    #[error("requested {requested} features but rank bound is {available}")]
    InsufficientRank { requested: usize, available: usize },

    #[error("internal consistency violation: {0}")]
    InternalConsistency(String),

    #[error("upstream collaborator failure: {0}")]
    Upstream(anyhow::Error),
}

impl From<anyhow::Error> for SvdError {
    fn from(err: anyhow::Error) -> Self {
        SvdError::Upstream(err)
    }
}
