//! Bidirectional mapping between opaque 64-bit IDs and dense matrix indices.
//!
//! Built once per model build from the full enumerated ID universe. Index
//! assignment is order-preserving: an ID's index is its position in the
//! enumeration, never its numeric value.

use crate::error::{IdKind, Result, SvdError};
use std::collections::HashMap;

/// Injective mapping from a finite set of unique IDs onto `0..n-1`.
///
/// Immutable after construction. Lookups for IDs outside the building
/// enumeration fail with [`SvdError::UnknownId`].
#[derive(Debug, Clone)]
pub struct IdIndexMapping {
    kind: IdKind,
    index_of: HashMap<i64, usize>,
    ids: Vec<i64>,
}

impl IdIndexMapping {
    /// Build a mapping from an ordered enumeration of unique IDs.
    ///
    /// A duplicate anywhere in the enumeration rejects the whole input.
    pub fn from_ids<I>(kind: IdKind, ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = i64>,
    {
        let iter = ids.into_iter();
        let mut index_of = HashMap::with_capacity(iter.size_hint().0);
        let mut ordered = Vec::with_capacity(iter.size_hint().0);

        for id in iter {
            if index_of.insert(id, ordered.len()).is_some() {
                return Err(SvdError::DuplicateId { kind, id });
            }
            ordered.push(id);
        }

        Ok(Self {
            kind,
            index_of,
            ids: ordered,
        })
    }

    /// Resolve an ID to its dense index.
    pub fn index_of(&self, id: i64) -> Result<usize> {
        self.index_of
            .get(&id)
            .copied()
            .ok_or(SvdError::UnknownId {
                kind: self.kind,
                id,
            })
    }

    /// Inverse lookup: the ID assigned to `index`, if in range.
    pub fn id_at(&self, index: usize) -> Option<i64> {
        self.ids.get(index).copied()
    }

    /// All IDs in enumeration (and therefore index) order.
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn kind(&self) -> IdKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
