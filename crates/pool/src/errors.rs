// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::slots::SlotError;
use crate::trie::TrieError;
use thiserror::Error;

/// Errors surfaced by pool operations.
///
/// Every user-facing variant is detected before any mutation begins, so a
/// failed call never leaves the pool partially updated. `Inconsistent` marks
/// an internal defect and is never expected in correct usage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("operator weight must be positive")]
    InvalidWeight,

    #[error("operator is already in the pool")]
    DuplicateOperator,

    #[error("operator is not in the pool")]
    UnknownOperator,

    #[error("no operators in pool")]
    EmptyPool,

    #[error("not enough operators in pool: {available} available, {requested} requested")]
    NotEnoughOperators { available: usize, requested: usize },

    #[error("pool capacity of {capacity} slots exhausted")]
    CapacityExceeded { capacity: usize },

    #[error("total weight would overflow")]
    WeightOverflow,

    #[error("pool state is inconsistent: {detail}")]
    Inconsistent { detail: String },
}

pub type PoolResult<T> = Result<T, PoolError>;

impl From<SlotError> for PoolError {
    fn from(err: SlotError) -> Self {
        match err {
            SlotError::CapacityExceeded { capacity } => PoolError::CapacityExceeded { capacity },
            SlotError::InvalidSlot { .. } => PoolError::Inconsistent {
                detail: err.to_string(),
            },
        }
    }
}

impl From<TrieError> for PoolError {
    fn from(err: TrieError) -> Self {
        match err {
            TrieError::EmptyTree => PoolError::EmptyPool,
            TrieError::Inconsistent { detail } => PoolError::Inconsistent { detail },
        }
    }
}
