// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};

/// One operator's record, stored at a leaf slot.
///
/// A weight of zero marks the leaf as excluded for the remainder of a
/// without-replacement pass; it never persists past the selection call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf<Id> {
    pub id: Id,
    pub weight: u64,
}

impl<Id> Leaf<Id> {
    pub fn new(id: Id, weight: u64) -> Self {
        Self { id, weight }
    }
}
