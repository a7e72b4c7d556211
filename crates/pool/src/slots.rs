// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("slot {slot} is out of bounds or already free")]
    InvalidSlot { slot: usize },

    #[error("pool capacity of {capacity} slots exhausted")]
    CapacityExceeded { capacity: usize },
}

/// Reusable storage slots for leaves.
///
/// Vacated slots are pushed onto a stack and reused most-recently-freed first,
/// so storage is bounded by the historical maximum concurrent population.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAllocator {
    capacity: usize,
    /// Number of slot indices ever handed out; fresh slots are appended here.
    issued: usize,
    /// Vacated slot indices, LIFO.
    free: Vec<usize>,
}

impl SlotAllocator {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            issued: 0,
            free: Vec::new(),
        }
    }

    /// Pop the most recently freed slot, or hand out a fresh index.
    pub fn allocate(&mut self) -> Result<usize, SlotError> {
        if let Some(slot) = self.free.pop() {
            return Ok(slot);
        }
        if self.issued >= self.capacity {
            return Err(SlotError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        let slot = self.issued;
        self.issued += 1;
        Ok(slot)
    }

    /// Return a slot to the free stack.
    pub fn free(&mut self, slot: usize) -> Result<(), SlotError> {
        if slot >= self.issued || self.free.contains(&slot) {
            return Err(SlotError::InvalidSlot { slot });
        }
        self.free.push(slot);
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Highest slot index ever handed out, plus one.
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Number of slots currently holding a leaf.
    pub fn in_use(&self) -> usize {
        self.issued - self.free.len()
    }

    #[cfg(test)]
    pub(crate) fn free_slots(&self) -> &[usize] {
        &self.free
    }
}
