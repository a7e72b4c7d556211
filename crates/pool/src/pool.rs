// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::draw::DrawSource;
use crate::errors::{PoolError, PoolResult};
use crate::leaf::Leaf;
use crate::seed::Seed;
use crate::slots::SlotAllocator;
use crate::trie::WeightTrie;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Slots addressable by a pool built with [`SortitionPool::default`].
pub const DEFAULT_CAPACITY: usize = 65_536;

/// A dynamic set of weighted operators supporting seeded group selection.
///
/// Selection probability is proportional to weight. Both selection algorithms
/// are deterministic in `(pool state, seed, size)`; the draw-value derivation
/// is an injected [`DrawSource`] capability. All operations assume exclusive
/// access; callers serialize concurrent use through a single writer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortitionPool<Id>
where
    Id: Eq + Hash,
{
    trie: WeightTrie,
    leaves: Vec<Option<Leaf<Id>>>,
    slots: SlotAllocator,
    index: HashMap<Id, usize>,
}

impl<Id: Clone + Eq + Hash> Default for SortitionPool<Id> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<Id: Clone + Eq + Hash> SortitionPool<Id> {
    /// Create a pool able to hold up to `capacity` concurrent operators.
    pub fn new(capacity: usize) -> Self {
        Self {
            trie: WeightTrie::new(capacity),
            leaves: Vec::new(),
            slots: SlotAllocator::new(capacity),
            index: HashMap::new(),
        }
    }

    /// Register an operator with a positive weight.
    pub fn insert_operator(&mut self, id: Id, weight: u64) -> PoolResult<()> {
        if weight == 0 {
            return Err(PoolError::InvalidWeight);
        }
        if self.index.contains_key(&id) {
            return Err(PoolError::DuplicateOperator);
        }
        if self.trie.total().checked_add(weight).is_none() {
            return Err(PoolError::WeightOverflow);
        }
        let slot = self.slots.allocate()?;
        if self.leaves.len() <= slot {
            self.leaves.resize_with(slot + 1, || None);
        }
        self.leaves[slot] = Some(Leaf::new(id.clone(), weight));
        self.trie.increase(slot, weight);
        self.index.insert(id, slot);
        Ok(())
    }

    /// Remove an operator, returning its slot to the free stack.
    pub fn remove_operator(&mut self, id: &Id) -> PoolResult<()> {
        let slot = *self.index.get(id).ok_or(PoolError::UnknownOperator)?;
        let weight = self.stored_leaf(slot)?.weight;
        self.trie.decrease(slot, weight)?;
        self.leaves[slot] = None;
        self.slots.free(slot)?;
        self.index.remove(id);
        Ok(())
    }

    /// Change an operator's weight in place.
    ///
    /// The ancestor sums absorb the net delta in a single walk; there is no
    /// intermediate remove-then-add state.
    pub fn update_operator_weight(&mut self, id: &Id, new_weight: u64) -> PoolResult<()> {
        if new_weight == 0 {
            return Err(PoolError::InvalidWeight);
        }
        let slot = *self.index.get(id).ok_or(PoolError::UnknownOperator)?;
        let old_weight = self.stored_leaf(slot)?.weight;
        if new_weight > old_weight {
            let grow = new_weight - old_weight;
            if self.trie.total().checked_add(grow).is_none() {
                return Err(PoolError::WeightOverflow);
            }
            self.trie.increase(slot, grow);
        } else if new_weight < old_weight {
            self.trie.decrease(slot, old_weight - new_weight)?;
        }
        if let Some(leaf) = self.leaves[slot].as_mut() {
            leaf.weight = new_weight;
        }
        Ok(())
    }

    /// Select a group of `size` operators with replacement.
    ///
    /// Each draw descends the unmodified trie, so the same operator may be
    /// returned multiple times; a pool smaller than `size` yields duplicates,
    /// not an error.
    pub fn select_group<D: DrawSource>(
        &self,
        size: usize,
        seed: Seed,
        draw: &D,
    ) -> PoolResult<Vec<Id>> {
        let total = self.trie.total();
        if total == 0 {
            return Err(PoolError::EmptyPool);
        }
        let mut group = Vec::with_capacity(size);
        let leaves = &self.leaves;
        for k in 0..size {
            let value = draw.draw(seed, k as u64, total);
            let slot = self
                .trie
                .descend(value, |slot| Self::weight_in(leaves, slot))?;
            group.push(self.stored_leaf(slot)?.id.clone());
        }
        Ok(group)
    }

    /// Select a group of `size` distinct operators.
    ///
    /// Each selected leaf is provisionally zeroed for the remainder of the
    /// pass so it cannot be drawn again; every provisional edit is rolled back
    /// in reverse before this call returns, on success and failure alike. The
    /// free stack and the id lookup are never touched.
    pub fn select_set_group<D: DrawSource>(
        &mut self,
        size: usize,
        seed: Seed,
        draw: &D,
    ) -> PoolResult<Vec<Id>> {
        let available = self.index.len();
        if available < size {
            return Err(PoolError::NotEnoughOperators {
                available,
                requested: size,
            });
        }

        let mut excluded: Vec<(usize, u64)> = Vec::with_capacity(size);
        let result = self.run_set_draws(size, seed, draw, &mut excluded);
        while let Some((slot, weight)) = excluded.pop() {
            if let Some(leaf) = self.leaves.get_mut(slot).and_then(|l| l.as_mut()) {
                leaf.weight = weight;
            }
            self.trie.increase(slot, weight);
        }
        result
    }

    fn run_set_draws<D: DrawSource>(
        &mut self,
        size: usize,
        seed: Seed,
        draw: &D,
        excluded: &mut Vec<(usize, u64)>,
    ) -> PoolResult<Vec<Id>> {
        let mut group = Vec::with_capacity(size);
        for k in 0..size {
            let total = self.trie.total();
            if total == 0 {
                return Err(PoolError::Inconsistent {
                    detail: "active weight exhausted mid-pass".into(),
                });
            }
            let value = draw.draw(seed, k as u64, total);
            let leaves = &self.leaves;
            let slot = self
                .trie
                .descend(value, |slot| Self::weight_in(leaves, slot))?;
            let leaf = self.stored_leaf(slot)?;
            let weight = leaf.weight;
            group.push(leaf.id.clone());
            self.trie.decrease(slot, weight)?;
            if let Some(leaf) = self.leaves[slot].as_mut() {
                leaf.weight = 0;
            }
            excluded.push((slot, weight));
        }
        Ok(group)
    }

    /// Count of active operators.
    pub fn size(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Current trunk sum.
    pub fn total_weight(&self) -> u64 {
        self.trie.total()
    }

    pub fn weight_of(&self, id: &Id) -> PoolResult<u64> {
        let slot = *self.index.get(id).ok_or(PoolError::UnknownOperator)?;
        Ok(self.stored_leaf(slot)?.weight)
    }

    pub fn is_operator_in_pool(&self, id: &Id) -> bool {
        self.index.contains_key(id)
    }

    /// Maximum concurrent operators this pool can hold.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    fn weight_in(leaves: &[Option<Leaf<Id>>], slot: usize) -> u64 {
        leaves
            .get(slot)
            .and_then(|leaf| leaf.as_ref())
            .map_or(0, |leaf| leaf.weight)
    }

    fn stored_leaf(&self, slot: usize) -> PoolResult<&Leaf<Id>> {
        self.leaves
            .get(slot)
            .and_then(|leaf| leaf.as_ref())
            .ok_or_else(|| PoolError::Inconsistent {
                detail: format!("slot {slot} is mapped but vacant"),
            })
    }
}
