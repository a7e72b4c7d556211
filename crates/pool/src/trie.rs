// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::position::{Position, BITS_PER_LEVEL, FANOUT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrieError {
    #[error("no weight in the tree")]
    EmptyTree,

    #[error("subtree sums are inconsistent: {detail}")]
    Inconsistent { detail: String },
}

/// Branch levels of the weight trie.
///
/// Every internal node stores the total weight of its subtree in a flat
/// per-level array; `levels[0]` holds the trunk. Leaf weights live outside the
/// trie (in the pool's leaf array) and are supplied to [`descend`](Self::descend)
/// by the caller. Level arrays grow lazily; an index past the end reads as
/// zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTrie {
    depth: u32,
    levels: Vec<Vec<u64>>,
}

impl WeightTrie {
    /// Build a trie deep enough to address `capacity` leaf slots.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut depth = 1u32;
        while Self::padded_capacity(depth) < capacity {
            depth += 1;
        }
        let mut levels = vec![Vec::new(); depth as usize];
        levels[0].push(0);
        Self { depth, levels }
    }

    fn padded_capacity(depth: u32) -> usize {
        1usize
            .checked_shl(BITS_PER_LEVEL * depth)
            .unwrap_or(usize::MAX)
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Leaf slots addressable at this depth.
    pub fn capacity(&self) -> usize {
        Self::padded_capacity(self.depth)
    }

    /// The trunk sum: total weight of all leaves.
    pub fn total(&self) -> u64 {
        self.levels[0][0]
    }

    fn sum_at(&self, level: u32, index: usize) -> u64 {
        self.levels[level as usize].get(index).copied().unwrap_or(0)
    }

    fn sum_mut(&mut self, level: u32, index: usize) -> &mut u64 {
        let nodes = &mut self.levels[level as usize];
        if nodes.len() <= index {
            nodes.resize(index + 1, 0);
        }
        &mut nodes[index]
    }

    /// Add `amount` to every ancestor of `slot`, trunk included.
    ///
    /// The caller checks that the trunk sum cannot overflow before inserting
    /// new weight; every other node's sum is bounded by the trunk's.
    pub fn increase(&mut self, slot: usize, amount: u64) {
        let pos = Position::new(slot, self.depth);
        for level in 0..self.depth {
            *self.sum_mut(level, pos.ancestor(level)) += amount;
        }
    }

    /// Subtract `amount` from every ancestor of `slot`, trunk included.
    ///
    /// Applied all-or-nothing: the path is verified before any node is
    /// touched, so a failure leaves the trie unchanged.
    pub fn decrease(&mut self, slot: usize, amount: u64) -> Result<(), TrieError> {
        let pos = Position::new(slot, self.depth);
        for level in 0..self.depth {
            if self.sum_at(level, pos.ancestor(level)) < amount {
                return Err(TrieError::Inconsistent {
                    detail: format!("level {level} sum underflow at slot {slot}"),
                });
            }
        }
        for level in 0..self.depth {
            *self.sum_mut(level, pos.ancestor(level)) -= amount;
        }
        Ok(())
    }

    /// Weighted descent from the trunk to a leaf slot.
    ///
    /// At each level the child whose half-open range
    /// `[running, running + sum)` contains `value` is taken, subtracting the
    /// preceding siblings' sums as the walk descends; the leftmost matching
    /// child wins on a boundary. `leaf_weight` supplies the bottom level.
    pub fn descend<F>(&self, mut value: u64, leaf_weight: F) -> Result<usize, TrieError>
    where
        F: Fn(usize) -> u64,
    {
        if self.total() == 0 {
            return Err(TrieError::EmptyTree);
        }
        debug_assert!(value < self.total());

        let mut node = 0usize;
        for level in 1..=self.depth {
            let base = node << BITS_PER_LEVEL;
            let mut matched = None;
            for child in 0..FANOUT {
                let index = base + child;
                let sum = if level == self.depth {
                    leaf_weight(index)
                } else {
                    self.sum_at(level, index)
                };
                if value < sum {
                    matched = Some(index);
                    break;
                }
                value -= sum;
            }
            node = matched.ok_or_else(|| TrieError::Inconsistent {
                detail: format!("no child range contained the draw at level {level}"),
            })?;
        }
        Ok(node)
    }

    /// Verify the subtree-sum invariant against the supplied leaf weights.
    #[cfg(test)]
    pub(crate) fn is_consistent<F>(&self, leaf_weight: F) -> bool
    where
        F: Fn(usize) -> u64,
    {
        for level in 0..self.depth {
            // Unmaterialized nodes read as zero and have only zero children;
            // any node on a nonzero path is materialized by `increase`.
            for index in 0..self.levels[level as usize].len() {
                let base = index << BITS_PER_LEVEL;
                let expected: u64 = (0..FANOUT)
                    .map(|child| {
                        if level + 1 == self.depth {
                            leaf_weight(base + child)
                        } else {
                            self.sum_at(level + 1, base + child)
                        }
                    })
                    .sum();
                if self.sum_at(level, index) != expected {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(table: &[u64]) -> impl Fn(usize) -> u64 + '_ {
        move |slot| table.get(slot).copied().unwrap_or(0)
    }

    #[test]
    fn depth_grows_with_capacity() {
        assert_eq!(WeightTrie::new(1).depth(), 1);
        assert_eq!(WeightTrie::new(16).depth(), 1);
        assert_eq!(WeightTrie::new(17).depth(), 2);
        assert_eq!(WeightTrie::new(65_536).depth(), 4);
    }

    #[test]
    fn path_updates_reach_the_trunk() {
        let mut trie = WeightTrie::new(256);
        trie.increase(0, 10);
        trie.increase(17, 7);
        assert_eq!(trie.total(), 17);
        trie.decrease(0, 10).unwrap();
        assert_eq!(trie.total(), 7);
    }

    #[test]
    fn decrease_is_all_or_nothing() {
        let mut trie = WeightTrie::new(256);
        trie.increase(3, 5);
        let before = trie.clone();
        assert!(trie.decrease(3, 6).is_err());
        assert_eq!(trie, before);
    }

    #[test]
    fn descend_respects_half_open_ranges() {
        let mut trie = WeightTrie::new(256);
        let table = {
            let mut t = vec![0u64; 256];
            t[0] = 10;
            t[1] = 11;
            t[2] = 12;
            t
        };
        for (slot, w) in table.iter().enumerate().filter(|(_, w)| **w > 0) {
            trie.increase(slot, *w);
        }
        let lw = weights(&table);
        assert_eq!(trie.descend(0, &lw), Ok(0));
        assert_eq!(trie.descend(9, &lw), Ok(0));
        // A value landing exactly on a boundary goes to the next child.
        assert_eq!(trie.descend(10, &lw), Ok(1));
        assert_eq!(trie.descend(20, &lw), Ok(1));
        assert_eq!(trie.descend(21, &lw), Ok(2));
        assert_eq!(trie.descend(32, &lw), Ok(2));
    }

    #[test]
    fn descend_skips_zero_weight_leaves() {
        let mut trie = WeightTrie::new(256);
        let table = {
            let mut t = vec![0u64; 256];
            t[5] = 1;
            t[200] = 1;
            t
        };
        trie.increase(5, 1);
        trie.increase(200, 1);
        let lw = weights(&table);
        assert_eq!(trie.descend(0, &lw), Ok(5));
        assert_eq!(trie.descend(1, &lw), Ok(200));
    }

    #[test]
    fn empty_tree_cannot_be_sampled() {
        let trie = WeightTrie::new(16);
        assert_eq!(trie.descend(0, |_| 0), Err(TrieError::EmptyTree));
    }

    #[test]
    fn sums_stay_consistent() {
        let mut trie = WeightTrie::new(4096);
        let mut table = vec![0u64; 4096];
        for slot in [0usize, 1, 15, 16, 255, 256, 4000] {
            let w = (slot as u64 % 13) + 1;
            table[slot] = w;
            trie.increase(slot, w);
        }
        assert!(trie.is_consistent(weights(&table)));
        trie.decrease(16, table[16]).unwrap();
        table[16] = 0;
        assert!(trie.is_consistent(weights(&table)));
    }
}
