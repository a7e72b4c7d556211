// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

pub const BITS_PER_LEVEL: u32 = 4;
pub const FANOUT: usize = 1 << BITS_PER_LEVEL;
pub const LEVEL_MASK: usize = FANOUT - 1;

/// Path from the trunk to a leaf slot, derived purely from the slot index.
///
/// Level 0 is the trunk; leaves sit at level `depth`. No state beyond the
/// index itself is stored, so the slot-index ↔ path mapping is bidirectional
/// and exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    slot: usize,
    depth: u32,
}

impl Position {
    pub fn new(slot: usize, depth: u32) -> Self {
        Self { slot, depth }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Index of the slot's ancestor within internal level `level`.
    ///
    /// `ancestor(0)` is always 0 (the trunk); `ancestor(depth)` is the slot
    /// itself.
    pub fn ancestor(&self, level: u32) -> usize {
        self.slot >> (BITS_PER_LEVEL * (self.depth - level))
    }

    /// Child branch taken when stepping from `level` down to `level + 1`.
    pub fn child_index(&self, level: u32) -> usize {
        (self.slot >> (BITS_PER_LEVEL * (self.depth - level - 1))) & LEVEL_MASK
    }

    /// Root-first sequence of per-level child indices.
    pub fn encode(&self) -> Vec<usize> {
        (0..self.depth).map(|level| self.child_index(level)).collect()
    }

    /// Rebuild a position from a root-first path. Inverse of [`encode`](Self::encode).
    pub fn decode(path: &[usize]) -> Self {
        let slot = path
            .iter()
            .fold(0usize, |slot, &child| (slot << BITS_PER_LEVEL) | (child & LEVEL_MASK));
        Self::new(slot, path.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn trunk_ancestor_is_zero() {
        let pos = Position::new(0xABC, 4);
        assert_eq!(pos.ancestor(0), 0);
        assert_eq!(pos.ancestor(4), 0xABC);
    }

    #[test]
    fn child_indices_walk_the_slot_digits() {
        // Slot 0x1F3 in base 16, depth 3: digits 1, 15, 3.
        let pos = Position::new(0x1F3, 3);
        assert_eq!(pos.child_index(0), 0x1);
        assert_eq!(pos.child_index(1), 0xF);
        assert_eq!(pos.child_index(2), 0x3);
        assert_eq!(pos.encode(), vec![0x1, 0xF, 0x3]);
    }

    #[test]
    fn decode_rebuilds_the_slot() {
        assert_eq!(Position::decode(&[0x1, 0xF, 0x3]).slot(), 0x1F3);
        assert_eq!(Position::decode(&[]).slot(), 0);
    }

    proptest! {
        #[test]
        fn encode_decode_roundtrip(slot in 0usize..(1 << 16)) {
            let pos = Position::new(slot, 4);
            prop_assert_eq!(Position::decode(&pos.encode()), pos);
        }

        #[test]
        fn ancestors_nest(slot in 0usize..(1 << 16), level in 0u32..4) {
            let pos = Position::new(slot, 4);
            // Each ancestor is the parent of the next level's ancestor.
            prop_assert_eq!(pos.ancestor(level), pos.ancestor(level + 1) >> BITS_PER_LEVEL);
        }
    }
}
