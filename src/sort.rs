//! Compaction and per-block sorting (§4.8).
//!
//! Compaction is a prerequisite for sorting: it moves every live entry in a
//! block into the contiguous prefix `[0, count)` so the sort only has to
//! reason about a dense array instead of a sparse one.

use crate::block::Block;
use std::cmp::Ordering;

/// Two-pointer sweep that packs a block's live entries into `[0, count)`.
/// `left` tracks the next empty slot to fill; `right` scans forward for the
/// next live entry to move into it. Idempotent: a block that is already
/// compact is scanned once and left untouched.
pub(crate) fn compact(block: &mut Block, sentinel: &[u8]) {
    let mut left = 0usize;
    for right in 0..block.capacity() as usize {
        if block.is_empty_slot(right, sentinel) {
            continue;
        }
        if right != left {
            block.move_entry(right, left, sentinel);
        }
        left += 1;
    }
    debug_assert_eq!(left as u64, block.count());
}

/// Sorts a block's compacted `[0, count)` prefix by `cmp`, applied to key
/// bytes. Computes the target permutation from keys alone, then realises it
/// with the minimum number of swaps: each index is cycled into place once.
pub(crate) fn sort_block<F>(block: &mut Block, cmp: &F)
where
    F: Fn(&[u8], &[u8]) -> Ordering,
{
    let count = block.count() as usize;
    if count < 2 {
        return;
    }

    let mut order: Vec<usize> = (0..count).collect();
    order.sort_by(|&a, &b| cmp(block.key(a), block.key(b)));

    for i in 0..count {
        while order[i] != i {
            let j = order[i];
            block.swap_entries(i, j);
            order.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_with(entries: &[(u32, u8)]) -> (Block, Vec<u8>) {
        let sentinel = vec![0u8; 1];
        let mut block = Block::new(256, 4, 1, 185, &sentinel, true).unwrap();
        for &(key, value) in entries {
            let bytes = key.to_be_bytes();
            let idx = match crate::probe::probe::<crate::hash::DefaultKeyHasher>(
                &block, &bytes, &sentinel,
            ) {
                crate::probe::ProbeResult::NotFound(idx) => idx,
                _ => unreachable!(),
            };
            block.write_key(idx, &bytes);
            block.value_mut(idx).copy_from_slice(&[value]);
        }
        (block, sentinel)
    }

    #[test]
    fn compact_packs_live_entries_to_front_preserving_multiset() {
        let (mut block, sentinel) = block_with(&[(10, 1), (20, 2), (30, 3)]);
        // Evict the middle entry directly to simulate a hole, bypassing the
        // (nonexistent) delete operation just to exercise compaction.
        let hole_idx = (0..block.capacity() as usize)
            .find(|&i| !block.is_empty_slot(i, &sentinel) && block.key(i) == 20u32.to_be_bytes())
            .unwrap();
        block.value_mut(hole_idx).copy_from_slice(&sentinel);
        block.count -= 1;

        compact(&mut block, &sentinel);
        assert_eq!(block.count(), 2);

        let mut values: Vec<u8> = (0..2).map(|i| block.value(i)[0]).collect();
        values.sort();
        assert_eq!(values, vec![1, 3]);
    }

    #[test]
    fn sort_block_orders_compacted_prefix_by_key() {
        let (mut block, sentinel) = block_with(&[(30, 3), (10, 1), (20, 2)]);
        compact(&mut block, &sentinel);
        sort_block(&mut block, &|a, b| a.cmp(b));

        let keys: Vec<u32> = (0..3)
            .map(|i| u32::from_be_bytes(block.key(i).try_into().unwrap()))
            .collect();
        assert_eq!(keys, vec![10, 20, 30]);
        let values: Vec<u8> = (0..3).map(|i| block.value(i)[0]).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn sort_block_on_single_entry_is_a_no_op() {
        let (mut block, _sentinel) = block_with(&[(42, 9)]);
        sort_block(&mut block, &|a, b| a.cmp(b));
        assert_eq!(block.key(0), 42u32.to_be_bytes());
    }
}
