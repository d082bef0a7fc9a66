//! The double-hashed open-addressing probe loop, shared by lookup,
//! duplicate detection on insert, and rehash migration.

use crate::block::Block;
use crate::hash::{combine, KeyHasher, SEED_PRIMARY, SEED_SECONDARY};

/// Outcome of probing a block for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProbeResult {
    /// The key was found at this slot.
    Found(usize),
    /// The key is absent; this is the first empty slot the probe passed,
    /// i.e. where it would be inserted.
    NotFound(usize),
}

/// Probes `block` for `key` using double hashing (§4.3): the primary index
/// is `h & (capacity - 1)`, the stride is `h | 1` (forced odd so it forms a
/// full permutation modulo the power-of-two capacity).
pub(crate) fn probe<H: KeyHasher>(block: &Block, key: &[u8], sentinel: &[u8]) -> ProbeResult {
    let (lo, hi) = H::hash_seeded(SEED_PRIMARY, SEED_SECONDARY, key);
    let mut h = combine(lo, hi);
    let step = h | 1;
    let mask = block.capacity() - 1;

    loop {
        let idx = (h & mask) as usize;
        if block.is_empty_slot(idx, sentinel) {
            return ProbeResult::NotFound(idx);
        }
        if block.key(idx) == key {
            return ProbeResult::Found(idx);
        }
        h = h.wrapping_add(step);
    }
}
