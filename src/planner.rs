//! The growth/rehash decision tree (§4.5): on overflow, choose between
//! appending a new block and collapsing every live entry into one larger
//! block.

use crate::block::{Block, MIN_BLOCK_ENTRIES};
use crate::error::{Error, Result};
use crate::hash::KeyHasher;
use crate::probe::{probe, ProbeResult};
use crate::table::Table;
use crate::MAX_BLOCKS;

/// Handles a full last block: append a new block or rehash, per the
/// decision tree in §4.5. Called only from `insert`, which has already
/// confirmed the table is not sorted.
pub(crate) fn grow<H: KeyHasher>(table: &mut Table<H>) -> Result<()> {
    if table.blocks.len() == MAX_BLOCKS {
        return Err(Error::no_more_blocks());
    }

    let last_capacity = table.blocks.last().unwrap().capacity();
    let next_capacity_raw =
        table
            .sizing
            .next_secondary_capacity_raw(table.blocks.len(), table.blocks[0].capacity(), last_capacity);

    if table.blocks[0].capacity() == table.primary_capacity_cap || table.rehash_tried_failed {
        append(table, next_capacity_raw.max(MIN_BLOCK_ENTRIES))
    } else if table.blocks.len() >= table.sizing.rehash_trigger_count
        || next_capacity_raw < MIN_BLOCK_ENTRIES
    {
        rehash::<H>(table)
    } else {
        append(table, next_capacity_raw)
    }
}

fn append<H: KeyHasher>(table: &mut Table<H>, capacity: u64) -> Result<()> {
    let block = Block::new(
        capacity,
        table.key_len,
        table.value_len,
        table.load_factor,
        &table.sentinel,
        table.memset_optimisable,
    )?;
    table.blocks.push(block);
    Ok(())
}

/// Collapses every live entry across all blocks into one new, larger
/// block. Soft-fails: if the new block cannot be allocated, records
/// `rehash_tried_failed` and falls back to appending a minimum-sized
/// block instead of propagating the error.
fn rehash<H: KeyHasher>(table: &mut Table<H>) -> Result<()> {
    debug_assert!(!table.is_sorted());

    let total: u64 = table.blocks.iter().map(|b| b.capacity()).sum();
    if total >= table.primary_capacity_cap {
        return Err(Error::out_of_memory(
            (total as usize).saturating_mul(table.entry_bytes()),
        ));
    }

    let mut target = total.next_power_of_two().clamp(
        MIN_BLOCK_ENTRIES,
        table.primary_capacity_cap.max(MIN_BLOCK_ENTRIES),
    );
    if target <= table.primary_capacity_cap / 2 && target < (1 << 28) {
        target *= 2;
    }

    let new_block = match Block::new(
        target,
        table.key_len,
        table.value_len,
        table.load_factor,
        &table.sentinel,
        table.memset_optimisable,
    ) {
        Ok(block) => block,
        Err(_) => {
            log::warn!("rehash to capacity {target} failed, falling back to appending a minimum-sized block");
            table.rehash_tried_failed = true;
            return append(table, MIN_BLOCK_ENTRIES);
        }
    };

    migrate_into::<H>(table, new_block)
}

/// Moves every live entry from the existing blocks (newest to oldest) into
/// `new_block`, then replaces `table.blocks` with the single new block.
fn migrate_into<H: KeyHasher>(table: &mut Table<H>, mut new_block: Block) -> Result<()> {
    for block in table.blocks.iter().rev() {
        for idx in 0..block.capacity() as usize {
            if block.is_empty_slot(idx, &table.sentinel) {
                continue;
            }
            let key = block.key(idx).to_vec();
            let value = block.value(idx).to_vec();

            match probe::<H>(&new_block, &key, &table.sentinel) {
                ProbeResult::NotFound(dest) => {
                    new_block.write_key(dest, &key);
                    new_block.value_mut(dest).copy_from_slice(&value);
                    new_block.count += 1;
                }
                ProbeResult::Found(_) => {
                    return Err(Error::internal(
                        "duplicate key encountered while rehashing: sentinel invariant violated or hash primitive is non-deterministic",
                    ));
                }
            }
        }
    }

    table.blocks = vec![new_block];
    Ok(())
}
