//! The table façade: block list, empty-value sentinel, options, and the
//! public `insert`/`lookup`/iteration/sort/destroy surface.

use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::block::{Block, MIN_BLOCK_ENTRIES};
use crate::codec;
use crate::error::{Error, Result};
use crate::handle::{ValueHandle, ValueHandleMut};
use crate::hash::{DefaultKeyHasher, KeyHasher};
use crate::iter::{Iter, SortedIter, UnsortedIter};
use crate::planner;
use crate::policy::{SecondaryPolicy, DEFAULT_SECONDARY_POLICY};
use crate::probe::{probe, ProbeResult};
use crate::sizing::{Sizing, DEFAULT_REHASH_TRIGGER_COUNT};
use crate::sort;
use crate::{config, MAX_BLOCKS};

/// Maximum key or value length this table supports (§1: "1..=255 bytes").
pub const MAX_FIELD_LEN: usize = 255;

/// Default load factor: `185 / 256 ≈ 72.5%`.
pub const DEFAULT_LOAD_FACTOR: u8 = 185;

/// The outcome of a successful `insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertStatus {
    /// The key was absent and has been written; the caller must still
    /// write a value through the returned handle.
    Inserted,
    /// The key was already present; the returned handle points at its
    /// existing value.
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortState {
    Unsorted,
    Sorted,
}

/// An open-addressed, multi-block growth hash table over fixed-width byte
/// keys and values.
///
/// Generic over the hash primitive `H` (§4.13); [`DefaultKeyHasher`] is
/// used unless a caller needs a different mixing quality/speed tradeoff.
pub struct Table<H: KeyHasher = DefaultKeyHasher> {
    pub(crate) key_len: usize,
    pub(crate) value_len: usize,
    pub(crate) load_factor: u8,
    pub(crate) sentinel: Vec<u8>,
    pub(crate) memset_optimisable: bool,
    pub(crate) blocks: Vec<Block>,
    pub(crate) primary_capacity_cap: u64,
    pub(crate) rehash_tried_failed: bool,
    pub(crate) sort_state: SortState,
    pub(crate) comparator: Option<Box<dyn Fn(&[u8], &[u8]) -> Ordering>>,
    pub(crate) sizing: Sizing,
    _hasher: PhantomData<H>,
}

impl<H: KeyHasher> Table<H> {
    /// Creates a table with the default secondary-block policy (`-3`) and
    /// default rehash trigger count (`4`).
    ///
    /// `empty_value_sentinel` defaults to `value_len` zero bytes when
    /// `None`. `estimated_count` sizes the initial primary block; it is a
    /// hint, not a hard limit.
    pub fn create(
        key_len: usize,
        value_len: usize,
        empty_value_sentinel: Option<&[u8]>,
        estimated_count: u64,
        load_factor: u8,
    ) -> Result<Self> {
        Self::create_with_options(
            key_len,
            value_len,
            empty_value_sentinel,
            estimated_count,
            load_factor,
            DEFAULT_SECONDARY_POLICY,
            DEFAULT_REHASH_TRIGGER_COUNT,
        )
    }

    /// Like [`Self::create`], but lets the caller override the secondary
    /// block policy and the rehash trigger count instead of taking the
    /// compile-time defaults.
    pub fn create_with_options(
        key_len: usize,
        value_len: usize,
        empty_value_sentinel: Option<&[u8]>,
        estimated_count: u64,
        load_factor: u8,
        secondary_policy: i32,
        rehash_trigger_count: usize,
    ) -> Result<Self> {
        if key_len == 0 || key_len > MAX_FIELD_LEN {
            return Err(Error::bad_argument("key_len must be in 1..=255"));
        }
        if value_len == 0 || value_len > MAX_FIELD_LEN {
            return Err(Error::bad_argument("value_len must be in 1..=255"));
        }

        let sentinel = match empty_value_sentinel {
            Some(bytes) if bytes.len() == value_len => bytes.to_vec(),
            Some(_) => {
                return Err(Error::bad_argument(
                    "empty_value_sentinel must be value_len bytes long",
                ))
            }
            None => vec![0u8; value_len],
        };
        let memset_optimisable = sentinel.windows(2).all(|w| w[0] == w[1]);

        let policy = SecondaryPolicy::from_raw(secondary_policy)?;
        let sizing = Sizing::new(policy, rehash_trigger_count);

        let entry_bytes = codec::entry_bytes(key_len, value_len) as u64;
        let primary_capacity_cap = sizing.primary_capacity_cap(config::max_memory_bytes(), entry_bytes);
        let initial_capacity =
            Sizing::initial_primary_capacity(estimated_count, load_factor, primary_capacity_cap);

        let primary = Self::allocate_with_retry(
            initial_capacity,
            key_len,
            value_len,
            load_factor,
            &sentinel,
            memset_optimisable,
        )?;

        Ok(Table {
            key_len,
            value_len,
            load_factor,
            sentinel,
            memset_optimisable,
            blocks: vec![primary],
            primary_capacity_cap,
            rehash_tried_failed: false,
            sort_state: SortState::Unsorted,
            comparator: None,
            sizing,
            _hasher: PhantomData,
        })
    }

    /// Allocates the initial primary block, halving the requested capacity
    /// and retrying on `OutOfMemory` until `MIN_BLOCK_ENTRIES` is reached
    /// (§4.4), per the original design's initial-allocation fallback.
    fn allocate_with_retry(
        mut capacity: u64,
        key_len: usize,
        value_len: usize,
        load_factor: u8,
        sentinel: &[u8],
        memset_optimisable: bool,
    ) -> Result<Block> {
        loop {
            match Block::new(
                capacity,
                key_len,
                value_len,
                load_factor,
                sentinel,
                memset_optimisable,
            ) {
                Ok(block) => return Ok(block),
                Err(_) if capacity > MIN_BLOCK_ENTRIES => {
                    log::warn!(
                        "initial allocation of capacity {capacity} failed, retrying at {}",
                        capacity / 2
                    );
                    capacity /= 2;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Number of bytes one entry occupies: `key_len + value_len`.
    #[inline]
    pub(crate) fn entry_bytes(&self) -> usize {
        codec::entry_bytes(self.key_len, self.value_len)
    }

    #[inline]
    pub(crate) fn is_sorted(&self) -> bool {
        self.sort_state == SortState::Sorted
    }

    /// Inserts `key`. Returns a handle to the slot's value bytes and
    /// whether the key was newly inserted or already present.
    ///
    /// On `Inserted`, the caller must write a non-sentinel value through
    /// the handle before performing any other mutating operation.
    pub fn insert(&mut self, key: &[u8]) -> Result<(ValueHandleMut<'_>, InsertStatus)> {
        if self.is_sorted() {
            return Err(Error::sorted_table("insert"));
        }
        if key.len() != self.key_len {
            return Err(Error::bad_argument("key length does not match key_len"));
        }

        if self.blocks.last().unwrap().is_full() {
            planner::grow::<H>(self)?;
        }

        let last_index = self.blocks.len() - 1;
        let mut insertion_slot = None;
        let mut found_at = None;
        for i in 0..self.blocks.len() {
            match probe::<H>(&self.blocks[i], key, &self.sentinel) {
                ProbeResult::Found(idx) => {
                    found_at = Some((i, idx));
                    break;
                }
                ProbeResult::NotFound(idx) => {
                    if i == last_index {
                        insertion_slot = Some(idx);
                    }
                }
            }
        }
        if let Some((i, idx)) = found_at {
            let value = self.blocks[i].value_mut(idx);
            return Ok((ValueHandleMut::new(value), InsertStatus::Duplicate));
        }

        let idx = insertion_slot.expect("probing the last block always yields a slot");
        let last = &mut self.blocks[last_index];
        last.write_key(idx, key);
        last.count += 1;
        Ok((ValueHandleMut::new(last.value_mut(idx)), InsertStatus::Inserted))
    }

    /// Looks up `key`. Returns a handle to its value bytes if present.
    pub fn lookup(&self, key: &[u8]) -> Result<Option<ValueHandle<'_>>> {
        if self.is_sorted() {
            return Err(Error::sorted_table("lookup"));
        }
        if key.len() != self.key_len {
            return Err(Error::bad_argument("key length does not match key_len"));
        }

        for block in &self.blocks {
            if let ProbeResult::Found(idx) = probe::<H>(block, key, &self.sentinel) {
                return Ok(Some(ValueHandle::new(block.value(idx))));
            }
        }
        Ok(None)
    }

    /// Sum of `count` across every block.
    pub fn count_entries(&self) -> u64 {
        self.blocks.iter().map(|b| b.count()).sum()
    }

    /// Sum of `capacity` across every block.
    pub fn count_buckets(&self) -> u64 {
        self.blocks.iter().map(|b| b.capacity()).sum()
    }

    /// Number of blocks currently backing this table.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Capacity of `blocks[0]`, the primary block.
    pub fn primary_capacity(&self) -> u64 {
        self.blocks[0].capacity()
    }

    /// Compacts every block's live entries into `[0, count)` and sorts
    /// each block independently by `cmp`. May be called again later with a
    /// different comparator; compaction is idempotent.
    ///
    /// After this call, `insert`, `lookup`, and rehashing are rejected
    /// (§4.9); only iteration and another `sort_by` remain legal.
    pub fn sort_by<F>(&mut self, cmp: F) -> Result<()>
    where
        F: Fn(&[u8], &[u8]) -> Ordering + 'static,
    {
        for block in &mut self.blocks {
            sort::compact(block, &self.sentinel);
            sort::sort_block(block, &cmp);
        }
        self.sort_state = SortState::Sorted;
        self.comparator = Some(Box::new(cmp));
        Ok(())
    }

    /// Iterates over every live `(key, value)` pair.
    ///
    /// Before sorting (or after sorting a single-block table), this is an
    /// unordered walk of every block. After sorting a multi-block table,
    /// this is a k-way merge across the blocks' sorted, compacted
    /// prefixes, in non-decreasing order under the comparator last passed
    /// to [`Self::sort_by`].
    pub fn iter(&self) -> Iter<'_> {
        if self.is_sorted() && self.blocks.len() > 1 {
            let cmp = self
                .comparator
                .as_ref()
                .expect("sorted table always has a comparator");
            Iter::Sorted(SortedIter::new(&self.blocks, cmp.as_ref()))
        } else {
            Iter::Unsorted(UnsortedIter::new(&self.blocks, &self.sentinel))
        }
    }

    /// Consumes and drops the table, releasing every block's storage.
    /// Provided for parity with the original `destroy(Table)` entry point;
    /// an ordinary drop does the same thing.
    pub fn destroy(self) {}
}
