//! An open-addressed, multi-block growth hash table for fixed-width byte
//! keys and values.
//!
//! A table starts as a single power-of-two-sized block. Once that block
//! crosses its load factor, the [growth planner](planner) either appends a
//! smaller secondary block or collapses every live entry into one larger
//! block (a rehash), bounded throughout by a process-wide memory budget
//! (see [`config`]). Deletion and concurrent mutation are not supported;
//! sorting a table (see [`Table::sort_by`]) permanently forbids further
//! inserts or lookups.

mod block;
mod codec;
pub mod config;
mod error;
mod handle;
mod hash;
mod iter;
mod planner;
mod policy;
mod probe;
mod sizing;
mod sort;
mod table;

pub use error::{Error, ErrorKind, Result};
pub use handle::{ValueHandle, ValueHandleMut};
pub use hash::{DefaultKeyHasher, KeyHasher};
pub use iter::Iter;
pub use policy::SecondaryPolicy;
pub use table::{InsertStatus, Table, DEFAULT_LOAD_FACTOR, MAX_FIELD_LEN};

/// Hard ceiling on how many blocks a table may hold at once. The growth
/// planner refuses to grow further once this many blocks exist, even if the
/// memory budget would allow it; a table in that state returns
/// [`ErrorKind::NoMoreBlocks`] from `insert` until it is destroyed.
pub const MAX_BLOCKS: usize = 8;
