//! Borrowed handles into a block's value bytes.
//!
//! The original protocol returns raw pointers into block storage and
//! documents, in prose, that they go stale the instant the table performs
//! an operation that can relocate entries. Rust can make that contract
//! load-bearing instead of advisory: both handle types borrow the table,
//! so the borrow checker itself rejects any `insert`/`sort_by` call while
//! a handle from an earlier operation is still alive.

use std::ops::{Deref, DerefMut};

/// A read-only view of one slot's value bytes, returned by [`lookup`](crate::Table::lookup).
pub struct ValueHandle<'a> {
    value: &'a [u8],
}

impl<'a> ValueHandle<'a> {
    pub(crate) fn new(value: &'a [u8]) -> Self {
        Self { value }
    }

    /// The value bytes this handle points at.
    pub fn as_bytes(&self) -> &[u8] {
        self.value
    }
}

impl Deref for ValueHandle<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.value
    }
}

/// A mutable view of one slot's value bytes, returned by
/// [`insert`](crate::Table::insert). On `Inserted`, the caller must write a
/// non-sentinel value through this handle before the slot can ever compare
/// as occupied again; on `Duplicate`, it points at the existing value.
pub struct ValueHandleMut<'a> {
    value: &'a mut [u8],
}

impl<'a> ValueHandleMut<'a> {
    pub(crate) fn new(value: &'a mut [u8]) -> Self {
        Self { value }
    }

    /// The value bytes this handle points at.
    pub fn as_bytes(&self) -> &[u8] {
        self.value
    }

    /// Overwrites the value bytes. `bytes.len()` must equal the table's
    /// `value_len`.
    pub fn write(&mut self, bytes: &[u8]) {
        self.value.copy_from_slice(bytes);
    }
}

impl Deref for ValueHandleMut<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.value
    }
}

impl DerefMut for ValueHandleMut<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mut_handle_write_round_trips() {
        let mut backing = vec![0u8; 4];
        let mut handle = ValueHandleMut::new(&mut backing);
        handle.write(&[1, 2, 3, 4]);
        assert_eq!(handle.as_bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn read_only_handle_exposes_bytes() {
        let backing = vec![5u8, 6, 7];
        let handle = ValueHandle::new(&backing);
        assert_eq!(&*handle, &[5, 6, 7]);
    }
}
