//! Fallible-operation result type for the table.
//!
//! Mirrors the error conditions named by the table's contract rather than
//! any particular failure message: callers match on [`ErrorKind`], not on
//! `Display` text.

use core::fmt;

/// The error type returned by every fallible table operation.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    pub(crate) const fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// The specific condition that caused this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub(crate) fn out_of_memory(requested_bytes: usize) -> Self {
        Self::new(ErrorKind::OutOfMemory { requested_bytes })
    }

    pub(crate) fn no_more_blocks() -> Self {
        Self::new(ErrorKind::NoMoreBlocks)
    }

    pub(crate) fn sorted_table(op: &'static str) -> Self {
        Self::new(ErrorKind::SortedTable { op })
    }

    pub(crate) fn bad_argument(reason: &'static str) -> Self {
        Self::new(ErrorKind::BadArgument { reason })
    }

    pub(crate) fn internal(reason: &'static str) -> Self {
        Self::new(ErrorKind::InternalError { reason })
    }
}

/// The specific condition a failed operation encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A block (or the scratch buffer for a rehash) could not be allocated.
    OutOfMemory { requested_bytes: usize },
    /// `MAX_BLOCKS` blocks already exist and the primary is at its cap.
    NoMoreBlocks,
    /// The table has been sorted and no longer accepts mutation.
    SortedTable { op: &'static str },
    /// A creation-time argument violated the table's contract.
    BadArgument { reason: &'static str },
    /// An invariant the table relies on was violated by the caller or the
    /// hash primitive (see the rehash duplicate-key check).
    InternalError { reason: &'static str },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::OutOfMemory { requested_bytes } => {
                write!(f, "failed to allocate {requested_bytes} bytes")
            }
            ErrorKind::NoMoreBlocks => {
                write!(f, "table already holds the maximum number of blocks")
            }
            ErrorKind::SortedTable { op } => {
                write!(f, "cannot {op} a table that has been sorted")
            }
            ErrorKind::BadArgument { reason } => write!(f, "bad argument: {reason}"),
            ErrorKind::InternalError { reason } => write!(f, "internal error: {reason}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
