//! Sequence error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during sequence operations.
///
/// The infallible API turns every variant except
/// [`AllocationFailed`](SeqError::AllocationFailed) into a contract-violation
/// panic; the `try_*` API returns them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeqError {
    /// An element layout with size zero was supplied.
    ZeroElementSize,
    /// A capacity of zero was requested.
    ZeroCapacity,
    /// An index at or beyond the logical length was read.
    OutOfBounds {
        /// The index requested.
        index: usize,
        /// The sequence length at the time of the call.
        length: usize,
    },
    /// A stack or bulk operation that needs at least one element saw none.
    Empty,
    /// A resize would drop live elements.
    CapacityBelowLength {
        /// The capacity requested.
        requested: usize,
        /// The sequence length at the time of the call.
        length: usize,
    },
    /// A value or source sequence does not match this sequence's element size.
    ElementSizeMismatch {
        /// Element size of this sequence, in bytes.
        expected: usize,
        /// Size of the offending value or source element, in bytes.
        actual: usize,
    },
    /// A raw source buffer holds fewer bytes than `count × element_size`.
    SourceTooShort {
        /// Bytes required.
        needed: usize,
        /// Bytes supplied.
        actual: usize,
    },
    /// An element alignment that is not a power of two.
    InvalidAlignment {
        /// The alignment supplied.
        align: usize,
    },
    /// `capacity × element_size` plus the header does not fit in `isize`.
    CapacityOverflow,
    /// The allocator returned null on a single-attempt (`try_*`) call.
    AllocationFailed {
        /// Size of the block that could not be allocated, in bytes.
        bytes: usize,
    },
}

impl fmt::Display for SeqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroElementSize => write!(f, "element size must be non-zero"),
            Self::ZeroCapacity => write!(f, "capacity must be non-zero"),
            Self::OutOfBounds { index, length } => {
                write!(f, "index {index} out of bounds for length {length}")
            }
            Self::Empty => write!(f, "sequence is empty"),
            Self::CapacityBelowLength { requested, length } => {
                write!(
                    f,
                    "requested capacity {requested} is below current length {length}"
                )
            }
            Self::ElementSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "element size mismatch: expected {expected} bytes, got {actual} bytes"
                )
            }
            Self::SourceTooShort { needed, actual } => {
                write!(f, "source too short: need {needed} bytes, got {actual} bytes")
            }
            Self::InvalidAlignment { align } => {
                write!(f, "alignment {align} is not a power of two")
            }
            Self::CapacityOverflow => write!(f, "capacity overflow"),
            Self::AllocationFailed { bytes } => {
                write!(f, "allocation of {bytes} bytes failed")
            }
        }
    }
}

impl Error for SeqError {}

/// A consuming operation that was refused, handing the sequence back intact.
///
/// Fallible operations that take `self` by value cannot simply return
/// `Err(SeqError)` without dropping the caller's data, so they return the
/// unchanged owner alongside the reason.
pub struct Rejected<S> {
    seq: S,
    error: SeqError,
}

impl<S> Rejected<S> {
    pub(crate) fn new(seq: S, error: SeqError) -> Self {
        Self { seq, error }
    }

    /// Rewrap the payload, keeping the error.
    pub(crate) fn map<T>(self, f: impl FnOnce(S) -> T) -> Rejected<T> {
        Rejected {
            seq: f(self.seq),
            error: self.error,
        }
    }

    /// Why the operation was refused.
    pub fn error(&self) -> &SeqError {
        &self.error
    }

    /// Recover the sequence, exactly as it was before the call.
    pub fn into_inner(self) -> S {
        self.seq
    }

    /// Split into the sequence and the error.
    pub fn into_parts(self) -> (S, SeqError) {
        (self.seq, self.error)
    }
}

impl<S> fmt::Debug for Rejected<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<S> fmt::Display for Rejected<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation rejected: {}", self.error)
    }
}

impl<S> Error for Rejected<S> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}
