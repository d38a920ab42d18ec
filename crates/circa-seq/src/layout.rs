//! Element layouts.
//!
//! [`ElemLayout`] is the runtime stand-in for an element type: its byte
//! size and alignment. [`Seq<T>`](crate::Seq) derives it from `T`;
//! [`RawSeq`](crate::RawSeq) and the C boundary carry it explicitly.

use std::mem;

use crate::error::SeqError;

/// Alignment used for blocks whose element type is only known by size.
///
/// Matches what `calloc` guarantees on mainstream 64-bit targets.
pub const MAX_ALIGN: usize = 16;

/// Byte size and alignment of one sequence element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElemLayout {
    size: usize,
    align: usize,
}

impl ElemLayout {
    /// Layout of an opaque element of `size` bytes, aligned to [`MAX_ALIGN`].
    pub fn from_size(size: usize) -> Result<Self, SeqError> {
        Self::new(size, MAX_ALIGN)
    }

    /// Layout with an explicit alignment.
    ///
    /// `align` must be a power of two; it is raised to at least 1.
    pub fn new(size: usize, align: usize) -> Result<Self, SeqError> {
        if size == 0 {
            return Err(SeqError::ZeroElementSize);
        }
        let align = align.max(1);
        if !align.is_power_of_two() {
            return Err(SeqError::InvalidAlignment { align });
        }
        Ok(Self { size, align })
    }

    /// Layout of `T`.
    pub fn of<T>() -> Result<Self, SeqError> {
        Self::new(mem::size_of::<T>(), mem::align_of::<T>())
    }

    /// Element size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Element alignment in bytes.
    pub fn align(&self) -> usize {
        self.align
    }

    /// Bytes occupied by `count` elements.
    pub(crate) fn bytes_for(&self, count: usize) -> Result<usize, SeqError> {
        count
            .checked_mul(self.size)
            .ok_or(SeqError::CapacityOverflow)
    }
}
