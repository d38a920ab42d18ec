//! Byte-level sequence with a runtime element size.
//!
//! [`RawSeq`] is the untyped form of the container: every element is an
//! opaque block of [`ElemLayout::size`] bytes. It backs [`Seq<T>`](crate::Seq)
//! and the C boundary.
//!
//! Operations that may relocate the block (`resize`, `reserve`, `set`,
//! `push`, `copy_from`, `append`, `reverse`) take `self` by value and return
//! the superseding owner, so a handle from before the call cannot be used
//! after it. Operations that never resize borrow.

use std::fmt;
use std::ptr::NonNull;

use smallvec::SmallVec;

use crate::config::SeqConfig;
use crate::contract;
use crate::error::{Rejected, SeqError};
use crate::layout::ElemLayout;
use crate::raw::{AllocMode, Block};

/// A copy of one element's bytes, inline for elements up to 16 bytes.
pub type ElemBytes = SmallVec<[u8; 16]>;

/// Growable sequence of fixed-size byte blocks.
///
/// Slots in `[len, capacity)` are all-zero between operations.
pub struct RawSeq {
    block: Block,
}

type Owned = Result<RawSeq, Rejected<RawSeq>>;

impl RawSeq {
    // ── Header/handle layer ────────────────────────────────────────

    /// Allocate an empty sequence with `capacity` zeroed slots.
    ///
    /// Blocks (retrying) if the allocator is out of memory.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or the block size overflows.
    #[track_caller]
    pub fn with_capacity(elem: ElemLayout, capacity: usize) -> Self {
        contract::expect(Self::alloc_in(elem, capacity, AllocMode::Block))
    }

    /// Single-attempt form of [`with_capacity`](RawSeq::with_capacity).
    pub fn try_with_capacity(elem: ElemLayout, capacity: usize) -> Result<Self, SeqError> {
        Self::alloc_in(elem, capacity, AllocMode::Once)
    }

    /// Allocate an empty sequence sized by `config.initial_capacity`.
    #[track_caller]
    pub fn from_config(elem: ElemLayout, config: &SeqConfig) -> Self {
        contract::expect(config.validate());
        Self::with_capacity(elem, config.initial_capacity)
    }

    /// Build a sequence of exactly `count` elements copied from `bytes`.
    ///
    /// Capacity and length are both `count`. Extra trailing bytes in
    /// `bytes` are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero or `bytes` is shorter than
    /// `count × elem.size()`.
    #[track_caller]
    pub fn from_bytes(elem: ElemLayout, count: usize, bytes: &[u8]) -> Self {
        contract::expect(Self::from_bytes_in(elem, count, bytes, AllocMode::Block))
    }

    /// Single-attempt form of [`from_bytes`](RawSeq::from_bytes).
    pub fn try_from_bytes(elem: ElemLayout, count: usize, bytes: &[u8]) -> Result<Self, SeqError> {
        Self::from_bytes_in(elem, count, bytes, AllocMode::Once)
    }

    /// Reallocate to exactly `capacity` slots. Length is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or below the current length.
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn resize(self, capacity: usize) -> Self {
        contract::expect_owned(self.resize_in(capacity, AllocMode::Block))
    }

    /// Single-attempt form of [`resize`](RawSeq::resize).
    pub fn try_resize(self, capacity: usize) -> Owned {
        self.resize_in(capacity, AllocMode::Once)
    }

    /// Make room for at least `min_capacity` slots.
    ///
    /// If the sequence is already large enough this is a no-op; otherwise
    /// it grows to `min_capacity + headroom`. A non-zero `headroom` makes
    /// repeated appends amortized O(1).
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn reserve(self, min_capacity: usize, headroom: usize) -> Self {
        contract::expect_owned(self.reserve_in(min_capacity, headroom, AllocMode::Block))
    }

    /// Single-attempt form of [`reserve`](RawSeq::reserve).
    pub fn try_reserve(self, min_capacity: usize, headroom: usize) -> Owned {
        self.reserve_in(min_capacity, headroom, AllocMode::Once)
    }

    /// Zero every byte of the block and free it.
    ///
    /// Dropping the sequence does the same; this spells it out.
    pub fn release(self) {
        drop(self);
    }

    /// Give up ownership, returning the pointer to slot 0.
    ///
    /// The block stays allocated until it is re-adopted with
    /// [`from_handle`](RawSeq::from_handle) and dropped.
    pub fn into_handle(self) -> NonNull<u8> {
        self.block.into_handle()
    }

    /// Re-adopt a block leaked with [`into_handle`](RawSeq::into_handle).
    ///
    /// # Safety
    ///
    /// `handle` must come from `into_handle` on a sequence created with
    /// exactly `elem`, and no other owner of it may exist.
    #[allow(unsafe_code)]
    pub unsafe fn from_handle(handle: NonNull<u8>, elem: ElemLayout) -> Self {
        Self {
            // SAFETY: forwarded to the caller.
            block: unsafe { Block::from_handle(handle, elem) },
        }
    }

    /// Pointer to slot 0. Changes whenever the block relocates.
    pub fn handle(&self) -> NonNull<u8> {
        self.block.handle()
    }

    // ── Accessor layer ─────────────────────────────────────────────

    /// Layout of one element.
    pub fn elem_layout(&self) -> ElemLayout {
        self.block.elem()
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.block.len()
    }

    /// Whether the sequence holds no live elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots backing the sequence.
    pub fn capacity(&self) -> usize {
        self.block.capacity()
    }

    /// Whether `index` names a live element.
    pub fn has(&self, index: usize) -> bool {
        index < self.len()
    }

    /// Bytes of the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[track_caller]
    pub fn get(&self, index: usize) -> &[u8] {
        contract::expect(self.try_get(index))
    }

    /// Bytes of the element at `index`, or `OutOfBounds`.
    pub fn try_get(&self, index: usize) -> Result<&[u8], SeqError> {
        let range = self.slot(index)?;
        Ok(&self.block.storage()[range])
    }

    /// Mutable bytes of the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[track_caller]
    pub fn get_mut(&mut self, index: usize) -> &mut [u8] {
        let range = contract::expect(self.slot(index));
        &mut self.block.storage_mut()[range]
    }

    /// Overwrite the element at `index`, extending the sequence if needed.
    ///
    /// Setting past the end grows the length to `index + 1`; slots between
    /// the old length and `index` read as zero.
    ///
    /// # Panics
    ///
    /// Panics if `value` is not exactly one element long.
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn set(self, index: usize, value: &[u8], headroom: usize) -> Self {
        contract::expect_owned(self.set_in(index, value, headroom, AllocMode::Block))
    }

    /// Single-attempt form of [`set`](RawSeq::set).
    pub fn try_set(self, index: usize, value: &[u8], headroom: usize) -> Owned {
        self.set_in(index, value, headroom, AllocMode::Once)
    }

    /// Drop every element. Capacity is kept; the vacated slots are zeroed.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Shorten to `len` elements, zeroing the slots that fall off.
    ///
    /// No-op if `len >= self.len()`.
    pub fn truncate(&mut self, len: usize) {
        let old = self.len();
        if len >= old {
            return;
        }
        let size = self.elem_layout().size();
        self.block.storage_mut()[len * size..old * size].fill(0);
        self.block.set_len(len);
    }

    /// Bytes of all live elements.
    pub fn as_bytes(&self) -> &[u8] {
        let end = self.len() * self.elem_layout().size();
        &self.block.storage()[..end]
    }

    /// Bytes of all live elements, mutably.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let end = self.len() * self.elem_layout().size();
        &mut self.block.storage_mut()[..end]
    }

    /// Bytes of the slots in `[len, capacity)`. Always all-zero.
    pub fn unused_bytes(&self) -> &[u8] {
        let start = self.len() * self.elem_layout().size();
        &self.block.storage()[start..]
    }

    // ── Stack layer ────────────────────────────────────────────────

    /// Append one element, growing by `headroom` extra slots when full.
    ///
    /// # Panics
    ///
    /// Panics if `value` is not exactly one element long.
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn push(self, value: &[u8], headroom: usize) -> Self {
        contract::expect_owned(self.push_in(value, headroom, AllocMode::Block))
    }

    /// Single-attempt form of [`push`](RawSeq::push).
    pub fn try_push(self, value: &[u8], headroom: usize) -> Owned {
        self.push_in(value, headroom, AllocMode::Once)
    }

    /// Bytes of the last element, without removing it.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    #[track_caller]
    pub fn top(&self) -> &[u8] {
        contract::expect(self.try_top())
    }

    /// Bytes of the last element, or `Empty`.
    pub fn try_top(&self) -> Result<&[u8], SeqError> {
        match self.len().checked_sub(1) {
            Some(last) => self.try_get(last),
            None => Err(SeqError::Empty),
        }
    }

    /// Remove the last element and return a copy of it.
    ///
    /// The vacated slot is zeroed.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    #[track_caller]
    pub fn pop(&mut self) -> ElemBytes {
        contract::expect(self.try_pop())
    }

    /// Remove the last element, or return `Empty`.
    pub fn try_pop(&mut self) -> Result<ElemBytes, SeqError> {
        let last = self.len().checked_sub(1).ok_or(SeqError::Empty)?;
        let value = ElemBytes::from_slice(self.try_get(last)?);
        self.truncate(last);
        Ok(value)
    }

    // ── Bulk-sequence layer ────────────────────────────────────────

    /// A new sequence holding a byte copy of this one, capacity = length.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    #[track_caller]
    pub fn duplicate(&self) -> Self {
        contract::expect(self.duplicate_in(AllocMode::Block))
    }

    /// Single-attempt form of [`duplicate`](RawSeq::duplicate).
    pub fn try_duplicate(&self) -> Result<Self, SeqError> {
        self.duplicate_in(AllocMode::Once)
    }

    /// Overwrite this sequence with the contents of `src`.
    ///
    /// Afterwards `self.len() == src.len()`; slots past the new length are
    /// zeroed.
    ///
    /// # Panics
    ///
    /// Panics if `src` is empty or has a different element size.
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn copy_from(self, src: &RawSeq, headroom: usize) -> Self {
        contract::expect_owned(self.copy_from_in(src, headroom, AllocMode::Block))
    }

    /// Single-attempt form of [`copy_from`](RawSeq::copy_from).
    pub fn try_copy_from(self, src: &RawSeq, headroom: usize) -> Owned {
        self.copy_from_in(src, headroom, AllocMode::Once)
    }

    /// Append every element of `src` after the current contents.
    ///
    /// # Panics
    ///
    /// Panics if `src` is empty or has a different element size.
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn append(self, src: &RawSeq, headroom: usize) -> Self {
        contract::expect_owned(self.append_in(src, headroom, AllocMode::Block))
    }

    /// Single-attempt form of [`append`](RawSeq::append).
    pub fn try_append(self, src: &RawSeq, headroom: usize) -> Owned {
        self.append_in(src, headroom, AllocMode::Once)
    }

    /// Append a copy of the current contents to itself, doubling it.
    ///
    /// The one-block form of `append(&self_copy)`; the copy is made inside
    /// the (possibly relocated) block, so nothing reads a stale view.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn append_self(self, headroom: usize) -> Self {
        contract::expect_owned(self.append_self_in(headroom, AllocMode::Block))
    }

    /// Single-attempt form of [`append_self`](RawSeq::append_self).
    pub fn try_append_self(self, headroom: usize) -> Owned {
        self.append_self_in(headroom, AllocMode::Once)
    }

    /// Reverse the elements in place.
    ///
    /// Borrows one slot past the end as swap space, growing by exactly one
    /// slot if the sequence is full. The scratch slot is zeroed afterwards.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn reverse(self) -> Self {
        contract::expect_owned(self.reverse_in(AllocMode::Block))
    }

    /// Single-attempt form of [`reverse`](RawSeq::reverse).
    pub fn try_reverse(self) -> Owned {
        self.reverse_in(AllocMode::Once)
    }

    // ── Crate-internal helpers ─────────────────────────────────────

    /// Remove the first `count` elements, shifting the rest down.
    ///
    /// Used by the compacting filter once survivors have been appended
    /// past the original region.
    pub(crate) fn discard_front(&mut self, count: usize) {
        let len = self.len();
        debug_assert!(count <= len);
        let size = self.elem_layout().size();
        let storage = self.block.storage_mut();
        storage.copy_within(count * size..len * size, 0);
        storage[(len - count) * size..len * size].fill(0);
        self.block.set_len(len - count);
    }

    /// Alignment of the block, and so of the handle and every slot.
    pub(crate) fn block_align(&self) -> usize {
        self.block.align()
    }

    /// Expose zeroed slots up to `len` without writing them.
    pub(crate) fn extend_zeroed(&mut self, len: usize) {
        debug_assert!(len <= self.capacity());
        if len > self.len() {
            self.block.set_len(len);
        }
    }

    fn alloc_in(elem: ElemLayout, capacity: usize, mode: AllocMode) -> Result<Self, SeqError> {
        Ok(Self {
            block: Block::allocate(elem, capacity, mode)?,
        })
    }

    fn from_bytes_in(
        elem: ElemLayout,
        count: usize,
        bytes: &[u8],
        mode: AllocMode,
    ) -> Result<Self, SeqError> {
        if count == 0 {
            return Err(SeqError::ZeroCapacity);
        }
        let needed = elem.bytes_for(count)?;
        if bytes.len() < needed {
            return Err(SeqError::SourceTooShort {
                needed,
                actual: bytes.len(),
            });
        }
        let mut seq = Self::alloc_in(elem, count, mode)?;
        seq.block.storage_mut().copy_from_slice(&bytes[..needed]);
        seq.block.set_len(count);
        Ok(seq)
    }

    fn duplicate_in(&self, mode: AllocMode) -> Result<Self, SeqError> {
        if self.is_empty() {
            return Err(SeqError::Empty);
        }
        Self::from_bytes_in(self.elem_layout(), self.len(), self.as_bytes(), mode)
    }

    /// Turn a failed precondition into a rejection that returns `self`.
    fn check(self, result: Result<(), SeqError>) -> Owned {
        match result {
            Ok(()) => Ok(self),
            Err(error) => Err(Rejected::new(self, error)),
        }
    }

    fn resize_in(mut self, capacity: usize, mode: AllocMode) -> Owned {
        match self.block.resize(capacity, mode) {
            Ok(()) => Ok(self),
            Err(error) => Err(Rejected::new(self, error)),
        }
    }

    fn reserve_in(self, min_capacity: usize, headroom: usize, mode: AllocMode) -> Owned {
        if self.capacity() >= min_capacity {
            return Ok(self);
        }
        match min_capacity.checked_add(headroom) {
            Some(target) => self.resize_in(target, mode),
            None => Err(Rejected::new(self, SeqError::CapacityOverflow)),
        }
    }

    fn slot(&self, index: usize) -> Result<std::ops::Range<usize>, SeqError> {
        let length = self.len();
        if index >= length {
            return Err(SeqError::OutOfBounds { index, length });
        }
        let size = self.elem_layout().size();
        Ok(index * size..(index + 1) * size)
    }

    fn value_fits(&self, value: &[u8]) -> Result<(), SeqError> {
        let expected = self.elem_layout().size();
        if value.len() != expected {
            return Err(SeqError::ElementSizeMismatch {
                expected,
                actual: value.len(),
            });
        }
        Ok(())
    }

    fn source_fits(&self, src: &RawSeq) -> Result<(), SeqError> {
        let expected = self.elem_layout().size();
        let actual = src.elem_layout().size();
        if expected != actual {
            return Err(SeqError::ElementSizeMismatch { expected, actual });
        }
        if src.is_empty() {
            return Err(SeqError::Empty);
        }
        Ok(())
    }

    fn set_in(self, index: usize, value: &[u8], headroom: usize, mode: AllocMode) -> Owned {
        let check = self.value_fits(value).and_then(|()| {
            index.checked_add(1).map(|_| ()).ok_or(SeqError::CapacityOverflow)
        });
        let mut seq = self.check(check)?.reserve_in(index + 1, headroom, mode)?;
        let size = seq.elem_layout().size();
        seq.block.storage_mut()[index * size..(index + 1) * size].copy_from_slice(value);
        seq.extend_zeroed(index + 1);
        Ok(seq)
    }

    fn push_in(self, value: &[u8], headroom: usize, mode: AllocMode) -> Owned {
        let index = self.len();
        self.set_in(index, value, headroom, mode)
    }

    fn copy_from_in(self, src: &RawSeq, headroom: usize, mode: AllocMode) -> Owned {
        let check = self.source_fits(src);
        let n = src.len();
        let mut seq = self.check(check)?.reserve_in(n, headroom, mode)?;
        let bytes = src.as_bytes();
        seq.block.storage_mut()[..bytes.len()].copy_from_slice(bytes);
        seq.truncate(n);
        seq.extend_zeroed(n);
        Ok(seq)
    }

    fn append_in(self, src: &RawSeq, headroom: usize, mode: AllocMode) -> Owned {
        let check = self.source_fits(src);
        let old = self.len();
        let total = old + src.len();
        let mut seq = self.check(check)?.reserve_in(total, headroom, mode)?;
        let size = seq.elem_layout().size();
        seq.block.storage_mut()[old * size..total * size].copy_from_slice(src.as_bytes());
        seq.extend_zeroed(total);
        Ok(seq)
    }

    fn append_self_in(self, headroom: usize, mode: AllocMode) -> Owned {
        let n = self.len();
        let check = if n == 0 { Err(SeqError::Empty) } else { Ok(()) };
        // `n * size` fits in `isize`, so doubling `n` cannot overflow.
        let mut seq = self.check(check)?.reserve_in(n * 2, headroom, mode)?;
        let size = seq.elem_layout().size();
        seq.block.storage_mut().copy_within(..n * size, n * size);
        seq.extend_zeroed(n * 2);
        Ok(seq)
    }

    fn reverse_in(self, mode: AllocMode) -> Owned {
        let check = if self.is_empty() {
            Err(SeqError::Empty)
        } else {
            Ok(())
        };
        let len = self.len();
        let mut seq = self.check(check)?.reserve_in(len + 1, 0, mode)?;
        let size = seq.elem_layout().size();
        let scratch = len * size;
        let storage = seq.block.storage_mut();
        for i in 0..len / 2 {
            let j = len - 1 - i;
            storage.copy_within(i * size..(i + 1) * size, scratch);
            storage.copy_within(j * size..(j + 1) * size, i * size);
            storage.copy_within(scratch..scratch + size, j * size);
        }
        storage[scratch..scratch + size].fill(0);
        Ok(seq)
    }
}

impl fmt::Debug for RawSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSeq")
            .field("element_size", &self.elem_layout().size())
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes4() -> ElemLayout {
        ElemLayout::new(4, 4).unwrap()
    }

    fn from_u32s(values: &[u32]) -> RawSeq {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        RawSeq::from_bytes(bytes4(), values.len(), &bytes)
    }

    fn to_u32s(seq: &RawSeq) -> Vec<u32> {
        seq.as_bytes()
            .chunks_exact(4)
            .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn zero_tail(seq: &RawSeq) -> bool {
        seq.unused_bytes().iter().all(|&b| b == 0)
    }

    #[test]
    fn with_capacity_starts_empty_and_zeroed() {
        let seq = RawSeq::with_capacity(bytes4(), 10);
        assert_eq!(seq.len(), 0);
        assert_eq!(seq.capacity(), 10);
        assert_eq!(seq.unused_bytes().len(), 40);
        assert!(zero_tail(&seq));
    }

    #[test]
    #[should_panic(expected = "capacity must be non-zero")]
    fn with_capacity_zero_panics() {
        let _ = RawSeq::with_capacity(bytes4(), 0);
    }

    #[test]
    fn try_with_capacity_reports_zero_capacity() {
        let err = RawSeq::try_with_capacity(bytes4(), 0).unwrap_err();
        assert_eq!(err, SeqError::ZeroCapacity);
    }

    #[test]
    fn from_config_uses_initial_capacity() {
        let seq = RawSeq::from_config(bytes4(), &SeqConfig::new(3));
        assert_eq!(seq.capacity(), 3);
    }

    #[test]
    fn push_grows_with_headroom() {
        let mut seq = RawSeq::with_capacity(bytes4(), 1);
        for v in 0u32..3 {
            seq = seq.push(&v.to_ne_bytes(), 8);
        }
        assert_eq!(to_u32s(&seq), vec![0, 1, 2]);
        // 1 slot, then grown to 2 + 8 on the second push.
        assert_eq!(seq.capacity(), 10);
        assert!(zero_tail(&seq));
    }

    #[test]
    #[should_panic(expected = "element size mismatch: expected 4 bytes, got 2 bytes")]
    fn push_wrong_size_panics() {
        let _ = RawSeq::with_capacity(bytes4(), 1).push(&[1, 2], 0);
    }

    #[test]
    fn try_push_wrong_size_returns_sequence_untouched() {
        let seq = from_u32s(&[5]);
        let rejected = seq.try_push(&[0; 3], 0).unwrap_err();
        assert_eq!(
            rejected.error(),
            &SeqError::ElementSizeMismatch {
                expected: 4,
                actual: 3
            }
        );
        let seq = rejected.into_inner();
        assert_eq!(to_u32s(&seq), vec![5]);
    }

    #[test]
    fn get_returns_element_bytes() {
        let seq = from_u32s(&[10, 20, 30]);
        assert_eq!(seq.get(1), &20u32.to_ne_bytes());
    }

    #[test]
    fn try_get_out_of_bounds() {
        let seq = from_u32s(&[10, 20]);
        assert_eq!(
            seq.try_get(2),
            Err(SeqError::OutOfBounds {
                index: 2,
                length: 2
            })
        );
    }

    #[test]
    #[should_panic(expected = "index 3 out of bounds for length 1")]
    fn get_out_of_bounds_panics() {
        let seq = from_u32s(&[1]);
        let _ = seq.get(3);
    }

    #[test]
    fn set_past_end_extends_with_zeroes() {
        let seq = RawSeq::with_capacity(bytes4(), 4);
        let seq = seq.push(&1u32.to_ne_bytes(), 0).push(&2u32.to_ne_bytes(), 0);
        let seq = seq.set(5, &9u32.to_ne_bytes(), 0);
        assert_eq!(seq.len(), 6);
        assert!(seq.capacity() >= 6);
        assert_eq!(to_u32s(&seq), vec![1, 2, 0, 0, 0, 9]);
        assert!(zero_tail(&seq));
    }

    #[test]
    fn set_within_length_overwrites() {
        let seq = from_u32s(&[1, 2, 3]).set(1, &7u32.to_ne_bytes(), 0);
        assert_eq!(to_u32s(&seq), vec![1, 7, 3]);
        assert_eq!(seq.capacity(), 3);
    }

    #[test]
    fn clear_zeroes_previous_contents() {
        let mut seq = from_u32s(&[1, 2, 3]);
        seq.clear();
        assert!(seq.is_empty());
        assert_eq!(seq.capacity(), 3);
        assert!(zero_tail(&seq));
    }

    #[test]
    fn pop_returns_last_and_zeroes_slot() {
        let mut seq = from_u32s(&[4, 5]);
        let top = seq.pop();
        assert_eq!(top.as_slice(), &5u32.to_ne_bytes());
        assert_eq!(seq.len(), 1);
        assert!(zero_tail(&seq));
    }

    #[test]
    fn top_does_not_remove() {
        let seq = from_u32s(&[4, 5]);
        assert_eq!(seq.top(), &5u32.to_ne_bytes());
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn pop_empty_is_error() {
        let mut seq = RawSeq::with_capacity(bytes4(), 1);
        assert_eq!(seq.try_pop(), Err(SeqError::Empty));
        assert_eq!(seq.try_top(), Err(SeqError::Empty));
    }

    #[test]
    #[should_panic(expected = "sequence is empty")]
    fn pop_empty_panics() {
        let mut seq = RawSeq::with_capacity(bytes4(), 1);
        seq.pop();
    }

    #[test]
    fn resize_shrink_and_grow() {
        let seq = RawSeq::with_capacity(bytes4(), 16).push(&3u32.to_ne_bytes(), 0);
        let seq = seq.resize(1);
        assert_eq!(seq.capacity(), 1);
        let seq = seq.resize(5);
        assert_eq!(seq.capacity(), 5);
        assert_eq!(to_u32s(&seq), vec![3]);
        assert!(zero_tail(&seq));
    }

    #[test]
    fn try_resize_below_length_keeps_sequence() {
        let seq = from_u32s(&[1, 2, 3]);
        let (seq, err) = seq.try_resize(2).unwrap_err().into_parts();
        assert_eq!(
            err,
            SeqError::CapacityBelowLength {
                requested: 2,
                length: 3
            }
        );
        assert_eq!(to_u32s(&seq), vec![1, 2, 3]);
    }

    #[test]
    fn reserve_is_noop_when_large_enough() {
        let seq = RawSeq::with_capacity(bytes4(), 8);
        let before = seq.handle();
        let seq = seq.reserve(8, 100);
        assert_eq!(seq.capacity(), 8);
        assert_eq!(seq.handle(), before);
    }

    #[test]
    fn reserve_adds_headroom() {
        let seq = RawSeq::with_capacity(bytes4(), 2).reserve(3, 4);
        assert_eq!(seq.capacity(), 7);
    }

    #[test]
    fn reserve_overflow_rejected() {
        let seq = RawSeq::with_capacity(bytes4(), 2);
        let rejected = seq.try_reserve(usize::MAX, 1).unwrap_err();
        assert_eq!(rejected.error(), &SeqError::CapacityOverflow);
        assert_eq!(rejected.into_inner().capacity(), 2);
    }

    #[test]
    fn duplicate_is_exact_copy() {
        let seq = from_u32s(&[1, 2, 3]).reserve(10, 0);
        let dup = seq.duplicate();
        assert_eq!(to_u32s(&dup), vec![1, 2, 3]);
        assert_eq!(dup.capacity(), 3);
        assert_ne!(dup.handle(), seq.handle());
    }

    #[test]
    fn duplicate_empty_rejected() {
        let seq = RawSeq::with_capacity(bytes4(), 2);
        assert_eq!(seq.try_duplicate().unwrap_err(), SeqError::Empty);
    }

    #[test]
    fn from_bytes_short_source_rejected() {
        let err = RawSeq::try_from_bytes(bytes4(), 3, &[0; 11]).unwrap_err();
        assert_eq!(
            err,
            SeqError::SourceTooShort {
                needed: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn copy_from_truncates_and_zeroes_leftovers() {
        let dst = from_u32s(&[9, 9, 9, 9]);
        let src = from_u32s(&[1, 2]);
        let dst = dst.copy_from(&src, 0);
        assert_eq!(to_u32s(&dst), vec![1, 2]);
        assert_eq!(dst.capacity(), 4);
        assert!(zero_tail(&dst));
    }

    #[test]
    fn copy_from_grows_destination() {
        let dst = RawSeq::with_capacity(bytes4(), 1);
        let src = from_u32s(&[1, 2, 3]);
        let dst = dst.copy_from(&src, 2);
        assert_eq!(to_u32s(&dst), vec![1, 2, 3]);
        assert_eq!(dst.capacity(), 5);
    }

    #[test]
    #[should_panic(expected = "sequence is empty")]
    fn copy_from_empty_source_panics() {
        let src = RawSeq::with_capacity(bytes4(), 1);
        let _ = from_u32s(&[1]).copy_from(&src, 0);
    }

    #[test]
    fn copy_from_other_element_size_rejected() {
        let src = RawSeq::from_bytes(ElemLayout::new(2, 2).unwrap(), 1, &[1, 2]);
        let rejected = from_u32s(&[1]).try_copy_from(&src, 0).unwrap_err();
        assert_eq!(
            rejected.error(),
            &SeqError::ElementSizeMismatch {
                expected: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn append_concatenates() {
        let dst = from_u32s(&[1, 2]);
        let src = from_u32s(&[3, 4, 5]);
        let dst = dst.append(&src, 0);
        assert_eq!(to_u32s(&dst), vec![1, 2, 3, 4, 5]);
        assert_eq!(dst.capacity(), 5);
        assert_eq!(to_u32s(&src), vec![3, 4, 5]);
    }

    #[test]
    fn reverse_odd_and_even_lengths() {
        let odd = from_u32s(&[1, 2, 3, 4, 5]).reverse();
        assert_eq!(to_u32s(&odd), vec![5, 4, 3, 2, 1]);
        assert!(zero_tail(&odd));

        let even = from_u32s(&[1, 2, 3, 4]).reverse();
        assert_eq!(to_u32s(&even), vec![4, 3, 2, 1]);
        assert_eq!(even.capacity(), 5);
        assert!(zero_tail(&even));
    }

    #[test]
    fn reverse_single_element() {
        let seq = from_u32s(&[7]).reverse();
        assert_eq!(to_u32s(&seq), vec![7]);
    }

    #[test]
    fn reverse_empty_rejected() {
        let seq = RawSeq::with_capacity(bytes4(), 4);
        let rejected = seq.try_reverse().unwrap_err();
        assert_eq!(rejected.error(), &SeqError::Empty);
    }

    #[test]
    fn append_self_doubles_contents() {
        let seq = from_u32s(&[1, 2, 3]).append_self(0);
        assert_eq!(to_u32s(&seq), vec![1, 2, 3, 1, 2, 3]);
        assert_eq!(seq.capacity(), 6);
        assert!(zero_tail(&seq));
    }

    #[test]
    fn append_self_empty_rejected() {
        let seq = RawSeq::with_capacity(bytes4(), 2);
        let rejected = seq.try_append_self(4).unwrap_err();
        assert_eq!(rejected.error(), &SeqError::Empty);
        assert_eq!(rejected.into_inner().capacity(), 2);
    }

    #[test]
    fn violated_consuming_call_leaves_block_in_place() {
        let seq = from_u32s(&[5, 6]);
        let elem = seq.elem_layout();
        let handle = seq.handle();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            seq.push(&[1, 2], 0)
        }));
        assert!(result.is_err());
        // SAFETY: the rejected owner was leaked, so `handle` is still live
        // and nothing else owns it.
        #[allow(unsafe_code)]
        let seq = unsafe { RawSeq::from_handle(handle, elem) };
        assert_eq!(to_u32s(&seq), vec![5, 6]);
    }

    #[test]
    fn discard_front_shifts_and_zeroes() {
        let mut seq = from_u32s(&[1, 2, 3, 4, 5]);
        seq.discard_front(3);
        assert_eq!(to_u32s(&seq), vec![4, 5]);
        assert!(zero_tail(&seq));
    }

    #[test]
    fn handle_round_trip() {
        let seq = from_u32s(&[8, 9]);
        let elem = seq.elem_layout();
        let handle = seq.into_handle();
        // SAFETY: the handle was just leaked from a sequence with `elem`.
        #[allow(unsafe_code)]
        let seq = unsafe { RawSeq::from_handle(handle, elem) };
        assert_eq!(to_u32s(&seq), vec![8, 9]);
    }

    #[test]
    fn has_checks_live_range() {
        let seq = from_u32s(&[1, 2]);
        assert!(seq.has(1));
        assert!(!seq.has(2));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn unused_slots_stay_zero(
                ops in proptest::collection::vec((0u8..6, 0u32..1000, 0usize..12), 1..60),
            ) {
                let mut seq = RawSeq::with_capacity(bytes4(), 1);
                for (op, value, index) in ops {
                    seq = match op {
                        0 => seq.push(&value.to_ne_bytes(), index % 3),
                        1 => {
                            let _ = seq.try_pop();
                            seq
                        }
                        2 => seq.set(index, &value.to_ne_bytes(), 1),
                        3 if !seq.is_empty() => seq.reverse(),
                        4 => {
                            seq.truncate(index);
                            seq
                        }
                        5 => {
                            let target = seq.len().max(1) + index;
                            seq.resize(target)
                        }
                        _ => seq,
                    };
                    prop_assert!(seq.len() <= seq.capacity());
                    prop_assert!(zero_tail(&seq));
                }
            }

            #[test]
            fn get_returns_last_write(values in proptest::collection::vec(any::<u32>(), 1..40)) {
                let mut seq = RawSeq::with_capacity(bytes4(), 1);
                for v in &values {
                    seq = seq.push(&v.to_ne_bytes(), 4);
                }
                for (i, v) in values.iter().enumerate() {
                    prop_assert_eq!(seq.get(i), &v.to_ne_bytes());
                }
            }
        }
    }
}
