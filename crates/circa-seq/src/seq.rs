//! Typed sequence over plain-old-data elements.

use std::fmt;
use std::marker::PhantomData;
use std::slice;

use bytemuck::Pod;

use crate::config::SeqConfig;
use crate::contract;
use crate::error::{Rejected, SeqError};
use crate::layout::ElemLayout;
use crate::raw_seq::RawSeq;

/// Growable sequence of `T`, stored in a single relocating block.
///
/// `T` must be [`Pod`]: elements are moved with byte copies, and unused
/// slots are all-zero, which must be a valid `T`.
///
/// Growing operations take `self` and return the sequence, because the
/// block may have moved:
///
/// ```
/// use circa_seq::Seq;
///
/// let mut seq = Seq::<u32>::with_capacity(2);
/// for v in 1..=5 {
///     seq = seq.push(v, 4);
/// }
/// assert_eq!(seq.as_slice(), &[1, 2, 3, 4, 5]);
/// assert_eq!(seq.pop(), 5);
/// ```
pub struct Seq<T: Pod> {
    raw: RawSeq,
    _elem: PhantomData<T>,
}

type Owned<T> = Result<Seq<T>, Rejected<Seq<T>>>;

impl<T: Pod> Seq<T> {
    /// Layout of `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[track_caller]
    fn layout() -> ElemLayout {
        contract::expect(ElemLayout::of::<T>())
    }

    fn wrap(raw: RawSeq) -> Self {
        Self {
            raw,
            _elem: PhantomData,
        }
    }

    fn lift(result: Result<RawSeq, Rejected<RawSeq>>) -> Owned<T> {
        result.map(Self::wrap).map_err(|r| r.map(Self::wrap))
    }

    /// Empty sequence with [`SeqConfig::DEFAULT_INITIAL_CAPACITY`] slots.
    #[track_caller]
    pub fn new() -> Self {
        Self::from_config(&SeqConfig::default())
    }

    /// Empty sequence with `capacity` zeroed slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or `T` is zero-sized.
    #[track_caller]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::wrap(RawSeq::with_capacity(Self::layout(), capacity))
    }

    /// Single-attempt form of [`with_capacity`](Seq::with_capacity).
    pub fn try_with_capacity(capacity: usize) -> Result<Self, SeqError> {
        RawSeq::try_with_capacity(ElemLayout::of::<T>()?, capacity).map(Self::wrap)
    }

    /// Empty sequence sized by `config.initial_capacity`.
    #[track_caller]
    pub fn from_config(config: &SeqConfig) -> Self {
        Self::wrap(RawSeq::from_config(Self::layout(), config))
    }

    /// Sequence holding a copy of `values`, with capacity `values.len()`.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    #[track_caller]
    pub fn from_slice(values: &[T]) -> Self {
        contract::expect(Self::try_from_slice(values))
    }

    /// Single-attempt form of [`from_slice`](Seq::from_slice).
    pub fn try_from_slice(values: &[T]) -> Result<Self, SeqError> {
        RawSeq::try_from_bytes(
            ElemLayout::of::<T>()?,
            values.len(),
            bytemuck::cast_slice(values),
        )
        .map(Self::wrap)
    }

    /// Adopt an untyped sequence whose elements are `T`.
    ///
    /// Fails with `ElementSizeMismatch` if the element size differs, or
    /// `InvalidAlignment` if the block is less aligned than `T`. The block
    /// is aligned to at least `usize` whatever the element alignment.
    pub fn from_raw(raw: RawSeq) -> Result<Self, Rejected<RawSeq>> {
        let want = match ElemLayout::of::<T>() {
            Ok(layout) => layout,
            Err(error) => return Err(Rejected::new(raw, error)),
        };
        let have = raw.elem_layout();
        if have.size() != want.size() {
            let error = SeqError::ElementSizeMismatch {
                expected: want.size(),
                actual: have.size(),
            };
            return Err(Rejected::new(raw, error));
        }
        let align = raw.block_align();
        if align < want.align() {
            let error = SeqError::InvalidAlignment { align };
            return Err(Rejected::new(raw, error));
        }
        Ok(Self::wrap(raw))
    }

    /// Drop the element type.
    pub fn into_raw(self) -> RawSeq {
        self.raw
    }

    /// The untyped view.
    pub fn as_raw(&self) -> &RawSeq {
        &self.raw
    }

    pub(crate) fn raw_mut(&mut self) -> &mut RawSeq {
        &mut self.raw
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether there are no live elements.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Number of slots backing the sequence.
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Whether `index` names a live element.
    pub fn has(&self, index: usize) -> bool {
        self.raw.has(index)
    }

    /// Reallocate to exactly `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or below `len()`.
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn resize(self, capacity: usize) -> Self {
        Self::wrap(self.raw.resize(capacity))
    }

    /// Single-attempt form of [`resize`](Seq::resize).
    pub fn try_resize(self, capacity: usize) -> Owned<T> {
        Self::lift(self.raw.try_resize(capacity))
    }

    /// Grow to `min_capacity + headroom` unless `min_capacity` already fits.
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn reserve(self, min_capacity: usize, headroom: usize) -> Self {
        Self::wrap(self.raw.reserve(min_capacity, headroom))
    }

    /// Single-attempt form of [`reserve`](Seq::reserve).
    pub fn try_reserve(self, min_capacity: usize, headroom: usize) -> Owned<T> {
        Self::lift(self.raw.try_reserve(min_capacity, headroom))
    }

    /// Zero and free the block.
    pub fn release(self) {
        self.raw.release();
    }

    /// Element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[track_caller]
    pub fn get(&self, index: usize) -> &T {
        bytemuck::from_bytes(self.raw.get(index))
    }

    /// Element at `index`, or `OutOfBounds`.
    pub fn try_get(&self, index: usize) -> Result<&T, SeqError> {
        self.raw.try_get(index).map(bytemuck::from_bytes)
    }

    /// Mutable element at `index`.
    #[track_caller]
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        bytemuck::from_bytes_mut(self.raw.get_mut(index))
    }

    /// Store `value` at `index`, extending with zeroed elements if needed.
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn set(self, index: usize, value: T, headroom: usize) -> Self {
        Self::wrap(self.raw.set(index, bytemuck::bytes_of(&value), headroom))
    }

    /// Single-attempt form of [`set`](Seq::set).
    pub fn try_set(self, index: usize, value: T, headroom: usize) -> Owned<T> {
        Self::lift(self.raw.try_set(index, bytemuck::bytes_of(&value), headroom))
    }

    /// Drop every element, zeroing their slots. Capacity is kept.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Shorten to `len` elements.
    pub fn truncate(&mut self, len: usize) {
        self.raw.truncate(len);
    }

    /// Live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        bytemuck::cast_slice(self.raw.as_bytes())
    }

    /// Live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        bytemuck::cast_slice_mut(self.raw.as_bytes_mut())
    }

    /// Iterator over the live elements.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Append `value`, growing by `headroom` extra slots when full.
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn push(self, value: T, headroom: usize) -> Self {
        Self::wrap(self.raw.push(bytemuck::bytes_of(&value), headroom))
    }

    /// Single-attempt form of [`push`](Seq::push).
    pub fn try_push(self, value: T, headroom: usize) -> Owned<T> {
        Self::lift(self.raw.try_push(bytemuck::bytes_of(&value), headroom))
    }

    /// Last element, without removing it.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    #[track_caller]
    pub fn top(&self) -> T {
        bytemuck::pod_read_unaligned(self.raw.top())
    }

    /// Last element, or `Empty`.
    pub fn try_top(&self) -> Result<T, SeqError> {
        self.raw.try_top().map(bytemuck::pod_read_unaligned)
    }

    /// Remove and return the last element.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    #[track_caller]
    pub fn pop(&mut self) -> T {
        contract::expect(self.try_pop())
    }

    /// Remove the last element, or return `Empty`.
    pub fn try_pop(&mut self) -> Result<T, SeqError> {
        let bytes = self.raw.try_pop()?;
        Ok(bytemuck::pod_read_unaligned(&bytes))
    }

    /// Exact copy with capacity equal to length.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    #[track_caller]
    pub fn duplicate(&self) -> Self {
        Self::wrap(self.raw.duplicate())
    }

    /// Single-attempt form of [`duplicate`](Seq::duplicate).
    pub fn try_duplicate(&self) -> Result<Self, SeqError> {
        self.raw.try_duplicate().map(Self::wrap)
    }

    /// Replace the contents with a copy of `src`.
    ///
    /// # Panics
    ///
    /// Panics if `src` is empty.
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn copy_from(self, src: &Seq<T>, headroom: usize) -> Self {
        Self::wrap(self.raw.copy_from(&src.raw, headroom))
    }

    /// Single-attempt form of [`copy_from`](Seq::copy_from).
    pub fn try_copy_from(self, src: &Seq<T>, headroom: usize) -> Owned<T> {
        Self::lift(self.raw.try_copy_from(&src.raw, headroom))
    }

    /// Append a copy of every element of `src`.
    ///
    /// # Panics
    ///
    /// Panics if `src` is empty.
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn append(self, src: &Seq<T>, headroom: usize) -> Self {
        Self::wrap(self.raw.append(&src.raw, headroom))
    }

    /// Single-attempt form of [`append`](Seq::append).
    pub fn try_append(self, src: &Seq<T>, headroom: usize) -> Owned<T> {
        Self::lift(self.raw.try_append(&src.raw, headroom))
    }

    /// Reverse the elements in place, using one spare slot as scratch.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    #[track_caller]
    #[must_use = "the sequence may have moved; use the returned value"]
    pub fn reverse(self) -> Self {
        Self::wrap(self.raw.reverse())
    }

    /// Single-attempt form of [`reverse`](Seq::reverse).
    pub fn try_reverse(self) -> Owned<T> {
        Self::lift(self.raw.try_reverse())
    }
}

impl<T: Pod> Default for Seq<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Pod + fmt::Debug> fmt::Debug for Seq<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T: Pod> IntoIterator for &'a Seq<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
