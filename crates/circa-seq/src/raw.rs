//! Header/handle primitives.
//!
//! This is the only module allowed to contain `unsafe` code. It owns the
//! block layout:
//!
//! ```text
//! base                      handle (data)
//! │ pad │ Header{cap, len} │ slot 0 │ slot 1 │ ... │ slot cap-1 │
//!       └── HEADER_SIZE ───┘
//! └──────── prefix ────────┘
//! ```
//!
//! `prefix` is `HEADER_SIZE` rounded up to the block alignment, so the
//! handle is element-aligned and the header always sits in the
//! `HEADER_SIZE` bytes immediately before it. Every byte of the block is
//! initialised at all times: allocation is zeroed and every growth zeroes
//! the added tail.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::mem;
use std::ptr::{self, NonNull};
use std::slice;
use std::sync::atomic::{compiler_fence, Ordering};

use crate::error::SeqError;
use crate::layout::ElemLayout;

/// Bookkeeping stored in front of the data region.
#[repr(C)]
struct Header {
    capacity: usize,
    length: usize,
}

const HEADER_SIZE: usize = mem::size_of::<Header>();

/// What to do when the global allocator returns null.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AllocMode {
    /// Retry until the allocation succeeds. Never reports failure.
    Block,
    /// Make a single attempt and report [`SeqError::AllocationFailed`].
    Once,
}

fn block_align(elem: ElemLayout) -> usize {
    elem.align().max(mem::align_of::<Header>())
}

fn prefix(elem: ElemLayout) -> usize {
    HEADER_SIZE.next_multiple_of(block_align(elem))
}

fn block_layout(elem: ElemLayout, capacity: usize) -> Result<Layout, SeqError> {
    let size = elem
        .bytes_for(capacity)?
        .checked_add(prefix(elem))
        .ok_or(SeqError::CapacityOverflow)?;
    Layout::from_size_align(size, block_align(elem)).map_err(|_| SeqError::CapacityOverflow)
}

/// Run `attempt` until it yields a non-null pointer, honouring `mode`.
///
/// `bytes` is only used for diagnostics.
pub(crate) fn acquire(
    mode: AllocMode,
    bytes: usize,
    mut attempt: impl FnMut() -> *mut u8,
) -> Result<NonNull<u8>, SeqError> {
    let mut failures: u64 = 0;
    loop {
        if let Some(ptr) = NonNull::new(attempt()) {
            if failures > 0 {
                tracing::debug!(bytes, failures, "allocation succeeded after retrying");
            }
            return Ok(ptr);
        }
        if mode == AllocMode::Once {
            return Err(SeqError::AllocationFailed { bytes });
        }
        if failures == 0 {
            tracing::warn!(bytes, "allocation failed, retrying until it succeeds");
        }
        failures = failures.saturating_add(1);
        std::thread::yield_now();
    }
}

/// Zero-fill `len` bytes with writes the optimiser may not elide.
///
/// # Safety
///
/// `ptr` must be valid for writes of `len` bytes.
unsafe fn scrub(ptr: *mut u8, len: usize) {
    for i in 0..len {
        // SAFETY: `ptr..ptr + len` is writable (caller contract).
        unsafe { ptr.add(i).write_volatile(0) };
    }
    compiler_fence(Ordering::SeqCst);
}

/// Exclusive owner of one header + storage allocation.
///
/// `Block` only knows how to allocate, resize, expose and release the
/// bytes; every sequence operation is written in safe code on top of
/// [`storage`](Block::storage) / [`storage_mut`](Block::storage_mut).
pub(crate) struct Block {
    /// Points at slot 0, never at the header.
    data: NonNull<u8>,
    elem: ElemLayout,
}

// SAFETY: a `Block` uniquely owns plain bytes; moving it to another thread
// moves that ownership with it.
unsafe impl Send for Block {}

impl Block {
    /// Allocate a zeroed block with room for `capacity` elements, length 0.
    pub(crate) fn allocate(
        elem: ElemLayout,
        capacity: usize,
        mode: AllocMode,
    ) -> Result<Self, SeqError> {
        if capacity == 0 {
            return Err(SeqError::ZeroCapacity);
        }
        let layout = block_layout(elem, capacity)?;
        // SAFETY: `layout` is non-zero sized (it always includes the header).
        let base = acquire(mode, layout.size(), || unsafe { alloc::alloc_zeroed(layout) })?;
        // SAFETY: the block is `prefix + capacity * size` bytes aligned to
        // `block_align`, so `base + prefix` is in bounds and the header slot
        // before it is aligned for `Header`.
        let data = unsafe { base.add(prefix(elem)) };
        let block = Self { data, elem };
        // SAFETY: the header slot is in bounds and aligned (see above).
        unsafe {
            block.header().write(Header {
                capacity,
                length: 0,
            });
        }
        Ok(block)
    }

    /// Re-adopt a block previously leaked with [`into_handle`](Block::into_handle).
    ///
    /// # Safety
    ///
    /// `data` must come from `into_handle` on a block allocated with exactly
    /// `elem`, and must not have been re-adopted since.
    pub(crate) unsafe fn from_handle(data: NonNull<u8>, elem: ElemLayout) -> Self {
        Self { data, elem }
    }

    /// Give up ownership without releasing, returning the data pointer.
    pub(crate) fn into_handle(self) -> NonNull<u8> {
        let data = self.data;
        mem::forget(self);
        data
    }

    pub(crate) fn handle(&self) -> NonNull<u8> {
        self.data
    }

    pub(crate) fn elem(&self) -> ElemLayout {
        self.elem
    }

    pub(crate) fn align(&self) -> usize {
        block_align(self.elem)
    }

    fn header(&self) -> *mut Header {
        // SAFETY: the header occupies the HEADER_SIZE bytes before `data`
        // within the same allocation.
        unsafe { self.data.sub(HEADER_SIZE).cast::<Header>().as_ptr() }
    }

    pub(crate) fn capacity(&self) -> usize {
        // SAFETY: the header is initialised at allocation and never freed
        // while `self` is alive.
        unsafe { (*self.header()).capacity }
    }

    pub(crate) fn len(&self) -> usize {
        // SAFETY: as in `capacity`.
        unsafe { (*self.header()).length }
    }

    /// Set the logical length. The caller keeps the zero invariant.
    pub(crate) fn set_len(&mut self, length: usize) {
        debug_assert!(length <= self.capacity());
        // SAFETY: as in `capacity`; `&mut self` gives exclusive access.
        unsafe { (*self.header()).length = length };
    }

    /// All `capacity × size` storage bytes.
    pub(crate) fn storage(&self) -> &[u8] {
        let len = self.capacity() * self.elem.size();
        // SAFETY: storage is `len` initialised bytes owned by `self`.
        unsafe { slice::from_raw_parts(self.data.as_ptr(), len) }
    }

    /// All `capacity × size` storage bytes, mutably.
    pub(crate) fn storage_mut(&mut self) -> &mut [u8] {
        let len = self.capacity() * self.elem.size();
        // SAFETY: as in `storage`, and `&mut self` is exclusive.
        unsafe { slice::from_raw_parts_mut(self.data.as_ptr(), len) }
    }

    /// Reallocate to `capacity` slots. Length is unchanged.
    ///
    /// Bytes leaving the block are zeroed before a shrink; bytes added by
    /// a growth are zeroed after it. On error the block is untouched.
    pub(crate) fn resize(&mut self, capacity: usize, mode: AllocMode) -> Result<(), SeqError> {
        let old_capacity = self.capacity();
        let length = self.len();
        if capacity == 0 {
            return Err(SeqError::ZeroCapacity);
        }
        if capacity < length {
            return Err(SeqError::CapacityBelowLength {
                requested: capacity,
                length,
            });
        }
        if capacity == old_capacity {
            return Ok(());
        }
        let size = self.elem.size();
        let old_layout = block_layout(self.elem, old_capacity)?;
        let new_layout = block_layout(self.elem, capacity)?;

        if capacity < old_capacity {
            self.storage_mut()[capacity * size..].fill(0);
        }
        let pre = prefix(self.elem);
        // SAFETY: `data - prefix` is the start of the live allocation.
        let base = unsafe { self.data.sub(pre) };
        // SAFETY: `base` was allocated with `old_layout` by the global
        // allocator and `new_layout.size()` is non-zero and valid for its
        // alignment. A null return leaves the old block in place, so
        // retrying is sound.
        let new_base = acquire(mode, new_layout.size(), || unsafe {
            alloc::realloc(base.as_ptr(), old_layout, new_layout.size())
        })?;
        // SAFETY: the new block keeps the same prefix.
        self.data = unsafe { new_base.add(pre) };
        if capacity > old_capacity {
            // SAFETY: the added tail is inside the new block; realloc leaves
            // it uninitialised.
            unsafe {
                ptr::write_bytes(
                    self.data.as_ptr().add(old_capacity * size),
                    0,
                    (capacity - old_capacity) * size,
                );
            }
        }
        // SAFETY: the header moved with the block.
        unsafe { (*self.header()).capacity = capacity };

        tracing::trace!(
            element_size = size,
            old_capacity,
            new_capacity = capacity,
            relocated = new_base != base,
            "resized sequence block"
        );
        Ok(())
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        let capacity = self.capacity();
        let layout = block_layout(self.elem, capacity)
            .expect("a live block's layout was valid when it was allocated");
        let pre = prefix(self.elem);
        // SAFETY: `data - prefix` is the start of a live allocation of
        // `layout`, so all `layout.size()` bytes are writable until it is
        // released exactly once here.
        unsafe {
            let base = self.data.as_ptr().sub(pre);
            scrub(base, layout.size());
            alloc::dealloc(base, layout);
        }
        tracing::debug!(
            element_size = self.elem.size(),
            capacity,
            "released sequence block"
        );
    }
}
