//! `circa_seq_*` functions.
//!
//! A handle is the `void *` returned by [`circa_seq_alloc`] (or any call
//! that returns a superseding handle). It points at element 0; the
//! length/capacity header sits just before it.

use std::ffi::c_void;
use std::mem::ManuallyDrop;
use std::ptr::{self, NonNull};
use std::slice;

use circa_seq::{ElemBytes, ElemLayout, RawSeq, SeqError};

/// Element layout for a C handle: `element_size` bytes at [`circa_seq::MAX_ALIGN`].
#[track_caller]
fn layout(element_size: usize) -> ElemLayout {
    match ElemLayout::from_size(element_size) {
        Ok(layout) => layout,
        Err(error) => panic!("sequence contract violated: {error}"),
    }
}

#[track_caller]
fn non_null(handle: *mut c_void) -> NonNull<u8> {
    match NonNull::new(handle.cast::<u8>()) {
        Some(data) => data,
        None => panic!("sequence contract violated: null sequence handle"),
    }
}

/// Take ownership of a live handle.
#[allow(unsafe_code)]
#[track_caller]
fn adopt(element_size: usize, handle: *mut c_void) -> RawSeq {
    let elem = layout(element_size);
    let data = non_null(handle);
    // SAFETY: the C contract requires `handle` to be a live handle created
    // with the same `element_size`, not retained by the caller after this
    // call returns a superseding one.
    unsafe { RawSeq::from_handle(data, elem) }
}

/// Borrow a live handle for the duration of `f` without taking ownership.
#[track_caller]
fn with_seq<R>(
    element_size: usize,
    handle: *mut c_void,
    f: impl FnOnce(&mut RawSeq) -> R,
) -> R {
    let mut seq = ManuallyDrop::new(adopt(element_size, handle));
    f(&mut seq)
}

fn leak(seq: RawSeq) -> *mut c_void {
    seq.into_handle().as_ptr().cast::<c_void>()
}

/// Copy the `element_size` bytes at `value`.
///
/// `value` may point into the very sequence about to be grown, so it is
/// read before the block can relocate.
#[allow(unsafe_code)]
#[track_caller]
fn element(element_size: usize, value: *const c_void) -> ElemBytes {
    assert!(
        !value.is_null(),
        "sequence contract violated: null element pointer"
    );
    // SAFETY: the C contract requires `value` to point at one element.
    let bytes = unsafe { slice::from_raw_parts(value.cast::<u8>(), element_size) };
    ElemBytes::from_slice(bytes)
}

/// Allocate an empty sequence with room for `capacity` elements.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_alloc(element_size: usize, capacity: usize) -> *mut c_void {
    ffi_guard!({ leak(RawSeq::with_capacity(layout(element_size), capacity)) })
}

/// Reallocate to exactly `capacity` elements. Returns the new handle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_resize(
    element_size: usize,
    seq: *mut c_void,
    capacity: usize,
) -> *mut c_void {
    ffi_guard!({ leak(adopt(element_size, seq).resize(capacity)) })
}

/// Grow to `capacity + headroom` unless `capacity` already fits.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_require(
    element_size: usize,
    seq: *mut c_void,
    capacity: usize,
    headroom: usize,
) -> *mut c_void {
    ffi_guard!({ leak(adopt(element_size, seq).reserve(capacity, headroom)) })
}

/// Zero and free a sequence. Null is a no-op. Always returns null.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_free(element_size: usize, seq: *mut c_void) -> *mut c_void {
    ffi_guard!({
        if !seq.is_null() {
            adopt(element_size, seq).release();
        }
        ptr::null_mut()
    })
}

/// Number of live elements. Null yields 0.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_len(seq: *mut c_void) -> usize {
    ffi_guard!({
        if seq.is_null() {
            return 0;
        }
        // Only the header is read, which sits at the same offset for every
        // element size.
        with_seq(1, seq, |s| s.len())
    })
}

/// Number of element slots. Null yields 0.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_cap(seq: *mut c_void) -> usize {
    ffi_guard!({
        if seq.is_null() {
            return 0;
        }
        with_seq(1, seq, |s| s.capacity())
    })
}

/// Whether `index` names a live element.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_has(element_size: usize, seq: *mut c_void, index: usize) -> bool {
    ffi_guard!({ with_seq(element_size, seq, |s| s.has(index)) })
}

/// Pointer to the element at `index`. Valid until the next call that
/// returns a superseding handle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_get(
    element_size: usize,
    seq: *mut c_void,
    index: usize,
) -> *mut c_void {
    ffi_guard!({
        with_seq(element_size, seq, |s| {
            s.get_mut(index).as_mut_ptr().cast::<c_void>()
        })
    })
}

/// Store the element at `value` at `index`, extending if needed.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_set(
    element_size: usize,
    seq: *mut c_void,
    index: usize,
    value: *const c_void,
    headroom: usize,
) -> *mut c_void {
    ffi_guard!({
        let value = element(element_size, value);
        leak(adopt(element_size, seq).set(index, &value, headroom))
    })
}

/// Drop every element, zeroing their slots.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_clear(element_size: usize, seq: *mut c_void) {
    ffi_guard!({ with_seq(element_size, seq, |s| s.clear()) })
}

/// Append the element at `value`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_push(
    element_size: usize,
    seq: *mut c_void,
    value: *const c_void,
    headroom: usize,
) -> *mut c_void {
    ffi_guard!({
        let value = element(element_size, value);
        leak(adopt(element_size, seq).push(&value, headroom))
    })
}

/// Copy the last element into `out`, removing it if `remove` is set.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_pop(
    element_size: usize,
    seq: *mut c_void,
    out: *mut c_void,
    remove: bool,
) {
    ffi_guard!({
        assert!(
            !out.is_null(),
            "sequence contract violated: null output pointer"
        );
        with_seq(element_size, seq, |s| {
            let top = if remove {
                s.pop()
            } else {
                s.top().iter().copied().collect()
            };
            // SAFETY: the C contract requires `out` to hold one element, and
            // `top` is exactly one element long.
            unsafe { ptr::copy_nonoverlapping(top.as_ptr(), out.cast::<u8>(), top.len()) };
        })
    })
}

/// New sequence holding a copy of `seq`, with capacity equal to its length.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_clone(element_size: usize, seq: *mut c_void) -> *mut c_void {
    ffi_guard!({ leak(with_seq(element_size, seq, |s| s.duplicate())) })
}

/// New sequence of `count` elements copied from `values`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_wrap(
    element_size: usize,
    count: usize,
    values: *const c_void,
) -> *mut c_void {
    ffi_guard!({
        let elem = layout(element_size);
        assert!(
            !values.is_null(),
            "sequence contract violated: null source pointer"
        );
        let bytes = match count.checked_mul(element_size) {
            Some(bytes) => bytes,
            None => panic!("sequence contract violated: {}", SeqError::CapacityOverflow),
        };
        // SAFETY: the C contract requires `values` to hold `count` elements.
        let source = unsafe { slice::from_raw_parts(values.cast::<u8>(), bytes) };
        leak(RawSeq::from_bytes(elem, count, source))
    })
}

/// Overwrite `dst` with the contents of `src`. Same handle is a no-op.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_copy(
    element_size: usize,
    dst: *mut c_void,
    src: *mut c_void,
    headroom: usize,
) -> *mut c_void {
    ffi_guard!({
        if dst == src {
            let _ = non_null(dst);
            return dst;
        }
        with_seq(element_size, src, |s| {
            leak(adopt(element_size, dst).copy_from(s, headroom))
        })
    })
}

/// Append the contents of `src` to `dst`. `src == dst` doubles the sequence.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_cat(
    element_size: usize,
    dst: *mut c_void,
    src: *mut c_void,
    headroom: usize,
) -> *mut c_void {
    ffi_guard!({
        if dst == src {
            return leak(adopt(element_size, dst).append_self(headroom));
        }
        with_seq(element_size, src, |s| {
            leak(adopt(element_size, dst).append(s, headroom))
        })
    })
}

/// Reverse the elements in place. Returns the new handle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn circa_seq_reverse(element_size: usize, seq: *mut c_void) -> *mut c_void {
    ffi_guard!({ leak(adopt(element_size, seq).reverse()) })
}
