//! C ABI for circa sequences.
//!
//! Every function takes the element size explicitly and, where the block
//! may move, returns the superseding handle. The caller must pass the same
//! `element_size` on every call for a given handle, and must stop using a
//! handle as soon as a call returns a new one.
//!
//! Precondition violations (null handle, bad index, zero element size, ...)
//! abort the process before any memory is touched. Nothing unwinds across
//! the boundary.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body, aborting the process if it panics.
macro_rules! ffi_guard {
    ($body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(_) => {
                tracing::error!("contract violation at the C boundary, aborting");
                std::process::abort()
            }
        }
    };
}

pub mod seq;

pub use seq::*;
