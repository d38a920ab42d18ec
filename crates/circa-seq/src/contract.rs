//! Fail-fast reporting for precondition violations.
//!
//! The infallible API checks every precondition before touching memory and
//! panics through [`violated`] when one fails. Both helpers are
//! `#[track_caller]`, and so is every public method that reaches them, so
//! the panic location is the caller's call site rather than this module.

use std::mem;

use crate::error::{Rejected, SeqError};

/// Abort the current operation with a contract violation.
#[cold]
#[track_caller]
pub(crate) fn violated(error: SeqError) -> ! {
    panic!("sequence contract violated: {error}")
}

/// Unwrap a result from the fallible path, treating any error as a violation.
#[track_caller]
pub(crate) fn expect<T>(result: Result<T, SeqError>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => violated(error),
    }
}

/// Like [`expect`], for consuming operations that hand the owner back.
///
/// On a violation the owner is leaked, not dropped: its block stays
/// allocated and unscrubbed, exactly as the caller passed it in.
#[track_caller]
pub(crate) fn expect_owned<S>(result: Result<S, Rejected<S>>) -> S {
    match result {
        Ok(seq) => seq,
        Err(rejected) => {
            let (seq, error) = rejected.into_parts();
            mem::forget(seq);
            violated(error)
        }
    }
}
