//! Relocating growable sequences with a hidden length/capacity header.
//!
//! A sequence is a single heap block: a small header recording capacity and
//! length, followed by `capacity` fixed-size element slots. The caller
//! holds a pointer to slot 0 (the *handle*); the header lives just before
//! it. Any operation that may grow or shrink the block can relocate it,
//! so those operations consume the sequence and return the new owner.
//!
//! # Architecture
//!
//! ```text
//! Seq<T: Pod>                  (typed view, traversal ops)
//! └── RawSeq                   (byte-level ops, runtime element size)
//!     └── Block                (raw.rs: header, alloc/realloc/free)
//!         └── │ Header{cap, len} │ slot 0 │ ... │ slot cap-1 │
//! ```
//!
//! # Invariants
//!
//! - `len <= capacity` and `capacity >= 1` for every live sequence.
//! - Every slot in `[len, capacity)` is all-zero between operations.
//! - Released blocks are zeroed before they go back to the allocator.
//!
//! # Failure model
//!
//! Precondition violations (bad index on read, pop from empty, resize
//! below length, ...) panic at the caller's location. Allocation failure
//! on the default path blocks and retries; every operation that allocates
//! also has a `try_*` form that makes one attempt and returns the error.
//!
//! Only `raw.rs` contains `unsafe` code.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
mod contract;
pub mod error;
pub mod layout;
mod raw;
pub mod raw_seq;
pub mod seq;
mod traverse;

// Public re-exports for the primary API surface.
pub use config::SeqConfig;
pub use error::{Rejected, SeqError};
pub use layout::{ElemLayout, MAX_ALIGN};
pub use raw_seq::{ElemBytes, RawSeq};
pub use seq::Seq;
