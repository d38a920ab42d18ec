//! Benchmark inputs for circa sequences.
//!
//! - [`ramp`]: `0..len` pushed one at a time
//! - [`scrambled`]: deterministic pseudo-random values from a seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use circa_seq::Seq;

/// Growth headroom used by every benchmark.
pub const HEADROOM: usize = 64;

/// Build `[0, 1, ..., len - 1]` by repeated push from capacity 1.
pub fn ramp(len: u32) -> Seq<u32> {
    let mut seq = Seq::with_capacity(1);
    for v in 0..len {
        seq = seq.push(v, HEADROOM);
    }
    seq
}

/// `len` pseudo-random values, identical for identical seeds.
pub fn scrambled(len: usize, seed: u64) -> Seq<u64> {
    let mut seq = Seq::with_capacity(len.max(1));
    let mut state = seed;
    for _ in 0..len {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seq = seq.push(state >> 11, 0);
    }
    seq
}
