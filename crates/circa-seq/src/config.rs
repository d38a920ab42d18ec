//! Sequence configuration parameters.

use crate::error::SeqError;

/// Sizing parameters for a new sequence and its growth.
///
/// `initial_capacity` is the slot count of the first allocation.
/// `headroom` is the number of extra slots callers pass to growing
/// operations (`push`, `set`, `append`, ...) so that appends amortize to
/// O(1): when a call needs more room, the block grows to the required
/// capacity plus `headroom`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeqConfig {
    /// Slots allocated up front. Must be at least 1.
    ///
    /// Default: 16.
    pub initial_capacity: usize,

    /// Extra slots requested whenever a growing call has to relocate.
    ///
    /// Default: 16. Zero is valid but makes every append past capacity
    /// a relocation.
    pub headroom: usize,
}

impl SeqConfig {
    /// Default initial capacity.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

    /// Default growth headroom.
    pub const DEFAULT_HEADROOM: usize = 16;

    /// Create a config with the given initial capacity and default headroom.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            headroom: Self::DEFAULT_HEADROOM,
        }
    }

    /// Replace the growth headroom.
    pub fn with_headroom(mut self, headroom: usize) -> Self {
        self.headroom = headroom;
        self
    }

    /// Check the parameters before anything is allocated.
    pub fn validate(&self) -> Result<(), SeqError> {
        if self.initial_capacity == 0 {
            return Err(SeqError::ZeroCapacity);
        }
        if self.initial_capacity.checked_add(self.headroom).is_none() {
            return Err(SeqError::CapacityOverflow);
        }
        Ok(())
    }
}

impl Default for SeqConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INITIAL_CAPACITY)
    }
}
