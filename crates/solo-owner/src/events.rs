//! Ownership tracing support.
//!
//! When the `tracing` feature is enabled, this module emits structured
//! events for the irreversible transitions of an owned object: its owner
//! destroying it, its owner releasing it, and its control block being freed.

#[cfg(feature = "tracing")]
mod internal {
    /// An `Owner` invalidated its control block and dropped the object.
    pub fn owner_destroyed(addr: *const (), refs_remaining: usize) {
        tracing::debug!(addr = ?addr, refs_remaining, "owner_destroyed");
    }

    /// An `Owner` invalidated its control block and handed the object back.
    pub fn owner_released(addr: *const (), refs_remaining: usize) {
        tracing::debug!(addr = ?addr, refs_remaining, "owner_released");
    }

    /// The last holder of a control block freed it.
    pub fn control_block_freed(block: *const ()) {
        tracing::trace!(block = ?block, "control_block_freed");
    }
}

#[cfg(not(feature = "tracing"))]
mod internal {
    /// Stub function when tracing is disabled.
    #[inline]
    pub const fn owner_destroyed(_addr: *const (), _refs_remaining: usize) {}

    /// Stub function when tracing is disabled.
    #[inline]
    pub const fn owner_released(_addr: *const (), _refs_remaining: usize) {}

    /// Stub function when tracing is disabled.
    #[inline]
    pub const fn control_block_freed(_block: *const ()) {}
}

pub(crate) use internal::{control_block_freed, owner_destroyed, owner_released};
