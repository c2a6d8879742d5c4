//! The out-of-band bookkeeping shared by an `Owner` and its `WeakRef`s.

use std::cell::Cell;
use std::ptr::NonNull;

use crate::{events, leak};

// ============================================================================
// `ControlBlock` - Liveness flag and holder count
// ============================================================================

/// Liveness flag and holder count for a single owned object.
///
/// The block lives in its own allocation, separate from the object, so the
/// flag stays readable after the object has been dropped. It is freed by
/// whichever holder brings `refs` down to zero.
pub(crate) struct ControlBlock {
    /// Cleared by the owner before the object is dropped. Never set again.
    alive: Cell<bool>,
    /// The owner (while bound) plus every live `WeakRef`.
    refs: Cell<usize>,
}

impl ControlBlock {
    /// Allocate a fresh block with `alive = true` and `refs = 1`.
    ///
    /// The single reference belongs to the `Owner` that requested it.
    pub(crate) fn allocate() -> NonNull<Self> {
        let block = Box::new(Self {
            alive: Cell::new(true),
            refs: Cell::new(1),
        });
        leak::record_block_allocated();
        NonNull::from(Box::leak(block))
    }

    /// Whether the owner has not yet begun destroying the object.
    #[inline]
    pub(crate) fn is_alive(&self) -> bool {
        self.alive.get()
    }

    /// Mark the object as dead.
    #[inline]
    pub(crate) fn invalidate(&self) {
        self.alive.set(false);
    }

    /// Current number of holders.
    #[inline]
    pub(crate) fn refs(&self) -> usize {
        self.refs.get()
    }

    /// Register one more holder.
    ///
    /// Aborts on overflow, the same way `std::rc::Rc` does; continuing would
    /// let the block be freed while holders remain.
    #[inline]
    pub(crate) fn inc_ref(&self) {
        let Some(count) = self.refs.get().checked_add(1) else {
            std::process::abort();
        };
        self.refs.set(count);
    }

    /// Drop one holder. Returns true if this call freed the block.
    ///
    /// Takes a raw pointer because the block may be deallocated here, and no
    /// reference to it may outlive that.
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`ControlBlock::allocate`], must not have been
    /// freed, and the caller must own one of the `refs` it is giving up.
    pub(crate) unsafe fn dec_ref(ptr: NonNull<Self>) -> bool {
        // SAFETY: the caller holds a reference, so the block is still allocated.
        let count = unsafe { ptr.as_ref() }.refs.get();
        debug_assert!(count > 0, "ControlBlock::dec_ref on a block with no holders");

        if count > 1 {
            // SAFETY: as above.
            unsafe { ptr.as_ref() }.refs.set(count - 1);
            return false;
        }

        // SAFETY: we were the last holder; nobody else can observe the block.
        drop(unsafe { Box::from_raw(ptr.as_ptr()) });
        leak::record_block_freed();
        events::control_block_freed(ptr.as_ptr().cast_const().cast());
        true
    }
}

// ============================================================================
// `Binding` - Object address paired with its control block
// ============================================================================

/// The object address and control block held by a non-empty handle.
///
/// Handles store `Option<Binding<T>>`, so "both present or both absent" is
/// enforced by the type rather than by convention.
pub(crate) struct Binding<T: ?Sized> {
    pub(crate) ptr: NonNull<T>,
    pub(crate) block: NonNull<ControlBlock>,
}

impl<T: ?Sized> Binding<T> {
    /// Thin address of the object, for identity comparison.
    #[inline]
    pub(crate) fn addr(self) -> *const () {
        self.ptr.as_ptr().cast_const().cast()
    }

    /// Borrow the control block.
    ///
    /// # Safety
    ///
    /// The caller must hold one of the block's `refs` for as long as the
    /// returned reference is used.
    #[inline]
    pub(crate) unsafe fn block<'a>(self) -> &'a ControlBlock {
        // SAFETY: the caller guarantees the block outlives the borrow.
        unsafe { self.block.as_ref() }
    }
}

impl<T: ?Sized> Clone for Binding<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Binding<T> {}
