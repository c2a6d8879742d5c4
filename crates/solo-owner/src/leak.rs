//! Allocation accounting for leak detection.
//!
//! When the `leak-check` feature is enabled, every control block and every
//! object handed to an [`Owner`](crate::Owner) is counted in a per-thread
//! ledger. Handles are `!Send`, so all of a handle's bookkeeping happens on
//! the thread that created it and the per-thread counts are exact.
//!
//! This is a debugging aid. Without the feature the hooks compile to nothing
//! and only the crate's own unit tests see the ledger.
#![cfg_attr(
    feature = "leak-check",
    doc = r#"
```
use solo_owner::{leak, Owner};

let before = leak::stats();
{
    let owner = Owner::new(7);
    let _weak = owner.get_non_owner();
}
assert!(leak::check_since(&before).is_ok());

leak::reset();
std::mem::forget(Owner::new(8));
assert!(leak::check().is_err());
```
"#
)]

#[cfg(any(test, feature = "leak-check"))]
mod internal {
    use std::cell::Cell;
    use std::fmt;

    /// Snapshot of the per-thread allocation ledger.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct LeakStats {
        /// Control blocks allocated on this thread.
        pub blocks_allocated: usize,
        /// Control blocks freed on this thread.
        pub blocks_freed: usize,
        /// Objects bound to an `Owner` on this thread.
        pub objects_owned: usize,
        /// Objects dropped by their `Owner`.
        pub objects_dropped: usize,
        /// Objects handed back to the caller through `Owner::release`.
        pub objects_released: usize,
    }

    impl LeakStats {
        /// Create an empty ledger.
        #[must_use]
        pub const fn new() -> Self {
            Self {
                blocks_allocated: 0,
                blocks_freed: 0,
                objects_owned: 0,
                objects_dropped: 0,
                objects_released: 0,
            }
        }

        /// Control blocks that have not been freed.
        #[must_use]
        pub const fn live_blocks(&self) -> usize {
            self.blocks_allocated.saturating_sub(self.blocks_freed)
        }

        /// Objects still bound to an `Owner`.
        #[must_use]
        pub const fn live_objects(&self) -> usize {
            self.objects_owned
                .saturating_sub(self.objects_dropped)
                .saturating_sub(self.objects_released)
        }

        /// A fresh ledger holding only the live counts of `self`.
        const fn carried_over(&self) -> Self {
            Self {
                blocks_allocated: self.live_blocks(),
                objects_owned: self.live_objects(),
                ..Self::new()
            }
        }

        /// Whether every allocation recorded so far has been accounted for.
        #[must_use]
        pub const fn is_balanced(&self) -> bool {
            self.live_blocks() == 0 && self.live_objects() == 0
        }
    }

    impl fmt::Display for LeakStats {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(
                f,
                "{} live control block(s), {} live object(s)",
                self.live_blocks(),
                self.live_objects()
            )
        }
    }

    thread_local! {
        static STATS: Cell<LeakStats> = const { Cell::new(LeakStats::new()) };
    }

    // Handles may be dropped while the thread's locals are torn down; those
    // events go unrecorded.
    fn update(f: impl FnOnce(&mut LeakStats)) {
        let _ = STATS.try_with(|cell| {
            let mut stats = cell.get();
            f(&mut stats);
            cell.set(stats);
        });
    }

    /// Get the current thread's ledger.
    ///
    /// Returns an empty ledger if the thread's locals are already destroyed.
    #[must_use]
    pub fn stats() -> LeakStats {
        STATS.try_with(Cell::get).unwrap_or_default()
    }

    /// Restart the current thread's ledger.
    ///
    /// The history is cleared, but control blocks and objects that are live
    /// at the time of the call stay on the books as live. Freeing them later
    /// brings the counts back to zero instead of hiding a newer leak.
    pub fn reset() {
        update(|s| *s = s.carried_over());
    }

    /// Check that nothing recorded on this thread is still live.
    ///
    /// # Errors
    ///
    /// Returns the ledger if any control block or owned object is unaccounted for.
    pub fn check() -> Result<(), LeakStats> {
        let stats = stats();
        if stats.is_balanced() {
            Ok(())
        } else {
            Err(stats)
        }
    }

    /// Check that the live counts are back where they were at `baseline`.
    ///
    /// # Errors
    ///
    /// Returns the current ledger if more blocks or objects are live now than
    /// at `baseline`.
    pub fn check_since(baseline: &LeakStats) -> Result<(), LeakStats> {
        let stats = stats();
        if stats.live_blocks() > baseline.live_blocks()
            || stats.live_objects() > baseline.live_objects()
        {
            Err(stats)
        } else {
            Ok(())
        }
    }

    pub(crate) fn record_block_allocated() {
        update(|s| s.blocks_allocated += 1);
    }

    pub(crate) fn record_block_freed() {
        update(|s| s.blocks_freed += 1);
    }

    pub(crate) fn record_object_owned() {
        update(|s| s.objects_owned += 1);
    }

    pub(crate) fn record_object_dropped() {
        update(|s| s.objects_dropped += 1);
    }

    pub(crate) fn record_object_released() {
        update(|s| s.objects_released += 1);
    }
}

#[cfg(not(any(test, feature = "leak-check")))]
mod internal {
    #[inline]
    pub(crate) const fn record_block_allocated() {}

    #[inline]
    pub(crate) const fn record_block_freed() {}

    #[inline]
    pub(crate) const fn record_object_owned() {}

    #[inline]
    pub(crate) const fn record_object_dropped() {}

    #[inline]
    pub(crate) const fn record_object_released() {}
}

#[cfg(any(test, feature = "leak-check"))]
pub use internal::{check, check_since, reset, stats, LeakStats};

pub(crate) use internal::{
    record_block_allocated, record_block_freed, record_object_dropped, record_object_owned,
    record_object_released,
};
