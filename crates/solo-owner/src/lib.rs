//! A single-owner smart pointer with observers that can detect destruction.
//!
//! `solo-owner` provides [`Owner<T>`], an exclusive-ownership pointer in the
//! spirit of `Box<T>`, and [`WeakRef<T>`], a cheap non-owning observer that
//! can tell, at the point of use, whether the object it refers to has already
//! been destroyed.
//!
//! The object is never shared-owned: exactly one `Owner` drops it, at a
//! deterministic point. Observers cannot extend its lifetime. What they share
//! with the owner is a small, separately allocated control block holding a
//! liveness flag and a holder count, so the flag stays readable after the
//! object itself is gone.
//!
//! # Quick Start
//!
//! ```
//! use solo_owner::Owner;
//!
//! let mut owner = Owner::new(5);
//! let weak = owner.get_non_owner();
//!
//! assert!(weak.ptr_is_valid());
//! assert_eq!(unsafe { *weak.as_ptr() }, 5);
//!
//! owner.destroy();
//! assert!(!weak.ptr_is_valid());
//! ```
//!
//! # Observers Do Not Upgrade
//!
//! Unlike `std::rc::Weak`, a [`WeakRef`] is not upgraded into an owning
//! handle. It keeps the object's raw address and exposes it as-is; after the
//! owner destroys the object that address is stale. Check
//! [`WeakRef::ptr_is_valid`] (or use [`WeakRef::try_get`]) before every
//! dereference.
//!
//! # Collections
//!
//! With the default `collections` feature, [`find_owner`],
//! [`contains_owner`], [`extract_owner`] and the [`OwnerSeqExt`] trait look
//! up owners in a sequence by the identity a `WeakRef` observes.
//!
//! # Features
//!
//! - `collections` (default): identity-based lookup over sequences of owners.
//! - `leak-check`: per-thread accounting of control blocks and owned objects,
//!   exposed through the `leak` module.
//! - `tracing`: structured events for destruction, release and control block
//!   reclamation.
//!
//! # Thread Safety
//!
//! `Owner<T>` and `WeakRef<T>` are `!Send` and `!Sync`. The shared
//! bookkeeping is updated with plain, unsynchronized reads and writes.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod block;
mod cast;
#[cfg(feature = "collections")]
mod collections;
mod error;
mod events;
mod owner;
mod weak;

#[cfg(any(test, feature = "leak-check"))]
pub mod leak;
#[cfg(not(any(test, feature = "leak-check")))]
mod leak;

// Re-export public API
pub use cast::weak_cast;
#[cfg(feature = "collections")]
pub use collections::{contains_owner, extract_owner, find_owner, OwnerSeqExt};
pub use error::AccessError;
pub use owner::Owner;
pub use weak::WeakRef;
