//! The `WeakRef<T>` observer implementation.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr::{self, NonNull};

use crate::block::{Binding, ControlBlock};
use crate::error::AccessError;
use crate::owner::Owner;

/// A non-owning observer of an object held by an [`Owner`].
///
/// A `WeakRef` caches the object's address and shares the owner's control
/// block. It never drops the object and never keeps it alive. Once the owner
/// destroys or releases the object, [`ptr_is_valid`](WeakRef::ptr_is_valid)
/// reports `false`; the cached address is left as it was and must not be
/// dereferenced from then on.
///
/// Cloning a `WeakRef` is cheap and registers one more holder of the control
/// block. The block is freed when the last holder, owner or observer, lets go.
///
/// Equality, ordering and hashing all use the object's address, so a
/// `WeakRef` can key a `BTreeMap` or `HashMap` by identity.
///
/// # Examples
///
/// ```
/// use solo_owner::Owner;
///
/// let mut owner = Owner::new(5);
/// let weak = owner.get_non_owner();
///
/// assert!(weak.ptr_is_valid());
/// assert_eq!(unsafe { *weak.get().unwrap().as_ref() }, 5);
///
/// owner.destroy();
/// assert!(!weak.ptr_is_valid());
/// ```
pub struct WeakRef<T: ?Sized> {
    /// Left untouched when the object is destroyed.
    binding: Option<Binding<T>>,
}

impl<T> WeakRef<T> {
    /// Raw pointer to the object, or null if empty.
    ///
    /// The pointer is returned whether or not the object is still alive.
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        self.binding
            .map_or(ptr::null(), |binding| binding.ptr.as_ptr().cast_const())
    }
}

impl<T: ?Sized> WeakRef<T> {
    /// Create an empty `WeakRef`.
    #[must_use]
    pub const fn null() -> Self {
        Self { binding: None }
    }

    /// Bind to `ptr` and register as a holder of `block`.
    ///
    /// # Safety
    ///
    /// `block` must be a live control block, kept alive by a ref the caller
    /// holds for the duration of this call, and `ptr` must be the object (or
    /// a reinterpretation of the object) that `block` tracks.
    pub(crate) unsafe fn from_parts(ptr: NonNull<T>, block: NonNull<ControlBlock>) -> Self {
        // SAFETY: guaranteed by the caller.
        unsafe { block.as_ref() }.inc_ref();
        Self {
            binding: Some(Binding { ptr, block }),
        }
    }

    pub(crate) const fn binding(&self) -> Option<Binding<T>> {
        self.binding
    }

    /// Returns `true` if this `WeakRef` observes nothing.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.binding.is_none()
    }

    /// Pointer to the object, or `None` if empty.
    ///
    /// This is returned unconditionally. Check
    /// [`ptr_is_valid`](WeakRef::ptr_is_valid) before dereferencing it.
    #[must_use]
    pub fn get(&self) -> Option<NonNull<T>> {
        self.binding.map(|binding| binding.ptr)
    }

    /// Thin address of the object, null if empty. Used for identity comparison.
    #[must_use]
    pub fn addr(&self) -> *const () {
        self.binding.map_or(ptr::null(), Binding::addr)
    }

    /// Whether it is safe to use the pointer returned by [`get`](WeakRef::get).
    ///
    /// Returns `true` for an empty `WeakRef`: there is nothing to have been
    /// destroyed. Otherwise returns `false` once the owner has begun
    /// destroying or releasing the object.
    ///
    /// The check itself never touches the object, only the control block,
    /// which stays allocated for as long as this `WeakRef` exists.
    #[must_use]
    pub fn ptr_is_valid(&self) -> bool {
        // SAFETY: we hold one of the block's refs.
        self.binding
            .is_none_or(|binding| unsafe { binding.block() }.is_alive())
    }

    /// Pointer to the object if it is bound and still alive.
    ///
    /// # Errors
    ///
    /// [`AccessError::Empty`] if this `WeakRef` observes nothing,
    /// [`AccessError::Dead`] if the owner has destroyed or released the object.
    pub fn try_get(&self) -> Result<NonNull<T>, AccessError> {
        let binding = self.binding.ok_or(AccessError::Empty)?;
        // SAFETY: we hold one of the block's refs.
        if unsafe { binding.block() }.is_alive() {
            Ok(binding.ptr)
        } else {
            Err(AccessError::Dead)
        }
    }

    /// Borrow the object if it is bound and still alive.
    ///
    /// # Safety
    ///
    /// While the returned reference is in use, the owning [`Owner`] must not
    /// be destroyed, released, dropped or mutably borrowed, and the object
    /// must not be mutated through any other path.
    #[must_use]
    pub unsafe fn as_ref(&self) -> Option<&T> {
        // SAFETY: liveness is checked by `try_get`; the rest is on the caller.
        self.try_get().ok().map(|ptr| unsafe { ptr.as_ref() })
    }

    /// Number of holders of the control block: the owner, if it still holds
    /// the object, plus every live observer. Returns 0 if empty.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        // SAFETY: we hold one of the block's refs.
        self.binding
            .map_or(0, |binding| unsafe { binding.block() }.refs())
    }

    /// Stop observing, leaving this `WeakRef` empty.
    pub fn clear(&mut self) {
        if let Some(binding) = self.binding.take() {
            // SAFETY: giving up the ref taken in `from_parts`.
            unsafe {
                ControlBlock::dec_ref(binding.block);
            }
        }
    }

    /// Returns `true` if this `WeakRef` observes the object held by `owner`.
    #[must_use]
    pub fn is(&self, owner: &Owner<T>) -> bool {
        self.addr() == Owner::addr(owner)
    }
}

impl<T: ?Sized> Clone for WeakRef<T> {
    fn clone(&self) -> Self {
        match self.binding {
            None => Self::null(),
            // SAFETY: our own ref keeps the block alive during the call.
            Some(binding) => unsafe { Self::from_parts(binding.ptr, binding.block) },
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.clear();
        *self = source.clone();
    }
}

impl<T: ?Sized> Drop for WeakRef<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: ?Sized> Default for WeakRef<T> {
    /// Constructs an empty `WeakRef`.
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized> From<&Owner<T>> for WeakRef<T> {
    fn from(owner: &Owner<T>) -> Self {
        owner.get_non_owner()
    }
}

impl<T: ?Sized, U: ?Sized> PartialEq<WeakRef<U>> for WeakRef<T> {
    fn eq(&self, other: &WeakRef<U>) -> bool {
        self.addr() == other.addr()
    }
}

impl<T: ?Sized> Eq for WeakRef<T> {}

impl<T: ?Sized, U: ?Sized> PartialEq<Owner<U>> for WeakRef<T> {
    fn eq(&self, other: &Owner<U>) -> bool {
        self.addr() == Owner::addr(other)
    }
}

impl<T: ?Sized> PartialOrd for WeakRef<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: ?Sized> Ord for WeakRef<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.addr().cmp(&other.addr())
    }
}

impl<T: ?Sized> Hash for WeakRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for WeakRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "WeakRef(<null>)");
        }
        f.debug_struct("WeakRef")
            .field("addr", &self.addr())
            .field("valid", &self.ptr_is_valid())
            .finish()
    }
}

impl<T: ?Sized> fmt::Pointer for WeakRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.addr(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_null_weak_is_vacuously_valid() {
        let weak: WeakRef<i32> = WeakRef::null();
        assert!(weak.is_null());
        assert!(weak.ptr_is_valid());
        assert!(weak.get().is_none());
        assert!(weak.as_ptr().is_null());
        assert_eq!(weak.ref_count(), 0);
        assert_eq!(weak.try_get(), Err(AccessError::Empty));
    }

    #[test]
    fn test_scenario_int_owner() {
        let mut owner = Owner::new(5);
        let weak = owner.get_non_owner();

        assert!(weak.ptr_is_valid());
        assert_eq!(unsafe { *weak.as_ptr() }, 5);

        owner.destroy();
        assert!(!weak.ptr_is_valid());
        assert_eq!(weak.try_get(), Err(AccessError::Dead));
        assert!(unsafe { weak.as_ref() }.is_none());
    }

    #[test]
    fn test_address_survives_invalidation() {
        let mut owner = Owner::new(11_u32);
        let weak = owner.get_non_owner();
        let addr = weak.addr();

        owner.destroy();
        assert_eq!(weak.addr(), addr);
        assert!(!weak.is_null());
    }

    #[test]
    fn test_clone_and_drop_round_trip() {
        let owner = Owner::new("x");
        let weak = owner.get_non_owner();
        let before = weak.ref_count();

        let copies: Vec<_> = (0..8).map(|_| weak.clone()).collect();
        assert_eq!(Owner::ref_count(&owner), before + 8);
        drop(copies);
        assert_eq!(Owner::ref_count(&owner), before);
    }

    #[test]
    fn test_clone_from_releases_previous_binding() {
        let a = Owner::new(1);
        let b = Owner::new(2);
        let mut weak = a.get_non_owner();
        let other = b.get_non_owner();

        weak.clone_from(&other);
        assert_eq!(Owner::ref_count(&a), 1);
        assert_eq!(Owner::ref_count(&b), 3);
        assert!(weak.is(&b));
    }

    #[test]
    fn test_move_keeps_ref_count() {
        let owner = Owner::new(0);
        let mut weak = owner.get_non_owner();
        let moved = std::mem::take(&mut weak);

        assert!(weak.is_null());
        assert!(moved.is(&owner));
        assert_eq!(Owner::ref_count(&owner), 2);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let owner = Owner::new(0);
        let mut weak = owner.get_non_owner();
        weak.clear();
        weak.clear();
        assert!(weak.is_null());
        assert_eq!(Owner::ref_count(&owner), 1);
    }

    #[test]
    fn test_weak_outlives_owner_and_frees_block() {
        let before = crate::leak::stats();
        let weak = {
            let owner = Owner::new(vec![1, 2, 3]);
            owner.get_non_owner()
        };
        assert!(!weak.ptr_is_valid());
        assert_eq!(weak.ref_count(), 1);
        assert_eq!(
            crate::leak::stats().live_blocks(),
            before.live_blocks() + 1
        );

        drop(weak);
        assert!(crate::leak::check_since(&before).is_ok());
    }

    #[test]
    fn test_ordering_by_address() {
        let owners: Vec<Owner<u8>> = (0..4).map(Owner::new).collect();
        let set: BTreeSet<WeakRef<u8>> = owners
            .iter()
            .map(Owner::get_non_owner)
            .chain(owners.iter().map(Owner::get_non_owner))
            .collect();

        assert_eq!(set.len(), 4);
        let addrs: Vec<_> = set.iter().map(WeakRef::addr).collect();
        assert!(addrs.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_debug_format() {
        let owner = Owner::new(1);
        let weak = owner.get_non_owner();
        assert!(format!("{weak:?}").contains("valid: true"));
        assert_eq!(format!("{:?}", WeakRef::<i32>::null()), "WeakRef(<null>)");
    }
}
