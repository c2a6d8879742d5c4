//! Type-changing conversions between weak references.
//!
//! A cast produces a new [`WeakRef`] of another type that shares the
//! original's control block, so it tracks the same [`Owner`](crate::Owner).
//! Nothing is checked at runtime; the caller vouches for the relationship
//! between the two types.

use std::ptr::NonNull;

use crate::weak::WeakRef;

impl<T: ?Sized> WeakRef<T> {
    /// Reinterpret the observed address as a `U`.
    ///
    /// An empty `WeakRef` casts to an empty `WeakRef<U>`. Otherwise the new
    /// reference shares this one's control block and counts as one more
    /// holder of it.
    ///
    /// # Safety
    ///
    /// While the object is alive, a pointer to it must also be a valid
    /// pointer to a `U`, for instance because `U` is a `#[repr(C)]` prefix of
    /// `T` or `T` is a `#[repr(transparent)]` wrapper around `U`.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_owner::Owner;
    ///
    /// #[repr(transparent)]
    /// struct Meters(f64);
    ///
    /// let owner = Owner::new(Meters(2.5));
    /// let weak = owner.get_non_owner();
    /// let raw = unsafe { weak.cast::<f64>() };
    ///
    /// assert!(raw == weak);
    /// assert_eq!(unsafe { *raw.as_ptr() }, 2.5);
    /// ```
    #[must_use]
    pub unsafe fn cast<U>(&self) -> WeakRef<U> {
        // SAFETY: forwarded to the caller.
        unsafe { self.cast_with(|ptr| ptr.cast::<U>()) }
    }

    /// Map the observed address to a `U` with `f`.
    ///
    /// This covers conversions [`cast`](WeakRef::cast) cannot express, such
    /// as unsizing to a trait object or narrowing one back to its concrete
    /// type. `f` is not called for an empty `WeakRef`.
    ///
    /// ```
    /// use solo_owner::{Owner, WeakRef};
    /// use std::fmt::Display;
    /// use std::ptr::NonNull;
    ///
    /// let owner = Owner::new(7_u8);
    /// let weak = owner.get_non_owner();
    /// let shown: WeakRef<dyn Display> = unsafe {
    ///     weak.cast_with(|ptr| -> NonNull<dyn Display> { ptr })
    /// };
    /// assert_eq!(unsafe { shown.as_ref() }.unwrap().to_string(), "7");
    /// ```
    ///
    /// # Safety
    ///
    /// `f` must return a pointer to the same object, and that pointer must
    /// be valid as a `U` while the object is alive.
    #[must_use]
    pub unsafe fn cast_with<U, F>(&self, f: F) -> WeakRef<U>
    where
        U: ?Sized,
        F: FnOnce(NonNull<T>) -> NonNull<U>,
    {
        match self.binding() {
            None => WeakRef::null(),
            // SAFETY: our own ref keeps the block alive during the call; the
            // pointer relationship is the caller's obligation.
            Some(binding) => unsafe { WeakRef::from_parts(f(binding.ptr), binding.block) },
        }
    }
}

/// Free-function form of [`WeakRef::cast`].
///
/// # Safety
///
/// See [`WeakRef::cast`].
#[must_use]
pub unsafe fn weak_cast<U, T: ?Sized>(weak: &WeakRef<T>) -> WeakRef<U> {
    // SAFETY: forwarded to the caller.
    unsafe { weak.cast::<U>() }
}
