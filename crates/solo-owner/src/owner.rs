//! The `Owner<T>` smart pointer implementation.
//!
//! An `Owner` is the single handle responsible for dropping its object.
//! It can mint any number of [`WeakRef`] observers that outlive the object
//! safely, because the liveness flag they read lives in a separately
//! allocated control block.

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use crate::block::{Binding, ControlBlock};
use crate::weak::WeakRef;
use crate::{events, leak};

/// An exclusive-ownership pointer whose observers can detect destruction.
///
/// `Owner<T>` behaves like `Box<T>`: it cannot be cloned, and dropping it
/// drops the value. Unlike a `Box`, it can hand out [`WeakRef`]s through
/// [`get_non_owner`](Owner::get_non_owner). Those observers never keep the
/// value alive; they can only ask whether it still is.
///
/// An `Owner` may also be empty, which is its [`Default`] state and the
/// state it is left in after [`destroy`](Owner::destroy),
/// [`release`](Owner::release) or [`take`](Owner::take).
///
/// # Thread Safety
///
/// `Owner<T>` is `!Send` and `!Sync`. The bookkeeping it shares with its
/// observers is updated without synchronization.
///
/// # Panics
///
/// Dereferencing an empty `Owner` panics. Use [`Owner::as_ref`] for
/// fallible access.
///
/// Accessors such as [`Owner::take`] and [`Owner::ref_count`] are associated
/// functions, so they never hide a method of the same name on `T`.
///
/// # Examples
///
/// ```
/// use solo_owner::Owner;
///
/// let mut owner = Owner::new(5);
/// let weak = owner.get_non_owner();
/// assert!(weak.ptr_is_valid());
///
/// owner.destroy();
/// assert!(!weak.ptr_is_valid());
/// ```
pub struct Owner<T: ?Sized> {
    binding: Option<Binding<T>>,
    /// `Owner` drops a `T`.
    _marker: PhantomData<T>,
}

impl<T> Owner<T> {
    /// Move `value` to the heap and take ownership of it.
    ///
    /// Allocation failure aborts through the global allocator; no partially
    /// constructed `Owner` is ever observable.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_owner::Owner;
    ///
    /// let owner = Owner::new(String::from("hello"));
    /// assert_eq!(owner.len(), 5);
    /// ```
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::from_box(Box::new(value))
    }

    /// Raw pointer to the object, or null if empty.
    #[must_use]
    pub fn as_ptr(this: &Self) -> *const T {
        this.binding
            .map_or(ptr::null(), |binding| binding.ptr.as_ptr().cast_const())
    }
}

impl<T: ?Sized> Owner<T> {
    /// Take ownership of an already boxed value.
    ///
    /// This is the way to own unsized values:
    ///
    /// ```
    /// use solo_owner::Owner;
    /// use std::fmt::Display;
    ///
    /// let owner: Owner<dyn Display> = Owner::from_box(Box::new(42));
    /// assert_eq!(owner.to_string(), "42");
    /// ```
    #[must_use]
    pub fn from_box(boxed: Box<T>) -> Self {
        let ptr = NonNull::from(Box::leak(boxed));
        let block = ControlBlock::allocate();
        leak::record_object_owned();
        Self {
            binding: Some(Binding { ptr, block }),
            _marker: PhantomData,
        }
    }

    /// Create an empty `Owner`.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            binding: None,
            _marker: PhantomData,
        }
    }

    /// Returns `true` if this `Owner` holds no object.
    ///
    /// ```
    /// use solo_owner::Owner;
    ///
    /// let mut owner = Owner::new(1);
    /// assert!(!Owner::is_null(&owner));
    /// owner.destroy();
    /// assert!(Owner::is_null(&owner));
    /// ```
    #[must_use]
    pub const fn is_null(this: &Self) -> bool {
        this.binding.is_none()
    }

    /// Pointer to the object, or `None` if empty.
    #[must_use]
    pub fn get(this: &Self) -> Option<NonNull<T>> {
        this.binding.map(|binding| binding.ptr)
    }

    /// Thin address of the object, null if empty. Used for identity comparison.
    #[must_use]
    pub fn addr(this: &Self) -> *const () {
        this.binding.map_or(ptr::null(), Binding::addr)
    }

    /// Borrow the object, or `None` if empty.
    #[must_use]
    pub fn as_ref(this: &Self) -> Option<&T> {
        // SAFETY: a bound owner's object is alive until the owner lets go of it,
        // which requires `&mut`.
        this.binding.map(|binding| unsafe { binding.ptr.as_ref() })
    }

    /// Mutably borrow the object, or `None` if empty.
    #[must_use]
    pub fn as_mut(this: &mut Self) -> Option<&mut T> {
        // SAFETY: as in `as_ref`; `&mut` excludes any other borrow through
        // this owner. Observers only reach the object through unsafe code.
        this.binding
            .map(|mut binding| unsafe { binding.ptr.as_mut() })
    }

    /// Number of holders of the control block: this owner plus its live
    /// observers. Returns 0 if empty.
    #[must_use]
    pub fn ref_count(this: &Self) -> usize {
        // SAFETY: this owner holds one of the block's refs.
        this.binding
            .map_or(0, |binding| unsafe { binding.block() }.refs())
    }

    /// Create an observer of the object.
    ///
    /// Returns an empty [`WeakRef`] if this `Owner` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_owner::Owner;
    ///
    /// let owner = Owner::new(7);
    /// let weak = owner.get_non_owner();
    /// assert_eq!(Owner::ref_count(&owner), 2);
    /// assert!(weak == owner);
    /// ```
    #[must_use]
    pub fn get_non_owner(&self) -> WeakRef<T> {
        match self.binding {
            None => WeakRef::null(),
            // SAFETY: the block is live because we hold a ref to it.
            Some(binding) => unsafe { WeakRef::from_parts(binding.ptr, binding.block) },
        }
    }

    /// Drop the object and leave this `Owner` empty.
    ///
    /// Observers see [`WeakRef::ptr_is_valid`] turn false before the object's
    /// destructor runs. Calling `destroy` on an empty `Owner` does nothing.
    pub fn destroy(&mut self) {
        let Some(ptr) = self.unbind(events::owner_destroyed) else {
            return;
        };
        // SAFETY: the object came from `Box::leak` in `from_box` and nobody
        // else is allowed to free it.
        drop(unsafe { Box::from_raw(ptr.as_ptr()) });
        leak::record_object_dropped();
    }

    /// Give up ownership without dropping the object.
    ///
    /// Observers are invalidated exactly as by [`destroy`](Owner::destroy);
    /// dropping the object becomes the caller's job. Returns `None` if empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_owner::Owner;
    ///
    /// let mut owner = Owner::new(3);
    /// let weak = owner.get_non_owner();
    /// let boxed = owner.release().unwrap();
    ///
    /// assert_eq!(*boxed, 3);
    /// assert!(Owner::is_null(&owner));
    /// assert!(!weak.ptr_is_valid());
    /// ```
    #[must_use = "dropping the released box drops the object"]
    pub fn release(&mut self) -> Option<Box<T>> {
        let ptr = self.unbind(events::owner_released)?;
        leak::record_object_released();
        // SAFETY: as in `destroy`.
        Some(unsafe { Box::from_raw(ptr.as_ptr()) })
    }

    /// Move the object out into a new `Owner`, leaving this one empty.
    ///
    /// Observers stay valid; ownership moves without touching the control block.
    ///
    /// ```
    /// use solo_owner::Owner;
    ///
    /// let mut slot = Owner::new(Some(4));
    /// let moved = Owner::take(&mut slot);
    /// assert!(Owner::is_null(&slot));
    /// assert_eq!(*moved, Some(4));
    /// ```
    #[must_use]
    pub fn take(this: &mut Self) -> Self {
        mem::take(this)
    }

    /// Reinterpret the owned object as another type, keeping observers intact.
    ///
    /// The control block is carried over unchanged, so existing [`WeakRef`]s
    /// keep tracking the object.
    ///
    /// ```
    /// use solo_owner::Owner;
    /// use std::fmt::Debug;
    /// use std::ptr::NonNull;
    ///
    /// let owner = Owner::new(vec![1, 2, 3]);
    /// let weak = owner.get_non_owner();
    /// let owner: Owner<dyn Debug> = unsafe {
    ///     owner.cast_with(|ptr| -> NonNull<dyn Debug> { ptr })
    /// };
    /// assert!(owner == weak);
    /// ```
    ///
    /// # Safety
    ///
    /// `f` must return a pointer to the same object, typed so that the
    /// object can later be dropped and deallocated as a `Box<U>`. An unsizing
    /// coercion satisfies this.
    #[must_use]
    pub unsafe fn cast_with<U, F>(mut self, f: F) -> Owner<U>
    where
        U: ?Sized,
        F: FnOnce(NonNull<T>) -> NonNull<U>,
    {
        // `self` stays bound until `f` returns, so a panic in `f` drops it.
        let binding = self.binding.map(|binding| Binding {
            ptr: f(binding.ptr),
            block: binding.block,
        });
        self.binding = None;
        Owner {
            binding,
            _marker: PhantomData,
        }
    }

    /// Invalidate the control block, give up this owner's ref to it and
    /// become empty. Returns the object, which the caller must dispose of.
    fn unbind(&mut self, log: fn(*const (), usize)) -> Option<NonNull<T>> {
        let binding = self.binding.take()?;
        // SAFETY: we still hold our ref; the block is alive until `dec_ref`.
        let refs_remaining = unsafe {
            let block = binding.block();
            block.invalidate();
            block.refs() - 1
        };
        // SAFETY: giving up the ref this owner held since `from_box`.
        unsafe {
            ControlBlock::dec_ref(binding.block);
        }
        log(binding.addr(), refs_remaining);
        Some(binding.ptr)
    }
}

impl<T: ?Sized> Drop for Owner<T> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<T: ?Sized> Deref for Owner<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match Self::as_ref(self) {
            Some(value) => value,
            None => panic!("Owner::deref: dereferenced an empty Owner"),
        }
    }
}

impl<T: ?Sized> DerefMut for Owner<T> {
    fn deref_mut(&mut self) -> &mut T {
        match Self::as_mut(self) {
            Some(value) => value,
            None => panic!("Owner::deref_mut: dereferenced an empty Owner"),
        }
    }
}

impl<T: ?Sized> Default for Owner<T> {
    /// Constructs an empty `Owner`.
    fn default() -> Self {
        Self::null()
    }
}

impl<T> From<T> for Owner<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: ?Sized> From<Box<T>> for Owner<T> {
    fn from(boxed: Box<T>) -> Self {
        Self::from_box(boxed)
    }
}

// Identity comparison: two handles are equal when they point at the same
// address, never by comparing the values behind them.

impl<T: ?Sized, U: ?Sized> PartialEq<Owner<U>> for Owner<T> {
    fn eq(&self, other: &Owner<U>) -> bool {
        Self::addr(self) == Owner::addr(other)
    }
}

impl<T: ?Sized> Eq for Owner<T> {}

impl<T: ?Sized, U: ?Sized> PartialEq<WeakRef<U>> for Owner<T> {
    fn eq(&self, other: &WeakRef<U>) -> bool {
        Self::addr(self) == other.addr()
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Owner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Self::as_ref(self) {
            Some(value) => f.debug_tuple("Owner").field(&value).finish(),
            None => write!(f, "Owner(<null>)"),
        }
    }
}

impl<T: ?Sized> fmt::Pointer for Owner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&Self::addr(self), f)
    }
}
