//! Identity-based lookup over sequences of owners.
//!
//! These helpers find an [`Owner`] in a sequence by the address a
//! [`WeakRef`] observes, never by comparing values. They are linear scans
//! and keep no state of their own.
//!
//! An empty `WeakRef` matches an empty `Owner` in the sequence (both have a
//! null address) and nothing else.

use std::collections::VecDeque;

use crate::owner::Owner;
use crate::weak::WeakRef;

/// Position of the first owner whose object `weak` observes.
///
/// # Examples
///
/// ```
/// use solo_owner::{find_owner, Owner};
///
/// let owners = vec![Owner::new(1), Owner::new(1)];
/// let weak = owners[1].get_non_owner();
/// assert_eq!(find_owner(&owners, &weak), Some(1));
/// ```
#[must_use]
pub fn find_owner<T: ?Sized>(owners: &[Owner<T>], weak: &WeakRef<T>) -> Option<usize> {
    let target = weak.addr();
    owners.iter().position(|owner| Owner::addr(owner) == target)
}

/// Returns `true` if some owner in `owners` holds the object `weak` observes.
#[must_use]
pub fn contains_owner<T: ?Sized>(owners: &[Owner<T>], weak: &WeakRef<T>) -> bool {
    find_owner(owners, weak).is_some()
}

/// Remove and return the owner whose object `weak` observes.
///
/// The remaining owners keep their relative order. Returns an empty
/// [`Owner`] if there is no match. Ownership moves out of the vector, so the
/// object stays alive and `weak` stays valid.
///
/// # Examples
///
/// ```
/// use solo_owner::{extract_owner, Owner};
///
/// let mut owners = vec![Owner::new('a'), Owner::new('b'), Owner::new('c')];
/// let weak = owners[1].get_non_owner();
///
/// let b = extract_owner(&mut owners, &weak);
/// assert_eq!(*b, 'b');
/// assert_eq!(owners.len(), 2);
/// assert!(Owner::is_null(&extract_owner(&mut owners, &weak)));
/// ```
#[must_use = "dropping the extracted owner destroys the object"]
pub fn extract_owner<T: ?Sized>(owners: &mut Vec<Owner<T>>, weak: &WeakRef<T>) -> Owner<T> {
    find_owner(owners, weak).map_or_else(Owner::null, |index| owners.remove(index))
}

/// Identity-based lookup on ordered containers of owners.
///
/// Implemented for `Vec<Owner<T>>` and `VecDeque<Owner<T>>`.
///
/// ```
/// use solo_owner::{Owner, OwnerSeqExt};
/// use std::collections::VecDeque;
///
/// let mut queue: VecDeque<_> = (0..3).map(Owner::new).collect();
/// let weak = queue[2].get_non_owner();
///
/// assert!(queue.contains_owner(&weak));
/// let owner = queue.extract_owner(&weak);
/// assert!(!queue.contains_owner(&weak));
/// assert!(weak.ptr_is_valid());
/// drop(owner);
/// assert!(!weak.ptr_is_valid());
/// ```
pub trait OwnerSeqExt<T: ?Sized> {
    /// Position of the first owner whose object `weak` observes.
    fn find_owner(&self, weak: &WeakRef<T>) -> Option<usize>;

    /// Returns `true` if some owner holds the object `weak` observes.
    fn contains_owner(&self, weak: &WeakRef<T>) -> bool {
        self.find_owner(weak).is_some()
    }

    /// Remove and return the matching owner, or an empty [`Owner`].
    ///
    /// The remaining owners keep their relative order.
    #[must_use = "dropping the extracted owner destroys the object"]
    fn extract_owner(&mut self, weak: &WeakRef<T>) -> Owner<T>;
}

impl<T: ?Sized> OwnerSeqExt<T> for Vec<Owner<T>> {
    fn find_owner(&self, weak: &WeakRef<T>) -> Option<usize> {
        find_owner(self, weak)
    }

    fn extract_owner(&mut self, weak: &WeakRef<T>) -> Owner<T> {
        extract_owner(self, weak)
    }
}

impl<T: ?Sized> OwnerSeqExt<T> for VecDeque<Owner<T>> {
    fn find_owner(&self, weak: &WeakRef<T>) -> Option<usize> {
        let target = weak.addr();
        self.iter().position(|owner| Owner::addr(owner) == target)
    }

    fn extract_owner(&mut self, weak: &WeakRef<T>) -> Owner<T> {
        self.find_owner(weak)
            .and_then(|index| self.remove(index))
            .unwrap_or_default()
    }
}
