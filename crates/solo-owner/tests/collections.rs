//! Tests for identity-based lookup over sequences of owners.

#![cfg(feature = "collections")]

use solo_owner::{contains_owner, extract_owner, find_owner, Owner, OwnerSeqExt, WeakRef};
use std::collections::VecDeque;

#[derive(Debug, PartialEq, Eq)]
struct Widget {
    id: u32,
}

fn widgets(n: u32) -> Vec<Owner<Widget>> {
    (0..n).map(|id| Owner::new(Widget { id })).collect()
}

#[test]
fn test_extract_returns_same_object() {
    let mut list = widgets(6);
    let target = list[3].get_non_owner();
    let addr = target.addr();

    let owner = extract_owner(&mut list, &target);
    assert!(!Owner::is_null(&owner));
    assert_eq!(Owner::addr(&owner), addr);
    assert_eq!(owner.id, 3);
    assert_eq!(list.len(), 5);
    assert!(list.iter().all(|w| *w != target));

    let again = extract_owner(&mut list, &target);
    assert!(Owner::is_null(&again));
    assert_eq!(list.len(), 5);
}

#[test]
fn test_extract_keeps_remaining_order() {
    let mut list = widgets(5);
    let first = list[0].get_non_owner();
    let last = list[4].get_non_owner();

    let _first = extract_owner(&mut list, &first);
    let _last = extract_owner(&mut list, &last);
    let ids: Vec<u32> = list.iter().map(|w| w.id).collect();
    assert_eq!(ids, [1, 2, 3]);
}

#[test]
fn test_dropping_extracted_owner_invalidates() {
    let mut list = widgets(3);
    let target = list[1].get_non_owner();

    let owner = extract_owner(&mut list, &target);
    assert!(target.ptr_is_valid());
    drop(owner);
    assert!(!target.ptr_is_valid());
    assert!(!contains_owner(&list, &target));
}

#[test]
fn test_contains_uses_identity() {
    let list = widgets(3);
    let equal_value = Owner::new(Widget { id: 1 });
    assert_eq!(*list[1], *equal_value);

    assert!(contains_owner(&list, &list[1].get_non_owner()));
    assert!(!contains_owner(&list, &equal_value.get_non_owner()));
    assert!(!contains_owner(&[], &list[0].get_non_owner()));
    assert!(!contains_owner(&list, &WeakRef::null()));
}

#[test]
fn test_find_first_match() {
    let list = widgets(4);
    for (index, owner) in list.iter().enumerate() {
        assert_eq!(find_owner(&list, &owner.get_non_owner()), Some(index));
    }
}

#[test]
fn test_destroyed_owner_address_no_longer_in_sequence() {
    let mut list = widgets(2);
    let target = list[0].get_non_owner();
    list[0].destroy();

    assert!(!target.ptr_is_valid());
    assert!(!list.contains_owner(&target));
    assert!(Owner::is_null(&list.extract_owner(&target)));
    assert_eq!(list.len(), 2);
}

#[test]
fn test_vecdeque_helpers() {
    let mut queue: VecDeque<Owner<Widget>> = widgets(4).into();
    let target = queue[2].get_non_owner();

    assert_eq!(queue.find_owner(&target), Some(2));
    let owner = queue.extract_owner(&target);
    assert_eq!(owner.id, 2);
    let ids: Vec<u32> = queue.iter().map(|w| w.id).collect();
    assert_eq!(ids, [0, 1, 3]);
    assert!(!queue.contains_owner(&target));
}
