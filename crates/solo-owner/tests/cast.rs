//! Tests for casting weak references between related types.

use solo_owner::{weak_cast, Owner, WeakRef};
use std::any::Any;
use std::ptr::NonNull;

trait Animal {
    fn name(&self) -> &'static str;
}

struct Dog;

impl Animal for Dog {
    fn name(&self) -> &'static str {
        "dog"
    }
}

#[repr(C)]
struct Header {
    tag: u16,
}

#[repr(C)]
struct Packet {
    header: Header,
    payload: [u8; 4],
}

#[test]
fn test_cast_empty_yields_empty() {
    let weak: WeakRef<Packet> = WeakRef::null();
    let header = unsafe { weak_cast::<Header, _>(&weak) };
    assert!(header.is_null());

    let animal: WeakRef<dyn Animal> =
        unsafe { WeakRef::<Dog>::null().cast_with(|ptr| -> NonNull<dyn Animal> { ptr }) };
    assert!(animal.is_null());
}

#[test]
fn test_cast_tracks_same_owner() {
    let mut owner = Owner::new(Packet {
        header: Header { tag: 0xBEEF },
        payload: [1, 2, 3, 4],
    });
    let packet = owner.get_non_owner();
    let header = unsafe { packet.cast::<Header>() };

    assert!(header == packet);
    assert!(header == owner);
    assert_eq!(unsafe { header.as_ref() }.map(|h| h.tag), Some(0xBEEF));
    assert_eq!(owner.payload, [1, 2, 3, 4]);

    owner.destroy();
    assert!(!packet.ptr_is_valid());
    assert!(!header.ptr_is_valid());
}

#[test]
fn test_widen_to_trait_object_and_narrow_back() {
    let owner = Owner::new(Dog);
    let dog = owner.get_non_owner();

    let animal: WeakRef<dyn Animal> =
        unsafe { dog.cast_with(|ptr| -> NonNull<dyn Animal> { ptr }) };
    assert_eq!(unsafe { animal.as_ref() }.map(|a| a.name()), Some("dog"));

    let narrowed = unsafe { animal.cast::<Dog>() };
    assert!(narrowed.is(&owner));
    assert_eq!(Owner::ref_count(&owner), 4);

    drop(owner);
    assert!(!animal.ptr_is_valid());
    assert!(!narrowed.ptr_is_valid());
}

#[test]
fn test_cast_from_dyn_owner() {
    let mut owner: Owner<dyn Any> = Owner::from_box(Box::new(17_i64));
    let any = owner.get_non_owner();
    assert!(owner.is::<i64>());

    let number = unsafe { any.cast::<i64>() };
    assert_eq!(unsafe { number.as_ref() }.copied(), Some(17));

    owner.destroy();
    assert!(!number.ptr_is_valid());
    assert_eq!(number.ref_count(), 2);
}

#[test]
fn test_owner_cast_with_keeps_observers() {
    let owner = Owner::new(Dog);
    let dog = owner.get_non_owner();

    let mut animal: Owner<dyn Animal> =
        unsafe { owner.cast_with(|ptr| -> NonNull<dyn Animal> { ptr }) };
    assert_eq!(animal.name(), "dog");
    assert!(dog.ptr_is_valid());
    assert_eq!(Owner::ref_count(&animal), 2);

    animal.destroy();
    assert!(!dog.ptr_is_valid());
}
