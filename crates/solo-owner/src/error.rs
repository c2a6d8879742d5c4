//! Errors reported by checked access through a [`WeakRef`](crate::WeakRef).

use std::error;
use std::fmt;

/// Why a [`WeakRef`](crate::WeakRef) could not hand out its object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessError {
    /// The reference was never bound, or has been cleared or moved from.
    Empty,
    /// The owning [`Owner`](crate::Owner) has destroyed or released the object.
    Dead,
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("weak reference is empty"),
            Self::Dead => f.write_str("referenced object has been destroyed by its owner"),
        }
    }
}

impl error::Error for AccessError {}
