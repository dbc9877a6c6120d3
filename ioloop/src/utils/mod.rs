//! Internal data structures.
//!
//! These helpers are not part of the public API and back the
//! connection registry.

mod slab;

pub(crate) use slab::{Key, Slab};
