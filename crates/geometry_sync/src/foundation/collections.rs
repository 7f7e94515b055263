//! Specialized collection types
//!
//! Geometry entities live in a generational arena. Handles stay valid while
//! the entity is alive and lookups on evicted handles simply return `None`.

pub use slotmap::{new_key_type, SecondaryMap, SlotMap};
