//! Renderer-side scene state
//!
//! Geometry entities and the objects that place them in the world. Entities
//! are owned by the cache in [`crate::sync`] and handed out by handle; this
//! module defines what a handle points at.

pub mod data;
pub mod geometry;
pub mod object;
pub mod shader_list;

pub use data::{GeometryData, HairCurve, HairData, MeshData, VolumeData, VolumeGrid};
pub use geometry::{Geometry, GeometryHandle};
pub use object::{Object, ObjectKind};
pub use shader_list::ShaderList;
