//! Scene objects
//!
//! Objects place cached geometry in the world. One host object produces one
//! scene object per representation it syncs, so an emitter with hair shows
//! up twice, once for the surface and once for the strands.

use crate::foundation::math::Mat4;
use crate::host::SourceFlags;
use crate::scene::geometry::GeometryHandle;

/// Renderer-side object instance.
#[derive(Debug, Clone)]
pub struct Object {
    /// Name copied from the host object.
    pub name: String,
    /// Object-to-world transform at base time.
    pub transform: Mat4,
    /// Geometry the object places.
    pub geometry: GeometryHandle,
    /// Flags the object carried when it was last synchronized.
    pub flags: SourceFlags,
}

/// The representation an object synchronizes as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Triangle mesh surface.
    Mesh,
    /// Particle hair strands.
    Hair,
    /// Fluid domain volume.
    Volume,
}

impl ObjectKind {
    /// Classify a snapshot by its flags.
    ///
    /// Hair wins over volume so that a hair pass on a domain object still
    /// produces strands; plain meshes are the fallback.
    pub fn classify(flags: SourceFlags) -> Self {
        if flags.contains(SourceFlags::PARTICLE_HAIR) {
            Self::Hair
        } else if flags.contains(SourceFlags::FLUID_DOMAIN) {
            Self::Volume
        } else {
            Self::Mesh
        }
    }
}
