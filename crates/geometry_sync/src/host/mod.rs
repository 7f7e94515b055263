//! Host integration surface
//!
//! The cache never talks to a host scene graph directly. Each update pass the
//! host hands over [`SourceObject`] snapshots built from plain identifiers
//! and flags, and implements three traits:
//!
//! - [`ShadingSystem`] resolves material references to shader handles
//! - [`GeometryExtractor`] fills geometry payloads when a rebuild is due
//! - [`StatusSink`] receives progress reporting for long rebuilds

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::math::Mat4;
use crate::scene::Geometry;

/// Opaque identity of an object or data block in the host scene graph.
///
/// Identities must be stable across passes for caching to work. Hosts
/// typically derive them from session-unique pointers or persistent ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub u64);

/// Handle to a shader owned by the host's shading system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShaderHandle(pub u64);

/// Reference to a material as the host scene graph stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialRef(pub u64);

bitflags! {
    /// Per-object conditions sampled from the host for one update pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SourceFlags: u32 {
        /// The object carries instance-level edits, so its geometry can never
        /// be shared with other users of the same data block.
        const MODIFIED = 1 << 0;
        /// The object changed since the previous pass.
        const UPDATED = 1 << 1;
        /// The snapshot describes the particle-hair representation of the
        /// object rather than its surface. Hosts emit a second snapshot with
        /// this flag set for objects that grow hair.
        const PARTICLE_HAIR = 1 << 2;
        /// The object is a fluid simulation domain rendered as a volume.
        const FLUID_DOMAIN = 1 << 3;
    }
}

impl Default for SourceFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Snapshot of one host object for the current update pass.
#[derive(Debug, Clone)]
pub struct SourceObject {
    /// Identity of the object instance.
    pub object: SourceId,
    /// Identity of the data block the instance points at. Several objects
    /// may point at the same data block.
    pub data: SourceId,
    /// Object name, used for status reporting.
    pub name: String,
    /// Data block name, used to label the geometry built from it.
    pub data_name: String,
    /// Condition flags sampled for this pass.
    pub flags: SourceFlags,
    /// Object-to-world transform.
    pub transform: Mat4,
    /// Ordered material slots. `None` marks an empty slot.
    pub material_slots: Vec<Option<MaterialRef>>,
    /// Motion steps requested for this object. Values below 2 disable
    /// motion sampling.
    pub motion_steps: usize,
}

impl SourceObject {
    /// Create a snapshot with the data block named after the object.
    pub fn new(object: SourceId, data: SourceId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            object,
            data,
            data_name: name.clone(),
            name,
            flags: SourceFlags::empty(),
            transform: Mat4::identity(),
            material_slots: Vec::new(),
            motion_steps: 0,
        }
    }

    /// Set the data block name.
    pub fn with_data_name(mut self, data_name: impl Into<String>) -> Self {
        self.data_name = data_name.into();
        self
    }

    /// Set the condition flags.
    pub fn with_flags(mut self, flags: SourceFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the object-to-world transform.
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Set the material slots.
    pub fn with_material_slots(mut self, slots: Vec<Option<MaterialRef>>) -> Self {
        self.material_slots = slots;
        self
    }

    /// Set the requested motion step count.
    pub fn with_motion_steps(mut self, steps: usize) -> Self {
        self.motion_steps = steps;
        self
    }
}

/// Shader resolution as the host's shading system provides it.
pub trait ShadingSystem {
    /// Shader substituted whenever a slot has no usable material.
    fn default_surface(&self) -> ShaderHandle;

    /// Resolve a material reference to the shader compiled for it.
    ///
    /// Returning `None` makes the slot fall back to the default surface.
    fn find_shader(&self, _material: MaterialRef) -> Option<ShaderHandle> {
        None
    }

    /// Whether the shader started requesting mesh attributes that were not
    /// captured when its geometry was last built.
    ///
    /// The flag belongs to the shading system. The cache only reads it while
    /// checking staleness and never clears it, so hosts reset it themselves
    /// once the pass that rebuilt the affected geometry completes.
    fn needs_attribute_rebuild(&self, _shader: ShaderHandle) -> bool {
        false
    }
}

/// Producer of geometry payloads.
///
/// Methods are only invoked for geometries the cache decided to rebuild, so
/// implementations never need their own staleness checks. The default bodies
/// do nothing, which keeps hosts that only deal in meshes free of hair and
/// volume boilerplate.
pub trait GeometryExtractor {
    /// Populate the triangle mesh payload for a rebuilt geometry.
    fn extract_mesh(&mut self, _source: &SourceObject, _geometry: &mut Geometry) {}

    /// Populate the hair curve payload for a rebuilt geometry.
    fn extract_hair(&mut self, _source: &SourceObject, _geometry: &mut Geometry) {}

    /// Populate the volume grid payload for a rebuilt geometry.
    fn extract_volume(&mut self, _source: &SourceObject, _geometry: &mut Geometry) {}

    /// Record mesh vertex positions for one motion step.
    fn extract_mesh_motion(&mut self, _source: &SourceObject, _geometry: &mut Geometry, _step: usize) {
    }

    /// Record hair key positions for one motion step.
    fn extract_hair_motion(&mut self, _source: &SourceObject, _geometry: &mut Geometry, _step: usize) {
    }
}

/// Receiver for synchronization progress updates.
pub trait StatusSink {
    /// Record a status line for the entity currently being synchronized.
    fn set_status(&mut self, status: &str, name: &str);
}

/// Status sink that forwards progress to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn set_status(&mut self, status: &str, name: &str) {
        log::info!("{}: {}", status, name);
    }
}
