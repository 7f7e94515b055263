//! Geometry payload data
//!
//! Plain storage for what extraction produces. The cache never inspects
//! payload contents; it swaps them wholesale when a geometry is rebuilt.

use crate::foundation::math::Point3;

/// Payload carried by a geometry entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GeometryData {
    /// No payload extracted yet.
    #[default]
    Empty,
    /// Triangle mesh payload.
    Mesh(MeshData),
    /// Hair curve payload.
    Hair(HairData),
    /// Volume grid payload.
    Volume(VolumeData),
}

impl GeometryData {
    /// Drop the payload.
    pub fn clear(&mut self) {
        *self = Self::Empty;
    }

    /// Whether no payload is present.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Mesh payload, if that is what the entity holds.
    pub fn as_mesh(&self) -> Option<&MeshData> {
        match self {
            Self::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Mutable mesh payload, if that is what the entity holds.
    pub fn as_mesh_mut(&mut self) -> Option<&mut MeshData> {
        match self {
            Self::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Hair payload, if that is what the entity holds.
    pub fn as_hair(&self) -> Option<&HairData> {
        match self {
            Self::Hair(hair) => Some(hair),
            _ => None,
        }
    }

    /// Mutable hair payload, if that is what the entity holds.
    pub fn as_hair_mut(&mut self) -> Option<&mut HairData> {
        match self {
            Self::Hair(hair) => Some(hair),
            _ => None,
        }
    }

    /// Volume payload, if that is what the entity holds.
    pub fn as_volume(&self) -> Option<&VolumeData> {
        match self {
            Self::Volume(volume) => Some(volume),
            _ => None,
        }
    }
}

/// Triangle mesh payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<Point3>,
    /// Vertex indices, three per triangle.
    pub triangles: Vec<[u32; 3]>,
    /// Per-triangle position into the geometry's shader list.
    pub shader_indices: Vec<u32>,
    /// Vertex positions per motion step, excluding the center step which
    /// `positions` already covers. Sized and filled by motion extraction.
    pub motion_positions: Vec<Vec<Point3>>,
}

/// Hair curve payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HairData {
    /// Control key positions for all curves.
    pub keys: Vec<Point3>,
    /// Per-key strand radius.
    pub radii: Vec<f32>,
    /// Curve topology over the shared key arrays.
    pub curves: Vec<HairCurve>,
    /// Key positions per motion step, excluding the center step.
    pub motion_keys: Vec<Vec<Point3>>,
}

/// One hair curve inside a [`HairData`] payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HairCurve {
    /// Index of the curve's first key.
    pub first_key: u32,
    /// Number of keys in the curve.
    pub key_count: u32,
    /// Position into the geometry's shader list.
    pub shader: u32,
}

/// Volume grid payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeData {
    /// Voxel resolution per axis.
    pub resolution: [u32; 3],
    /// Named voxel grids, all at the payload resolution.
    pub grids: Vec<VolumeGrid>,
}

/// One named grid inside a [`VolumeData`] payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeGrid {
    /// Grid name, matching what shaders sample.
    pub name: String,
    /// Voxel values in x-major order.
    pub values: Vec<f32>,
}
