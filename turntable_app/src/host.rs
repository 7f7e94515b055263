//! Demo host: a table-driven shading system and a procedural extractor
//!
//! Stands in for a real content pipeline. Shaders are minted handles in a
//! lookup table, and extraction generates small procedural payloads instead
//! of reading authored assets.

use std::collections::{HashMap, HashSet};

use geometry_sync::foundation::math::{constants, Point3};
use geometry_sync::host::{
    GeometryExtractor, MaterialRef, ShaderHandle, ShadingSystem, SourceObject,
};
use geometry_sync::scene::{
    Geometry, GeometryData, HairCurve, HairData, MeshData, VolumeData, VolumeGrid,
};

/// Shading system backed by a material-to-shader table.
pub struct DemoShadingSystem {
    default_surface: ShaderHandle,
    shaders: HashMap<MaterialRef, ShaderHandle>,
    attribute_requests: HashSet<ShaderHandle>,
    next_handle: u64,
}

impl DemoShadingSystem {
    pub fn new() -> Self {
        Self {
            default_surface: ShaderHandle(0),
            shaders: HashMap::new(),
            attribute_requests: HashSet::new(),
            next_handle: 1,
        }
    }

    /// Mint a shader for a scene material.
    pub fn register_material(&mut self, material: MaterialRef) -> ShaderHandle {
        let handle = ShaderHandle(self.next_handle);
        self.next_handle += 1;
        self.shaders.insert(material, handle);
        handle
    }

    /// Flag a shader as wanting mesh attributes its geometry does not carry.
    pub fn request_attribute_rebuild(&mut self, shader: ShaderHandle) {
        log::debug!("Shader {:?} now requests extra attributes", shader);
        self.attribute_requests.insert(shader);
    }

    /// Reset attribute requests once the pass that served them finished.
    pub fn clear_attribute_requests(&mut self) {
        self.attribute_requests.clear();
    }
}

impl ShadingSystem for DemoShadingSystem {
    fn default_surface(&self) -> ShaderHandle {
        self.default_surface
    }

    fn find_shader(&self, material: MaterialRef) -> Option<ShaderHandle> {
        self.shaders.get(&material).copied()
    }

    fn needs_attribute_rebuild(&self, shader: ShaderHandle) -> bool {
        self.attribute_requests.contains(&shader)
    }
}

/// Extractor that generates procedural payloads and counts its work.
#[derive(Default)]
pub struct ProceduralExtractor {
    pub meshes_built: usize,
    pub hair_built: usize,
    pub volumes_built: usize,
    pub motion_steps_recorded: usize,
}

const DISC_SECTORS: u32 = 8;
const STRANDS: u32 = 6;
const STRAND_KEYS: u32 = 4;
const VOLUME_RESOLUTION: u32 = 8;

impl GeometryExtractor for ProceduralExtractor {
    fn extract_mesh(&mut self, source: &SourceObject, geometry: &mut Geometry) {
        self.meshes_built += 1;

        let mut mesh = MeshData::default();
        mesh.positions.push(Point3::origin());
        for sector in 0..DISC_SECTORS {
            let angle = constants::TAU * sector as f32 / DISC_SECTORS as f32;
            mesh.positions.push(Point3::new(angle.cos(), 0.0, angle.sin()));
        }

        let slot_count = source.material_slots.len().max(1);
        for sector in 0..DISC_SECTORS {
            let here = sector + 1;
            let next = if sector + 1 == DISC_SECTORS { 1 } else { sector + 2 };
            mesh.triangles.push([0, here, next]);
            let slot = sector as usize % slot_count;
            mesh.shader_indices.push(geometry.shaders().slot_position(slot) as u32);
        }

        log::trace!(
            "Built disc mesh for '{}': {} triangles",
            source.data_name,
            mesh.triangles.len()
        );
        *geometry.data_mut() = GeometryData::Mesh(mesh);
    }

    fn extract_hair(&mut self, source: &SourceObject, geometry: &mut Geometry) {
        self.hair_built += 1;

        let mut hair = HairData::default();
        let shader = geometry.shaders().slot_position(0) as u32;
        for strand in 0..STRANDS {
            let angle = constants::TAU * strand as f32 / STRANDS as f32;
            let first_key = hair.keys.len() as u32;
            for key in 0..STRAND_KEYS {
                let t = key as f32 / (STRAND_KEYS - 1) as f32;
                let reach = 1.0 + 0.2 * t;
                hair.keys
                    .push(Point3::new(angle.cos() * reach, 0.4 * t, angle.sin() * reach));
                hair.radii.push(0.02 * (1.0 - t) + 0.005);
            }
            hair.curves.push(HairCurve {
                first_key,
                key_count: STRAND_KEYS,
                shader,
            });
        }

        log::trace!(
            "Built {} strands for '{}'",
            hair.curves.len(),
            source.data_name
        );
        *geometry.data_mut() = GeometryData::Hair(hair);
    }

    fn extract_volume(&mut self, source: &SourceObject, geometry: &mut Geometry) {
        self.volumes_built += 1;

        let resolution = VOLUME_RESOLUTION;
        let mut values = Vec::with_capacity((resolution * resolution * resolution) as usize);
        for z in 0..resolution {
            for y in 0..resolution {
                for x in 0..resolution {
                    let to_unit = |v: u32| 2.0 * v as f32 / (resolution - 1) as f32 - 1.0;
                    let local = Point3::new(to_unit(x), to_unit(y), to_unit(z));
                    let world = source.transform.transform_point(&local);
                    let falloff = 1.0 - (to_unit(y) + 1.0) * 0.5;
                    let density = ((world.x * 1.3).sin() * (world.z * 1.7).cos()).abs() * falloff;
                    values.push(density);
                }
            }
        }

        log::trace!("Sampled density grid for '{}'", source.data_name);
        *geometry.data_mut() = GeometryData::Volume(VolumeData {
            resolution: [resolution; 3],
            grids: vec![VolumeGrid {
                name: String::from("density"),
                values,
            }],
        });
        // World-space grids avoid resampling on lookup but tie the payload
        // to the transform it was sampled with.
        geometry.set_transform_applied(true);
    }

    fn extract_mesh_motion(&mut self, source: &SourceObject, geometry: &mut Geometry, step: usize) {
        let steps = geometry.motion_attribute_steps();
        if let Some(mesh) = geometry.data_mut().as_mesh_mut() {
            if mesh.motion_positions.len() != steps {
                mesh.motion_positions.resize(steps, Vec::new());
            }
            let lift = 0.05 * (step as f32 + 1.0);
            let displaced: Vec<Point3> = mesh
                .positions
                .iter()
                .map(|p| Point3::new(p.x, p.y + lift, p.z))
                .collect();
            if let Some(slot) = mesh.motion_positions.get_mut(step) {
                *slot = displaced;
                self.motion_steps_recorded += 1;
                log::trace!("Recorded mesh motion step {} for '{}'", step, source.data_name);
            }
        }
    }

    fn extract_hair_motion(&mut self, source: &SourceObject, geometry: &mut Geometry, step: usize) {
        let steps = geometry.motion_attribute_steps();
        if let Some(hair) = geometry.data_mut().as_hair_mut() {
            if hair.motion_keys.len() != steps {
                hair.motion_keys.resize(steps, Vec::new());
            }
            let sway = 0.03 * (step as f32 + 1.0);
            let displaced: Vec<Point3> = hair
                .keys
                .iter()
                .map(|k| Point3::new(k.x + sway, k.y, k.z))
                .collect();
            if let Some(slot) = hair.motion_keys.get_mut(step) {
                *slot = displaced;
                self.motion_steps_recorded += 1;
                log::trace!("Recorded hair motion step {} for '{}'", step, source.data_name);
            }
        }
    }
}
