//! Demo scene: a serializable description plus the runtime state derived from it
//!
//! The description mirrors what an exporter would hand us. The runtime state
//! mints stable identifiers and advances the turntable each frame, replaying
//! scripted edit events against the synchronization engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use geometry_sync::config::Config;
use geometry_sync::foundation::math::{constants, utils, Quat, Transform, Vec3};
use geometry_sync::host::{MaterialRef, ShadingSystem, SourceFlags, SourceId, SourceObject};
use geometry_sync::sync::GeometrySync;

use crate::host::DemoShadingSystem;

/// On-disk scene model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub materials: Vec<MaterialDescription>,
    pub data_blocks: Vec<DataBlockDescription>,
    pub objects: Vec<ObjectDescription>,
    pub events: Vec<SceneEvent>,
}

impl Config for SceneDescription {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialDescription {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataBlockDescription {
    pub name: String,
    /// Deformation steps for motion blur, 0 disables.
    #[serde(default)]
    pub motion_steps: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectDescription {
    pub name: String,
    pub data: String,
    /// Material names per slot, `None` leaves the slot empty.
    pub materials: Vec<Option<String>>,
    pub position: (f32, f32, f32),
    /// Turntable spin in degrees per frame.
    pub spin: f32,
    pub hair: bool,
    pub volume: bool,
}

impl Default for ObjectDescription {
    fn default() -> Self {
        Self {
            name: String::new(),
            data: String::new(),
            materials: Vec::new(),
            position: (0.0, 0.0, 0.0),
            spin: 0.0,
            hair: false,
            volume: false,
        }
    }
}

/// A scripted edit applied when the frame counter reaches `frame`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneEvent {
    pub frame: u32,
    pub action: SceneAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SceneAction {
    /// Flag a data block as edited so its geometry rebuilds.
    TagData(String),
    /// Make a shader ask for attributes its geometry does not carry yet.
    RequestAttributes(String),
    /// Assign a material to an object slot: object, slot, material.
    AssignMaterial(String, usize, String),
    /// Attach an object-level modifier, giving the object private data.
    ModifyObject(String),
    /// Delete an object from the scene.
    RemoveObject(String),
    /// Swap a data block wholesale, dropping cached geometry for it.
    ReplaceData(String),
}

impl SceneDescription {
    /// Fallback scene used when no description file is found.
    pub fn built_in() -> Self {
        Self {
            materials: vec![
                MaterialDescription { name: String::from("BodyMetal") },
                MaterialDescription { name: String::from("GlowCoat") },
                MaterialDescription { name: String::from("FuzzStrand") },
                MaterialDescription { name: String::from("ClayReview") },
            ],
            data_blocks: vec![
                DataBlockDescription { name: String::from("rotor_mesh"), motion_steps: 3 },
                DataBlockDescription { name: String::from("prop_mesh"), motion_steps: 0 },
                DataBlockDescription { name: String::from("fuzz_mesh"), motion_steps: 3 },
                DataBlockDescription { name: String::from("smoke_volume"), motion_steps: 0 },
            ],
            objects: vec![
                ObjectDescription {
                    name: String::from("rotor_a"),
                    data: String::from("rotor_mesh"),
                    materials: vec![
                        Some(String::from("BodyMetal")),
                        Some(String::from("GlowCoat")),
                    ],
                    position: (-2.0, 0.0, 0.0),
                    spin: 12.0,
                    ..ObjectDescription::default()
                },
                ObjectDescription {
                    name: String::from("rotor_b"),
                    data: String::from("rotor_mesh"),
                    materials: vec![
                        Some(String::from("BodyMetal")),
                        Some(String::from("GlowCoat")),
                    ],
                    position: (2.0, 0.0, 0.0),
                    spin: 12.0,
                    ..ObjectDescription::default()
                },
                ObjectDescription {
                    name: String::from("prop"),
                    data: String::from("prop_mesh"),
                    materials: vec![Some(String::from("GlowCoat")), None],
                    position: (0.0, 0.0, 3.0),
                    ..ObjectDescription::default()
                },
                ObjectDescription {
                    name: String::from("fuzzy"),
                    data: String::from("fuzz_mesh"),
                    materials: vec![Some(String::from("FuzzStrand"))],
                    position: (0.0, 0.0, -3.0),
                    spin: 6.0,
                    hair: true,
                    ..ObjectDescription::default()
                },
                ObjectDescription {
                    name: String::from("smoke"),
                    data: String::from("smoke_volume"),
                    position: (0.0, 1.0, 0.0),
                    spin: 4.0,
                    volume: true,
                    ..ObjectDescription::default()
                },
            ],
            events: vec![
                SceneEvent { frame: 3, action: SceneAction::TagData(String::from("rotor_mesh")) },
                SceneEvent {
                    frame: 5,
                    action: SceneAction::AssignMaterial(
                        String::from("prop"),
                        1,
                        String::from("GlowCoat"),
                    ),
                },
                SceneEvent {
                    frame: 7,
                    action: SceneAction::RequestAttributes(String::from("BodyMetal")),
                },
                SceneEvent { frame: 9, action: SceneAction::ModifyObject(String::from("rotor_b")) },
                SceneEvent { frame: 11, action: SceneAction::RemoveObject(String::from("prop")) },
                SceneEvent {
                    frame: 13,
                    action: SceneAction::ReplaceData(String::from("fuzz_mesh")),
                },
            ],
        }
    }
}

struct DataBlock {
    id: SourceId,
    motion_steps: usize,
}

struct ObjectState {
    name: String,
    id: SourceId,
    data_name: String,
    data_id: SourceId,
    motion_steps: usize,
    materials: Vec<Option<MaterialRef>>,
    position: Vec3,
    /// Radians per frame.
    spin: f32,
    angle: f32,
    hair: bool,
    volume: bool,
    modified: bool,
    removed: bool,
    updated: bool,
}

/// Live scene derived from a [`SceneDescription`].
pub struct SceneState {
    materials: HashMap<String, MaterialRef>,
    data_blocks: HashMap<String, DataBlock>,
    objects: Vec<ObjectState>,
    events: Vec<SceneEvent>,
}

impl SceneState {
    /// Instantiate the description, minting identifiers and registering
    /// every material with the shading system.
    pub fn from_description(description: &SceneDescription, shading: &mut DemoShadingSystem) -> Self {
        let mut next_id: u64 = 1;
        let mut mint = move || {
            let id = next_id;
            next_id += 1;
            id
        };

        let mut materials = HashMap::new();
        for material in &description.materials {
            let material_ref = MaterialRef(mint());
            shading.register_material(material_ref);
            materials.insert(material.name.clone(), material_ref);
        }

        let mut data_blocks = HashMap::new();
        for block in &description.data_blocks {
            data_blocks.insert(
                block.name.clone(),
                DataBlock { id: SourceId(mint()), motion_steps: block.motion_steps },
            );
        }

        let mut objects = Vec::new();
        for object in &description.objects {
            let block = match data_blocks.get(&object.data) {
                Some(block) => block,
                None => {
                    log::warn!(
                        "Object '{}' references unknown data block '{}', skipping",
                        object.name,
                        object.data
                    );
                    continue;
                }
            };
            let slots = object
                .materials
                .iter()
                .map(|slot| match slot {
                    Some(name) => {
                        let found = materials.get(name).copied();
                        if found.is_none() {
                            log::warn!(
                                "Object '{}' references unknown material '{}'",
                                object.name,
                                name
                            );
                        }
                        found
                    }
                    None => None,
                })
                .collect();
            objects.push(ObjectState {
                name: object.name.clone(),
                id: SourceId(mint()),
                data_name: object.data.clone(),
                data_id: block.id,
                motion_steps: block.motion_steps,
                materials: slots,
                position: Vec3::new(object.position.0, object.position.1, object.position.2),
                spin: utils::deg_to_rad(object.spin),
                angle: 0.0,
                hair: object.hair,
                volume: object.volume,
                modified: false,
                removed: false,
                updated: false,
            });
        }

        Self { materials, data_blocks, objects, events: description.events.clone() }
    }

    /// Step the turntable: spin objects and refresh their update flags.
    pub fn advance(&mut self) {
        for object in &mut self.objects {
            object.modified = false;
            object.updated = object.spin != 0.0;
            object.angle = (object.angle + object.spin) % constants::TAU;
        }
    }

    /// Replay the edits scripted for this frame.
    pub fn apply_events(
        &mut self,
        frame: u32,
        shading: &mut DemoShadingSystem,
        engine: &mut GeometrySync,
    ) {
        let actions: Vec<SceneAction> = self
            .events
            .iter()
            .filter(|event| event.frame == frame)
            .map(|event| event.action.clone())
            .collect();

        for action in actions {
            match action {
                SceneAction::TagData(name) => {
                    if let Some(block) = self.data_blocks.get(&name) {
                        log::info!("Frame {}: data block '{}' edited", frame, name);
                        engine.tag_update(block.id);
                    }
                }
                SceneAction::RequestAttributes(material) => {
                    if let Some(shader) =
                        self.materials.get(&material).and_then(|m| shading.find_shader(*m))
                    {
                        log::info!("Frame {}: shader '{}' requests attributes", frame, material);
                        shading.request_attribute_rebuild(shader);
                    }
                }
                SceneAction::AssignMaterial(object_name, slot, material) => {
                    let material_ref = self.materials.get(&material).copied();
                    if let Some(object) =
                        self.objects.iter_mut().find(|o| o.name == object_name)
                    {
                        if object.materials.len() <= slot {
                            object.materials.resize(slot + 1, None);
                        }
                        object.materials[slot] = material_ref;
                        log::info!(
                            "Frame {}: assigned '{}' to slot {} of '{}'",
                            frame,
                            material,
                            slot,
                            object_name
                        );
                    }
                }
                SceneAction::ModifyObject(name) => {
                    if let Some(object) = self.objects.iter_mut().find(|o| o.name == name) {
                        object.modified = true;
                        object.updated = true;
                        log::info!("Frame {}: object '{}' gained a modifier", frame, name);
                    }
                }
                SceneAction::RemoveObject(name) => {
                    if let Some(object) = self.objects.iter_mut().find(|o| o.name == name) {
                        object.removed = true;
                        log::info!("Frame {}: object '{}' removed", frame, name);
                    }
                }
                SceneAction::ReplaceData(name) => {
                    if let Some(block) = self.data_blocks.get(&name) {
                        let dropped = engine.invalidate(block.id);
                        log::info!(
                            "Frame {}: data block '{}' replaced, dropped {} cached geometries",
                            frame,
                            name,
                            dropped
                        );
                    }
                }
            }
        }
    }

    /// Snapshot every live object the way a host exporter would.
    pub fn snapshots(&self) -> Vec<SourceObject> {
        let mut sources = Vec::new();
        for object in self.objects.iter().filter(|o| !o.removed) {
            let rotation = Quat::from_axis_angle(&Vec3::y_axis(), object.angle);
            let transform =
                Transform::from_position_rotation(object.position, rotation).to_matrix();

            let mut flags = SourceFlags::empty();
            if object.modified {
                flags |= SourceFlags::MODIFIED;
            }
            if object.updated {
                flags |= SourceFlags::UPDATED;
            }
            if object.volume {
                flags |= SourceFlags::FLUID_DOMAIN;
            }

            if object.hair {
                sources.push(
                    SourceObject::new(object.id, object.data_id, &object.name)
                        .with_data_name(format!("{}.hair", object.data_name))
                        .with_flags(flags | SourceFlags::PARTICLE_HAIR)
                        .with_transform(transform)
                        .with_material_slots(object.materials.clone())
                        .with_motion_steps(object.motion_steps),
                );
            }
            sources.push(
                SourceObject::new(object.id, object.data_id, &object.name)
                    .with_data_name(object.data_name.clone())
                    .with_flags(flags)
                    .with_transform(transform)
                    .with_material_slots(object.materials.clone())
                    .with_motion_steps(object.motion_steps),
            );
        }
        sources
    }

    /// Look up the minted reference for a material name.
    pub fn material(&self, name: &str) -> Option<MaterialRef> {
        self.materials.get(name).copied()
    }

    pub fn live_object_count(&self) -> usize {
        self.objects.iter().filter(|o| !o.removed).count()
    }
}
