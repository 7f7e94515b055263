//! Shader list resolution

use crate::host::{MaterialRef, ShadingSystem, SourceObject};
use crate::scene::ShaderList;

/// Resolve the shaders a snapshot's geometry will use.
///
/// Each material slot resolves independently: an active override replaces
/// the slot's material, and whatever material ends up selected is looked up
/// in the shading system, with the default surface substituted when the slot
/// is empty or the lookup fails. Objects without any slots still get a one
/// entry list so every primitive has a shader to fall back on.
pub fn resolve_used_shaders(
    source: &SourceObject,
    shading: &dyn ShadingSystem,
    material_override: Option<MaterialRef>,
) -> ShaderList {
    let default_surface = shading.default_surface();
    let mut shaders = ShaderList::new();

    for slot in &source.material_slots {
        let material = material_override.or(*slot);
        let shader = material
            .and_then(|material| shading.find_shader(material))
            .unwrap_or(default_surface);
        shaders.push(shader);
    }

    if shaders.is_empty() {
        let shader = material_override
            .and_then(|material| shading.find_shader(material))
            .unwrap_or(default_surface);
        shaders.push(shader);
    }

    shaders
}
