//! Deduplicated per-geometry shader lists

use std::collections::HashMap;

use crate::host::ShaderHandle;

/// Ordered list of the shaders a geometry uses, without duplicates.
///
/// Payload data references shaders by position in this list rather than by
/// handle, so the list also remembers which position each original material
/// slot resolved to. Two lists compare equal when they hold the same handles
/// in the same order; the slot bookkeeping does not participate in equality,
/// as it only matters while payloads are being built.
#[derive(Debug, Clone, Default)]
pub struct ShaderList {
    handles: Vec<ShaderHandle>,
    index: HashMap<ShaderHandle, usize>,
    slot_positions: Vec<usize>,
}

impl ShaderList {
    /// Create an empty shader list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the shader resolved for the next material slot.
    ///
    /// A handle already present keeps its existing position. Returns the
    /// position the slot maps to.
    pub fn push(&mut self, shader: ShaderHandle) -> usize {
        let position = match self.index.get(&shader) {
            Some(&position) => position,
            None => {
                let position = self.handles.len();
                self.handles.push(shader);
                self.index.insert(shader, position);
                position
            }
        };
        self.slot_positions.push(position);
        position
    }

    /// Number of distinct shaders in the list.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the list holds no shaders.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Shader at a list position.
    pub fn get(&self, position: usize) -> Option<ShaderHandle> {
        self.handles.get(position).copied()
    }

    /// Position of a shader already in the list.
    pub fn position_of(&self, shader: ShaderHandle) -> Option<usize> {
        self.index.get(&shader).copied()
    }

    /// List position a material slot resolved to.
    ///
    /// Out-of-range slots fall back to position 0, mirroring how renderers
    /// treat primitives with shader indices past the end of the list.
    pub fn slot_position(&self, slot: usize) -> usize {
        self.slot_positions.get(slot).copied().unwrap_or(0)
    }

    /// Iterate over the shader handles in list order.
    pub fn iter(&self) -> impl Iterator<Item = ShaderHandle> + '_ {
        self.handles.iter().copied()
    }

    /// The shader handles in list order.
    pub fn handles(&self) -> &[ShaderHandle] {
        &self.handles
    }
}

impl PartialEq for ShaderList {
    fn eq(&self, other: &Self) -> bool {
        self.handles == other.handles
    }
}

impl Eq for ShaderList {}
