//! Geometry entities
//!
//! A [`Geometry`] is the renderer-side counterpart of one host data block,
//! or of one modified object when sharing is not possible. Entities are
//! addressed by [`GeometryHandle`] and survive across update passes until
//! evicted.
//!
//! # Motion steps
//!
//! A geometry configured with `N > 1` motion steps samples the shutter
//! interval at relative times `2 * i / (N - 1) - 1` for `i in 0..N`, evenly
//! spread over `[-1, 1]`. The center step is written by base extraction, so
//! motion payloads store only the remaining `N - 1` steps and
//! [`Geometry::motion_step`] maps a relative time to a position in that
//! reduced storage.

use crate::foundation::collections::new_key_type;
use crate::scene::data::GeometryData;
use crate::scene::shader_list::ShaderList;

new_key_type! {
    /// Stable handle to a geometry owned by the cache.
    pub struct GeometryHandle;
}

/// Renderer-side geometry entity.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    name: String,
    shaders: ShaderList,
    transform_applied: bool,
    motion_steps: usize,
    data: GeometryData,
}

impl Geometry {
    /// Create an empty geometry with a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Name of the data block the geometry was built from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the geometry.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Shaders the current payload references.
    pub fn shaders(&self) -> &ShaderList {
        &self.shaders
    }

    /// Replace the shader list.
    pub fn set_shaders(&mut self, shaders: ShaderList) {
        self.shaders = shaders;
    }

    /// Whether the payload was extracted in world space, with the object
    /// transform baked into positions.
    pub fn transform_applied(&self) -> bool {
        self.transform_applied
    }

    /// Record whether the payload has the object transform baked in.
    pub fn set_transform_applied(&mut self, applied: bool) {
        self.transform_applied = applied;
    }

    /// Number of motion steps the geometry is configured for.
    pub fn motion_steps(&self) -> usize {
        self.motion_steps
    }

    /// Configure the number of motion steps.
    pub fn set_motion_steps(&mut self, steps: usize) {
        self.motion_steps = steps;
    }

    /// Number of motion steps payloads actually store.
    ///
    /// The center step lives in the base payload, so storage holds one step
    /// less than the configured count.
    pub fn motion_attribute_steps(&self) -> usize {
        if self.motion_steps > 1 {
            self.motion_steps - 1
        } else {
            0
        }
    }

    /// Relative shutter time of a raw motion step, in `[-1, 1]`.
    pub fn motion_time(&self, step: usize) -> f32 {
        if self.motion_steps > 1 {
            2.0 * step as f32 / (self.motion_steps - 1) as f32 - 1.0
        } else {
            0.0
        }
    }

    /// Map a relative time to its position in motion payload storage.
    ///
    /// Returns `None` when motion is disabled, when no step matches the
    /// time, or when the time lands on the center step that base extraction
    /// already covers. Times are compared exactly, so hosts must pass values
    /// produced by [`Self::motion_time`].
    #[allow(clippy::float_cmp)]
    pub fn motion_step(&self, time: f32) -> Option<usize> {
        if self.motion_steps <= 1 {
            return None;
        }

        let center = self.motion_steps / 2;
        let mut attribute_step = 0;
        for step in 0..self.motion_steps {
            if self.motion_time(step) == time {
                if step == center {
                    return None;
                }
                return Some(attribute_step);
            }
            if step != center {
                attribute_step += 1;
            }
        }

        None
    }

    /// Current payload.
    pub fn data(&self) -> &GeometryData {
        &self.data
    }

    /// Mutable access to the payload, for extraction.
    pub fn data_mut(&mut self) -> &mut GeometryData {
        &mut self.data
    }

    /// Reset the entity for a rebuild.
    ///
    /// Drops the payload, shader list, and baked-transform marker. The name
    /// and motion configuration are reassigned by the pass driver right
    /// after.
    pub fn clear(&mut self) {
        self.data.clear();
        self.shaders = ShaderList::new();
        self.transform_applied = false;
    }
}
