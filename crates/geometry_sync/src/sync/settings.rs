//! Pass settings

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::host::MaterialRef;

/// Settings one update pass runs under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Material substituted into every slot of every object, for clay-style
    /// review renders. `None` leaves assignments untouched.
    pub material_override: Option<MaterialRef>,
    /// Whether geometries gather motion steps. When disabled, every
    /// geometry is configured with zero steps and the motion phase has
    /// nothing to do.
    pub use_motion_blur: bool,
}

impl Config for SyncSettings {}
