//! Per-pass synchronization state

use crate::foundation::collections::SecondaryMap;
use crate::scene::GeometryHandle;

/// How far one geometry has progressed within the current update pass.
///
/// The state only ever advances `Untouched -> BaseSynced -> MotionSynced`
/// during a pass. Between motion sweeps the motion marker is rolled back so
/// every base-synced geometry becomes eligible for the next sample time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncState {
    /// Not rebuilt this pass. Either untouched so far or reused as-is.
    #[default]
    Untouched,
    /// Base geometry was rebuilt this pass.
    BaseSynced,
    /// Motion data was recorded for the current sample time.
    MotionSynced,
}

/// Pass-scoped state for every geometry the pass has seen.
///
/// Lives only as long as one [`crate::sync::SyncPass`]; the next pass starts
/// from a blank map, which is what makes every state implicitly `Untouched`
/// again.
#[derive(Debug, Default)]
pub struct PassState {
    states: SecondaryMap<GeometryHandle, SyncState>,
}

impl PassState {
    /// Create an empty state map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a geometry.
    pub fn state_of(&self, handle: GeometryHandle) -> SyncState {
        self.states.get(handle).copied().unwrap_or_default()
    }

    /// Claim a geometry for base synchronization.
    ///
    /// The first claim in a pass wins and returns `true`; later claims from
    /// other objects sharing the geometry return `false`.
    pub fn begin_base(&mut self, handle: GeometryHandle) -> bool {
        if self.state_of(handle) == SyncState::Untouched {
            self.states.insert(handle, SyncState::BaseSynced);
            true
        } else {
            false
        }
    }

    /// Mark a base-synced geometry as motion-synced for this sweep.
    ///
    /// Geometries that were not base-synced this pass stay where they are,
    /// since their stored motion data is still current.
    pub fn mark_motion_synced(&mut self, handle: GeometryHandle) {
        if self.state_of(handle) == SyncState::BaseSynced {
            self.states.insert(handle, SyncState::MotionSynced);
        }
    }

    /// Roll motion-synced geometries back to base-synced.
    ///
    /// Called between motion sweeps so each sample time records at most one
    /// motion step per geometry.
    pub fn reset_motion(&mut self) {
        for state in self.states.values_mut() {
            if *state == SyncState::MotionSynced {
                *state = SyncState::BaseSynced;
            }
        }
    }
}
