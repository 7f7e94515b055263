//! Synchronized object table

use std::collections::{HashMap, HashSet};

use crate::host::{SourceFlags, SourceId, SourceObject};
use crate::scene::{GeometryHandle, Object};

/// One synchronized representation of a host object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct InstanceKey {
    object: SourceId,
    hair: bool,
}

impl InstanceKey {
    fn of(source: &SourceObject) -> Self {
        Self {
            object: source.object,
            hair: source.flags.contains(SourceFlags::PARTICLE_HAIR),
        }
    }
}

/// Objects produced by past passes, keyed by host object identity.
///
/// The motion phase uses this table to find which geometry an object ended
/// up with during the base phase. Like geometry entities, objects a pass no
/// longer syncs are evicted when the pass finishes.
#[derive(Debug, Default)]
pub struct ObjectTable {
    entries: HashMap<InstanceKey, Object>,
    used: HashSet<InstanceKey>,
}

impl ObjectTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget which objects the previous pass synchronized.
    pub(crate) fn begin_pass(&mut self) {
        self.used.clear();
    }

    /// Record the object state a base sync produced.
    pub(crate) fn upsert(&mut self, source: &SourceObject, geometry: GeometryHandle) {
        let key = InstanceKey::of(source);
        self.used.insert(key);
        self.entries.insert(
            key,
            Object {
                name: source.name.clone(),
                transform: source.transform,
                geometry,
                flags: source.flags,
            },
        );
    }

    /// Evict objects the current pass never synchronized.
    ///
    /// Returns how many were evicted.
    pub(crate) fn finish_pass(&mut self) -> usize {
        let before = self.entries.len();
        let used = &self.used;
        self.entries.retain(|key, _| used.contains(key));
        self.used.clear();
        before - self.entries.len()
    }

    /// Synchronized state for one representation of a host object.
    pub fn get(&self, object: SourceId, hair: bool) -> Option<&Object> {
        self.entries.get(&InstanceKey { object, hair })
    }

    /// Number of synchronized objects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no objects.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
