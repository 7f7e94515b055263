//! Geometry cache with staleness tracking

use std::collections::{HashMap, HashSet};

use crate::foundation::collections::SlotMap;
use crate::host::{ShadingSystem, SourceId};
use crate::scene::{Geometry, GeometryHandle, ShaderList};
use crate::sync::key::GeometryKey;

/// Why a cached geometry needs to be rebuilt.
///
/// Staleness checks run in a fixed order and the first hit wins, so a reason
/// names the earliest cause, not necessarily the only one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildReason {
    /// No entity existed for the key yet.
    Created,
    /// The host tagged the underlying identity as changed.
    SourceTagged,
    /// The object moved while its payload has the transform baked in.
    TransformInvalidated,
    /// The resolved shader list differs from the one the payload was built
    /// with.
    ShadersChanged,
    /// A shader on the current payload requests attributes that were not
    /// captured when the payload was built.
    AttributesRequested,
}

/// Long-lived store of geometry entities, indexed by cache key.
///
/// The cache tracks three things across passes: the entities themselves,
/// host change tags accumulated between passes, and which entities the
/// current pass has referenced. Finishing a pass evicts every entity the
/// pass never looked up.
#[derive(Debug, Default)]
pub struct GeometryCache {
    geometries: SlotMap<GeometryHandle, Geometry>,
    index: HashMap<GeometryKey, GeometryHandle>,
    tagged: HashSet<SourceId>,
    used: HashSet<GeometryHandle>,
}

impl GeometryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a host-side change to an object or data block identity.
    ///
    /// Tags accumulate until the next pass finishes and force a rebuild of
    /// every geometry keyed by the identity.
    pub fn tag_update(&mut self, identity: SourceId) {
        self.tagged.insert(identity);
    }

    /// Drop the entities keyed by an identity, in both representations.
    ///
    /// For hosts that destroy data blocks mid-session. Returns how many
    /// entities were removed.
    pub fn invalidate(&mut self, identity: SourceId) -> usize {
        let mut removed = 0;
        for hair in [false, true] {
            let key = GeometryKey::new(identity, hair);
            if let Some(handle) = self.index.remove(&key) {
                if let Some(geometry) = self.geometries.remove(handle) {
                    log::trace!("Invalidated geometry '{}'", geometry.name());
                    removed += 1;
                }
                self.used.remove(&handle);
            }
        }
        removed
    }

    /// Forget which entities the previous pass referenced.
    pub fn begin_pass(&mut self) {
        self.used.clear();
    }

    /// Look up the entity for a key, creating it when missing.
    ///
    /// The entity is marked as referenced by the current pass either way.
    /// When a rebuild is due, the returned reason says why; `None` means the
    /// cached payload is still current. Staleness is judged against the
    /// shader list resolved for this pass and the object's updated flag,
    /// checked in a fixed order: host tag first, then baked transforms,
    /// then shader membership, then attribute requests.
    pub fn lookup_or_create(
        &mut self,
        key: GeometryKey,
        shaders: &ShaderList,
        object_updated: bool,
        shading: &dyn ShadingSystem,
    ) -> (GeometryHandle, Option<RebuildReason>) {
        if let Some(&handle) = self.index.get(&key) {
            self.used.insert(handle);
            let reason = self.staleness(handle, key, shaders, object_updated, shading);
            return (handle, reason);
        }

        let handle = self.geometries.insert(Geometry::default());
        self.index.insert(key, handle);
        self.used.insert(handle);
        (handle, Some(RebuildReason::Created))
    }

    fn staleness(
        &self,
        handle: GeometryHandle,
        key: GeometryKey,
        shaders: &ShaderList,
        object_updated: bool,
        shading: &dyn ShadingSystem,
    ) -> Option<RebuildReason> {
        let geometry = match self.geometries.get(handle) {
            Some(geometry) => geometry,
            None => return Some(RebuildReason::Created),
        };

        if self.tagged.contains(&key.identity()) {
            return Some(RebuildReason::SourceTagged);
        }
        if object_updated && geometry.transform_applied() {
            return Some(RebuildReason::TransformInvalidated);
        }
        if geometry.shaders() != shaders {
            return Some(RebuildReason::ShadersChanged);
        }
        let requested = geometry
            .shaders()
            .iter()
            .any(|shader| shading.needs_attribute_rebuild(shader));
        if requested {
            return Some(RebuildReason::AttributesRequested);
        }

        None
    }

    /// Evict every entity the current pass never referenced.
    ///
    /// Also clears the accumulated host tags, which have all been acted on
    /// by now. Returns how many entities were evicted.
    pub fn finish_pass(&mut self) -> usize {
        let stale: Vec<GeometryHandle> = self
            .geometries
            .keys()
            .filter(|handle| !self.used.contains(handle))
            .collect();

        for handle in &stale {
            if let Some(geometry) = self.geometries.remove(*handle) {
                log::trace!("Evicting geometry '{}'", geometry.name());
            }
        }
        let alive = &self.geometries;
        self.index.retain(|_, handle| alive.contains_key(*handle));

        self.tagged.clear();
        self.used.clear();
        stale.len()
    }

    /// Entity behind a handle, if it is still alive.
    pub fn get(&self, handle: GeometryHandle) -> Option<&Geometry> {
        self.geometries.get(handle)
    }

    /// Mutable entity behind a handle, if it is still alive.
    pub fn get_mut(&mut self, handle: GeometryHandle) -> Option<&mut Geometry> {
        self.geometries.get_mut(handle)
    }

    /// Handle an identity currently maps to.
    pub fn handle_for(&self, key: GeometryKey) -> Option<GeometryHandle> {
        self.index.get(&key).copied()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    /// Whether the cache holds no entities.
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Iterate over live entities.
    pub fn iter(&self) -> impl Iterator<Item = (GeometryHandle, &Geometry)> {
        self.geometries.iter()
    }
}
