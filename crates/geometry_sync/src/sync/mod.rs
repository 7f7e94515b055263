//! Update-pass driver
//!
//! [`GeometrySync`] owns the long-lived cache and object table. A host
//! drives one update pass at a time through a [`SyncPass`]: every visible
//! object is offered to [`SyncPass::sync_object`], motion samples follow
//! through [`SyncPass::sync_object_motion`], and [`SyncPass::finish`] evicts
//! whatever the pass did not touch.

pub mod cache;
pub mod key;
pub mod objects;
pub mod settings;
pub mod shaders;
pub mod state;

pub use cache::{GeometryCache, RebuildReason};
pub use key::GeometryKey;
pub use objects::ObjectTable;
pub use settings::SyncSettings;
pub use shaders::resolve_used_shaders;
pub use state::{PassState, SyncState};

use crate::host::{
    GeometryExtractor, ShadingSystem, SourceFlags, SourceId, SourceObject, StatusSink,
};
use crate::scene::{GeometryHandle, ObjectKind, ShaderList};

/// Counters for what one pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Geometries rebuilt from scratch.
    pub rebuilt: usize,
    /// Objects whose cached geometry was still current.
    pub reused: usize,
    /// Objects that wanted a rebuild another object already performed this
    /// pass.
    pub shared: usize,
    /// Motion steps recorded across all geometries.
    pub motion_synced: usize,
}

/// What a finished pass amounted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Counters gathered while the pass ran.
    pub stats: PassStats,
    /// Geometries evicted because nothing referenced them anymore.
    pub evicted_geometries: usize,
    /// Objects evicted because the pass no longer synchronized them.
    pub evicted_objects: usize,
}

/// Long-lived synchronization state between a host and a renderer scene.
#[derive(Debug, Default)]
pub struct GeometrySync {
    cache: GeometryCache,
    objects: ObjectTable,
}

impl GeometrySync {
    /// Create an empty synchronization state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a host-side change to an object or data block identity.
    pub fn tag_update(&mut self, identity: SourceId) {
        log::debug!("Tagged {:?} for rebuild", identity);
        self.cache.tag_update(identity);
    }

    /// Eagerly drop cached geometry for a destroyed identity.
    pub fn invalidate(&mut self, identity: SourceId) -> usize {
        let removed = self.cache.invalidate(identity);
        log::debug!("Invalidated {:?}, dropped {} geometries", identity, removed);
        removed
    }

    /// The geometry cache, for inspection.
    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    /// The synchronized object table, for inspection.
    pub fn objects(&self) -> &ObjectTable {
        &self.objects
    }

    /// Start an update pass.
    ///
    /// The returned pass borrows the host collaborators for its whole
    /// lifetime and must be consumed with [`SyncPass::finish`] for eviction
    /// and tag clearing to happen.
    pub fn begin_pass<'a>(
        &'a mut self,
        settings: SyncSettings,
        shading: &'a dyn ShadingSystem,
        extractor: &'a mut dyn GeometryExtractor,
        status: &'a mut dyn StatusSink,
    ) -> SyncPass<'a> {
        log::debug!("Starting sync pass (motion blur: {})", settings.use_motion_blur);
        self.cache.begin_pass();
        self.objects.begin_pass();
        SyncPass {
            cache: &mut self.cache,
            objects: &mut self.objects,
            shading,
            extractor,
            status,
            settings,
            state: PassState::new(),
            motion_times: Vec::new(),
            stats: PassStats::default(),
        }
    }
}

/// One update pass over the host scene.
///
/// Offer every visible object to [`Self::sync_object`] first. When motion
/// blur is enabled, follow with one sweep per sample time from
/// [`Self::motion_times`], separated by [`Self::begin_motion_sweep`],
/// offering the same objects to [`Self::sync_object_motion`].
pub struct SyncPass<'a> {
    cache: &'a mut GeometryCache,
    objects: &'a mut ObjectTable,
    shading: &'a dyn ShadingSystem,
    extractor: &'a mut dyn GeometryExtractor,
    status: &'a mut dyn StatusSink,
    settings: SyncSettings,
    state: PassState,
    motion_times: Vec<f32>,
    stats: PassStats,
}

impl<'a> SyncPass<'a> {
    /// Synchronize one object snapshot.
    ///
    /// Resolves the cache key and shader list, rebuilds the geometry when
    /// the cache finds it stale, and records the object in the table either
    /// way. Returns the handle the object ended up pointing at.
    pub fn sync_object(&mut self, source: &SourceObject) -> GeometryHandle {
        let key = GeometryKey::resolve(source);
        let shaders = resolve_used_shaders(source, self.shading, self.settings.material_override);
        let object_updated = source.flags.contains(SourceFlags::UPDATED);

        let (handle, reason) =
            self.cache
                .lookup_or_create(key, &shaders, object_updated, self.shading);

        if let Some(reason) = reason {
            if self.state.begin_base(handle) {
                self.rebuild(source, handle, shaders, reason);
            } else {
                self.stats.shared += 1;
                log::trace!("Geometry '{}' already rebuilt this pass", source.data_name);
            }
        } else {
            self.stats.reused += 1;
            log::trace!(
                "Reusing geometry '{}' for object '{}'",
                source.data_name,
                source.name
            );
        }

        self.configure_motion(source, handle);
        self.objects.upsert(source, handle);
        handle
    }

    fn rebuild(
        &mut self,
        source: &SourceObject,
        handle: GeometryHandle,
        shaders: ShaderList,
        reason: RebuildReason,
    ) {
        self.stats.rebuilt += 1;
        log::debug!("Rebuilding geometry '{}' ({:?})", source.data_name, reason);
        self.status.set_status("Synchronizing object", &source.name);

        let kind = ObjectKind::classify(source.flags);
        if let Some(geometry) = self.cache.get_mut(handle) {
            geometry.clear();
            geometry.set_shaders(shaders);
            geometry.set_name(&source.data_name);
            match kind {
                ObjectKind::Hair => self.extractor.extract_hair(source, geometry),
                ObjectKind::Volume => self.extractor.extract_volume(source, geometry),
                ObjectKind::Mesh => self.extractor.extract_mesh(source, geometry),
            }
        }
    }

    /// Configure motion steps on the geometry and register the pass-wide
    /// sample times they imply.
    fn configure_motion(&mut self, source: &SourceObject, handle: GeometryHandle) {
        let steps = if self.settings.use_motion_blur {
            source.motion_steps
        } else {
            0
        };

        if let Some(geometry) = self.cache.get_mut(handle) {
            geometry.set_motion_steps(steps);
        }
        if steps > 1 {
            if let Some(geometry) = self.cache.get(handle) {
                for step in 0..steps {
                    let time = geometry.motion_time(step);
                    if !self.motion_times.contains(&time) {
                        self.motion_times.push(time);
                    }
                }
            }
        }
    }

    /// Sample times the base phase registered, sorted ascending.
    ///
    /// Includes the center time `0.0`, which base extraction already covers;
    /// hosts skip it when sweeping.
    pub fn motion_times(&self) -> Vec<f32> {
        let mut times = self.motion_times.clone();
        times.sort_by(f32::total_cmp);
        times
    }

    /// Make motion-synced geometries eligible for the next sample time.
    ///
    /// Call between sweeps when the host evaluates more than one motion
    /// time per pass.
    pub fn begin_motion_sweep(&mut self) {
        log::trace!("Starting motion sweep");
        self.state.reset_motion();
    }

    /// Record motion data for one object at one sample time.
    ///
    /// Only geometries whose base was rebuilt this pass participate; reused
    /// geometries already hold current motion data, and geometries another
    /// object covered during this sweep are not written twice.
    pub fn sync_object_motion(&mut self, source: &SourceObject, motion_time: f32) {
        let hair = source.flags.contains(SourceFlags::PARTICLE_HAIR);
        let handle = match self.objects.get(source.object, hair) {
            Some(object) => object.geometry,
            None => {
                log::trace!("No synced object '{}' for motion", source.name);
                return;
            }
        };

        match self.state.state_of(handle) {
            SyncState::MotionSynced => {
                log::trace!("Motion for '{}' already recorded this sweep", source.data_name);
                return;
            }
            SyncState::Untouched => {
                log::trace!(
                    "Skipping motion for '{}': base geometry was reused",
                    source.data_name
                );
                return;
            }
            SyncState::BaseSynced => {}
        }
        self.state.mark_motion_synced(handle);

        let step = match self.cache.get(handle).and_then(|g| g.motion_step(motion_time)) {
            Some(step) => step,
            None => {
                log::debug!(
                    "No motion step matches time {} for '{}'",
                    motion_time,
                    source.data_name
                );
                return;
            }
        };

        let kind = ObjectKind::classify(source.flags);
        if let Some(geometry) = self.cache.get_mut(handle) {
            match kind {
                ObjectKind::Hair => {
                    self.extractor.extract_hair_motion(source, geometry, step);
                    self.stats.motion_synced += 1;
                }
                ObjectKind::Mesh => {
                    self.extractor.extract_mesh_motion(source, geometry, step);
                    self.stats.motion_synced += 1;
                }
                ObjectKind::Volume => {
                    log::trace!("Volume '{}' has no motion payload", source.data_name);
                }
            }
        }
    }

    /// Counters gathered so far.
    pub fn stats(&self) -> PassStats {
        self.stats
    }

    /// Finish the pass, evicting unreferenced state.
    pub fn finish(self) -> PassSummary {
        let evicted_geometries = self.cache.finish_pass();
        let evicted_objects = self.objects.finish_pass();
        let summary = PassSummary {
            stats: self.stats,
            evicted_geometries,
            evicted_objects,
        };
        log::info!(
            "Sync pass finished: {} rebuilt, {} reused, {} shared, {} motion synced; evicted {} geometries and {} objects",
            summary.stats.rebuilt,
            summary.stats.reused,
            summary.stats.shared,
            summary.stats.motion_synced,
            evicted_geometries,
            evicted_objects
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MaterialRef, ShaderHandle};
    use crate::scene::{Geometry, GeometryData, HairData, MeshData, VolumeData};
    use std::collections::{HashMap, HashSet};

    #[derive(Default)]
    struct TestShading {
        shaders: HashMap<MaterialRef, ShaderHandle>,
        attribute_requests: HashSet<ShaderHandle>,
    }

    impl TestShading {
        fn with_material(mut self, material: MaterialRef, shader: ShaderHandle) -> Self {
            self.shaders.insert(material, shader);
            self
        }
    }

    impl ShadingSystem for TestShading {
        fn default_surface(&self) -> ShaderHandle {
            ShaderHandle(0)
        }

        fn find_shader(&self, material: MaterialRef) -> Option<ShaderHandle> {
            self.shaders.get(&material).copied()
        }

        fn needs_attribute_rebuild(&self, shader: ShaderHandle) -> bool {
            self.attribute_requests.contains(&shader)
        }
    }

    #[derive(Default)]
    struct CountingExtractor {
        mesh: usize,
        hair: usize,
        volume: usize,
        mesh_motion_steps: Vec<usize>,
        hair_motion_steps: Vec<usize>,
        bake_transforms: bool,
    }

    impl GeometryExtractor for CountingExtractor {
        fn extract_mesh(&mut self, _source: &SourceObject, geometry: &mut Geometry) {
            self.mesh += 1;
            if self.bake_transforms {
                geometry.set_transform_applied(true);
            }
            *geometry.data_mut() = GeometryData::Mesh(MeshData::default());
        }

        fn extract_hair(&mut self, _source: &SourceObject, geometry: &mut Geometry) {
            self.hair += 1;
            *geometry.data_mut() = GeometryData::Hair(HairData::default());
        }

        fn extract_volume(&mut self, _source: &SourceObject, geometry: &mut Geometry) {
            self.volume += 1;
            *geometry.data_mut() = GeometryData::Volume(VolumeData::default());
        }

        fn extract_mesh_motion(
            &mut self,
            _source: &SourceObject,
            _geometry: &mut Geometry,
            step: usize,
        ) {
            self.mesh_motion_steps.push(step);
        }

        fn extract_hair_motion(
            &mut self,
            _source: &SourceObject,
            _geometry: &mut Geometry,
            step: usize,
        ) {
            self.hair_motion_steps.push(step);
        }
    }

    #[derive(Default)]
    struct RecordingStatus {
        lines: Vec<String>,
    }

    impl StatusSink for RecordingStatus {
        fn set_status(&mut self, status: &str, name: &str) {
            self.lines.push(format!("{}: {}", status, name));
        }
    }

    fn mesh_object(object: u64, data: u64, name: &str) -> SourceObject {
        SourceObject::new(SourceId(object), SourceId(data), name)
    }

    fn blur() -> SyncSettings {
        SyncSettings {
            use_motion_blur: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_objects_sharing_a_data_block_share_geometry() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a").with_data_name("shared_mesh");
        let b = mesh_object(11, 2, "b").with_data_name("shared_mesh");

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        let handle_a = pass.sync_object(&a);
        let handle_b = pass.sync_object(&b);
        let summary = pass.finish();

        assert_eq!(handle_a, handle_b);
        assert_eq!(extractor.mesh, 1);
        assert_eq!(summary.stats.rebuilt, 1);
        assert_eq!(summary.stats.reused, 1);
        assert_eq!(engine.cache().len(), 1);
        assert_eq!(engine.objects().len(), 2);
        assert_eq!(
            engine.cache().get(handle_a).map(|g| g.name().to_string()),
            Some(String::from("shared_mesh"))
        );
    }

    #[test]
    fn test_modified_objects_get_private_geometry() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a");
        let b = mesh_object(11, 2, "b").with_flags(SourceFlags::MODIFIED);

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        let handle_a = pass.sync_object(&a);
        let handle_b = pass.sync_object(&b);
        let summary = pass.finish();

        assert_ne!(handle_a, handle_b);
        assert_eq!(extractor.mesh, 2);
        assert_eq!(summary.stats.rebuilt, 2);
        assert_eq!(engine.cache().len(), 2);
    }

    #[test]
    fn test_tagged_data_rebuilds_shared_users_once() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a");
        let b = mesh_object(11, 2, "b");

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        pass.sync_object(&a);
        pass.sync_object(&b);
        pass.finish();

        engine.tag_update(SourceId(2));

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        pass.sync_object(&a);
        pass.sync_object(&b);
        let summary = pass.finish();

        assert_eq!(extractor.mesh, 2);
        assert_eq!(summary.stats.rebuilt, 1);
        assert_eq!(summary.stats.shared, 1);
        assert_eq!(summary.stats.reused, 0);
    }

    #[test]
    fn test_unchanged_scene_reuses_without_extraction() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a");

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        let first = pass.sync_object(&a);
        pass.finish();

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        let second = pass.sync_object(&a);
        let summary = pass.finish();

        assert_eq!(first, second);
        assert_eq!(extractor.mesh, 1);
        assert_eq!(summary.stats.rebuilt, 0);
        assert_eq!(summary.stats.reused, 1);
    }

    #[test]
    fn test_update_without_baked_transform_reuses() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let at_rest = mesh_object(10, 2, "a");
        let moved = at_rest.clone().with_flags(SourceFlags::UPDATED);

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        pass.sync_object(&at_rest);
        pass.finish();

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        pass.sync_object(&moved);
        let summary = pass.finish();

        assert_eq!(extractor.mesh, 1);
        assert_eq!(summary.stats.reused, 1);
    }

    #[test]
    fn test_baked_transform_rebuilds_on_movement() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor {
            bake_transforms: true,
            ..Default::default()
        };
        let mut status = RecordingStatus::default();

        let at_rest = mesh_object(10, 2, "a");
        let moved = at_rest.clone().with_flags(SourceFlags::UPDATED);

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        pass.sync_object(&at_rest);
        pass.finish();

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        pass.sync_object(&moved);
        pass.finish();

        assert_eq!(extractor.mesh, 2);

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        pass.sync_object(&at_rest);
        let summary = pass.finish();

        assert_eq!(extractor.mesh, 2);
        assert_eq!(summary.stats.reused, 1);
    }

    #[test]
    fn test_shader_reassignment_rebuilds() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default()
            .with_material(MaterialRef(1), ShaderHandle(11))
            .with_material(MaterialRef(2), ShaderHandle(12));
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let before = mesh_object(10, 2, "a").with_material_slots(vec![Some(MaterialRef(1))]);
        let after = mesh_object(10, 2, "a").with_material_slots(vec![Some(MaterialRef(2))]);

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        pass.sync_object(&before);
        pass.finish();

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        let handle = pass.sync_object(&after);
        let summary = pass.finish();

        assert_eq!(extractor.mesh, 2);
        assert_eq!(summary.stats.rebuilt, 1);
        assert_eq!(
            engine.cache().get(handle).map(|g| g.shaders().handles().to_vec()),
            Some(vec![ShaderHandle(12)])
        );
    }

    #[test]
    fn test_attribute_request_rebuilds_existing_payload() {
        let mut engine = GeometrySync::new();
        let mut shading =
            TestShading::default().with_material(MaterialRef(1), ShaderHandle(11));
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a").with_material_slots(vec![Some(MaterialRef(1))]);

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        pass.sync_object(&a);
        pass.finish();

        shading.attribute_requests.insert(ShaderHandle(11));

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        pass.sync_object(&a);
        let summary = pass.finish();

        assert_eq!(extractor.mesh, 2);
        assert_eq!(summary.stats.rebuilt, 1);
    }

    #[test]
    fn test_material_override_unifies_shader_lists() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default()
            .with_material(MaterialRef(1), ShaderHandle(11))
            .with_material(MaterialRef(2), ShaderHandle(12))
            .with_material(MaterialRef(7), ShaderHandle(17));
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a")
            .with_material_slots(vec![Some(MaterialRef(1)), Some(MaterialRef(2))]);
        let b = mesh_object(11, 3, "b").with_material_slots(Vec::new());

        let settings = SyncSettings {
            material_override: Some(MaterialRef(7)),
            use_motion_blur: false,
        };
        let mut pass = engine.begin_pass(settings, &shading, &mut extractor, &mut status);
        let handle_a = pass.sync_object(&a);
        let handle_b = pass.sync_object(&b);
        pass.finish();

        for handle in [handle_a, handle_b] {
            assert_eq!(
                engine.cache().get(handle).map(|g| g.shaders().handles().to_vec()),
                Some(vec![ShaderHandle(17)])
            );
        }
    }

    #[test]
    fn test_status_reports_rebuilt_objects_only() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "alpha");
        let b = mesh_object(11, 2, "beta");

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        pass.sync_object(&a);
        pass.sync_object(&b);
        pass.finish();

        assert_eq!(status.lines, vec![String::from("Synchronizing object: alpha")]);

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        pass.sync_object(&a);
        pass.sync_object(&b);
        pass.finish();

        assert_eq!(status.lines.len(), 1);
    }

    #[test]
    fn test_hair_and_surface_sync_separately() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let surface = mesh_object(10, 2, "fuzzy");
        let strands = surface.clone().with_flags(SourceFlags::PARTICLE_HAIR);

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        let surface_handle = pass.sync_object(&surface);
        let strand_handle = pass.sync_object(&strands);
        pass.finish();

        assert_ne!(surface_handle, strand_handle);
        assert_eq!(extractor.mesh, 1);
        assert_eq!(extractor.hair, 1);
        assert_eq!(engine.cache().len(), 2);
        assert_eq!(engine.objects().len(), 2);
    }

    #[test]
    fn test_volume_objects_extract_grids() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let smoke = mesh_object(10, 2, "smoke").with_flags(SourceFlags::FLUID_DOMAIN);

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        let handle = pass.sync_object(&smoke);
        pass.finish();

        assert_eq!(extractor.volume, 1);
        assert!(engine
            .cache()
            .get(handle)
            .and_then(|g| g.data().as_volume())
            .is_some());
    }

    #[test]
    fn test_motion_times_cover_configured_steps() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a").with_motion_steps(3);

        let mut pass = engine.begin_pass(blur(), &shading, &mut extractor, &mut status);
        pass.sync_object(&a);
        assert_eq!(pass.motion_times(), vec![-1.0, 0.0, 1.0]);
        pass.finish();
    }

    #[test]
    fn test_motion_disabled_leaves_no_times() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a").with_motion_steps(3);

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        let handle = pass.sync_object(&a);
        assert!(pass.motion_times().is_empty());
        pass.finish();

        assert_eq!(engine.cache().get(handle).map(|g| g.motion_steps()), Some(0));
    }

    #[test]
    fn test_motion_records_steps_for_rebuilt_geometry() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a").with_motion_steps(3);

        let mut pass = engine.begin_pass(blur(), &shading, &mut extractor, &mut status);
        pass.sync_object(&a);
        pass.sync_object_motion(&a, -1.0);
        pass.begin_motion_sweep();
        pass.sync_object_motion(&a, 1.0);
        let summary = pass.finish();

        assert_eq!(extractor.mesh_motion_steps, vec![0, 1]);
        assert_eq!(summary.stats.motion_synced, 2);
    }

    #[test]
    fn test_motion_is_idempotent_within_a_sweep() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a").with_motion_steps(3);

        let mut pass = engine.begin_pass(blur(), &shading, &mut extractor, &mut status);
        pass.sync_object(&a);
        pass.sync_object_motion(&a, -1.0);
        pass.sync_object_motion(&a, -1.0);
        pass.finish();

        assert_eq!(extractor.mesh_motion_steps, vec![0]);
    }

    #[test]
    fn test_shared_geometry_records_motion_once_per_sweep() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a").with_motion_steps(3);
        let b = mesh_object(11, 2, "b").with_motion_steps(3);

        let mut pass = engine.begin_pass(blur(), &shading, &mut extractor, &mut status);
        pass.sync_object(&a);
        pass.sync_object(&b);
        pass.sync_object_motion(&a, -1.0);
        pass.sync_object_motion(&b, -1.0);
        pass.finish();

        assert_eq!(extractor.mesh_motion_steps, vec![0]);
    }

    #[test]
    fn test_motion_skips_reused_geometry() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a").with_motion_steps(3);

        let mut pass = engine.begin_pass(blur(), &shading, &mut extractor, &mut status);
        pass.sync_object(&a);
        pass.sync_object_motion(&a, -1.0);
        pass.finish();

        let mut pass = engine.begin_pass(blur(), &shading, &mut extractor, &mut status);
        pass.sync_object(&a);
        pass.sync_object_motion(&a, -1.0);
        let summary = pass.finish();

        assert_eq!(extractor.mesh_motion_steps, vec![0]);
        assert_eq!(summary.stats.motion_synced, 0);
    }

    #[test]
    fn test_motion_before_base_is_ignored() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a").with_motion_steps(3);

        let mut pass = engine.begin_pass(blur(), &shading, &mut extractor, &mut status);
        pass.sync_object_motion(&a, -1.0);
        pass.finish();

        assert!(extractor.mesh_motion_steps.is_empty());
    }

    #[test]
    fn test_unmatched_motion_times_are_ignored() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a").with_motion_steps(3);

        let mut pass = engine.begin_pass(blur(), &shading, &mut extractor, &mut status);
        pass.sync_object(&a);
        pass.sync_object_motion(&a, 0.25);
        pass.begin_motion_sweep();
        pass.sync_object_motion(&a, 0.0);
        let summary = pass.finish();

        assert!(extractor.mesh_motion_steps.is_empty());
        assert_eq!(summary.stats.motion_synced, 0);
    }

    #[test]
    fn test_hair_motion_uses_hair_extraction() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let strands = mesh_object(10, 2, "fuzzy")
            .with_flags(SourceFlags::PARTICLE_HAIR)
            .with_motion_steps(3);

        let mut pass = engine.begin_pass(blur(), &shading, &mut extractor, &mut status);
        pass.sync_object(&strands);
        pass.sync_object_motion(&strands, 1.0);
        pass.finish();

        assert_eq!(extractor.hair_motion_steps, vec![1]);
        assert!(extractor.mesh_motion_steps.is_empty());
    }

    #[test]
    fn test_volume_motion_is_a_noop() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let smoke = mesh_object(10, 2, "smoke")
            .with_flags(SourceFlags::FLUID_DOMAIN)
            .with_motion_steps(3);

        let mut pass = engine.begin_pass(blur(), &shading, &mut extractor, &mut status);
        pass.sync_object(&smoke);
        pass.sync_object_motion(&smoke, -1.0);
        let summary = pass.finish();

        assert_eq!(summary.stats.motion_synced, 0);
        assert!(extractor.mesh_motion_steps.is_empty());
        assert!(extractor.hair_motion_steps.is_empty());
    }

    #[test]
    fn test_removed_objects_are_evicted() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a");
        let b = mesh_object(11, 3, "b");

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        pass.sync_object(&a);
        let handle_b = pass.sync_object(&b);
        pass.finish();

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        pass.sync_object(&a);
        let summary = pass.finish();

        assert_eq!(summary.evicted_geometries, 1);
        assert_eq!(summary.evicted_objects, 1);
        assert_eq!(engine.cache().len(), 1);
        assert_eq!(engine.objects().len(), 1);
        assert!(engine.cache().get(handle_b).is_none());
    }

    #[test]
    fn test_invalidate_forces_recreation() {
        let mut engine = GeometrySync::new();
        let shading = TestShading::default();
        let mut extractor = CountingExtractor::default();
        let mut status = RecordingStatus::default();

        let a = mesh_object(10, 2, "a");

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        let first = pass.sync_object(&a);
        pass.finish();

        assert_eq!(engine.invalidate(SourceId(2)), 1);
        assert!(engine.cache().is_empty());

        let mut pass =
            engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
        let second = pass.sync_object(&a);
        let summary = pass.finish();

        assert_ne!(first, second);
        assert_eq!(extractor.mesh, 2);
        assert_eq!(summary.stats.rebuilt, 1);
    }
}
