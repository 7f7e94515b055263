//! Incremental geometry synchronization between a host scene graph and a renderer
//!
//! The crate keeps renderer-side geometry alive across update passes and
//! rebuilds only what actually changed on the host side. Objects that share
//! an unmodified data block share one geometry, motion samples are gathered
//! in a dependent second phase, and anything a pass no longer references is
//! evicted when the pass finishes.
//!
//! # Architecture
//!
//! - [`host`] - snapshot types and traits the embedding host implements
//! - [`scene`] - renderer-side geometry entities, payloads, and shader lists
//! - [`sync`] - the cache, pass driver, and staleness rules
//! - [`config`] - file-backed configuration with TOML and RON support
//! - [`foundation`] - math, collections, and logging utilities
//!
//! # Example
//!
//! ```rust,no_run
//! use geometry_sync::prelude::*;
//!
//! struct FlatShading;
//!
//! impl ShadingSystem for FlatShading {
//!     fn default_surface(&self) -> ShaderHandle {
//!         ShaderHandle(1)
//!     }
//! }
//!
//! struct NoExtraction;
//!
//! impl GeometryExtractor for NoExtraction {}
//!
//! fn main() {
//!     let mut engine = GeometrySync::new();
//!     let shading = FlatShading;
//!     let mut extractor = NoExtraction;
//!     let mut status = LogStatus;
//!
//!     let source = SourceObject::new(SourceId(10), SourceId(20), "pedestal");
//!     let mut pass =
//!         engine.begin_pass(SyncSettings::default(), &shading, &mut extractor, &mut status);
//!     let handle = pass.sync_object(&source);
//!     let summary = pass.finish();
//!     println!("synced {:?}: {} rebuilt", handle, summary.stats.rebuilt);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod host;
pub mod scene;
pub mod sync;

/// Commonly used types, re-exported for host integrations.
pub mod prelude {
    pub use crate::config::{Config, ConfigError};
    pub use crate::foundation::math::{Mat4, Point3, Transform, Vec3};
    pub use crate::host::{
        GeometryExtractor, LogStatus, MaterialRef, ShaderHandle, ShadingSystem, SourceFlags,
        SourceId, SourceObject, StatusSink,
    };
    pub use crate::scene::{
        Geometry, GeometryData, GeometryHandle, HairCurve, HairData, MeshData, Object, ObjectKind,
        ShaderList, VolumeData, VolumeGrid,
    };
    pub use crate::sync::{
        GeometryCache, GeometryKey, GeometrySync, PassStats, PassSummary, RebuildReason, SyncPass,
        SyncSettings, SyncState,
    };
}
