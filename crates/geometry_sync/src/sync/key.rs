//! Cache key resolution

use crate::host::{SourceFlags, SourceId, SourceObject};

/// Identity of a geometry entity in the cache.
///
/// Unmodified objects key their geometry by data block, which is what lets
/// several objects share one entity. An object with instance-level edits
/// keys by its own identity instead and always gets a private entity. The
/// hair flag keeps an emitter's strand geometry separate from its surface
/// geometry even though both come from the same data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryKey {
    identity: SourceId,
    hair: bool,
}

impl GeometryKey {
    /// Create a key from an explicit identity.
    pub fn new(identity: SourceId, hair: bool) -> Self {
        Self { identity, hair }
    }

    /// Resolve the cache key for a snapshot.
    pub fn resolve(source: &SourceObject) -> Self {
        let identity = if source.flags.contains(SourceFlags::MODIFIED) {
            source.object
        } else {
            source.data
        };
        Self {
            identity,
            hair: source.flags.contains(SourceFlags::PARTICLE_HAIR),
        }
    }

    /// The identity the key is scoped to.
    pub fn identity(&self) -> SourceId {
        self.identity
    }

    /// Whether the key addresses hair geometry.
    pub fn is_hair(&self) -> bool {
        self.hair
    }
}
