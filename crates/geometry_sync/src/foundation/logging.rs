//! Logging utilities
//!
//! Pass summaries log at info, per-object rebuild decisions at debug, and
//! fast-path skips at trace.

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from the environment
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with an explicit default level
///
/// `RUST_LOG` still overrides the level when set.
pub fn init_with_level(level: log::LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
