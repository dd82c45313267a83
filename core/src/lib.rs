//! # Lumen Core
//!
//! GPU-agnostic building blocks shared by the Lumen rendering crates:
//!
//! - [`mesh`] - vertex layouts with named attributes, topology, CPU meshes and
//!   procedural shape generators
//! - [`time`] - monotonic frame clock
//! - [`profiling`] - optional Tracy instrumentation macros

pub mod mesh;
pub mod profiling;
pub mod time;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the core library version.
pub fn init() {
    log::info!("Lumen Core v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
