//! # Lumen Graphics
//!
//! Host-side rendering core: turns a set of material programs and a frame's
//! drawables into an ordered sequence of GPU draw calls with bound state.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`ProgramCatalog`] - compiles and links material programs, cached by id
//! - [`AttributeLayoutRegistry`] - binds mesh attributes to program inputs
//! - [`UniformBinder`] - resolves and pushes typed uniforms per draw
//! - [`MaterialDescriptor`] - the declarative contract a drawable references
//! - [`DrawScheduler`] - opaque/transparent buckets with deterministic order
//! - [`Renderer`] - the frame driver owning all of the above
//! - [`GpuBackend`] - the seam to a graphics API, with a recording
//!   [`DummyBackend`] for tests
//!
//! ## Example
//!
//! ```ignore
//! use lumen_graphics::{DummyBackend, FrameUniforms, Renderer, RendererConfig};
//!
//! let mut renderer = Renderer::new(DummyBackend::new(), RendererConfig::default());
//! renderer.register_builtin_materials()?;
//! renderer.begin_frame(FrameUniforms::new(0.0, view_proj));
//! renderer.submit(drawable)?;
//! let report = renderer.end_frame()?;
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod materials;
pub mod mesh;
pub mod program;
pub mod scene;
pub mod shader;

// Re-export main types for convenience
pub use backend::{BackendError, DummyBackend, GpuBackend};
pub use config::{BuiltinUniformNames, RendererConfig};
pub use error::{AttributeSource, DrawError, LinkFailure, ProgramError, SchedulerError};
pub use materials::{
    MaterialDescriptor, MaterialKind, RenderState, UniformBinder, UniformSpec, UniformType,
    UniformValue, UniformValues,
};
pub use mesh::{AttributeLayoutRegistry, BoundLayout, Mesh, VertexLayout};
pub use program::{MaterialId, MaterialSource, Program, ProgramCatalog, ProgramId};
pub use scene::{
    DrawScheduler, Drawable, FrameReport, FrameState, FrameUniforms, LightParameters,
    RenderBucket, Renderer,
};
pub use shader::{ShaderCompiler, ShaderStage};

// Math types used throughout the public API
pub use glam;

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
///
/// Starts the Tracy client when the `profiling` feature is enabled.
pub fn init() {
    #[cfg(feature = "profiling")]
    let _ = lumen_core::profiling::tracy_client::Client::start();
    log::info!("Lumen Graphics v{} initialized", VERSION);
}
