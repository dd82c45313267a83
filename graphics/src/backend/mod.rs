//! GPU backend abstraction layer.
//!
//! The rendering core drives the GPU exclusively through the [`GpuBackend`]
//! trait. Every method takes `&mut self`: the graphics context is owned by a
//! single draw thread and is never shared.
//!
//! # Available Backends
//!
//! - [`DummyBackend`]: records every command instead of talking to a GPU.
//!   Used by tests, benchmarks and the headless demo.

pub mod dummy;
mod error;

pub use dummy::{BackendCommand, DummyBackend};
pub use error::{BackendError, BackendResult};

use crate::materials::{RenderState, UniformValue};
use crate::mesh::{AttributeBinding, IndexFormat, PrimitiveTopology};
use crate::shader::{ShaderStage, UniformLocation};

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw backend object id.
            pub const fn from_raw(id: u64) -> Self {
                Self(id)
            }

            /// The raw backend object id.
            pub const fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

gpu_handle!(
    /// Handle to a compiled shader stage object.
    ShaderHandle
);
gpu_handle!(
    /// Handle to a linked program object.
    ProgramHandle
);
gpu_handle!(
    /// Handle to a vertex or index buffer, supplied by the mesh loader.
    BufferHandle
);
gpu_handle!(
    /// Handle to a texture, supplied by the texture loader.
    TextureHandle
);
gpu_handle!(
    /// Handle to a sampler object.
    SamplerHandle
);

/// Vertex input state for one draw.
#[derive(Debug, Clone, Copy)]
pub struct VertexInput<'a> {
    /// Attribute slots to enable, with their buffer placement.
    pub attributes: &'a [AttributeBinding],
    /// Vertex buffers by slot index.
    pub vertex_buffers: &'a [BufferHandle],
    /// Index buffer, if the mesh is indexed.
    pub index_buffer: Option<(BufferHandle, IndexFormat)>,
}

/// A single draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub topology: PrimitiveTopology,
    /// Number of indices (indexed) or vertices (non-indexed).
    pub count: u32,
    pub indexed: bool,
}

/// Trait every GPU backend implements.
pub trait GpuBackend {
    /// Get the backend name.
    fn name(&self) -> &'static str;

    /// Create and compile a shader stage object from GLSL text.
    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> BackendResult<ShaderHandle>;

    fn destroy_shader(&mut self, shader: ShaderHandle);

    /// Link a vertex and a fragment stage into a program object.
    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> BackendResult<ProgramHandle>;

    fn destroy_program(&mut self, program: ProgramHandle);

    /// Make `program` current for subsequent draws. Uniform uploads name
    /// their program explicitly and do not depend on it.
    fn use_program(&mut self, program: ProgramHandle);

    /// Configure vertex input bindings for the next draw.
    fn set_vertex_input(&mut self, input: VertexInput<'_>);

    /// Upload a single uniform value to `program`.
    fn set_uniform(
        &mut self,
        program: ProgramHandle,
        location: UniformLocation,
        value: &UniformValue,
    );

    /// Apply blending, alpha testing, the color write mask, and the stencil
    /// and depth tests.
    fn set_render_state(&mut self, state: &RenderState);

    /// Issue a draw call. Never blocks on the GPU.
    fn draw(&mut self, call: DrawCall);

    /// Take the oldest pending asynchronous error, if any.
    fn poll_error(&mut self) -> Option<BackendError>;
}
