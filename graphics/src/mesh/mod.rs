//! Meshes and vertex attribute binding.
//!
//! - [`Mesh`] - buffer handles supplied by the mesh loader, plus the
//!   [`VertexLayout`] describing them
//! - [`AttributeLayoutRegistry`] - matches a layout against a program and a
//!   material descriptor, caching the resulting [`BoundLayout`]
//!
//! # Efficient Sharing via Arc
//!
//! Vertex layouts are wrapped in `Arc`: there are only a few layout
//! combinations across many meshes, and pointer comparison makes the
//! registry's cache lookup cheap.

mod data;
mod registry;

pub use data::Mesh;
pub use registry::{AttributeBinding, AttributeLayoutRegistry, BoundLayout};

pub use lumen_core::mesh::{
    generators, CpuMesh, IndexFormat, PrimitiveTopology, VertexAttribute, VertexAttributeFormat,
    VertexBufferLayout, VertexLayout,
};
