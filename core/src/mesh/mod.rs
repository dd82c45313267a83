//! CPU-side mesh types and generators.
//!
//! - [`VertexLayout`] - Named vertex attributes across one or more buffers
//! - [`CpuMesh`] - Generated geometry (vertex bytes, u16 indices, layout)
//! - Generators for the basic shapes (triangle, square, circle, cube)
//!
//! These types are re-exported by `lumen-graphics`.

mod data;
pub mod generators;
mod layout;

pub use data::{CpuMesh, IndexFormat, PrimitiveTopology};
pub use layout::{VertexAttribute, VertexAttributeFormat, VertexBufferLayout, VertexLayout};
