//! Materials: descriptors, uniform typing, binding and the built-in set.
//!
//! - [`MaterialDescriptor`] - immutable, `Arc`-shared draw contract
//! - [`UniformSpec`] / [`UniformValue`] - typed uniforms with optional defaults
//! - [`UniformBinder`] - resolves and pushes a draw's uniforms
//! - [`MaterialKind`] - the built-in techniques

mod binder;
mod builtin;
mod material;
mod uniforms;

pub use binder::{DrawUniforms, UniformBinder};
pub use builtin::{register_builtin_materials, MaterialKind, GLYPH_DEFAULT_COLOR};
pub use material::{
    AttributeRequirement, BlendComponent, BlendFactor, BlendOperation, BlendState,
    ColorWriteMask, CompareFunction, DepthState, MaterialDescriptor, MaterialDescriptorBuilder,
    RenderState, StencilOperation, StencilState,
};
pub use uniforms::{UniformSpec, UniformType, UniformValue, UniformValues};
