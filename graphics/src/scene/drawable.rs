//! Drawables: one mesh instance to render this frame.

use std::sync::Arc;

use glam::{Mat4, Vec4};

use crate::materials::{MaterialDescriptor, UniformValue, UniformValues};
use crate::mesh::Mesh;

/// Which queue a drawable is issued from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderBucket {
    /// Sorted by program to minimize switches.
    Opaque,
    /// Alpha-tested or blended. Issued in submission order.
    Transparent,
}

/// A mesh instance with its material and per-instance values.
///
/// Meshes and descriptors are shared: many drawables may reference one.
///
/// # Example
///
/// ```ignore
/// let drawable = Drawable::new(mesh.clone(), MaterialKind::Glyph.descriptor())
///     .with_model(Mat4::from_translation(Vec3::X))
///     .with_uniform("u_texture", atlas)
///     .with_uniform("u_sampler", sampler)
///     .with_label("title");
/// ```
#[derive(Debug, Clone)]
pub struct Drawable {
    pub mesh: Arc<Mesh>,
    pub material: Arc<MaterialDescriptor>,
    pub model: Mat4,
    pub tint: Option<Vec4>,
    pub uniforms: UniformValues,
    /// Index into [`FrameUniforms::lights`](super::FrameUniforms::lights).
    pub light: Option<usize>,
    pub label: Option<String>,
}

impl Drawable {
    pub fn new(mesh: Arc<Mesh>, material: Arc<MaterialDescriptor>) -> Self {
        Self {
            mesh,
            material,
            model: Mat4::IDENTITY,
            tint: None,
            uniforms: UniformValues::new(),
            light: None,
            label: None,
        }
    }

    pub fn with_model(mut self, model: Mat4) -> Self {
        self.model = model;
        self
    }

    pub fn with_tint(mut self, tint: Vec4) -> Self {
        self.tint = Some(tint);
        self
    }

    pub fn with_uniform(mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        self.uniforms.set(name, value);
        self
    }

    pub fn with_light(mut self, index: usize) -> Self {
        self.light = Some(index);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Classified by the descriptor's alpha-test and blend flags.
    pub fn bucket(&self) -> RenderBucket {
        if self.material.is_transparent() {
            RenderBucket::Transparent
        } else {
            RenderBucket::Opaque
        }
    }
}
