//! Programs and the program catalog.
//!
//! A [`Program`] is a linked vertex+fragment pair together with the maps
//! that bind names to slots: attribute name → input location, uniform name →
//! [`UniformLocation`]. Programs are owned by the [`ProgramCatalog`] and
//! handed out as `Arc<Program>`.

mod catalog;
mod link;

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::{ProgramHandle, ShaderHandle};
use crate::materials::UniformType;
use crate::shader::{ShaderStage, UniformLocation};

pub use catalog::ProgramCatalog;
pub(crate) use link::link_interfaces;

/// Identifier of a material in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(Arc<str>);

impl MaterialId {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MaterialId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for MaterialId {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl std::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// GLSL text of a material's two stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialSource {
    vertex: String,
    fragment: String,
    label: Option<String>,
}

impl MaterialSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// Opaque, process-unique program identity. Doubles as the draw sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(u32);

impl ProgramId {
    pub(crate) fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// A compiled stage object owned by a program.
#[derive(Debug, Clone)]
pub struct ShaderObject {
    pub stage: ShaderStage,
    /// Source the stage was compiled from (includes expanded).
    pub source: String,
    pub handle: ShaderHandle,
}

/// Vertex input slot of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSlot {
    pub location: u32,
    pub components: u32,
}

/// Uniform slot of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot {
    pub location: UniformLocation,
    pub ty: UniformType,
}

/// A successfully linked program. Never exists in a partially bound state:
/// only the catalog creates one, after the link succeeded.
#[derive(Debug)]
pub struct Program {
    id: ProgramId,
    material: MaterialId,
    handle: ProgramHandle,
    vertex: ShaderObject,
    fragment: ShaderObject,
    attributes: HashMap<String, AttributeSlot>,
    uniforms: HashMap<String, UniformSlot>,
}

static_assertions::assert_impl_all!(Program: Send, Sync);

impl Program {
    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn material(&self) -> &MaterialId {
        &self.material
    }

    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    pub fn vertex_stage(&self) -> &ShaderObject {
        &self.vertex
    }

    pub fn fragment_stage(&self) -> &ShaderObject {
        &self.fragment
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSlot> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeSlot)> {
        self.attributes.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformSlot> {
        self.uniforms.get(name)
    }

    pub fn uniforms(&self) -> impl Iterator<Item = (&str, &UniformSlot)> {
        self.uniforms.iter().map(|(n, s)| (n.as_str(), s))
    }
}
