//! Vertex layout definitions for meshes.
//!
//! A layout names every attribute a vertex buffer provides together with its
//! element format and byte offset. Attribute names are the contract with the
//! shader stage: `position`, `color`, `normal` and `uv` in the built-in
//! interleaved layout, matched by exact name against a program's declared
//! inputs.
//!
//! Layouts are shared via `Arc` since there are typically only a few
//! combinations across many meshes.
//!
//! # Example
//!
//! ```ignore
//! let layout = Arc::new(VertexLayout::new()
//!     .with_buffer(VertexBufferLayout::new(28))
//!     .with_attribute(VertexAttribute::new("position", VertexAttributeFormat::Float3, 0, 0))
//!     .with_attribute(VertexAttribute::new("color", VertexAttributeFormat::Float4, 12, 0)));
//! ```

use std::sync::Arc;

/// Format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    /// Single 32-bit float.
    Float,
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
    /// Four 8-bit unsigned integers (normalized to 0.0-1.0).
    Unorm8x4,
}

impl VertexAttributeFormat {
    /// Get the size in bytes of this format.
    pub fn size(&self) -> usize {
        match self {
            Self::Float => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
            Self::Unorm8x4 => 4,
        }
    }

    /// Number of components the shader sees (2 for vec2, 3 for vec3, ...).
    pub fn components(&self) -> u32 {
        match self {
            Self::Float => 1,
            Self::Float2 => 2,
            Self::Float3 => 3,
            Self::Float4 | Self::Unorm8x4 => 4,
        }
    }
}

/// Describes a single vertex buffer binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBufferLayout {
    /// Stride in bytes between consecutive vertices.
    pub stride: u32,
}

impl VertexBufferLayout {
    pub fn new(stride: u32) -> Self {
        Self { stride }
    }
}

/// A single named vertex attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Name the shader stage declares for this input.
    pub name: String,
    /// Data format of this attribute.
    pub format: VertexAttributeFormat,
    /// Byte offset within the vertex buffer.
    pub offset: u32,
    /// Index of the vertex buffer this attribute reads from.
    pub buffer_index: u32,
}

impl VertexAttribute {
    /// Create a new vertex attribute.
    pub fn new(
        name: impl Into<String>,
        format: VertexAttributeFormat,
        offset: u32,
        buffer_index: u32,
    ) -> Self {
        Self {
            name: name.into(),
            format,
            offset,
            buffer_index,
        }
    }

    /// `position` (float3) at buffer 0.
    pub fn position(offset: u32) -> Self {
        Self::new("position", VertexAttributeFormat::Float3, offset, 0)
    }

    /// `normal` (float3) at buffer 0.
    pub fn normal(offset: u32) -> Self {
        Self::new("normal", VertexAttributeFormat::Float3, offset, 0)
    }

    /// `color` (float4) at buffer 0.
    pub fn color(offset: u32) -> Self {
        Self::new("color", VertexAttributeFormat::Float4, offset, 0)
    }

    /// `uv` (float2) at buffer 0.
    pub fn uv(offset: u32) -> Self {
        Self::new("uv", VertexAttributeFormat::Float2, offset, 0)
    }

    /// Set the buffer index for this attribute.
    pub fn at_buffer(mut self, buffer_index: u32) -> Self {
        self.buffer_index = buffer_index;
        self
    }
}

/// Describes the layout of vertex data across one or more buffers.
///
/// Two layouts compare equal when buffers and attributes match, which lets
/// the graphics crate cache bindings per layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexLayout {
    /// Descriptions of each vertex buffer binding.
    pub buffers: Vec<VertexBufferLayout>,
    /// The vertex attributes, each referencing a buffer by index.
    pub attributes: Vec<VertexAttribute>,
    /// Optional label for debugging.
    pub label: Option<String>,
}

impl VertexLayout {
    /// Create a new empty vertex layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex buffer binding.
    pub fn with_buffer(mut self, buffer: VertexBufferLayout) -> Self {
        self.buffers.push(buffer);
        self
    }

    /// Add a vertex attribute.
    pub fn with_attribute(mut self, attribute: VertexAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Get the stride for a specific buffer, 0 if the slot is undefined.
    pub fn buffer_stride(&self, buffer_index: usize) -> u32 {
        self.buffers
            .get(buffer_index)
            .map(|b| b.stride)
            .unwrap_or(0)
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Validate the layout: attributes reference defined buffers, fit inside
    /// their stride and names are unique.
    pub fn validate(&self) -> Result<(), String> {
        for (i, attr) in self.attributes.iter().enumerate() {
            let Some(buffer) = self.buffers.get(attr.buffer_index as usize) else {
                return Err(format!(
                    "Attribute '{}' references buffer {} but only {} buffers defined",
                    attr.name,
                    attr.buffer_index,
                    self.buffers.len()
                ));
            };
            if attr.offset as usize + attr.format.size() > buffer.stride as usize {
                return Err(format!(
                    "Attribute '{}' at offset {} overruns stride {}",
                    attr.name, attr.offset, buffer.stride
                ));
            }
            if self.attributes[..i].iter().any(|a| a.name == attr.name) {
                return Err(format!("Attribute '{}' declared twice", attr.name));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Common Layouts
// ============================================================================

impl VertexLayout {
    /// Position-only layout (12 bytes per vertex).
    pub fn position_only() -> Arc<Self> {
        Arc::new(
            Self::new()
                .with_buffer(VertexBufferLayout::new(12))
                .with_attribute(VertexAttribute::position(0))
                .with_label("position_only"),
        )
    }

    /// Position + normal layout (24 bytes per vertex).
    pub fn position_normal() -> Arc<Self> {
        Arc::new(
            Self::new()
                .with_buffer(VertexBufferLayout::new(24))
                .with_attribute(VertexAttribute::position(0))
                .with_attribute(VertexAttribute::normal(12))
                .with_label("position_normal"),
        )
    }

    /// Position + uv layout (20 bytes per vertex).
    pub fn position_uv() -> Arc<Self> {
        Arc::new(
            Self::new()
                .with_buffer(VertexBufferLayout::new(20))
                .with_attribute(VertexAttribute::position(0))
                .with_attribute(VertexAttribute::uv(12))
                .with_label("position_uv"),
        )
    }

    /// Position + vec3 color layout (24 bytes per vertex).
    pub fn position_rgb() -> Arc<Self> {
        Arc::new(
            Self::new()
                .with_buffer(VertexBufferLayout::new(24))
                .with_attribute(VertexAttribute::position(0))
                .with_attribute(VertexAttribute::new(
                    "color",
                    VertexAttributeFormat::Float3,
                    12,
                    0,
                ))
                .with_label("position_rgb"),
        )
    }

    /// The interleaved layout used by the shape generators:
    /// position (vec3), color (vec4), normal (vec3), uv (vec2), 48 bytes.
    pub fn standard() -> Arc<Self> {
        Arc::new(
            Self::new()
                .with_buffer(VertexBufferLayout::new(48))
                .with_attribute(VertexAttribute::position(0))
                .with_attribute(VertexAttribute::color(12))
                .with_attribute(VertexAttribute::normal(28))
                .with_attribute(VertexAttribute::uv(40))
                .with_label("standard"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_attribute_format() {
        assert_eq!(VertexAttributeFormat::Float3.size(), 12);
        assert_eq!(VertexAttributeFormat::Float3.components(), 3);
        assert_eq!(VertexAttributeFormat::Unorm8x4.size(), 4);
        assert_eq!(VertexAttributeFormat::Unorm8x4.components(), 4);
    }

    #[test]
    fn test_standard_layout() {
        let layout = VertexLayout::standard();
        assert_eq!(layout.buffer_count(), 1);
        assert_eq!(layout.buffer_stride(0), 48);
        assert_eq!(layout.attribute("color").map(|a| a.format.components()), Some(4));
        assert_eq!(layout.attribute("uv").map(|a| a.offset), Some(40));
        assert!(!layout.has_attribute("tangent"));
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_common_layouts_validate() {
        for layout in [
            VertexLayout::position_only(),
            VertexLayout::position_normal(),
            VertexLayout::position_uv(),
            VertexLayout::position_rgb(),
        ] {
            assert!(layout.validate().is_ok(), "{:?}", layout.label);
        }
    }

    #[test]
    fn test_vertex_layout_validation() {
        let bad_buffer = VertexLayout::new()
            .with_buffer(VertexBufferLayout::new(12))
            .with_attribute(VertexAttribute::position(0).at_buffer(5));
        assert!(bad_buffer.validate().is_err());

        let overrun = VertexLayout::new()
            .with_buffer(VertexBufferLayout::new(12))
            .with_attribute(VertexAttribute::color(0));
        assert!(overrun.validate().is_err());

        let duplicate = VertexLayout::new()
            .with_buffer(VertexBufferLayout::new(24))
            .with_attribute(VertexAttribute::position(0))
            .with_attribute(VertexAttribute::position(12));
        assert!(duplicate.validate().is_err());
    }

    #[test]
    fn test_layout_equality_ignores_arc() {
        assert_eq!(*VertexLayout::standard(), *VertexLayout::standard());
        assert_ne!(*VertexLayout::position_rgb(), *VertexLayout::standard());
    }
}
