//! CPU-side mesh data structures.
//!
//! - [`PrimitiveTopology`] - How vertices are assembled into primitives
//! - [`IndexFormat`] - Index data format (u16 or u32)
//! - [`CpuMesh`] - Generated vertex and index data

use std::sync::Arc;

use super::layout::VertexLayout;

/// Primitive topology describing how vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Each vertex is a separate point.
    PointList,
    /// Every two vertices form a line.
    LineList,
    /// Vertices form a connected strip of lines.
    LineStrip,
    /// Every three vertices form a triangle.
    #[default]
    TriangleList,
    /// Vertices form a connected strip of triangles.
    TriangleStrip,
    /// Every vertex after the second forms a triangle with the first vertex
    /// and its predecessor.
    TriangleFan,
}

impl PrimitiveTopology {
    /// Number of primitives assembled from `count` vertices (or indices).
    pub fn primitive_count(&self, count: u32) -> u32 {
        match self {
            Self::PointList => count,
            Self::LineList => count / 2,
            Self::LineStrip => count.saturating_sub(1),
            Self::TriangleList => count / 3,
            Self::TriangleStrip | Self::TriangleFan => count.saturating_sub(2),
        }
    }
}

/// Index format for indexed drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    #[default]
    Uint16,
    Uint32,
}

/// Generated geometry: one interleaved vertex buffer plus u16 indices.
///
/// Whatever uploads buffers for the active backend reads the bytes; the
/// rendering core only needs the layout, topology and counts.
#[derive(Debug, Clone)]
pub struct CpuMesh {
    layout: Arc<VertexLayout>,
    topology: PrimitiveTopology,
    vertices: Vec<u8>,
    vertex_count: u32,
    indices: Vec<u16>,
    label: &'static str,
}

impl CpuMesh {
    pub fn new<V: bytemuck::Pod>(
        layout: Arc<VertexLayout>,
        topology: PrimitiveTopology,
        vertices: &[V],
        indices: Vec<u16>,
        label: &'static str,
    ) -> Self {
        Self {
            layout,
            topology,
            vertices: bytemuck::cast_slice(vertices).to_vec(),
            vertex_count: vertices.len() as u32,
            indices,
            label,
        }
    }

    pub fn layout(&self) -> &Arc<VertexLayout> {
        &self.layout
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// `None` for a mesh drawn without indices.
    pub fn index_format(&self) -> Option<IndexFormat> {
        (!self.indices.is_empty()).then_some(IndexFormat::Uint16)
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_count() {
        assert_eq!(PrimitiveTopology::TriangleList.primitive_count(36), 12);
        assert_eq!(PrimitiveTopology::TriangleFan.primitive_count(10), 8);
        assert_eq!(PrimitiveTopology::TriangleStrip.primitive_count(1), 0);
        assert_eq!(PrimitiveTopology::LineStrip.primitive_count(0), 0);
    }

    #[test]
    fn test_counts_follow_vertex_type() {
        let corners: [[f32; 3]; 4] = [[0.0; 3]; 4];
        let mesh = CpuMesh::new(
            VertexLayout::position_only(),
            PrimitiveTopology::TriangleFan,
            &corners,
            Vec::new(),
            "quad",
        );

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.vertex_bytes().len(), 48);
        assert_eq!(mesh.index_format(), None);
        assert!(mesh.index_bytes().is_empty());
    }
}
