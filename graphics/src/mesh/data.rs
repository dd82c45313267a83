//! GPU-side mesh: buffer handles plus the layout that describes them.
//!
//! Buffers are created by an external mesh loader; the core only references
//! them. Each vertex buffer corresponds to a slot defined in the
//! [`VertexLayout`].

use std::sync::Arc;

use crate::backend::{BufferHandle, DrawCall};

use super::{CpuMesh, IndexFormat, PrimitiveTopology, VertexLayout};

/// A mesh whose data already lives on the GPU.
///
/// # Example
///
/// ```ignore
/// let cpu = generators::cube();
/// let vertices = loader.upload(cpu.vertex_bytes());
/// let indices = loader.upload(cpu.index_bytes());
/// let mesh = Arc::new(Mesh::from_cpu(&cpu, vec![vertices], Some(indices)));
/// ```
#[derive(Debug, Clone)]
pub struct Mesh {
    layout: Arc<VertexLayout>,
    topology: PrimitiveTopology,
    vertex_buffers: Vec<BufferHandle>,
    vertex_count: u32,
    index_buffer: Option<(BufferHandle, IndexFormat)>,
    index_count: u32,
    label: Option<String>,
}

static_assertions::assert_impl_all!(Mesh: Send, Sync);

impl Mesh {
    /// The layout is checked when the mesh is first bound to a program, see
    /// [`AttributeLayoutRegistry`](super::AttributeLayoutRegistry).
    pub fn new(
        layout: Arc<VertexLayout>,
        vertex_buffers: Vec<BufferHandle>,
        vertex_count: u32,
    ) -> Self {
        debug_assert_eq!(
            vertex_buffers.len(),
            layout.buffer_count(),
            "Mesh buffer count must match layout buffer count"
        );
        Self {
            layout,
            topology: PrimitiveTopology::default(),
            vertex_buffers,
            vertex_count,
            index_buffer: None,
            index_count: 0,
            label: None,
        }
    }

    /// Reference the uploaded buffers of `cpu`. `index_buffer` is ignored if
    /// the CPU mesh has no indices.
    pub fn from_cpu(
        cpu: &CpuMesh,
        vertex_buffers: Vec<BufferHandle>,
        index_buffer: Option<BufferHandle>,
    ) -> Self {
        let mut mesh = Self::new(Arc::clone(cpu.layout()), vertex_buffers, cpu.vertex_count())
            .with_topology(cpu.topology())
            .with_label(cpu.label());
        if let (Some(buffer), Some(format)) = (index_buffer, cpu.index_format()) {
            mesh = mesh.with_indices(buffer, format, cpu.index_count());
        }
        mesh
    }

    pub fn with_indices(mut self, buffer: BufferHandle, format: IndexFormat, count: u32) -> Self {
        self.index_buffer = Some((buffer, format));
        self.index_count = count;
        self
    }

    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn layout(&self) -> &Arc<VertexLayout> {
        &self.layout
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn vertex_buffers(&self) -> &[BufferHandle] {
        &self.vertex_buffers
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_buffer(&self) -> Option<(BufferHandle, IndexFormat)> {
        self.index_buffer
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Number of primitives based on topology and vertex/index count.
    pub fn primitive_count(&self) -> u32 {
        self.topology.primitive_count(self.element_count())
    }

    fn element_count(&self) -> u32 {
        if self.is_indexed() {
            self.index_count
        } else {
            self.vertex_count
        }
    }

    /// The draw call that renders the whole mesh.
    pub fn draw_call(&self) -> DrawCall {
        DrawCall {
            topology: self.topology,
            count: self.element_count(),
            indexed: self.is_indexed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::generators;

    #[test]
    fn test_from_cpu_indexed() {
        let cpu = generators::cube();
        let mesh = Mesh::from_cpu(
            &cpu,
            vec![BufferHandle::from_raw(1)],
            Some(BufferHandle::from_raw(2)),
        );

        assert!(mesh.is_indexed());
        assert_eq!(mesh.index_count(), 36);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.primitive_count(), 12);
        assert_eq!(
            mesh.draw_call(),
            DrawCall {
                topology: PrimitiveTopology::TriangleList,
                count: 36,
                indexed: true,
            }
        );
    }

    #[test]
    fn test_from_cpu_non_indexed() {
        let cpu = generators::triangle();
        let mesh = Mesh::from_cpu(&cpu, vec![BufferHandle::from_raw(7)], None);

        assert!(!mesh.is_indexed());
        assert_eq!(mesh.draw_call().count, 3);
        assert_eq!(mesh.primitive_count(), 1);
        assert!(Arc::ptr_eq(mesh.layout(), cpu.layout()));
    }
}
