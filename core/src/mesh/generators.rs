//! Mesh generators for common shapes.
//!
//! Every generator emits the [`VertexLayout::standard`] interleaved layout
//! (position, color, normal, uv; 48 bytes per vertex) with u16 indices.

use super::data::{CpuMesh, PrimitiveTopology};
use super::layout::VertexLayout;

/// Interleaved vertex matching [`VertexLayout::standard`].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StandardVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl StandardVertex {
    pub const fn new(
        position: [f32; 3],
        color: [f32; 4],
        normal: [f32; 3],
        uv: [f32; 2],
    ) -> Self {
        Self {
            position,
            color,
            normal,
            uv,
        }
    }
}

const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const FACING_X: [f32; 3] = [1.0, 0.0, 0.0];

fn build(
    vertices: &[StandardVertex],
    indices: &[u16],
    topology: PrimitiveTopology,
    label: &'static str,
) -> CpuMesh {
    CpuMesh::new(
        VertexLayout::standard(),
        topology,
        vertices,
        indices.to_vec(),
        label,
    )
}

/// A red/green/blue triangle spanning the lower-left half of clip space.
pub fn triangle() -> CpuMesh {
    let vertices = [
        StandardVertex::new([-1.0, -1.0, 0.0], RED, FACING_X, [0.0, 0.0]),
        StandardVertex::new([-1.0, 1.0, 0.0], GREEN, FACING_X, [0.0, 1.0]),
        StandardVertex::new([1.0, 1.0, 0.0], BLUE, FACING_X, [1.0, 0.0]),
    ];
    build(&vertices, &[0, 1, 2], PrimitiveTopology::TriangleList, "triangle")
}

/// A square covering clip space, drawn as a triangle fan.
pub fn square() -> CpuMesh {
    let vertices = [
        StandardVertex::new([-1.0, -1.0, 0.0], RED, FACING_X, [0.0, 0.0]),
        StandardVertex::new([-1.0, 1.0, 0.0], GREEN, FACING_X, [0.0, 1.0]),
        StandardVertex::new([1.0, 1.0, 0.0], BLUE, FACING_X, [1.0, 1.0]),
        StandardVertex::new([1.0, -1.0, 0.0], BLACK, FACING_X, [1.0, 0.0]),
    ];
    build(&vertices, &[0, 1, 2, 3], PrimitiveTopology::TriangleFan, "square")
}

/// A white unit circle on the XY plane, drawn as a triangle fan.
///
/// `segments` is clamped to at least 3.
pub fn circle(segments: u16) -> CpuMesh {
    let segments = segments.max(3);
    let step = std::f32::consts::TAU / segments as f32;
    let vertices: Vec<_> = (0..segments)
        .map(|i| {
            let (y, x) = (i as f32 * step).sin_cos();
            StandardVertex::new(
                [x, y, 0.0],
                WHITE,
                FACING_X,
                [(x + 1.0) / 2.0, (y + 1.0) / 2.0],
            )
        })
        .collect();
    let indices: Vec<u16> = (0..segments).collect();
    build(&vertices, &indices, PrimitiveTopology::TriangleFan, "circle")
}

/// A unit cube centered at the origin with per-face normals and uvs.
pub fn cube() -> CpuMesh {
    // (normal, four corners counter-clockwise seen from outside, their uvs)
    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4], [[f32; 2]; 4]); 6] = [
        ([1.0, 0.0, 0.0],
         [[0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, -0.5]],
         [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]),
        ([-1.0, 0.0, 0.0],
         [[-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [-0.5, 0.5, 0.5], [-0.5, -0.5, 0.5]],
         [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]),
        ([0.0, 1.0, 0.0],
         [[-0.5, 0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5]],
         [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]),
        ([0.0, -1.0, 0.0],
         [[-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, -0.5, -0.5]],
         [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]),
        ([0.0, 0.0, 1.0],
         [[-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, -0.5, 0.5]],
         [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]),
        ([0.0, 0.0, -1.0],
         [[-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5]],
         [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, (normal, corners, uvs)) in faces.iter().enumerate() {
        for (corner, uv) in corners.iter().zip(uvs) {
            vertices.push(StandardVertex::new(*corner, RED, *normal, *uv));
        }
        let base = 4 * face as u16;
        indices.extend([0, 1, 2, 0, 2, 3].map(|i| base + i));
    }
    build(&vertices, &indices, PrimitiveTopology::TriangleList, "cube")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertices(mesh: &CpuMesh) -> Vec<StandardVertex> {
        mesh.vertex_bytes()
            .chunks_exact(std::mem::size_of::<StandardVertex>())
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }

    #[test]
    fn test_vertex_matches_standard_layout() {
        let layout = VertexLayout::standard();
        assert_eq!(
            std::mem::size_of::<StandardVertex>(),
            layout.buffer_stride(0) as usize
        );
        assert_eq!(layout.attribute("color").unwrap().offset, 12);
        assert_eq!(layout.attribute("normal").unwrap().offset, 28);
    }

    #[test]
    fn test_triangle() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.index_count(), 3);
        assert_eq!(mesh.topology(), PrimitiveTopology::TriangleList);
        assert_eq!(vertices(&mesh)[2].color, BLUE);
    }

    #[test]
    fn test_square_is_fan() {
        let mesh = square();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.topology(), PrimitiveTopology::TriangleFan);
        assert_eq!(mesh.topology().primitive_count(mesh.index_count()), 2);
    }

    #[test]
    fn test_circle() {
        let mesh = circle(360);
        assert_eq!(mesh.vertex_count(), 360);
        assert_eq!(mesh.index_count(), 360);
        let first = vertices(&mesh)[0];
        assert_eq!(first.position, [1.0, 0.0, 0.0]);
        assert_eq!(first.uv, [1.0, 0.5]);

        assert_eq!(circle(1).vertex_count(), 3);
    }

    #[test]
    fn test_cube() {
        let mesh = cube();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        assert_eq!(mesh.index_bytes().len(), 36 * 2);
        for v in vertices(&mesh) {
            let n = v.normal;
            let along: f32 = (0..3).map(|i| v.position[i] * n[i]).sum();
            assert_eq!(along, 0.5, "corner must lie on its face plane");
        }
    }
}
