//! Common utilities for rendering core integration tests.
//!
//! Every test runs against the recording [`DummyBackend`], so assertions are
//! made on the exact command stream a frame produced.

#![allow(dead_code)]

use std::sync::Arc;

use lumen_graphics::backend::{BackendCommand, BufferHandle, SamplerHandle, TextureHandle};
use lumen_graphics::glam::{Mat4, Vec3, Vec4};
use lumen_graphics::mesh::VertexLayout;
use lumen_graphics::{
    DummyBackend, Drawable, FrameUniforms, LightParameters, MaterialKind, Mesh, Renderer,
    RendererConfig,
};

/// Install a test logger. Safe to call from every test.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fixed frame values: tests never read a real clock.
pub fn frame(time: f32) -> FrameUniforms {
    FrameUniforms::new(time, Mat4::IDENTITY).with_light(LightParameters::new(
        Vec3::new(100.0, 100.0, 0.0),
        Vec4::new(1.0, 0.8, 0.6, 1.0),
        25.0,
    ))
}

/// A renderer with every built-in material already linked.
pub struct TestContext {
    pub renderer: Renderer<DummyBackend>,
    next_buffer: u64,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(RendererConfig::default())
    }

    pub fn with_config(config: RendererConfig) -> Self {
        init_logger();
        let mut renderer = Renderer::new(DummyBackend::new(), config);
        renderer
            .register_builtin_materials()
            .expect("built-in materials must build");
        renderer.backend_mut().clear_commands();
        Self {
            renderer,
            next_buffer: 1000,
        }
    }

    pub fn backend(&self) -> &DummyBackend {
        self.renderer.backend()
    }

    /// A non-indexed mesh over `layout` with `vertex_count` vertices.
    ///
    /// Vertex counts double as draw identities in assertions.
    pub fn mesh(&mut self, layout: Arc<VertexLayout>, vertex_count: u32) -> Arc<Mesh> {
        let buffers = (0..layout.buffer_count())
            .map(|_| {
                self.next_buffer += 1;
                BufferHandle::from_raw(self.next_buffer)
            })
            .collect();
        Arc::new(Mesh::new(layout, buffers, vertex_count))
    }

    /// A drawable for `kind` with every resource its material needs.
    pub fn drawable(&mut self, kind: MaterialKind, vertex_count: u32) -> Drawable {
        let mesh = self.mesh(VertexLayout::standard(), vertex_count);
        let drawable = Drawable::new(mesh, kind.descriptor())
            .with_label(format!("{}#{}", kind.name(), vertex_count));
        match kind {
            MaterialKind::TexturedLit | MaterialKind::Glyph => drawable
                .with_uniform("u_texture", TextureHandle::from_raw(1))
                .with_uniform("u_sampler", SamplerHandle::from_raw(2)),
            MaterialKind::PointLight => drawable.with_light(0),
            _ => drawable,
        }
    }

    /// Vertex counts of the draws issued since the last clear, in order.
    pub fn draw_counts(&self) -> Vec<u32> {
        self.backend()
            .draws()
            .iter()
            .map(|(_, call)| call.count)
            .collect()
    }

    pub fn count_commands(&self, predicate: impl Fn(&BackendCommand) -> bool) -> usize {
        self.backend().commands().iter().filter(|c| predicate(c)).count()
    }
}
