//! # Material Showcase
//!
//! Drives the built-in material set through the rendering core for a fixed
//! number of frames on the recording dummy backend and prints each frame's
//! report. No window or GPU is needed.
//!
//! ```bash
//! cargo run -p lumen-demos -- --frames 5 --broken-draw
//! ```

use std::sync::Arc;

use clap::Parser;
use glam::{Mat4, Vec3, Vec4};

use lumen_core::mesh::{generators, CpuMesh};
use lumen_core::time::FrameClock;
use lumen_graphics::backend::{BufferHandle, SamplerHandle, TextureHandle};
use lumen_graphics::mesh::VertexLayout;
use lumen_graphics::{
    BackendError, Drawable, DummyBackend, FrameReport, FrameUniforms, LightParameters,
    MaterialKind, Mesh, Renderer, RendererConfig,
};

/// Lumen material showcase (headless).
#[derive(Parser, Debug)]
#[command(name = "material_showcase", version)]
struct Args {
    /// Number of frames to render.
    #[arg(long, default_value = "3")]
    frames: u64,

    /// Number of segments of the rainbow circle.
    #[arg(long, default_value = "64")]
    segments: u16,

    /// Also submit a drawable whose mesh has a vec3 color, which the
    /// vertex-color material rejects.
    #[arg(long)]
    broken_draw: bool,

    /// Simulate an asynchronous GPU fault before this frame.
    #[arg(long)]
    fault_at: Option<u64>,

    /// Do not poll the backend for asynchronous errors.
    #[arg(long)]
    no_error_polling: bool,
}

/// Hands out buffer handles the way an external mesh loader would.
#[derive(Default)]
struct MeshUploader {
    next: u64,
}

impl MeshUploader {
    fn upload(&mut self, cpu: &CpuMesh) -> Arc<Mesh> {
        let mut handle = || {
            self.next += 1;
            BufferHandle::from_raw(self.next)
        };
        let vertex_buffers = (0..cpu.layout().buffer_count()).map(|_| handle()).collect();
        let index_buffer = cpu.index_format().is_some().then(&mut handle);
        Arc::new(Mesh::from_cpu(cpu, vertex_buffers, index_buffer))
    }
}

struct Scene {
    drawables: Vec<Drawable>,
}

impl Scene {
    fn build(args: &Args) -> Self {
        let mut uploader = MeshUploader::default();
        let cube = uploader.upload(&generators::cube());
        let square = uploader.upload(&generators::square());
        let triangle = uploader.upload(&generators::triangle());
        let circle = uploader.upload(&generators::circle(args.segments));

        let atlas = TextureHandle::from_raw(1);
        let sampler = SamplerHandle::from_raw(1);
        let at = |x: f32, y: f32| Mat4::from_translation(Vec3::new(x, y, 0.0));

        let mut drawables = vec![
            Drawable::new(Arc::clone(&cube), MaterialKind::FlatLit.descriptor())
                .with_model(at(-2.0, 1.0))
                .with_tint(Vec4::new(0.9, 0.3, 0.2, 1.0))
                .with_label("lit cube"),
            Drawable::new(Arc::clone(&square), MaterialKind::TexturedLit.descriptor())
                .with_model(at(0.0, 1.0))
                .with_uniform("u_texture", atlas)
                .with_uniform("u_sampler", sampler)
                .with_label("textured square"),
            Drawable::new(Arc::clone(&triangle), MaterialKind::VertexColor.descriptor())
                .with_model(at(2.0, 1.0))
                .with_label("rgb triangle"),
            Drawable::new(Arc::clone(&circle), MaterialKind::Rainbow.descriptor())
                .with_model(at(-2.0, -1.0))
                .with_label("rainbow circle"),
            Drawable::new(Arc::clone(&square), MaterialKind::Glyph.descriptor())
                .with_model(at(0.0, -1.0))
                .with_uniform("u_texture", atlas)
                .with_uniform("u_sampler", sampler)
                .with_label("glyph"),
            Drawable::new(Arc::clone(&square), MaterialKind::Noise.descriptor())
                .with_model(at(2.0, -1.0))
                .with_label("noise square"),
            Drawable::new(Arc::clone(&square), MaterialKind::PointLight.descriptor())
                .with_light(0)
                .with_label("light glow"),
        ];

        if args.broken_draw {
            let rgb = Arc::new(Mesh::new(
                VertexLayout::position_rgb(),
                vec![BufferHandle::from_raw(u64::MAX)],
                3,
            ));
            drawables.push(
                Drawable::new(rgb, MaterialKind::VertexColor.descriptor())
                    .with_label("vec3 colors"),
            );
        }

        Self { drawables }
    }
}

fn frame_uniforms(clock: &FrameClock) -> FrameUniforms {
    let t = clock.elapsed_seconds();
    let view_proj = Mat4::orthographic_rh(-4.0, 4.0, -3.0, 3.0, -1.0, 1.0);
    FrameUniforms::new(t, view_proj).with_light(LightParameters::new(
        Vec3::new(400.0 + 100.0 * t.cos(), 300.0 + 100.0 * t.sin(), 0.0),
        Vec4::new(1.0, 0.9, 0.6, 1.0),
        40.0,
    ))
}

fn print_report(report: &FrameReport) {
    println!(
        "frame {:>3}: {} issued, {} skipped, {} program switches",
        report.frame,
        report.issued,
        report.skipped.len(),
        report.program_switches
    );
    for skipped in &report.skipped {
        println!(
            "    skipped #{} ({}): {}",
            skipped.index,
            skipped.label.as_deref().unwrap_or("unnamed"),
            skipped.error
        );
    }
    for error in &report.backend_errors {
        println!("    backend error: {}", error);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    lumen_core::init();
    lumen_graphics::init();

    let args = Args::parse();
    let config = RendererConfig::new().with_error_polling(!args.no_error_polling);
    let mut renderer = Renderer::new(DummyBackend::new(), config);

    if let Err(error) = renderer.register_builtin_materials() {
        log::error!("Failed to build built-in materials: {}", error);
        std::process::exit(1);
    }

    let scene = Scene::build(&args);
    let mut clock = FrameClock::new();

    for frame in 0..args.frames {
        if args.fault_at == Some(frame) {
            renderer
                .backend_mut()
                .inject_error(BackendError::Gpu("simulated device fault".into()));
        }

        clock.tick();
        renderer.begin_frame(frame_uniforms(&clock));
        for drawable in &scene.drawables {
            if let Err(error) = renderer.submit(drawable.clone()) {
                log::error!("Submit failed: {}", error);
            }
        }
        match renderer.end_frame() {
            Ok(report) => print_report(&report),
            Err(error) => log::error!("Frame {} failed: {}", frame, error),
        }
    }

    let binder = renderer.binder();
    println!(
        "uniform pushes: {} issued, {} skipped as redundant",
        binder.pushed(),
        binder.skipped()
    );
}
