use std::collections::HashMap;
use std::sync::Arc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use lumen_graphics::backend::{BufferHandle, SamplerHandle, TextureHandle};
use lumen_graphics::glam::Mat4;
use lumen_graphics::mesh::VertexLayout;
use lumen_graphics::{
    DrawScheduler, Drawable, DummyBackend, FrameUniforms, LightParameters, MaterialId,
    MaterialKind, Mesh, ProgramId, Renderer, RendererConfig, ShaderCompiler,
};

fn drawables(count: usize) -> Vec<Drawable> {
    let mesh = Arc::new(Mesh::new(
        VertexLayout::standard(),
        vec![BufferHandle::from_raw(1)],
        36,
    ));
    let descriptors: Vec<_> = MaterialKind::ALL.iter().map(|k| (*k, k.descriptor())).collect();
    (0..count)
        .map(|i| {
            let (kind, descriptor) = &descriptors[i % descriptors.len()];
            let drawable = Drawable::new(Arc::clone(&mesh), Arc::clone(descriptor))
                .with_model(Mat4::from_translation([i as f32, 0.0, 0.0].into()));
            match kind {
                MaterialKind::TexturedLit | MaterialKind::Glyph => drawable
                    .with_uniform("u_texture", TextureHandle::from_raw(1))
                    .with_uniform("u_sampler", SamplerHandle::from_raw(2)),
                MaterialKind::PointLight => drawable.with_light(0),
                _ => drawable,
            }
        })
        .collect()
}

fn renderer() -> Renderer<DummyBackend> {
    let mut renderer = Renderer::new(DummyBackend::new(), RendererConfig::default());
    renderer
        .register_builtin_materials()
        .expect("built-in materials must build");
    renderer
}

fn frame() -> FrameUniforms {
    FrameUniforms::new(1.0, Mat4::IDENTITY).with_light(LightParameters::default())
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

fn bench_scheduler_sort(c: &mut Criterion) {
    let renderer = renderer();
    let programs: HashMap<MaterialId, ProgramId> = MaterialKind::ALL
        .iter()
        .filter_map(|k| {
            let id = k.material_id();
            let program = renderer.catalog().get(&id)?.id();
            Some((id, program))
        })
        .collect();
    let input = drawables(1024);

    c.bench_function("scheduler_sort_1024_drawables", |b| {
        b.iter_batched(
            || {
                let mut scheduler = DrawScheduler::with_capacity(1024, 512);
                for drawable in &input {
                    scheduler.submit(drawable.clone()).unwrap();
                }
                scheduler
            },
            |mut scheduler| {
                scheduler
                    .sort_opaque(|d| programs.get(d.material.material()).copied())
                    .unwrap();
                scheduler.sort_transparent().unwrap();
                black_box(scheduler.opaque().len());
            },
            BatchSize::SmallInput,
        );
    });
}

// ---------------------------------------------------------------------------
// Frame issue
// ---------------------------------------------------------------------------

fn bench_frame_issue(c: &mut Criterion) {
    let mut renderer = renderer();
    let input = drawables(256);

    c.bench_function("frame_issue_256_drawables", |b| {
        b.iter(|| {
            renderer.backend_mut().clear_commands();
            renderer.begin_frame(frame());
            for drawable in &input {
                renderer.submit(drawable.clone()).unwrap();
            }
            black_box(renderer.end_frame().unwrap());
        });
    });
}

// ---------------------------------------------------------------------------
// Shader front-end
// ---------------------------------------------------------------------------

fn bench_compile_pair(c: &mut Criterion) {
    let compiler = ShaderCompiler::with_standard_library();
    let kind = MaterialKind::TexturedLit;
    let (id, source) = (kind.material_id(), kind.source());

    c.bench_function("compile_pair_textured_lit", |b| {
        b.iter(|| black_box(compiler.compile_pair(&id, &source).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_scheduler_sort,
    bench_frame_issue,
    bench_compile_pair,
);
criterion_main!(benches);
