use criterion::{Criterion, black_box, criterion_group, criterion_main};

use lumen_core::mesh::generators::{circle, cube};
use lumen_core::mesh::{VertexAttribute, VertexBufferLayout, VertexLayout};

// ---------------------------------------------------------------------------
// Mesh generation
// ---------------------------------------------------------------------------

fn bench_generate_circle(c: &mut Criterion) {
    c.bench_function("generate_circle_360", |b| {
        b.iter(|| circle(black_box(360)));
    });
}

fn bench_generate_cube(c: &mut Criterion) {
    c.bench_function("generate_cube", |b| {
        b.iter(cube);
    });
}

// ---------------------------------------------------------------------------
// Layouts
// ---------------------------------------------------------------------------

fn bench_layout_compare(c: &mut Criterion) {
    let a = VertexLayout::standard();
    let b_layout = VertexLayout::standard();
    c.bench_function("vertex_layout_eq_standard", |b| {
        b.iter(|| black_box(*a == *b_layout));
    });
}

fn bench_layout_validate(c: &mut Criterion) {
    let layout = VertexLayout::new()
        .with_buffer(VertexBufferLayout::new(12))
        .with_buffer(VertexBufferLayout::new(36))
        .with_attribute(VertexAttribute::position(0))
        .with_attribute(VertexAttribute::color(0).at_buffer(1))
        .with_attribute(VertexAttribute::normal(16).at_buffer(1));
    c.bench_function("vertex_layout_validate", |b| {
        b.iter(|| black_box(layout.validate()));
    });
}

criterion_group!(
    benches,
    bench_generate_circle,
    bench_generate_cube,
    bench_layout_compare,
    bench_layout_validate,
);
criterion_main!(benches);
