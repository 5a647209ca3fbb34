use criterion::Criterion;
use volvis_lib::landscape::{LandscapeData, LandscapeRenderer, LandscapeSurfaceBuilder, Node};

use crate::common::*;

// nodes on a jittered grid, value is a smooth bump
fn grid_landscape(side: usize) -> LandscapeData {
    let mut nodes = Vec::with_capacity(side * side);
    let mut links = Vec::new();
    for j in 0..side {
        for i in 0..side {
            let x = i as f64 + 0.3 * ((i * 7 + j * 3) % 5) as f64 / 5.0;
            let y = j as f64;
            let value = (x * 0.4).sin() * (y * 0.3).cos();
            nodes.push(Node::new([x, y], value));
            if i > 0 {
                links.push((j * side + i - 1, j * side + i));
            }
        }
    }
    LandscapeData::new(nodes, links)
}

pub fn build_surface(c: &mut Criterion) {
    let data = grid_landscape(10);
    c.bench_function("landscape surface build", |b| {
        b.iter(|| {
            let mut builder = LandscapeSurfaceBuilder::new();
            builder.set_data(&data);
            builder
        });
    });
}

pub fn render_landscape(c: &mut Criterion) {
    let mut builder = LandscapeSurfaceBuilder::new();
    builder.set_data(&grid_landscape(10));
    let renderer = LandscapeRenderer::new();
    let mut frame = FrameBuffer::new(WIDTH, HEIGHT);

    c.bench_function("landscape render", |b| {
        b.iter(|| renderer.render(&builder, &mut frame));
    });
}
