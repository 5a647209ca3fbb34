use criterion::{criterion_group, criterion_main, Criterion};
use render_benchmarks::{landscape::*, techniques::*};

mod common;
mod render_benchmarks;

criterion_group! {
    name = slicing;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = render_object_aligned, render_view_aligned
}

criterion_group! {
    name = ray_marching;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = render_ray_marching, render_ray_marching_atlas
}

criterion_group! {
    name = landscape_view;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = build_surface, render_landscape
}

criterion_main!(slicing, ray_marching, landscape_view);
