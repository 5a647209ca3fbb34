use criterion::Criterion;
use volvis_lib::render::{Capabilities, Device};

use crate::common::*;

fn bench_technique(c: &mut Criterion, name: &str, device: Device, kind: TechniqueKind) {
    let mut technique = get_technique(&device, kind);
    let mut frame = FrameBuffer::new(WIDTH, HEIGHT);

    c.bench_function(name, |b| {
        b.iter(|| {
            for &(rx, ry) in &DEFAULT_CAMERA_POSITIONS {
                technique.set_camera(OrbitCamera::new(rx, ry, 2.5));
                technique.render(&mut frame);
            }
        });
    });

    technique.cleanup();
}

pub fn render_object_aligned(c: &mut Criterion) {
    bench_technique(
        c,
        "object aligned slicing",
        Device::default(),
        TechniqueKind::ObjectAlignedSlicing,
    );
}

pub fn render_view_aligned(c: &mut Criterion) {
    bench_technique(
        c,
        "view aligned slicing",
        Device::default(),
        TechniqueKind::ViewAlignedSlicing,
    );
}

pub fn render_ray_marching(c: &mut Criterion) {
    bench_technique(
        c,
        "ray marching, 3D texture",
        Device::default(),
        TechniqueKind::RayMarching,
    );
}

pub fn render_ray_marching_atlas(c: &mut Criterion) {
    bench_technique(
        c,
        "ray marching, slice atlas",
        Device::new(Capabilities::without_3d()),
        TechniqueKind::RayMarching,
    );
}
