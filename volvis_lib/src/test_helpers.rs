//! Module with helper functions
//! Saves repetition in unit tests

use nalgebra::{vector, Vector3};

use crate::{
    landscape::{LandscapeData, Node},
    volumetric::{NormalizationPolicy, Volume, VolumeBuilder},
};

/// 2x2x2 volume holding `0, 32, 64, 96, 128, 160, 192, 255`
pub fn cube_volume() -> Volume {
    let data = vec![0.0, 32.0, 64.0, 96.0, 128.0, 160.0, 192.0, 255.0];
    VolumeBuilder::new()
        .with_size(vector![2, 2, 2])
        .with_samples(data)
        .with_policy(NormalizationPolicy::Clamp)
        .build()
        .expect("cube volume")
}

/// Volume whose samples grow with `x + y + z`, spanning the whole byte range
pub fn gradient_volume(size: Vector3<usize>, spacing: Vector3<f32>) -> Volume {
    let max = (size.x + size.y + size.z - 3).max(1) as f32;
    let mut data = Vec::with_capacity(size.x * size.y * size.z);
    for z in 0..size.z {
        for y in 0..size.y {
            for x in 0..size.x {
                data.push((x + y + z) as f32 / max);
            }
        }
    }
    VolumeBuilder::new()
        .with_size(size)
        .with_spacing(spacing)
        .with_samples(data)
        .build()
        .expect("gradient volume")
}

/// Every sample set to `value`
pub fn solid_volume(size: Vector3<usize>, value: u8) -> Volume {
    VolumeBuilder::new()
        .with_size(size)
        .with_samples(vec![value as f32; size.x * size.y * size.z])
        .with_policy(NormalizationPolicy::Clamp)
        .build()
        .expect("solid volume")
}

/// Four nodes on a unit square with rising values, linked in a ring
pub fn square_landscape() -> LandscapeData {
    let nodes = vec![
        Node::new([0.0, 0.0], 1.0),
        Node::new([1.0, 0.0], 2.0),
        Node::new([1.0, 1.0], 3.0),
        Node::new([0.0, 1.0], 4.0),
    ];
    LandscapeData::new(nodes, vec![(0, 1), (1, 2), (2, 3), (3, 0)])
}
