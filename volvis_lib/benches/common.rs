use std::sync::Arc;

use nalgebra::vector;
pub use volvis_lib::{
    camera::OrbitCamera,
    render::{
        create_technique, Device, FrameBuffer, RenderOptions, RenderTechnique, TechniqueKind,
    },
    test_helpers::gradient_volume,
    transfer_function::TransferFunction,
    volumetric::Volume,
};

pub const WIDTH: usize = 256;
pub const HEIGHT: usize = 256;

pub const VOLUME_SIZE: usize = 64;

/// Camera positions every benchmark renders from, in degrees
pub const DEFAULT_CAMERA_POSITIONS: [(f32, f32); 3] = [(0.0, 0.0), (30.0, 45.0), (-60.0, 170.0)];

pub fn get_volume() -> Arc<Volume> {
    Arc::new(gradient_volume(
        vector![VOLUME_SIZE, VOLUME_SIZE, VOLUME_SIZE],
        vector![1.0, 1.0, 1.0],
    ))
}

pub fn get_technique(device: &Device, kind: TechniqueKind) -> Box<dyn RenderTechnique> {
    let tf = TransferFunction::new();
    create_technique(kind, device, get_volume(), tf.lut(), RenderOptions::default()).unwrap()
}
