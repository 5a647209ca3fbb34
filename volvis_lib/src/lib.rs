use std::sync::Arc;

use crate::{
    camera::OrbitCamera,
    error::Result,
    render::{create_technique, Device, FrameBuffer, RenderOptions, TechniqueKind},
    transfer_function::TransferFunction,
    volumetric::Volume,
};

pub mod camera;
pub mod color;
pub mod common;
pub mod controller;
pub mod error;
pub mod landscape;
pub mod render;
pub mod test_helpers;
pub mod transfer_function;
pub mod volumetric;

pub use error::VolvisError;

/// Render a single frame of `volume` and return it as RGB8
///
/// Convenience for one-off images, interactive use goes through [`controller::Controller`].
pub fn render_frame(
    volume: Volume,
    kind: TechniqueKind,
    camera: OrbitCamera,
    width: usize,
    height: usize,
) -> Result<Vec<u8>> {
    let device = Device::default();
    let tf = TransferFunction::new();
    let mut technique = create_technique(
        kind,
        &device,
        Arc::new(volume),
        tf.lut(),
        RenderOptions::default(),
    )?;
    technique.set_camera(camera);

    let mut frame = FrameBuffer::new(width, height);
    technique.render(&mut frame);
    technique.cleanup();

    Ok(frame.to_rgb8())
}
