//! Object aligned slicing
//!
//! Every z layer of the volume becomes its own 2D texture. Each frame the layers are
//! drawn as textured quads in their own z plane, farthest from the camera first.

use std::sync::Arc;

use log::debug;
use nalgebra::point;

use crate::{
    camera::OrbitCamera,
    color,
    error::RenderError,
    transfer_function::TransferLut,
    volumetric::{Volume, VolumeGrid},
};

use super::{
    geometry::{slice_quad, to_clip},
    raster::{rasterize_fan, ClipVertex, CullMode},
    BlendMode, Device, FrameBuffer, RenderOptions, RenderTechnique, TechniqueKind, Texture2D,
};

/// Opacity factor of a single slice
pub const SLICE_ALPHA: f32 = 0.8;

#[derive(Debug)]
struct Slice {
    // position of the layer in unscaled object space, [-0.5, 0.5]
    z_pos: f32,
    texture: Texture2D,
}

pub struct ObjectAlignedSlicing {
    volume: Arc<Volume>,
    lut: Arc<TransferLut>,
    options: RenderOptions,
    camera: OrbitCamera,
    slices: Vec<Slice>,
}

impl ObjectAlignedSlicing {
    pub fn new(
        device: &Device,
        volume: Arc<Volume>,
        lut: Arc<TransferLut>,
        options: RenderOptions,
    ) -> Result<Self, RenderError> {
        let size = volume.get_size();
        let mut slices = Vec::with_capacity(size.z);
        for z in 0..size.z {
            let texture = device
                .create_texture_2d(size.x, size.y, volume.slice(z).to_vec())
                .map_err(|e| RenderError::Unsupported {
                    technique: TechniqueKind::ObjectAlignedSlicing,
                    reason: e.to_string(),
                })?;
            slices.push(Slice {
                z_pos: layer_position(z, size.z),
                texture,
            });
        }
        debug!("Object aligned slicing: {} slice textures", slices.len());

        Ok(ObjectAlignedSlicing {
            volume,
            lut,
            options,
            camera: OrbitCamera::default(),
            slices,
        })
    }

    /// Number of slice textures held
    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    /// Indices of the layers in drawing order, farthest from the camera first
    pub fn draw_order(&self) -> Vec<usize> {
        let scale_z = self.volume.scale().z;
        let depths: Vec<f32> = self
            .slices
            .iter()
            .map(|s| self.camera.eye_depth(&point![0.0, 0.0, s.z_pos * scale_z]))
            .collect();

        let mut order: Vec<usize> = (0..self.slices.len()).collect();
        order.sort_by(|&a, &b| depths[b].total_cmp(&depths[a]));
        order
    }

    /// Unscaled z of a layer
    pub fn layer_z(&self, index: usize) -> Option<f32> {
        self.slices.get(index).map(|s| s.z_pos)
    }
}

/// Layers spread evenly over [-0.5, 0.5], a single layer sits at 0
fn layer_position(z: usize, depth: usize) -> f32 {
    if depth <= 1 {
        0.0
    } else {
        -0.5 + z as f32 / (depth - 1) as f32
    }
}

impl RenderTechnique for ObjectAlignedSlicing {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::ObjectAlignedSlicing
    }

    fn update_transfer_function(&mut self, lut: Arc<TransferLut>) {
        self.lut = lut;
    }

    fn render(&mut self, frame: &mut FrameBuffer) {
        frame.clear(color::white());
        if self.slices.is_empty() {
            return;
        }

        let (width, height) = (frame.width(), frame.height());
        let mvp = self.camera.mvp(frame.aspect(), self.volume.scale());
        let brightness = self.options.brightness;
        let lut = &self.lut;

        for index in self.draw_order() {
            let slice = &self.slices[index];
            let quad = slice_quad(slice.z_pos).map(|(p, uv)| ClipVertex::new(to_clip(&mvp, &p), uv));

            rasterize_fan(&quad, width, height, CullMode::None, |frag| {
                let [u, v] = frag.attributes;
                let intensity = slice.texture.sample(u, v);
                let alpha = lut.opacity_at(intensity) * SLICE_ALPHA;
                if alpha <= 0.0 {
                    return;
                }
                let rgb = (lut.color_at(intensity) * brightness).map(|c| c.min(1.0));
                frame.blend(
                    frag.x,
                    frag.y,
                    color::new(rgb.x, rgb.y, rgb.z, alpha),
                    BlendMode::AlphaOver,
                );
            });
        }
    }

    fn cleanup(&mut self) {
        debug!("Releasing {} slice textures", self.slices.len());
        self.slices.clear();
    }

    fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }
}
