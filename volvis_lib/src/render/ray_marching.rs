//! Two pass ray marching
//!
//! The first pass rasterizes the back faces of the volume box and stores the exit point
//! of every pixel in an offscreen target. The second pass rasterizes the front faces and
//! marches from the entry point to the stored exit point, compositing front to back.

use std::sync::Arc;

use log::debug;
use nalgebra::{Matrix4, Point3, Vector3};

use crate::{
    camera::OrbitCamera,
    color::{self, RGBA},
    common::BoundBox,
    error::RenderError,
    transfer_function::TransferLut,
    volumetric::Volume,
};

use super::{
    geometry::{cube_triangles, to_clip},
    raster::{rasterize_triangle, ClipVertex, CullMode},
    BlendMode, Device, FrameBuffer, RenderOptions, RenderTarget, RenderTechnique, TechniqueKind,
    VolumeTexture,
};

pub const MAX_STEPS: usize = 1024;
/// Accumulated opacity at which a ray stops
pub const TERMINATION_ALPHA: f32 = 0.95;
/// Reference distance of the opacity correction, samples are `step * OPACITY_CORRECTION` apart
pub const OPACITY_CORRECTION: f32 = 200.0;

const MIN_STEP: f32 = 1e-4;
const MIN_RAY_LENGTH: f32 = 1e-4;
// entry points this far outside the unit cube still count as inside
const ENTRY_TOLERANCE: f32 = 1e-4;

/// Back face hit stored by the first pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitPoint {
    pub depth: f32,
    /// Texture coordinate of the hit
    pub position: Point3<f32>,
}

fn inside_unit_cube(p: &Point3<f32>, eps: f32) -> bool {
    p.iter().all(|&c| c >= -eps && c <= 1.0 + eps)
}

/// Front to back compositing along one ray
///
/// Yields the accumulated color after every step, the last item is the final color.
pub struct RayMarch<'a> {
    texture: &'a VolumeTexture,
    lut: &'a TransferLut,
    entry: Point3<f32>,
    direction: Vector3<f32>,
    step: f32,
    num_steps: usize,
    brightness: f32,
    current: usize,
    accumulated: RGBA,
}

impl<'a> RayMarch<'a> {
    /// Ray between two texture coordinates, `None` if they (almost) coincide
    pub fn new(
        texture: &'a VolumeTexture,
        lut: &'a TransferLut,
        entry: Point3<f32>,
        exit: Point3<f32>,
        step_size: f32,
        brightness: f32,
    ) -> Option<RayMarch<'a>> {
        let ray = exit - entry;
        let length = ray.norm();
        if !(length >= MIN_RAY_LENGTH) {
            return None;
        }

        let desired = length / step_size.max(MIN_STEP);
        let steps = desired.clamp(1.0, MAX_STEPS as f32);

        Some(RayMarch {
            texture,
            lut,
            entry,
            direction: ray / length,
            step: length / steps,
            num_steps: (steps + 0.5) as usize,
            brightness,
            current: 0,
            accumulated: color::zero(),
        })
    }

    /// Number of samples the ray takes unless terminated early
    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Distance between samples in texture space
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Run to the end, returns premultiplied color
    pub fn composite(self) -> RGBA {
        self.last().unwrap_or_else(color::zero)
    }
}

impl<'a> Iterator for RayMarch<'a> {
    type Item = RGBA;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.num_steps || self.accumulated.w >= TERMINATION_ALPHA {
            return None;
        }
        let t = self.current as f32 * self.step;
        self.current += 1;

        let pos = self.entry + self.direction * t;
        if !inside_unit_cube(&pos, 0.0) {
            return Some(self.accumulated);
        }

        let intensity = (self.texture.sample(pos) * self.brightness).clamp(0.0, 1.0);
        let rgb = self.lut.color_at(intensity);
        let opacity = self.lut.opacity_at(intensity);
        let opacity = 1.0 - (1.0 - opacity).powf(self.step * OPACITY_CORRECTION);

        let remaining = 1.0 - self.accumulated.w;
        let src = rgb * opacity * remaining;
        self.accumulated.x += src.x;
        self.accumulated.y += src.y;
        self.accumulated.z += src.z;
        self.accumulated.w += remaining * opacity;

        Some(self.accumulated)
    }
}

pub struct RayMarching {
    device: Device,
    lut: Arc<TransferLut>,
    options: RenderOptions,
    camera: OrbitCamera,
    scale: Vector3<f32>,
    cube: Vec<[Point3<f32>; 3]>,
    texture: Option<VolumeTexture>,
    exit_points: Option<RenderTarget<Option<ExitPoint>>>,
}

impl RayMarching {
    pub fn new(
        device: &Device,
        volume: Arc<Volume>,
        lut: Arc<TransferLut>,
        options: RenderOptions,
    ) -> Result<Self, RenderError> {
        let texture = device.create_volume_texture(&volume, TechniqueKind::RayMarching)?;
        debug!(
            "Ray marching: {} volume texture",
            if texture.is_native() { "native" } else { "atlas" }
        );
        Ok(RayMarching {
            device: device.clone(),
            lut,
            options,
            camera: OrbitCamera::default(),
            scale: volume.scale(),
            cube: cube_triangles(&BoundBox::unit()),
            texture: Some(texture),
            exit_points: None,
        })
    }

    pub fn texture(&self) -> Option<&VolumeTexture> {
        self.texture.as_ref()
    }

    /// Exit point target of the last frame
    pub fn exit_points(&self) -> Option<&RenderTarget<Option<ExitPoint>>> {
        self.exit_points.as_ref()
    }
}

// unit cube corner, texture coordinate as attribute
fn cube_vertices(mvp: &Matrix4<f32>, triangle: &[Point3<f32>; 3]) -> [ClipVertex<3>; 3] {
    triangle.map(|p| ClipVertex::new(to_clip(mvp, &p), p.coords.add_scalar(0.5).into()))
}

impl RenderTechnique for RayMarching {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::RayMarching
    }

    fn update_transfer_function(&mut self, lut: Arc<TransferLut>) {
        self.lut = lut;
    }

    fn render(&mut self, frame: &mut FrameBuffer) {
        frame.clear(color::white());
        if self.texture.is_none() {
            return;
        }

        let (width, height) = (frame.width(), frame.height());
        let mvp = self.camera.mvp(frame.aspect(), self.scale);

        if self.exit_points.as_ref().map(|t| t.size()) != Some((width, height)) {
            // release the old target before allocating
            self.exit_points = None;
            self.exit_points = Some(self.device.create_render_target(width, height));
        }

        let triangles: Vec<[ClipVertex<3>; 3]> = self
            .cube
            .iter()
            .map(|tri| cube_vertices(&mvp, tri))
            .collect();

        let (texture, exit_points) = match (&self.texture, &mut self.exit_points) {
            (Some(texture), Some(exit_points)) => (texture, exit_points),
            _ => return,
        };
        exit_points.clear();

        // pass 1: back faces, nearest hit wins
        for tri in &triangles {
            rasterize_triangle(tri, width, height, CullMode::Front, |frag| {
                let closer = match exit_points.get(frag.x, frag.y) {
                    Some(stored) => frag.depth < stored.depth,
                    None => true,
                };
                if closer {
                    exit_points.set(
                        frag.x,
                        frag.y,
                        Some(ExitPoint {
                            depth: frag.depth,
                            position: Point3::from(frag.attributes),
                        }),
                    );
                }
            });
        }

        // pass 2: front faces march to the stored exit
        let lut = &*self.lut;
        let step = self.options.ray_step;
        let brightness = self.options.brightness;
        let exit_points = &*exit_points;
        for tri in &triangles {
            rasterize_triangle(tri, width, height, CullMode::Back, |frag| {
                let entry = Point3::from(frag.attributes);
                if !inside_unit_cube(&entry, ENTRY_TOLERANCE) {
                    return;
                }
                let entry = entry.map(|c| c.clamp(0.0, 1.0));
                let exit = match exit_points.get(frag.x, frag.y) {
                    Some(exit) => exit.position,
                    None => return,
                };
                let march = match RayMarch::new(texture, lut, entry, exit, step, brightness) {
                    Some(march) => march,
                    None => return,
                };
                let color = march.composite();
                if color.w > 0.0 {
                    frame.blend(frag.x, frag.y, color, BlendMode::PremultipliedOver);
                }
            });
        }
    }

    fn cleanup(&mut self) {
        self.exit_points = None;
        if self.texture.take().is_some() {
            debug!("Released ray marching resources");
        }
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

#[cfg(test)]
mod test {
    use nalgebra::{point, vector};

    use super::*;
    use crate::{
        render::Capabilities,
        test_helpers::{gradient_volume, solid_volume},
        transfer_function::TransferFunction,
    };

    fn solid_texture(device: &Device, value: u8) -> VolumeTexture {
        let volume = solid_volume(vector![4, 4, 4], value);
        device
            .create_volume_texture(&volume, TechniqueKind::RayMarching)
            .unwrap()
    }

    #[test]
    fn step_count_is_bounded() {
        let device = Device::default();
        let texture = solid_texture(&device, 128);
        let lut = TransferFunction::new().lut();

        let entry = point![0.0, 0.0, 0.0];
        let exit = point![1.0, 1.0, 1.0];

        let march = RayMarch::new(&texture, &lut, entry, exit, 1e-6, 1.0).unwrap();
        assert_eq!(march.num_steps(), MAX_STEPS);

        let march = RayMarch::new(&texture, &lut, entry, exit, 10.0, 1.0).unwrap();
        assert_eq!(march.num_steps(), 1);

        assert!(RayMarch::new(&texture, &lut, entry, entry, 0.01, 1.0).is_none());
    }

    #[test]
    fn alpha_accumulates_monotonically() {
        let device = Device::default();
        let texture = solid_texture(&device, 200);
        let lut = TransferFunction::new().lut();

        let march = RayMarch::new(
            &texture,
            &lut,
            point![0.5, 0.5, 0.0],
            point![0.5, 0.5, 1.0],
            0.005,
            1.0,
        )
        .unwrap();

        let alphas: Vec<f32> = march.map(|c| c.w).collect();
        assert!(!alphas.is_empty());
        assert!(alphas.len() <= MAX_STEPS);
        assert!(alphas.windows(2).all(|w| w[0] <= w[1]));
        assert!(alphas.iter().all(|&a| a <= 1.0));
        // terminated early once opaque enough
        let last = *alphas.last().unwrap();
        assert!(last >= TERMINATION_ALPHA);
        assert!(alphas.len() < 200);
    }

    #[test]
    fn transparent_volume_leaves_background() {
        let device = Device::default();
        let volume = Arc::new(solid_volume(vector![4, 4, 4], 0));
        let lut = TransferFunction::new().lut();
        let mut rm = RayMarching::new(&device, volume, lut, RenderOptions::default()).unwrap();

        let mut frame = FrameBuffer::new(32, 32);
        rm.render(&mut frame);
        assert!(frame.pixels().iter().all(|&c| c == color::white()));

        // the exit points still cover the middle of the screen
        let exits = rm.exit_points().unwrap();
        assert!(exits.get(16, 16).is_some());
        assert!(exits.get(0, 0).is_none());
    }

    #[test]
    fn renders_gradient_and_releases() {
        let device = Device::new(Capabilities::without_3d());
        let volume = Arc::new(gradient_volume(vector![8, 8, 8], vector![1.0, 1.0, 2.0]));
        let lut = TransferFunction::new().lut();
        let mut rm = RayMarching::new(&device, volume, lut, RenderOptions::default()).unwrap();

        let mut frame = FrameBuffer::new(40, 30);
        rm.render(&mut frame);
        assert_eq!(frame.get(0, 0), color::white());
        assert_ne!(frame.get(20, 15), color::white());
        assert_eq!(device.stats().render_targets, 1);

        // resize reallocates, never leaks
        let mut frame = FrameBuffer::new(20, 20);
        rm.render(&mut frame);
        assert_eq!(device.stats().render_targets, 1);

        rm.cleanup();
        assert_eq!(device.stats().live(), 0);
    }
}
