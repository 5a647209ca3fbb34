//! View aligned slicing
//!
//! The volume is sampled through a single 3D-sampleable texture. Each frame a stack of
//! planes perpendicular to the viewing direction is intersected with the volume box
//! and the resulting polygons are composited back to front.

use std::sync::Arc;

use log::debug;
use nalgebra::{vector, Point3, Vector3};

use crate::{
    camera::OrbitCamera,
    color,
    common::{BoundBox, BOX_EDGES},
    error::RenderError,
    transfer_function::TransferLut,
    volumetric::Volume,
};

use super::{
    geometry::to_clip,
    raster::{rasterize_fan, ClipVertex, CullMode},
    BlendMode, Device, FrameBuffer, RenderOptions, RenderTechnique, TechniqueKind,
    VolumeTexture,
};

// edges whose ends differ less than this along the normal are parallel to the plane
const PARALLEL_EPS: f32 = 1e-6;
const MERGE_EPS: f32 = 1e-5;

/// Intersect the box of size `scale` with `count` planes perpendicular to `view_dir`
///
/// Polygons are in scaled object space, ordered back to front, their vertices sorted
/// around the centroid. Planes that miss the box produce no polygon.
pub fn slice_polygons(
    scale: Vector3<f32>,
    view_dir: Vector3<f32>,
    count: usize,
) -> Vec<Vec<Point3<f32>>> {
    let normal = match view_dir.try_normalize(f32::EPSILON) {
        Some(n) => n,
        None => return Vec::new(),
    };
    let corners = BoundBox::centered(scale).corners();
    let max_dist = 0.5 * scale.norm();
    let count = count.max(2);

    let (tangent, bitangent) = plane_basis(&normal);

    let mut polygons = Vec::with_capacity(count);
    for i in (0..count).rev() {
        let d = -max_dist + 2.0 * max_dist * i as f32 / (count - 1) as f32;

        let mut points: Vec<Point3<f32>> = Vec::with_capacity(6);
        for (a, b) in BOX_EDGES {
            let (ca, cb) = (corners[a], corners[b]);
            let s0 = normal.dot(&ca.coords) - d;
            let s1 = normal.dot(&cb.coords) - d;
            if s0 * s1 > 0.0 || (s0 - s1).abs() < PARALLEL_EPS {
                continue;
            }
            let t = s0 / (s0 - s1);
            let p = ca + (cb - ca) * t;
            if points.iter().all(|q| (q - p).norm() > MERGE_EPS) {
                points.push(p);
            }
        }
        if points.len() < 3 {
            continue;
        }

        let centroid = Point3::from(
            points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / points.len() as f32,
        );
        let angle = |p: &Point3<f32>| {
            let r = p - centroid;
            f32::atan2(r.dot(&bitangent), r.dot(&tangent))
        };
        points.sort_by(|p, q| angle(p).total_cmp(&angle(q)));
        polygons.push(points);
    }
    polygons
}

// two unit vectors spanning the plane perpendicular to `v`
fn plane_basis(v: &Vector3<f32>) -> (Vector3<f32>, Vector3<f32>) {
    let tangent = if v.x.abs() > 0.5 {
        vector![-v.z, 0.0, v.x]
    } else {
        vector![0.0, v.z, -v.y]
    };
    let tangent = tangent.normalize();
    let bitangent = v.cross(&tangent);
    (tangent, bitangent)
}

/// Opacity scale of one slice, keeps the total opacity independent of the slice count
pub fn alpha_per_slice(opacity_multiplier: f32, count: usize) -> f32 {
    opacity_multiplier / (count.max(1) as f32).sqrt()
}

pub struct ViewAlignedSlicing {
    volume: Arc<Volume>,
    lut: Arc<TransferLut>,
    options: RenderOptions,
    camera: OrbitCamera,
    texture: Option<VolumeTexture>,
}

impl ViewAlignedSlicing {
    pub fn new(
        device: &Device,
        volume: Arc<Volume>,
        lut: Arc<TransferLut>,
        options: RenderOptions,
    ) -> Result<Self, RenderError> {
        let texture = device.create_volume_texture(&volume, TechniqueKind::ViewAlignedSlicing)?;
        debug!(
            "View aligned slicing: {} volume texture",
            if texture.is_native() { "native" } else { "atlas" }
        );
        Ok(ViewAlignedSlicing {
            volume,
            lut,
            options,
            camera: OrbitCamera::default(),
            texture: Some(texture),
        })
    }

    pub fn texture(&self) -> Option<&VolumeTexture> {
        self.texture.as_ref()
    }

    /// Slice polygons of the current view
    pub fn polygons(&self) -> Vec<Vec<Point3<f32>>> {
        slice_polygons(
            self.volume.scale(),
            self.camera.view_direction(),
            self.options.effective_slice_count(),
        )
    }
}

impl RenderTechnique for ViewAlignedSlicing {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::ViewAlignedSlicing
    }

    fn update_transfer_function(&mut self, lut: Arc<TransferLut>) {
        self.lut = lut;
    }

    fn render(&mut self, frame: &mut FrameBuffer) {
        frame.clear(color::white());
        let texture = match &self.texture {
            Some(t) => t,
            None => return,
        };

        let (width, height) = (frame.width(), frame.height());
        // polygons are already scaled
        let mvp = self.camera.mvp(frame.aspect(), Vector3::repeat(1.0));
        let scale = self.volume.scale();
        let alpha_scale =
            alpha_per_slice(self.options.opacity_multiplier, self.options.effective_slice_count());
        let brightness = self.options.brightness;
        let lut = &self.lut;

        for polygon in self.polygons() {
            let verts: Vec<ClipVertex<3>> = polygon
                .iter()
                .map(|q| {
                    let tex = q.coords.component_div(&scale).add_scalar(0.5);
                    ClipVertex::new(to_clip(&mvp, q), tex.into())
                })
                .collect();

            rasterize_fan(&verts, width, height, CullMode::None, |frag| {
                let intensity = texture.sample(Point3::from(frag.attributes)).clamp(0.0, 1.0);
                let alpha = (lut.opacity_at(intensity) * alpha_scale).min(1.0);
                if alpha <= 0.0 {
                    return;
                }
                let rgb = (lut.color_at(intensity) * brightness).map(|c| c.min(1.0)) * alpha;
                frame.blend(
                    frag.x,
                    frag.y,
                    color::new(rgb.x, rgb.y, rgb.z, alpha),
                    BlendMode::PremultipliedOver,
                );
            });
        }
    }

    fn cleanup(&mut self) {
        if self.texture.take().is_some() {
            debug!("Released view aligned volume texture");
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
    use super::*;
    use crate::{
        render::Capabilities, test_helpers::gradient_volume, transfer_function::TransferFunction,
    };

    #[test]
    fn axis_view_gives_rectangles() {
        let scale = vector![1.0, 0.5, 0.8];
        let polys = slice_polygons(scale, vector![0.0, 0.0, 1.0], 64);
        assert!(!polys.is_empty());
        assert!(polys.len() < 64);

        let bbox = BoundBox::centered(scale);
        let mut last_z = f32::INFINITY;
        for poly in &polys {
            assert_eq!(poly.len(), 4);
            let z = poly[0].z;
            assert!(poly.iter().all(|p| (p.z - z).abs() < 1e-5));
            assert!(poly.iter().all(|p| bbox.contains(p, 1e-5)));
            // back to front
            assert!(z < last_z);
            last_z = z;
        }
    }

    #[test]
    fn oblique_polygons_lie_in_their_planes() {
        let dir = vector![0.3, -0.5, 0.8].normalize();
        let polys = slice_polygons(vector![1.0, 1.0, 1.0], dir, 32);
        let mut last_d = f32::INFINITY;
        for poly in &polys {
            assert!((3..=6).contains(&poly.len()));
            let d = dir.dot(&poly[0].coords);
            assert!(poly.iter().all(|p| (dir.dot(&p.coords) - d).abs() < 1e-4));
            assert!(d < last_d);
            last_d = d;

            // sorted around the centroid: consecutive edges turn the same way
            let n = poly.len();
            for i in 0..n {
                let e0 = poly[(i + 1) % n] - poly[i];
                let e1 = poly[(i + 2) % n] - poly[(i + 1) % n];
                assert!(e0.cross(&e1).dot(&dir) > -1e-6);
            }
        }
    }

    #[test]
    fn degenerate_direction() {
        assert!(slice_polygons(vector![1.0, 1.0, 1.0], Vector3::zeros(), 32).is_empty());
    }

    #[test]
    fn alpha_scale() {
        assert_eq!(alpha_per_slice(5.0, 100), 0.5);
        assert_eq!(alpha_per_slice(0.0, 128), 0.0);
    }

    #[test]
    fn renders_with_atlas_fallback() {
        let volume = Arc::new(gradient_volume(vector![8, 8, 8], vector![1.0, 1.0, 1.0]));
        let lut = TransferFunction::new().lut();

        let device = Device::new(Capabilities::without_3d());
        let mut vas =
            ViewAlignedSlicing::new(&device, volume, lut, RenderOptions::default()).unwrap();
        assert!(!vas.texture().map_or(true, VolumeTexture::is_native));

        let mut frame = FrameBuffer::new(48, 48);
        vas.render(&mut frame);
        assert_eq!(frame.get(0, 0), color::white());
        assert_ne!(frame.get(24, 24), color::white());

        vas.cleanup();
        assert_eq!(device.stats().live(), 0);
    }
}
