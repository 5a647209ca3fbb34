//! Software rendering of the landscape geometry
//!
//! Draw order: lit surface, contour fills, contour outlines, links, nodes.
//! Decorations are depth tested against the surface with a small bias so that
//! lines lying on it are not swallowed.

use log::trace;
use nalgebra::{vector, Matrix4, Vector3};

use crate::{
    camera::{OrbitCamera, RotationOrder},
    color::{self, RGB},
    render::{
        geometry::to_clip,
        raster::{rasterize_line, rasterize_point, rasterize_triangle, ClipVertex, CullMode},
        BlendMode, FrameBuffer,
    },
};

use super::{LandscapeGeometry, LandscapeSurfaceBuilder};

pub const AMBIENT: f32 = 0.35;
pub const NODE_SIZE: usize = 5;
pub const CONTOUR_FILL_ALPHA: f32 = 0.45;
pub const DEPTH_BIAS: f32 = 1e-4;

fn light_direction() -> Vector3<f32> {
    vector![0.4, 1.0, 0.3].normalize()
}

fn link_color() -> RGB {
    color::rgb(0.25, 0.25, 0.25)
}

/// Lambert shading with an ambient floor
pub fn shade(base: RGB, normal: &Vector3<f32>) -> RGB {
    let n = normal.normalize();
    let diffuse = n.dot(&light_direction()).max(0.0);
    base * (AMBIENT + (1.0 - AMBIENT) * diffuse)
}

fn passes_biased(frame: &mut FrameBuffer, x: usize, y: usize, depth: f32) -> bool {
    frame.depth_test(x, y, depth - DEPTH_BIAS)
}

pub struct LandscapeRenderer {
    camera: OrbitCamera,
}

impl Default for LandscapeRenderer {
    fn default() -> Self {
        LandscapeRenderer::new()
    }
}

impl LandscapeRenderer {
    pub fn new() -> LandscapeRenderer {
        LandscapeRenderer {
            camera: OrbitCamera::new(30.0, 0.0, 2.5)
                .with_zoom_limits(0.1, 10.0)
                .with_rotation_order(RotationOrder::YFirst),
        }
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    // the surface occupies y in [0, 1], centre it on the orbit point
    fn mvp(&self, aspect: f32) -> Matrix4<f32> {
        let center = Matrix4::new_translation(&vector![0.0, -0.5, 0.0]);
        self.camera.mvp(aspect, vector![1.0, 1.0, 1.0]) * center
    }

    /// Draw the current landscape, white background when there is nothing to show
    pub fn render(&self, builder: &LandscapeSurfaceBuilder, frame: &mut FrameBuffer) {
        frame.clear(color::white());
        let geometry = match builder.geometry() {
            Some(g) if !g.is_empty() => g,
            _ => return,
        };

        let mvp = self.mvp(frame.aspect());
        if builder.surface_visible() {
            draw_surface(geometry, &mvp, frame);
            draw_contours(geometry, &mvp, frame);
        }
        draw_graph(geometry, &mvp, frame);
    }
}

fn draw_surface(geometry: &LandscapeGeometry, mvp: &Matrix4<f32>, frame: &mut FrameBuffer) {
    let (width, height) = (frame.width(), frame.height());
    let vertices: Vec<ClipVertex<6>> = geometry
        .surface
        .iter()
        .map(|v| {
            ClipVertex::new(
                to_clip(mvp, &v.position),
                [v.color.x, v.color.y, v.color.z, v.normal.x, v.normal.y, v.normal.z],
            )
        })
        .collect();

    for tri in &geometry.triangles {
        let tri = tri.map(|i| vertices[i]);
        rasterize_triangle(&tri, width, height, CullMode::None, |frag| {
            if !frame.depth_test(frag.x, frag.y, frag.depth) {
                return;
            }
            let [r, g, b, nx, ny, nz] = frag.attributes;
            let lit = shade(color::rgb(r, g, b), &vector![nx, ny, nz]);
            frame.blend(frag.x, frag.y, color::opaque(lit), BlendMode::Replace);
        });
    }
    trace!("Drew {} surface triangles", geometry.triangles.len());
}

fn draw_contours(geometry: &LandscapeGeometry, mvp: &Matrix4<f32>, frame: &mut FrameBuffer) {
    let (width, height) = (frame.width(), frame.height());

    for contour in &geometry.contours {
        let fill_color = color::new(
            contour.color.x,
            contour.color.y,
            contour.color.z,
            CONTOUR_FILL_ALPHA,
        );
        for tri in &contour.fill {
            let tri = tri.map(|p| ClipVertex::new(to_clip(mvp, &p), []));
            rasterize_triangle(&tri, width, height, CullMode::None, |frag| {
                // fills do not occlude each other
                if frag.depth - DEPTH_BIAS < frame.depth(frag.x, frag.y) {
                    frame.blend(frag.x, frag.y, fill_color, BlendMode::AlphaOver);
                }
            });
        }

        let outline_color = color::opaque(contour.color * 0.6);
        let n = contour.outline.len();
        for i in 0..n {
            let a = contour.outline[i];
            let b = contour.outline[(i + 1) % n];
            let line = [
                ClipVertex::new(to_clip(mvp, &a), []),
                ClipVertex::new(to_clip(mvp, &b), []),
            ];
            rasterize_line(&line, width, height, |frag| {
                if passes_biased(frame, frag.x, frag.y, frag.depth) {
                    frame.blend(frag.x, frag.y, outline_color, BlendMode::Replace);
                }
            });
        }
    }
}

fn draw_graph(geometry: &LandscapeGeometry, mvp: &Matrix4<f32>, frame: &mut FrameBuffer) {
    let (width, height) = (frame.width(), frame.height());
    let clip: Vec<ClipVertex<0>> = geometry
        .nodes
        .iter()
        .map(|n| ClipVertex::new(to_clip(mvp, &n.position), []))
        .collect();

    let line_color = color::opaque(link_color());
    for &[a, b] in &geometry.links {
        rasterize_line(&[clip[a], clip[b]], width, height, |frag| {
            if passes_biased(frame, frag.x, frag.y, frag.depth) {
                frame.blend(frag.x, frag.y, line_color, BlendMode::Replace);
            }
        });
    }

    for (node, vertex) in geometry.nodes.iter().zip(&clip) {
        let node_color = color::opaque(node.color);
        rasterize_point(vertex, NODE_SIZE, width, height, |frag| {
            if passes_biased(frame, frag.x, frag.y, frag.depth) {
                frame.blend(frag.x, frag.y, node_color, BlendMode::Replace);
            }
        });
    }
}
