//! Renderable landscape geometry
//!
//! Everything lives in one frame: x and z in [-1, 1] span the node bounding box,
//! y is the height normalized by the height field range.

use log::{debug, warn};
use nalgebra::{point, Point2, Point3, Vector3};

use crate::color::{self, RGB};

use super::{
    contour::{triangulate, FillKind},
    HeightField, LandscapeData,
};

/// Contour fills float this far above their level
pub const CONTOUR_OFFSET: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceVertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub color: RGB,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    pub position: Point3<f32>,
    pub color: RGB,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Function value of the level
    pub level: f64,
    /// Height the contour is drawn at, offset included
    pub height: f32,
    pub color: RGB,
    pub outline: Vec<Point3<f32>>,
    pub fill: Vec<[Point3<f32>; 3]>,
    pub fill_kind: FillKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandscapeGeometry {
    pub surface: Vec<SurfaceVertex>,
    pub triangles: Vec<[usize; 3]>,
    pub nodes: Vec<NodePoint>,
    /// Pairs of indices into `nodes`
    pub links: Vec<[usize; 2]>,
    pub contours: Vec<Contour>,
}

impl LandscapeGeometry {
    pub fn is_empty(&self) -> bool {
        self.surface.is_empty() && self.nodes.is_empty()
    }
}

/// Base color of a node at normalized height `height`
pub fn node_color(height: f32) -> RGB {
    color::heat_map(height.clamp(0.0, 1.0))
}

fn surface_mesh(field: &HeightField, geometry: &mut LandscapeGeometry) {
    let res = field.resolution();
    geometry.surface.reserve(res * res);
    for j in 0..res {
        for i in 0..res {
            let v = field.vertex(i, j);
            geometry.surface.push(SurfaceVertex {
                position: Point3::from(v),
                normal: field.normal(i, j),
                color: color::heat_map(v.y),
            });
        }
    }

    geometry.triangles.reserve(2 * (res - 1) * (res - 1));
    for j in 0..res - 1 {
        for i in 0..res - 1 {
            let v00 = j * res + i;
            let v10 = v00 + 1;
            let v01 = v00 + res;
            let v11 = v01 + 1;
            geometry.triangles.push([v00, v10, v11]);
            geometry.triangles.push([v00, v11, v01]);
        }
    }
}

fn contours(data: &LandscapeData, field: &HeightField) -> Vec<Contour> {
    let mut contours = Vec::new();
    for level in &data.contours {
        let level_height = field.normalize_value(level.value);
        let height = level_height + CONTOUR_OFFSET;
        let color = color::heat_map(level_height.clamp(0.0, 1.0));

        for polyline in &level.polylines {
            let framed: Vec<[f32; 2]> = polyline.iter().map(|p| field.to_frame(*p)).collect();
            let triangulation = match triangulate(&framed) {
                Some(t) => t,
                None => {
                    debug!("Skipping degenerate contour polyline at level {}", level.value);
                    continue;
                }
            };
            if triangulation.kind == FillKind::Rejected {
                warn!(
                    "Contour polyline at level {} intersects itself, drawing outline only",
                    level.value
                );
            }

            let lift = |p: &Point2<f32>| point![p.x, height, p.y];
            let outline = triangulation.vertices.iter().map(lift).collect();
            let fill = triangulation
                .triangles
                .iter()
                .map(|tri| tri.map(|k| lift(&triangulation.vertices[k])))
                .collect();

            contours.push(Contour {
                level: level.value,
                height,
                color,
                outline,
                fill,
                fill_kind: triangulation.kind,
            });
        }
    }
    contours
}

/// Surface mesh, node points, link lines and contour decorations of `data`
pub fn build_geometry(data: &LandscapeData, field: &HeightField) -> LandscapeGeometry {
    let mut geometry = LandscapeGeometry::default();
    surface_mesh(field, &mut geometry);

    geometry.nodes = data
        .nodes
        .iter()
        .map(|node| {
            let [x, z] = field.to_frame(node.position);
            let y = field.normalize_value(node.value);
            NodePoint {
                position: point![x, y, z],
                color: node_color(y),
            }
        })
        .collect();

    let node_count = data.nodes.len();
    for &(a, b) in &data.links {
        if a >= node_count || b >= node_count {
            warn!("Link {a}-{b} references a missing node, {node_count} nodes present");
            continue;
        }
        geometry.links.push([a, b]);
    }

    geometry.contours = contours(data, field);

    debug!(
        "Landscape geometry: {} surface triangles, {} nodes, {} links, {} contours",
        geometry.triangles.len(),
        geometry.nodes.len(),
        geometry.links.len(),
        geometry.contours.len()
    );
    geometry
}
