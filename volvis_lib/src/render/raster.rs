//! Triangle and line rasterization
//!
//! Vertices arrive in clip space. After the perspective divide, NDC y points up and screen
//! rows grow downwards. Pixels are sampled at their centers, shared edges are owned by
//! exactly one triangle (top-left rule) and attributes are interpolated perspective-correct.
//! Triangles and lines are clipped against the near plane `z = -w` before the divide.

use nalgebra::{point, Point2, Vector4};

use crate::common::ViewportBox;

/// Vertices closer to the eye plane than this are dropped with their primitive
const MIN_W: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    /// Drop triangles facing the camera
    Front,
    /// Drop triangles facing away from the camera
    Back,
}

/// Vertex after the vertex stage
#[derive(Debug, Clone, Copy)]
pub struct ClipVertex<const N: usize> {
    pub position: Vector4<f32>,
    pub attributes: [f32; N],
}

impl<const N: usize> ClipVertex<N> {
    pub fn new(position: Vector4<f32>, attributes: [f32; N]) -> Self {
        ClipVertex {
            position,
            attributes,
        }
    }

    /// Signed distance to the near plane, negative on the camera side
    fn near_distance(&self) -> f32 {
        self.position.z + self.position.w
    }

    fn lerp(&self, other: &Self, t: f32) -> Self {
        let mut attributes = self.attributes;
        for (a, b) in attributes.iter_mut().zip(other.attributes) {
            *a += (b - *a) * t;
        }
        ClipVertex {
            position: self.position.lerp(&other.position, t),
            attributes,
        }
    }

    // point where the edge to `other` crosses the near plane
    fn near_crossing(&self, other: &Self) -> Self {
        let (da, db) = (self.near_distance(), other.near_distance());
        self.lerp(other, da / (da - db))
    }
}

/// Part of the triangle on the visible side of the near plane, at most four vertices
fn clip_near<const N: usize>(triangle: &[ClipVertex<N>; 3]) -> Vec<ClipVertex<N>> {
    let mut polygon = Vec::with_capacity(4);
    for (i, current) in triangle.iter().enumerate() {
        let next = &triangle[(i + 1) % 3];
        let (inside, next_inside) = (current.near_distance() >= 0.0, next.near_distance() >= 0.0);
        if inside {
            polygon.push(*current);
        }
        if inside != next_inside {
            polygon.push(current.near_crossing(next));
        }
    }
    polygon
}

/// Covered pixel with interpolated values
#[derive(Debug, Clone, Copy)]
pub struct Fragment<const N: usize> {
    pub x: usize,
    pub y: usize,
    /// Window depth in [0,1], 0 at the near plane
    pub depth: f32,
    pub attributes: [f32; N],
}

#[derive(Debug, Clone, Copy)]
struct ScreenVertex<const N: usize> {
    pos: Point2<f32>,
    depth: f32,
    inv_w: f32,
    // attributes divided by w
    attributes: [f32; N],
}

fn to_screen<const N: usize>(
    v: &ClipVertex<N>,
    width: usize,
    height: usize,
) -> Option<ScreenVertex<N>> {
    let w = v.position.w;
    if w <= MIN_W {
        return None;
    }
    let inv_w = 1.0 / w;
    let ndc = v.position.xyz() * inv_w;
    Some(ScreenVertex {
        pos: point![
            (ndc.x + 1.0) * 0.5 * width as f32,
            (1.0 - ndc.y) * 0.5 * height as f32
        ],
        depth: (ndc.z + 1.0) * 0.5,
        inv_w,
        attributes: v.attributes.map(|a| a * inv_w),
    })
}

// twice the signed area of (a, b, p), positive when p lies right of a->b on screen
fn edge(a: &Point2<f32>, b: &Point2<f32>, p: &Point2<f32>) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

// with positive orientation the interior is below top edges and right of left edges
fn is_top_left(a: &Point2<f32>, b: &Point2<f32>) -> bool {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dy == 0.0 && dx > 0.0) || dy < 0.0
}

fn covers(w: f32, top_left: bool) -> bool {
    w > 0.0 || (w == 0.0 && top_left)
}

/// Rasterize one triangle, `emit` is called for every covered pixel
///
/// Counter-clockwise triangles in NDC face the camera. A triangle crossing the near
/// plane is cut there and the visible part is drawn, clipping keeps the winding.
pub fn rasterize_triangle<const N: usize>(
    triangle: &[ClipVertex<N>; 3],
    width: usize,
    height: usize,
    cull: CullMode,
    mut emit: impl FnMut(Fragment<N>),
) {
    let visible = triangle.iter().filter(|v| v.near_distance() >= 0.0).count();
    match visible {
        0 => (),
        3 => rasterize_visible(triangle, width, height, cull, &mut emit),
        _ => {
            let polygon = clip_near(triangle);
            for i in 1..polygon.len().saturating_sub(1) {
                let tri = [polygon[0], polygon[i], polygon[i + 1]];
                rasterize_visible(&tri, width, height, cull, &mut emit);
            }
        }
    }
}

fn rasterize_visible<const N: usize>(
    triangle: &[ClipVertex<N>; 3],
    width: usize,
    height: usize,
    cull: CullMode,
    mut emit: impl FnMut(Fragment<N>),
) {
    let mut verts = [None; 3];
    for (slot, v) in verts.iter_mut().zip(triangle) {
        *slot = to_screen(v, width, height);
    }
    let [Some(a), Some(mut b), Some(mut c)] = verts else {
        return;
    };

    let area = edge(&a.pos, &b.pos, &c.pos);
    if area == 0.0 || area.is_nan() {
        return;
    }

    // screen rows grow downwards, so counter-clockwise in NDC has negative screen area
    let front_facing = area < 0.0;
    match cull {
        CullMode::Front if front_facing => return,
        CullMode::Back if !front_facing => return,
        _ => (),
    }

    let mut area = area;
    if area < 0.0 {
        std::mem::swap(&mut b, &mut c);
        area = -area;
    }

    let vbox = ViewportBox::from_points([&a.pos, &b.pos, &c.pos]);
    let (xs, ys) = match vbox.pixel_range(width, height) {
        Some(r) => r,
        None => return,
    };

    let tl_bc = is_top_left(&b.pos, &c.pos);
    let tl_ca = is_top_left(&c.pos, &a.pos);
    let tl_ab = is_top_left(&a.pos, &b.pos);

    for y in ys {
        for x in xs.clone() {
            let p = point![x as f32 + 0.5, y as f32 + 0.5];
            let w0 = edge(&b.pos, &c.pos, &p);
            let w1 = edge(&c.pos, &a.pos, &p);
            let w2 = edge(&a.pos, &b.pos, &p);
            if !(covers(w0, tl_bc) && covers(w1, tl_ca) && covers(w2, tl_ab)) {
                continue;
            }

            let l0 = w0 / area;
            let l1 = w1 / area;
            let l2 = w2 / area;

            let inv_w = l0 * a.inv_w + l1 * b.inv_w + l2 * c.inv_w;
            let mut attributes = [0.0; N];
            for (i, attr) in attributes.iter_mut().enumerate() {
                *attr =
                    (l0 * a.attributes[i] + l1 * b.attributes[i] + l2 * c.attributes[i]) / inv_w;
            }

            emit(Fragment {
                x,
                y,
                depth: l0 * a.depth + l1 * b.depth + l2 * c.depth,
                attributes,
            });
        }
    }
}

/// Rasterize a convex polygon as a fan around its first vertex
pub fn rasterize_fan<const N: usize>(
    polygon: &[ClipVertex<N>],
    width: usize,
    height: usize,
    cull: CullMode,
    mut emit: impl FnMut(Fragment<N>),
) {
    if polygon.len() < 3 {
        return;
    }
    for i in 1..polygon.len() - 1 {
        let tri = [polygon[0], polygon[i], polygon[i + 1]];
        rasterize_triangle(&tri, width, height, cull, &mut emit);
    }
}

/// Rasterize a one pixel wide line, attributes interpolated perspective-correct
pub fn rasterize_line<const N: usize>(
    line: &[ClipVertex<N>; 2],
    width: usize,
    height: usize,
    mut emit: impl FnMut(Fragment<N>),
) {
    let [mut start, mut end] = *line;
    match (start.near_distance() >= 0.0, end.near_distance() >= 0.0) {
        (true, true) => (),
        (false, false) => return,
        (true, false) => end = start.near_crossing(&end),
        (false, true) => start = start.near_crossing(&end),
    }
    let (Some(a), Some(b)) = (
        to_screen(&start, width, height),
        to_screen(&end, width, height),
    ) else {
        return;
    };

    let d = b.pos - a.pos;
    let steps = f32::max(d.x.abs(), d.y.abs()).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let p = a.pos + d * t;
        if p.x < 0.0 || p.y < 0.0 {
            continue;
        }
        let (x, y) = (p.x as usize, p.y as usize);
        if x >= width || y >= height {
            continue;
        }
        let inv_w = a.inv_w + (b.inv_w - a.inv_w) * t;
        let mut attributes = [0.0; N];
        for (k, attr) in attributes.iter_mut().enumerate() {
            *attr = (a.attributes[k] + (b.attributes[k] - a.attributes[k]) * t) / inv_w;
        }
        emit(Fragment {
            x,
            y,
            depth: a.depth + (b.depth - a.depth) * t,
            attributes,
        });
    }
}

/// Square point sprite of `size` pixels centered on the vertex
pub fn rasterize_point<const N: usize>(
    vertex: &ClipVertex<N>,
    size: usize,
    width: usize,
    height: usize,
    mut emit: impl FnMut(Fragment<N>),
) {
    let Some(v) = to_screen(vertex, width, height) else {
        return;
    };
    let half = size as f32 * 0.5;
    let mut vbox = ViewportBox::new();
    vbox.add_point(v.pos.x - half + 0.5, v.pos.y - half + 0.5);
    vbox.add_point(v.pos.x + half - 0.5, v.pos.y + half - 0.5);
    let Some((xs, ys)) = vbox.pixel_range(width, height) else {
        return;
    };
    let attributes = vertex.attributes;
    for y in ys {
        for x in xs.clone() {
            let (cx, cy) = (x as f32 + 0.5, y as f32 + 0.5);
            if (cx - v.pos.x).abs() <= half && (cy - v.pos.y).abs() <= half {
                emit(Fragment {
                    x,
                    y,
                    depth: v.depth,
                    attributes,
                });
            }
        }
    }
}
