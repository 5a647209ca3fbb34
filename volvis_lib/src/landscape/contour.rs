//! Contour polygon triangulation
//!
//! A fan from the first vertex is used whenever it covers the polygon exactly, that is
//! when the polygon is star shaped around that vertex. Other simple polygons are ear
//! clipped. Self intersecting polylines have no well defined interior and get no fill.

use nalgebra::{point, Point2};

const AREA_EPS: f32 = 1e-12;

/// How a contour polygon was filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillKind {
    Fan,
    EarClipped,
    /// Self intersecting, outline only
    Rejected,
}

/// Triangles indexing into the cleaned polygon
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    pub vertices: Vec<Point2<f32>>,
    pub triangles: Vec<[usize; 3]>,
    pub kind: FillKind,
}

/// Drop the repeated closing vertex and consecutive duplicates
///
/// `None` when fewer than three distinct vertices remain.
pub fn clean_polyline(points: &[[f32; 2]]) -> Option<Vec<Point2<f32>>> {
    let mut cleaned: Vec<Point2<f32>> = Vec::with_capacity(points.len());
    for p in points {
        let p = point![p[0], p[1]];
        if !p.x.is_finite() || !p.y.is_finite() {
            return None;
        }
        if cleaned.last() != Some(&p) {
            cleaned.push(p);
        }
    }
    while cleaned.len() > 1 && cleaned.first() == cleaned.last() {
        cleaned.pop();
    }
    if cleaned.len() < 3 {
        None
    } else {
        Some(cleaned)
    }
}

// twice the signed area of triangle abc, positive when counter-clockwise
fn orient(a: &Point2<f32>, b: &Point2<f32>, c: &Point2<f32>) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Twice the signed polygon area
pub fn signed_area(poly: &[Point2<f32>]) -> f32 {
    let n = poly.len();
    (0..n)
        .map(|i| {
            let (a, b) = (poly[i], poly[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum()
}

fn on_segment(a: &Point2<f32>, b: &Point2<f32>, p: &Point2<f32>) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Segments `ab` and `cd` share at least one point
fn segments_intersect(a: &Point2<f32>, b: &Point2<f32>, c: &Point2<f32>, d: &Point2<f32>) -> bool {
    let d1 = orient(c, d, a);
    let d2 = orient(c, d, b);
    let d3 = orient(a, b, c);
    let d4 = orient(a, b, d);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(c, d, a))
        || (d2 == 0.0 && on_segment(c, d, b))
        || (d3 == 0.0 && on_segment(a, b, c))
        || (d4 == 0.0 && on_segment(a, b, d))
}

/// Any two non adjacent edges touch, or adjacent edges fold back onto each other
pub fn is_self_intersecting(poly: &[Point2<f32>]) -> bool {
    let n = poly.len();
    for i in 0..n {
        let (a, b) = (poly[i], poly[(i + 1) % n]);
        for j in i + 1..n {
            let (c, d) = (poly[j], poly[(j + 1) % n]);
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if adjacent {
                // shared vertex is expected, overlapping is not
                let shared = if j == i + 1 { b } else { a };
                let (p, q) = if j == i + 1 { (a, d) } else { (b, c) };
                if orient(&p, &shared, &q) == 0.0 && (p - shared).dot(&(q - shared)) > 0.0 {
                    return true;
                }
                continue;
            }
            if segments_intersect(&a, &b, &c, &d) {
                return true;
            }
        }
    }
    false
}

/// Every fan triangle around vertex 0 turns the same way as the polygon
pub fn is_fan_safe(poly: &[Point2<f32>]) -> bool {
    let area = signed_area(poly);
    if area.abs() <= AREA_EPS {
        return false;
    }
    let sign = area.signum();
    (1..poly.len() - 1).all(|i| orient(&poly[0], &poly[i], &poly[i + 1]) * sign >= 0.0)
}

fn point_in_triangle(p: &Point2<f32>, a: &Point2<f32>, b: &Point2<f32>, c: &Point2<f32>) -> bool {
    orient(a, b, p) >= 0.0 && orient(b, c, p) >= 0.0 && orient(c, a, p) >= 0.0
}

/// Ear clipping of a simple polygon
pub fn ear_clip(poly: &[Point2<f32>]) -> Vec<[usize; 3]> {
    let mut remaining: Vec<usize> = (0..poly.len()).collect();
    if signed_area(poly) < 0.0 {
        remaining.reverse();
    }

    let mut triangles = Vec::with_capacity(poly.len().saturating_sub(2));
    while remaining.len() > 3 {
        let m = remaining.len();
        let mut clipped = false;

        for k in 0..m {
            let (ia, ib, ic) = (remaining[(k + m - 1) % m], remaining[k], remaining[(k + 1) % m]);
            let (a, b, c) = (&poly[ia], &poly[ib], &poly[ic]);
            if orient(a, b, c) <= 0.0 {
                continue;
            }
            let blocked = remaining
                .iter()
                .filter(|&&v| v != ia && v != ib && v != ic)
                .any(|&v| point_in_triangle(&poly[v], a, b, c));
            if blocked {
                continue;
            }
            triangles.push([ia, ib, ic]);
            remaining.remove(k);
            clipped = true;
            break;
        }

        if !clipped {
            // only collinear or numerically degenerate corners left
            let collinear = (0..m).find(|&k| {
                let (ia, ib, ic) = (remaining[(k + m - 1) % m], remaining[k], remaining[(k + 1) % m]);
                orient(&poly[ia], &poly[ib], &poly[ic]) == 0.0
            });
            match collinear {
                Some(k) => {
                    remaining.remove(k);
                }
                None => break,
            }
        }
    }

    if remaining.len() == 3 {
        let [a, b, c] = [remaining[0], remaining[1], remaining[2]];
        if orient(&poly[a], &poly[b], &poly[c]) > 0.0 {
            triangles.push([a, b, c]);
        }
    }
    triangles
}

/// Triangulate one contour polyline, `None` if it is degenerate
pub fn triangulate(points: &[[f32; 2]]) -> Option<Triangulation> {
    let vertices = clean_polyline(points)?;

    let (triangles, kind) = if is_self_intersecting(&vertices) {
        (Vec::new(), FillKind::Rejected)
    } else if is_fan_safe(&vertices) {
        let fan = (1..vertices.len() - 1).map(|i| [0, i, i + 1]).collect();
        (fan, FillKind::Fan)
    } else {
        (ear_clip(&vertices), FillKind::EarClipped)
    };

    Some(Triangulation {
        vertices,
        triangles,
        kind,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn area_of(t: &Triangulation) -> f32 {
        t.triangles
            .iter()
            .map(|&[a, b, c]| orient(&t.vertices[a], &t.vertices[b], &t.vertices[c]).abs())
            .sum()
    }

    #[test]
    fn cleaning() {
        let closed = [[0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]];
        assert_eq!(clean_polyline(&closed).unwrap().len(), 3);

        assert!(clean_polyline(&[[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]).is_none());
        assert!(clean_polyline(&[[0.0, 0.0], [f32::NAN, 1.0], [1.0, 0.0]]).is_none());
    }

    #[test]
    fn convex_polygon_is_fanned() {
        let square = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let t = triangulate(&square).unwrap();
        assert_eq!(t.kind, FillKind::Fan);
        assert_eq!(t.triangles, vec![[0, 1, 2], [0, 2, 3]]);
        assert!((area_of(&t) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn concave_polygon_is_ear_clipped() {
        // U shape seen from vertex 0 in a notch corner cannot be fanned
        let u = [
            [1.0, 1.0],
            [1.0, 3.0],
            [0.0, 3.0],
            [0.0, 0.0],
            [3.0, 0.0],
            [3.0, 3.0],
            [2.0, 3.0],
            [2.0, 1.0],
        ];
        let verts = clean_polyline(&u).unwrap();
        assert!(!is_fan_safe(&verts));

        let t = triangulate(&u).unwrap();
        assert_eq!(t.kind, FillKind::EarClipped);
        assert_eq!(t.triangles.len(), 6);
        // twice the area of the U: 9 - 2
        assert!((area_of(&t) - 14.0).abs() < 1e-4);
    }

    #[test]
    fn clockwise_star_shape_is_fanned() {
        let arrow = [[0.0, 0.0], [-1.0, 2.0], [0.0, 1.0], [1.0, 2.0]];
        let t = triangulate(&arrow).unwrap();
        assert_eq!(t.kind, FillKind::Fan);
    }

    #[test]
    fn bow_tie_is_rejected() {
        let bow_tie = [[0.0, 0.0], [1.0, 1.0], [1.0, 0.0], [0.0, 1.0]];
        let t = triangulate(&bow_tie).unwrap();
        assert_eq!(t.kind, FillKind::Rejected);
        assert!(t.triangles.is_empty());
        assert_eq!(t.vertices.len(), 4);
    }

    #[test]
    fn folded_edge_is_rejected() {
        let folded = [[0.0, 0.0], [2.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        assert!(is_self_intersecting(&clean_polyline(&folded).unwrap()));
    }
}
