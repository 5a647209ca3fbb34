//! Proxy geometry of the techniques

use nalgebra::{point, Matrix4, Point3, Vector4};

use crate::common::BoundBox;

// corner quads of the six faces, as indexed by `BoundBox::corners`
const FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [3, 2, 6, 7],
    [0, 3, 7, 4],
    [1, 2, 6, 5],
];

/// Twelve triangles of the box surface
///
/// Triangles are wound so that faces turned towards the camera are
/// counter-clockwise on screen.
pub fn cube_triangles(bbox: &BoundBox) -> Vec<[Point3<f32>; 3]> {
    let corners = bbox.corners();
    let center = bbox.center();

    let mut triangles = Vec::with_capacity(12);
    for face in FACES {
        let mut quad = face.map(|i| corners[i]);
        let face_center = Point3::from(
            (quad[0].coords + quad[1].coords + quad[2].coords + quad[3].coords) * 0.25,
        );
        let outward = face_center - center;
        let normal = (quad[1] - quad[0]).cross(&(quad[2] - quad[0]));
        if normal.dot(&outward) > 0.0 {
            quad.reverse();
        }
        triangles.push([quad[0], quad[1], quad[2]]);
        triangles.push([quad[0], quad[2], quad[3]]);
    }
    triangles
}

/// Unit quad in the xy plane at height `z`, with texture coordinates
pub fn slice_quad(z: f32) -> [(Point3<f32>, [f32; 2]); 4] {
    [
        (point![-0.5, -0.5, z], [0.0, 0.0]),
        (point![0.5, -0.5, z], [1.0, 0.0]),
        (point![0.5, 0.5, z], [1.0, 1.0]),
        (point![-0.5, 0.5, z], [0.0, 1.0]),
    ]
}

pub fn to_clip(mvp: &Matrix4<f32>, p: &Point3<f32>) -> Vector4<f32> {
    mvp * p.to_homogeneous()
}

#[cfg(test)]
mod test {
    use nalgebra::vector;

    use super::*;

    #[test]
    fn cube_faces_point_outwards() {
        let bbox = BoundBox::centered(vector![1.0, 0.5, 2.0]);
        let tris = cube_triangles(&bbox);
        assert_eq!(tris.len(), 12);
        for [a, b, c] in tris {
            let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
            let outward = centroid - bbox.center();
            // counter-clockwise as seen from outside in a left-handed frame
            assert!((b - a).cross(&(c - a)).dot(&outward) < 0.0);
        }
    }

    #[test]
    fn quad_spans_unit_square() {
        let quad = slice_quad(0.25);
        assert!(quad.iter().all(|(p, _)| p.z == 0.25));
        assert_eq!(quad[2].0, point![0.5, 0.5, 0.25]);
        assert_eq!(quad[2].1, [1.0, 1.0]);
    }
}
