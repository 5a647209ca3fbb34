use nalgebra::{point, Point3, Vector3};

/// Corner index pairs of the 12 box edges, corners numbered as yielded by [`BoundBoxIterator`]
pub const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundBox {
    pub lower: Point3<f32>,
    pub upper: Point3<f32>,
}

impl BoundBox {
    pub fn new(lower: Point3<f32>, upper: Point3<f32>) -> BoundBox {
        BoundBox { lower, upper }
    }

    /// Box of size `dims` centered at the origin
    pub fn centered(dims: Vector3<f32>) -> BoundBox {
        let half = dims * 0.5;
        BoundBox {
            lower: Point3::from(-half),
            upper: Point3::from(half),
        }
    }

    /// Unit cube `[-0.5, 0.5]^3`
    pub fn unit() -> BoundBox {
        BoundBox::centered(Vector3::repeat(1.0))
    }

    pub fn dims(&self) -> Vector3<f32> {
        self.upper - self.lower
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.lower, &self.upper)
    }

    pub fn corners(&self) -> [Point3<f32>; 8] {
        let mut corners = [Point3::origin(); 8];
        for (slot, corner) in corners.iter_mut().zip(*self) {
            *slot = corner;
        }
        corners
    }

    /// Inclusive containment test with tolerance `eps` on every side
    pub fn contains(&self, pos: &Point3<f32>, eps: f32) -> bool {
        (0..3).all(|i| pos[i] >= self.lower[i] - eps && pos[i] <= self.upper[i] + eps)
    }
}

pub struct BoundBoxIterator {
    pub lower: Point3<f32>,
    pub upper: Point3<f32>,
    state: u8,
}

impl Iterator for BoundBoxIterator {
    type Item = Point3<f32>;

    fn next(&mut self) -> Option<Self::Item> {
        let p = match self.state {
            0 => self.lower,
            1 => point![self.upper.x, self.lower.y, self.lower.z],
            2 => point![self.upper.x, self.upper.y, self.lower.z],
            3 => point![self.lower.x, self.upper.y, self.lower.z],
            4 => point![self.lower.x, self.lower.y, self.upper.z],
            5 => point![self.upper.x, self.lower.y, self.upper.z],
            6 => self.upper,
            7 => point![self.lower.x, self.upper.y, self.upper.z],
            _ => return None,
        };
        self.state += 1;
        Some(p)
    }
}

impl IntoIterator for BoundBox {
    type Item = Point3<f32>;

    type IntoIter = BoundBoxIterator;

    fn into_iter(self) -> Self::IntoIter {
        BoundBoxIterator {
            lower: self.lower,
            upper: self.upper,
            state: 0,
        }
    }
}

#[cfg(test)]
mod test {
    use nalgebra::vector;

    use super::*;

    #[test]
    fn edges_connect_neighbours() {
        let corners = BoundBox::unit().corners();
        for (a, b) in BOX_EDGES {
            // every edge runs along exactly one axis
            let d = corners[b] - corners[a];
            let axes = d.iter().filter(|c| c.abs() > 0.0).count();
            assert_eq!(axes, 1);
            assert_eq!(d.norm(), 1.0);
        }
    }

    #[test]
    fn centered_box() {
        let bbox = BoundBox::centered(vector![1.0, 0.5, 0.25]);
        assert_eq!(bbox.lower, point![-0.5, -0.25, -0.125]);
        assert_eq!(bbox.center(), point![0.0, 0.0, 0.0]);
        assert!(bbox.contains(&point![0.5, 0.25, 0.0], 0.0));
        assert!(!bbox.contains(&point![0.0, 0.3, 0.0], 1e-3));
    }
}
