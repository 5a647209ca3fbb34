use std::ops::Range;

use nalgebra::{point, Point2, Vector2};

// a 2D range in pixel space, rectangle described by two points
#[derive(Debug, Clone, Copy)]
pub struct ViewportBox {
    pub lower: Point2<f32>,
    pub upper: Point2<f32>,
}

impl ViewportBox {
    // Empty box, flipped so that any point extends it
    pub fn new() -> Self {
        Self {
            lower: point![f32::INFINITY, f32::INFINITY],
            upper: point![f32::NEG_INFINITY, f32::NEG_INFINITY],
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2<f32>>) -> Self {
        let mut vbox = ViewportBox::new();
        for p in points {
            vbox.add_point(p.x, p.y);
        }
        vbox
    }

    pub fn add_point(&mut self, x: f32, y: f32) {
        self.upper.x = f32::max(self.upper.x, x);
        self.upper.y = f32::max(self.upper.y, y);
        self.lower.x = f32::min(self.lower.x, x);
        self.lower.y = f32::min(self.lower.y, y);
    }

    pub fn size(&self) -> Vector2<f32> {
        self.upper - self.lower
    }

    /// Pixels whose centers may lie inside the box, clipped to the target.
    /// `None` if the box misses the target entirely.
    pub fn pixel_range(&self, width: usize, height: usize) -> Option<(Range<usize>, Range<usize>)> {
        if self.lower.x > self.upper.x || self.lower.y > self.upper.y {
            return None;
        }

        // pixel centers sit at +0.5
        let start_x = f32::max(f32::floor(self.lower.x - 0.5), 0.0);
        let start_y = f32::max(f32::floor(self.lower.y - 0.5), 0.0);
        let end_x = f32::min(f32::ceil(self.upper.x + 0.5), width as f32);
        let end_y = f32::min(f32::ceil(self.upper.y + 0.5), height as f32);

        if start_x >= end_x || start_y >= end_y {
            return None;
        }

        Some((
            start_x as usize..end_x as usize,
            start_y as usize..end_y as usize,
        ))
    }
}

impl Default for ViewportBox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pixel_range_clipped() {
        let pts = [point![-3.0, 2.2], point![4.7, 9.0]];
        let vbox = ViewportBox::from_points(&pts);

        let (xs, ys) = vbox.pixel_range(4, 100).unwrap();
        assert_eq!(xs, 0..4);
        assert_eq!(ys, 1..10);
    }

    #[test]
    fn outside_target() {
        let pts = [point![-30.0, -5.0], point![-10.0, -1.0]];
        let vbox = ViewportBox::from_points(&pts);
        assert!(vbox.pixel_range(64, 64).is_none());
        assert!(ViewportBox::new().pixel_range(64, 64).is_none());
    }
}
