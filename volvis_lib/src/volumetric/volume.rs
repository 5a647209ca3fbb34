use nalgebra::{Point3, Vector3};

/// Regular grid of byte samples
///
/// Implemented by the in-memory volume and by the device textures holding a copy of it.
/// Sampling conventions are shared, so every implementor interpolates identically.
pub trait VolumeGrid {
    // get data dimensions
    fn get_size(&self) -> Vector3<usize>;

    // raw sample, coordinates must be inside the grid
    fn get_data(&self, x: usize, y: usize, z: usize) -> u8;

    // trilinear interpolation sample in [0, 255]
    // pos in grid coordinates, clamped to the grid
    fn sample_at(&self, pos: Point3<f32>) -> f32 {
        let size = self.get_size();
        let (x0, x1, tx) = grid_cell(pos.x, size.x);
        let (y0, y1, ty) = grid_cell(pos.y, size.y);
        let (z0, z1, tz) = grid_cell(pos.z, size.z);

        let plane = |z: usize| {
            let c0 = lerp(self.get_data(x0, y0, z) as f32, self.get_data(x1, y0, z) as f32, tx);
            let c1 = lerp(self.get_data(x0, y1, z) as f32, self.get_data(x1, y1, z) as f32, tx);
            lerp(c0, c1, ty)
        };

        lerp(plane(z0), plane(z1), tz)
    }

    // sample with texture coordinates, [0,1] spans the grid from first to last sample
    // result normalized to [0,1]
    fn sample_normalized(&self, tex: Point3<f32>) -> f32 {
        let size = self.get_size();
        let pos = Point3::from(tex.coords.component_mul(&size.map(|n| n.saturating_sub(1) as f32)));
        self.sample_at(pos) / 255.0
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Neighbouring sample indices and blend factor along one axis
pub fn grid_cell(coord: f32, len: usize) -> (usize, usize, f32) {
    let max = len.saturating_sub(1) as f32;
    let coord = if coord.is_nan() { 0.0 } else { coord.clamp(0.0, max) };
    let low = coord.floor();
    let i0 = low as usize;
    let i1 = usize::min(i0 + 1, len.saturating_sub(1));
    (i0, i1, coord - low)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cell_lookup() {
        assert_eq!(grid_cell(0.25, 4), (0, 1, 0.25));
        assert_eq!(grid_cell(3.0, 4), (3, 3, 0.0));
        assert_eq!(grid_cell(7.5, 4), (3, 3, 0.0));
        assert_eq!(grid_cell(-1.0, 4), (0, 1, 0.0));
        assert_eq!(grid_cell(0.5, 1), (0, 0, 0.0));
    }
}
