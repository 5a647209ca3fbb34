use nalgebra::{vector, Vector3};

use crate::config::{Config, GeneratorConfig};

use super::SampleGenerator;

/// Spread of object sides around the requested size
const SIZE_VARIANCE: u32 = 2;
/// Spread of object values around the requested sample
const SAMPLE_VARIANCE: u8 = 10;

/// Generate volume with a number of randomly placed shapes
/// Where shapes overlap, the one generated first wins
pub struct ShapesGenerator {
    shapes: Vec<ShapeInfo>,
}

impl ShapesGenerator {
    pub fn from_config(config: &Config) -> ShapesGenerator {
        let (n_of_shapes, sample, obj_size) = match config.generator {
            GeneratorConfig::Shapes {
                n_of_shapes,
                sample,
                obj_size,
            } => (n_of_shapes, sample, obj_size),
            _ => (0, 0, 1),
        };

        let random_shape_gen = ShapeInfoGenerator::new(
            config.dims,
            vector![obj_size, obj_size, obj_size],
            SIZE_VARIANCE,
            sample,
            config.seed,
        );
        ShapesGenerator {
            shapes: random_shape_gen.get_shapes(n_of_shapes),
        }
    }
}

impl SampleGenerator for ShapesGenerator {
    fn sample_at(&self, coords: Vector3<u32>) -> u8 {
        self.shapes
            .iter()
            .find(|shape| shape.contains(coords))
            .map_or(0, |shape| shape.render_at(coords - shape.position_low))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    Cuboid,
    Sphere,
}

/// One shape in volume, bounds are inclusive
#[derive(Debug, Clone)]
pub struct ShapeInfo {
    pub position_low: Vector3<u32>,
    pub position_high: Vector3<u32>,
    pub shape_type: ShapeType,
    pub sample: u8,
}

impl ShapeInfo {
    fn contains(&self, coords: Vector3<u32>) -> bool {
        (0..3).all(|i| coords[i] >= self.position_low[i] && coords[i] <= self.position_high[i])
    }

    fn render_at(&self, offset: Vector3<u32>) -> u8 {
        match self.shape_type {
            ShapeType::Cuboid => self.sample,
            ShapeType::Sphere => self.render_sphere(offset),
        }
    }

    fn render_sphere(&self, offset: Vector3<u32>) -> u8 {
        let extent = (self.position_high - self.position_low).cast::<f32>();
        let center = extent / 2.0;
        let r = extent.min() / 2.0;

        if (offset.cast::<f32>() - center).norm() <= r {
            self.sample
        } else {
            0
        }
    }
}

/// Random shapes that fit into the volume
pub struct ShapeInfoGenerator {
    rng: fastrand::Rng,
    vol_dims: Vector3<u32>,
    size: Vector3<u32>,
    size_variance: u32,
    sample: u8,
}

impl ShapeInfoGenerator {
    #[must_use]
    pub fn new(
        vol_dims: Vector3<u32>,
        size: Vector3<u32>,
        size_variance: u32,
        sample: u8,
        seed: Option<u64>,
    ) -> Self {
        let rng = fastrand::Rng::new();
        if let Some(seed) = seed {
            rng.seed(seed);
        }

        Self {
            rng,
            vol_dims,
            size,
            size_variance,
            sample,
        }
    }

    fn random_shape(&self) -> ShapeType {
        if self.rng.bool() {
            ShapeType::Cuboid
        } else {
            ShapeType::Sphere
        }
    }

    pub fn get_shapes(&self, n: usize) -> Vec<ShapeInfo> {
        (0..n).map(|_| self.get_shape()).collect()
    }

    pub fn get_shape(&self) -> ShapeInfo {
        let shape_type = self.random_shape();

        // side along each axis, never larger than the volume
        let size = Vector3::from_fn(|i, _| {
            let max_side = self.vol_dims[i];
            let low = self.size[i].saturating_sub(self.size_variance).clamp(1, max_side);
            let high = (self.size[i] + self.size_variance).clamp(low, max_side);
            self.rng.u32(low..=high)
        });

        let position_low = Vector3::from_fn(|i, _| self.rng.u32(0..=self.vol_dims[i] - size[i]));
        let position_high = position_low + size - vector![1, 1, 1];

        let low = self.sample.saturating_sub(SAMPLE_VARIANCE).max(1);
        let high = self.sample.saturating_add(SAMPLE_VARIANCE).max(low);
        let sample = self.rng.u8(low..=high);

        ShapeInfo {
            position_low,
            position_high,
            shape_type,
            sample,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shapes_fit_and_repeat_with_seed() {
        let dims = vector![10, 6, 4];
        let a = ShapeInfoGenerator::new(dims, vector![8, 8, 8], 2, 100, Some(7)).get_shapes(20);
        let b = ShapeInfoGenerator::new(dims, vector![8, 8, 8], 2, 100, Some(7)).get_shapes(20);

        for (sa, sb) in a.iter().zip(&b) {
            assert_eq!(sa.position_low, sb.position_low);
            assert_eq!(sa.sample, sb.sample);
            assert!((0..3).all(|i| sa.position_high[i] < dims[i]));
            assert!((90..=110).contains(&sa.sample));
        }
    }

    #[test]
    fn cuboid_fills_its_box() {
        let shape = ShapeInfo {
            position_low: vector![1, 1, 1],
            position_high: vector![2, 3, 2],
            shape_type: ShapeType::Cuboid,
            sample: 50,
        };
        let gen = ShapesGenerator {
            shapes: vec![shape],
        };
        assert_eq!(gen.sample_at(vector![1, 3, 2]), 50);
        assert_eq!(gen.sample_at(vector![0, 1, 1]), 0);
        assert_eq!(gen.sample_at(vector![3, 1, 1]), 0);
    }
}
