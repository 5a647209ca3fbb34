use nalgebra::Vector3;

use crate::config::Config;

use super::SampleGenerator;

/// Radial gradient
/// Brightest in the center, zero from the inscribed ellipsoid outwards
pub struct SphereGenerator {
    dims: Vector3<f32>,
}

impl SphereGenerator {
    pub fn from_config(config: &Config) -> SphereGenerator {
        SphereGenerator {
            dims: config.dims.cast::<f32>(),
        }
    }
}

impl SampleGenerator for SphereGenerator {
    fn sample_at(&self, coords: Vector3<u32>) -> u8 {
        // voxel centers mapped to [-1, 1]
        let d = (coords.cast::<f32>().add_scalar(0.5))
            .component_div(&self.dims)
            .add_scalar(-0.5)
            * 2.0;
        let falloff = (1.0 - d.norm()).max(0.0);
        (falloff * 255.0).round() as u8
    }
}
