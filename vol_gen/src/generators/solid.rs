use nalgebra::{vector, Vector3};

use crate::config::{Config, GeneratorConfig};

use super::SampleGenerator;

/// Widest empty border around the block
const MAX_PAD: u32 = 5;

/// Generate solid volume
/// All samples inside the border have the same value
pub struct SolidGenerator {
    /// The sample value
    sample: u8,
    pad: u32,
    dims: Vector3<u32>,
}

impl SolidGenerator {
    pub fn from_config(config: &Config) -> SolidGenerator {
        let sample = match config.generator {
            GeneratorConfig::Solid { sample } => sample,
            _ => 255,
        };
        let dims = config.dims;

        SolidGenerator {
            sample,
            pad: (dims.min() / 4).min(MAX_PAD),
            dims,
        }
    }
}

impl SampleGenerator for SolidGenerator {
    fn sample_at(&self, coords: Vector3<u32>) -> u8 {
        let pad_end = self.dims - vector![self.pad, self.pad, self.pad];
        if coords.x < self.pad
            || coords.y < self.pad
            || coords.z < self.pad
            || coords.x >= pad_end.x
            || coords.y >= pad_end.y
            || coords.z >= pad_end.z
        {
            0
        } else {
            self.sample
        }
    }
}
