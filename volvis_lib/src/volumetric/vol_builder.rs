use std::path::Path;

use log::{debug, info};
use nalgebra::{point, vector, Point3, Vector3};

use crate::{common::ValueRange, error::LoadError};

use super::{parse::parse_structured_points, Volume, VolumeGrid};

/// How raw scalar samples become bytes
///
/// Files carry arbitrary numeric samples, the renderer works with `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationPolicy {
    /// `round((v - min) / (max - min) * 255)`, using the observed range of the file.
    /// A constant volume maps to 0.
    #[default]
    LinearRescale,
    /// Samples are assumed to already be bytes: truncated to integers and clamped to `0..=255`.
    Clamp,
}

impl NormalizationPolicy {
    /// Normalize one raw sample, `range` is the raw range of the whole volume
    pub fn normalize(&self, raw: f32, range: &ValueRange) -> u8 {
        let v = match self {
            NormalizationPolicy::LinearRescale => (range.normalize(raw) * 255.0).round(),
            NormalizationPolicy::Clamp => raw.trunc(),
        };
        if v.is_nan() {
            0
        } else {
            v.clamp(0.0, 255.0) as u8
        }
    }
}

/// `nx * ny * nz`, `None` when it does not fit `usize`
pub fn voxel_count(size: &Vector3<usize>) -> Option<usize> {
    size.x.checked_mul(size.y)?.checked_mul(size.z)
}

/// Collects volume parts, builds [`Volume`] once everything is known
#[derive(Debug, Default)]
pub struct VolumeBuilder {
    pub size: Option<Vector3<usize>>,
    pub spacing: Option<Vector3<f32>>,
    pub origin: Option<Point3<f32>>,
    pub samples: Option<Vec<f32>>,
    pub policy: NormalizationPolicy,
}

impl VolumeBuilder {
    pub fn new() -> VolumeBuilder {
        Default::default()
    }

    pub fn with_size(mut self, size: Vector3<usize>) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_spacing(mut self, spacing: Vector3<f32>) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn with_origin(mut self, origin: Point3<f32>) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_samples(mut self, samples: Vec<f32>) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn with_policy(mut self, policy: NormalizationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate and normalize
    ///
    /// Surplus samples are dropped, missing spacing and origin get defaults.
    pub fn build(self) -> Result<Volume, LoadError> {
        let size = self.size.ok_or(LoadError::MissingDimensions)?;
        if size.iter().any(|&d| d == 0) {
            return Err(LoadError::InvalidDimensions(size.x, size.y, size.z));
        }
        let expected =
            voxel_count(&size).ok_or(LoadError::InvalidDimensions(size.x, size.y, size.z))?;
        let mut samples = self.samples.ok_or(LoadError::MissingDataBlock)?;

        if samples.len() < expected {
            return Err(LoadError::SampleCount {
                expected,
                found: samples.len(),
            });
        }
        if samples.len() > expected {
            debug!("Ignoring {} surplus samples", samples.len() - expected);
            samples.truncate(expected);
        }

        let raw_range = ValueRange::from_samples(samples.iter().copied());
        let data: Vec<u8> = samples
            .iter()
            .map(|&v| self.policy.normalize(v, &raw_range))
            .collect();

        let spacing = self.spacing.unwrap_or_else(|| vector![1.0, 1.0, 1.0]);
        let origin = self.origin.unwrap_or_else(|| point![0.0, 0.0, 0.0]);

        let volume = Volume::from_parts(size, spacing, origin, data, raw_range, self.policy);
        debug!("Built volume {volume:?}");
        Ok(volume)
    }
}

/// Parse structured points text into a volume
pub fn parse_volume(text: &str, policy: NormalizationPolicy) -> Result<Volume, LoadError> {
    let builder = parse_structured_points(text)?;
    builder.with_policy(policy).build()
}

/// Read and parse a structured points file
pub fn from_file<P>(path: P, policy: NormalizationPolicy) -> Result<Volume, LoadError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let volume = parse_volume(&text, policy)?;
    let size = volume.get_size();
    info!(
        "Loaded {:?}: {}x{}x{} samples, raw range {} to {}",
        path,
        size.x,
        size.y,
        size.z,
        volume.raw_range().low,
        volume.raw_range().high
    );
    Ok(volume)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn linear_rescale() {
        let range: ValueRange = (-100.0..300.0).into();
        let policy = NormalizationPolicy::LinearRescale;
        assert_eq!(policy.normalize(-100.0, &range), 0);
        assert_eq!(policy.normalize(300.0, &range), 255);
        assert_eq!(policy.normalize(100.0, &range), 128);
        // constant volume
        assert_eq!(policy.normalize(7.0, &ValueRange::seed(7.0)), 0);
    }

    #[test]
    fn clamp_truncates() {
        let range = ValueRange::empty();
        let policy = NormalizationPolicy::Clamp;
        assert_eq!(policy.normalize(12.7, &range), 12);
        assert_eq!(policy.normalize(-3.0, &range), 0);
        assert_eq!(policy.normalize(1024.0, &range), 255);
    }

    #[test]
    fn builder_checks_counts() {
        let builder = VolumeBuilder::new()
            .with_size(vector![2, 2, 1])
            .with_samples(vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            builder.build(),
            Err(LoadError::SampleCount {
                expected: 4,
                found: 3
            })
        ));

        let builder = VolumeBuilder::new()
            .with_size(vector![2, 0, 1])
            .with_samples(vec![]);
        assert!(matches!(
            builder.build(),
            Err(LoadError::InvalidDimensions(2, 0, 1))
        ));

        let builder = VolumeBuilder::new().with_samples(vec![1.0]);
        assert!(matches!(builder.build(), Err(LoadError::MissingDimensions)));
    }

    #[test]
    fn overflowing_dimensions() {
        let huge = 1usize << (usize::BITS / 2);
        let builder = VolumeBuilder::new()
            .with_size(vector![huge, huge, 2])
            .with_samples(vec![1.0, 2.0]);
        assert!(matches!(
            builder.build(),
            Err(LoadError::InvalidDimensions(x, y, 2)) if x == huge && y == huge
        ));
        assert_eq!(voxel_count(&vector![3, 4, 5]), Some(60));
    }

    #[test]
    fn builder_drops_surplus() {
        let volume = VolumeBuilder::new()
            .with_size(vector![2, 1, 1])
            .with_samples(vec![0.0, 10.0, 99.0])
            .build()
            .unwrap();
        assert_eq!(volume.data(), &[0, 255]);
        assert_eq!(volume.get_size(), vector![2, 1, 1]);
        assert_eq!(volume.spacing(), vector![1.0, 1.0, 1.0]);
    }
}
