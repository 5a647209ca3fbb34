use nalgebra::{Point3, Vector3};

use crate::common::{BoundBox, ValueRange};

use super::{NormalizationPolicy, VolumeGrid};

/// Scalar volume, samples normalized to bytes
///
/// Samples are stored linearly, x fastest, then y, then z.
/// Built only by [`super::VolumeBuilder`], immutable afterwards.
pub struct Volume {
    size: Vector3<usize>,
    spacing: Vector3<f32>,
    origin: Point3<f32>,
    data: Vec<u8>,
    raw_range: ValueRange,
    policy: NormalizationPolicy,
}

impl std::fmt::Debug for Volume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Volume")
            .field("size", &self.size)
            .field("spacing", &self.spacing)
            .field("origin", &self.origin)
            .field("raw_range", &self.raw_range)
            .field("policy", &self.policy)
            .field("data len", &self.data.len())
            .finish()
    }
}

impl Volume {
    /// Caller guarantees `data.len()` is the product of `size`
    pub(super) fn from_parts(
        size: Vector3<usize>,
        spacing: Vector3<f32>,
        origin: Point3<f32>,
        data: Vec<u8>,
        raw_range: ValueRange,
        policy: NormalizationPolicy,
    ) -> Volume {
        debug_assert_eq!(data.len(), size.x * size.y * size.z);
        Volume {
            size,
            spacing,
            origin,
            data,
            raw_range,
            policy,
        }
    }

    fn get_3d_index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.size.x + z * self.size.x * self.size.y
    }

    pub fn spacing(&self) -> Vector3<f32> {
        self.spacing
    }

    pub fn origin(&self) -> Point3<f32> {
        self.origin
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn voxel_count(&self) -> usize {
        self.data.len()
    }

    /// Min and max of the samples before normalization
    pub fn raw_range(&self) -> ValueRange {
        self.raw_range
    }

    pub fn policy(&self) -> NormalizationPolicy {
        self.policy
    }

    /// Min and max of the stored byte samples
    pub fn sample_range(&self) -> ValueRange {
        ValueRange::from_samples(self.data.iter().copied())
    }

    /// Physical size, `dims * spacing`
    pub fn extents(&self) -> Vector3<f32> {
        self.size.map(|v| v as f32).component_mul(&self.spacing)
    }

    /// Extents divided by the longest one
    ///
    /// The longest axis gets exactly 1.0.
    pub fn scale(&self) -> Vector3<f32> {
        let extents = self.extents();
        let max = extents.max();
        if max > 0.0 {
            extents / max
        } else {
            Vector3::repeat(1.0)
        }
    }

    /// Box the volume occupies in scaled object space, centered at the origin
    pub fn bound_box(&self) -> BoundBox {
        BoundBox::centered(self.scale())
    }

    /// One xy layer of samples
    pub fn slice(&self, z: usize) -> &[u8] {
        let layer = self.size.x * self.size.y;
        &self.data[z * layer..(z + 1) * layer]
    }

    /// Isovalue in [0,1] that a raw (unnormalized) value maps to
    pub fn iso_of(&self, raw: f32) -> f32 {
        let byte = self.policy.normalize(raw, &self.raw_range);
        byte as f32 / 255.0
    }
}

impl VolumeGrid for Volume {
    fn get_size(&self) -> Vector3<usize> {
        self.size
    }

    fn get_data(&self, x: usize, y: usize, z: usize) -> u8 {
        self.data[self.get_3d_index(x, y, z)]
    }
}
