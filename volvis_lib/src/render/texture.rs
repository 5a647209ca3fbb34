//! Textures and volume sampling paths
//!
//! Sampling is grid aligned: texture coordinate 0 hits the first sample and 1 the last one.
//! The native 3D texture and the slice atlas share this convention and interpolate in the
//! same order, so both paths return the same values.

use nalgebra::{Point3, Vector3};

use crate::volumetric::{grid_cell, lerp, VolumeGrid};

use super::device::Allocation;

/// Single channel 2D texture with bilinear filtering
#[derive(Debug)]
pub struct Texture2D {
    width: usize,
    height: usize,
    data: Vec<u8>,
    _allocation: Allocation,
}

impl Texture2D {
    pub(super) fn new(width: usize, height: usize, data: Vec<u8>, allocation: Allocation) -> Self {
        Texture2D {
            width,
            height,
            data,
            _allocation: allocation,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn texel(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Bilinear fetch in texel coordinates, clamped to `[0, w-1] x [0, h-1]`
    pub fn fetch_bilinear(&self, x: f32, y: f32) -> f32 {
        let (x0, x1, tx) = grid_cell(x, self.width);
        let (y0, y1, ty) = grid_cell(y, self.height);
        let c0 = lerp(self.texel(x0, y0) as f32, self.texel(x1, y0) as f32, tx);
        let c1 = lerp(self.texel(x0, y1) as f32, self.texel(x1, y1) as f32, tx);
        lerp(c0, c1, ty)
    }

    /// Bilinear sample with coordinates in [0,1], result in [0,1]
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let x = u * self.width.saturating_sub(1) as f32;
        let y = v * self.height.saturating_sub(1) as f32;
        self.fetch_bilinear(x, y) / 255.0
    }
}

/// Native 3D texture, trilinear filtering
#[derive(Debug)]
pub struct Texture3D {
    size: Vector3<usize>,
    data: Vec<u8>,
    _allocation: Allocation,
}

impl Texture3D {
    pub(super) fn new(size: Vector3<usize>, data: Vec<u8>, allocation: Allocation) -> Self {
        Texture3D {
            size,
            data,
            _allocation: allocation,
        }
    }
}

impl VolumeGrid for Texture3D {
    fn get_size(&self) -> Vector3<usize> {
        self.size
    }

    fn get_data(&self, x: usize, y: usize, z: usize) -> u8 {
        self.data[x + y * self.size.x + z * self.size.x * self.size.y]
    }
}

/// Volume slices packed row by row into one 2D texture
///
/// Used where the device cannot hold a 3D texture. Trilinear sampling is emulated
/// by two bilinear fetches from neighbouring slices and a linear blend between them.
#[derive(Debug)]
pub struct SliceAtlas {
    size: Vector3<usize>,
    slices_per_row: usize,
    texture: Texture2D,
}

impl SliceAtlas {
    pub(super) fn new(size: Vector3<usize>, slices_per_row: usize, texture: Texture2D) -> Self {
        SliceAtlas {
            size,
            slices_per_row,
            texture,
        }
    }

    /// Slices per row and number of rows for a volume of `size`
    pub fn layout(size: Vector3<usize>) -> (usize, usize) {
        let per_row = usize::max((size.z as f64).sqrt().ceil() as usize, 1);
        let rows = (size.z + per_row - 1) / per_row;
        (per_row, rows)
    }

    pub fn slices_per_row(&self) -> usize {
        self.slices_per_row
    }

    pub fn texture(&self) -> &Texture2D {
        &self.texture
    }

    // top left texel of slice z
    fn tile_origin(&self, z: usize) -> (usize, usize) {
        (
            z % self.slices_per_row * self.size.x,
            z / self.slices_per_row * self.size.y,
        )
    }

    /// Bilinear sample inside one slice, `x`, `y` in grid coordinates
    fn sample_slice(&self, z: usize, x: f32, y: f32) -> f32 {
        let (x0, x1, tx) = grid_cell(x, self.size.x);
        let (y0, y1, ty) = grid_cell(y, self.size.y);
        let (ox, oy) = self.tile_origin(z);
        let t = &self.texture;
        let c0 = lerp(
            t.texel(ox + x0, oy + y0) as f32,
            t.texel(ox + x1, oy + y0) as f32,
            tx,
        );
        let c1 = lerp(
            t.texel(ox + x0, oy + y1) as f32,
            t.texel(ox + x1, oy + y1) as f32,
            tx,
        );
        lerp(c0, c1, ty)
    }
}

impl VolumeGrid for SliceAtlas {
    fn get_size(&self) -> Vector3<usize> {
        self.size
    }

    fn get_data(&self, x: usize, y: usize, z: usize) -> u8 {
        let (ox, oy) = self.tile_origin(z);
        self.texture.texel(ox + x, oy + y)
    }

    fn sample_at(&self, pos: Point3<f32>) -> f32 {
        let (z0, z1, tz) = grid_cell(pos.z, self.size.z);
        let v0 = self.sample_slice(z0, pos.x, pos.y);
        let v1 = self.sample_slice(z1, pos.x, pos.y);
        lerp(v0, v1, tz)
    }
}

/// One sampling interface over both storage paths
#[derive(Debug)]
pub enum VolumeTexture {
    Native(Texture3D),
    Atlas(SliceAtlas),
}

impl VolumeTexture {
    pub fn is_native(&self) -> bool {
        matches!(self, VolumeTexture::Native(_))
    }

    /// Scalar at texture coordinate `tex` in [0,1]^3, result in [0,1]
    pub fn sample(&self, tex: Point3<f32>) -> f32 {
        match self {
            VolumeTexture::Native(t) => t.sample_normalized(tex),
            VolumeTexture::Atlas(a) => a.sample_normalized(tex),
        }
    }

    pub fn size(&self) -> Vector3<usize> {
        match self {
            VolumeTexture::Native(t) => t.get_size(),
            VolumeTexture::Atlas(a) => a.get_size(),
        }
    }
}
