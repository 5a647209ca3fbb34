//! Software device
//!
//! Owns nothing itself, but every texture and render target is allocated through it
//! and accounted for until dropped. Techniques are expected to release everything in
//! `cleanup`, the statistics make leaks visible.

use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::{
    error::RenderError,
    volumetric::{Volume, VolumeGrid},
};

use super::{
    texture::{SliceAtlas, Texture2D, Texture3D, VolumeTexture},
    TechniqueKind,
};

/// What the device is able to allocate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Native 3D textures with trilinear filtering
    pub texture_3d: bool,
    /// Largest side of a 2D texture
    pub max_texture_size: usize,
    /// Largest side of a 3D texture
    pub max_texture_3d_size: usize,
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities {
            texture_3d: true,
            max_texture_size: 8192,
            max_texture_3d_size: 2048,
        }
    }
}

impl Capabilities {
    /// Device without 3D textures, volumes are packed into a 2D atlas
    pub fn without_3d() -> Capabilities {
        Capabilities {
            texture_3d: false,
            ..Default::default()
        }
    }
}

/// Live allocations
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResourceStats {
    pub textures: usize,
    pub render_targets: usize,
    pub bytes: usize,
}

impl ResourceStats {
    pub fn live(&self) -> usize {
        self.textures + self.render_targets
    }
}

#[derive(Debug, Clone, Copy)]
enum AllocationKind {
    Texture,
    RenderTarget,
}

/// Ticket of one allocation, returned to the device on drop
#[derive(Debug)]
pub struct Allocation {
    stats: Arc<Mutex<ResourceStats>>,
    kind: AllocationKind,
    bytes: usize,
}

impl Drop for Allocation {
    fn drop(&mut self) {
        let mut stats = self.stats.lock();
        match self.kind {
            AllocationKind::Texture => stats.textures -= 1,
            AllocationKind::RenderTarget => stats.render_targets -= 1,
        }
        stats.bytes -= self.bytes;
    }
}

/// Handle to the device, cheap to clone
#[derive(Debug, Clone)]
pub struct Device {
    capabilities: Capabilities,
    stats: Arc<Mutex<ResourceStats>>,
}

impl Device {
    pub fn new(capabilities: Capabilities) -> Device {
        Device {
            capabilities,
            stats: Default::default(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn stats(&self) -> ResourceStats {
        *self.stats.lock()
    }

    fn allocate(&self, kind: AllocationKind, bytes: usize) -> Allocation {
        let mut stats = self.stats.lock();
        match kind {
            AllocationKind::Texture => stats.textures += 1,
            AllocationKind::RenderTarget => stats.render_targets += 1,
        }
        stats.bytes += bytes;
        Allocation {
            stats: Arc::clone(&self.stats),
            kind,
            bytes,
        }
    }

    fn check_2d(&self, width: usize, height: usize) -> Result<(), RenderError> {
        let limit = self.capabilities.max_texture_size;
        if width > limit || height > limit {
            return Err(RenderError::TextureTooLarge {
                width,
                height,
                limit,
            });
        }
        Ok(())
    }

    /// Single channel 2D texture, `data` row by row
    pub fn create_texture_2d(
        &self,
        width: usize,
        height: usize,
        data: Vec<u8>,
    ) -> Result<Texture2D, RenderError> {
        self.check_2d(width, height)?;
        debug_assert_eq!(data.len(), width * height);
        let allocation = self.allocate(AllocationKind::Texture, data.len());
        Ok(Texture2D::new(width, height, data, allocation))
    }

    /// Native 3D texture holding a copy of the volume
    pub fn create_texture_3d(&self, volume: &Volume) -> Result<Texture3D, RenderError> {
        let size = volume.get_size();
        if !self.capabilities.texture_3d {
            return Err(RenderError::Unsupported {
                technique: TechniqueKind::RayMarching,
                reason: "device has no 3D textures".into(),
            });
        }
        let limit = self.capabilities.max_texture_3d_size;
        if size.max() > limit {
            return Err(RenderError::TextureTooLarge {
                width: size.x,
                height: size.y,
                limit,
            });
        }
        let data = volume.data().to_vec();
        let allocation = self.allocate(AllocationKind::Texture, data.len());
        Ok(Texture3D::new(size, data, allocation))
    }

    /// Volume packed into a near-square atlas of xy slices
    pub fn create_slice_atlas(&self, volume: &Volume) -> Result<SliceAtlas, RenderError> {
        let size = volume.get_size();
        let (per_row, rows) = SliceAtlas::layout(size);
        let width = per_row * size.x;
        let height = rows * size.y;
        self.check_2d(width, height)?;

        let mut data = vec![0; width * height];
        for z in 0..size.z {
            let (tile_x, tile_y) = (z % per_row * size.x, z / per_row * size.y);
            for (y, row) in volume.slice(z).chunks(size.x).enumerate() {
                let start = (tile_y + y) * width + tile_x;
                data[start..start + size.x].copy_from_slice(row);
            }
        }
        let texture = self.create_texture_2d(width, height, data)?;
        Ok(SliceAtlas::new(size, per_row, texture))
    }

    /// Best sampling path the device offers for `volume`
    ///
    /// Native 3D texture when available, slice atlas otherwise.
    pub fn create_volume_texture(
        &self,
        volume: &Volume,
        technique: TechniqueKind,
    ) -> Result<VolumeTexture, RenderError> {
        if self.capabilities.texture_3d {
            match self.create_texture_3d(volume) {
                Ok(texture) => return Ok(VolumeTexture::Native(texture)),
                Err(e) => debug!("3D texture not available ({e}), packing slices"),
            }
        }

        self.create_slice_atlas(volume)
            .map(VolumeTexture::Atlas)
            .map_err(|e| RenderError::Unsupported {
                technique,
                reason: format!("volume does not fit any texture: {e}"),
            })
    }

    /// Offscreen target of `width` x `height` cells filled with `T::default()`
    pub fn create_render_target<T>(&self, width: usize, height: usize) -> RenderTarget<T>
    where
        T: Copy + Default,
    {
        let cells = width * height;
        let allocation = self.allocate(
            AllocationKind::RenderTarget,
            cells * std::mem::size_of::<T>(),
        );
        RenderTarget {
            width,
            height,
            data: vec![T::default(); cells],
            _allocation: allocation,
        }
    }
}

impl Default for Device {
    fn default() -> Self {
        Device::new(Capabilities::default())
    }
}

/// Offscreen buffer written by one pass and read by a later one
#[derive(Debug)]
pub struct RenderTarget<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
    _allocation: Allocation,
}

impl<T> RenderTarget<T>
where
    T: Copy + Default,
{
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn clear(&mut self) {
        self.data.fill(T::default());
    }

    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.data[y * self.width + x] = value;
    }
}

#[cfg(test)]
mod test {
    use nalgebra::vector;

    use super::*;
    use crate::test_helpers::gradient_volume;

    #[test]
    fn allocations_are_counted() {
        let device = Device::default();
        let volume = gradient_volume(vector![4, 4, 4], vector![1.0, 1.0, 1.0]);

        let tex = device.create_texture_3d(&volume).unwrap();
        let target = device.create_render_target::<f32>(10, 10);
        let stats = device.stats();
        assert_eq!(stats.textures, 1);
        assert_eq!(stats.render_targets, 1);
        assert_eq!(stats.bytes, 64 + 400);

        drop(tex);
        drop(target);
        assert_eq!(device.stats(), ResourceStats::default());
    }

    #[test]
    fn falls_back_to_atlas() {
        let device = Device::new(Capabilities::without_3d());
        let volume = gradient_volume(vector![3, 2, 5], vector![1.0, 1.0, 1.0]);
        let texture = device
            .create_volume_texture(&volume, TechniqueKind::RayMarching)
            .unwrap();
        assert!(!texture.is_native());
        assert_eq!(device.stats().textures, 1);
    }

    #[test]
    fn too_large_for_any_path() {
        let device = Device::new(Capabilities {
            texture_3d: false,
            max_texture_size: 4,
            max_texture_3d_size: 4,
        });
        let volume = gradient_volume(vector![3, 3, 9], vector![1.0, 1.0, 1.0]);
        let err = device
            .create_volume_texture(&volume, TechniqueKind::ViewAlignedSlicing)
            .unwrap_err();
        assert!(matches!(err, RenderError::Unsupported { .. }));
        assert_eq!(device.stats().live(), 0);
    }
}
