//! Software rendering of volumes
//!
//! A [`Device`] hands out textures and offscreen targets, [`raster`] turns proxy geometry
//! into fragments and each [`RenderTechnique`] composites one frame into a [`FrameBuffer`].

mod device;
mod framebuffer;
pub mod geometry;
mod object_aligned;
pub mod raster;
mod ray_marching;
mod render_options;
mod technique;
mod texture;
mod view_aligned;

pub use device::{Capabilities, Device, RenderTarget, ResourceStats};
pub use framebuffer::{BlendMode, FrameBuffer};
pub use object_aligned::{ObjectAlignedSlicing, SLICE_ALPHA};
pub use ray_marching::{
    ExitPoint, RayMarch, RayMarching, MAX_STEPS, OPACITY_CORRECTION, TERMINATION_ALPHA,
};
pub use render_options::{
    RenderOptions, RenderOptionsBuilder, BRIGHTNESS_RANGE, DEFAULT_BRIGHTNESS,
    DEFAULT_OPACITY_MULTIPLIER, DEFAULT_RAY_STEP, DEFAULT_SLICE_COUNT, OPACITY_MULTIPLIER_RANGE,
    RAY_STEP_RANGE, SLICE_COUNT_RANGE,
};
pub use technique::{create_technique, RenderTechnique, TechniqueKind};
pub use texture::{SliceAtlas, Texture2D, Texture3D, VolumeTexture};
pub use view_aligned::{alpha_per_slice, slice_polygons, ViewAlignedSlicing};
