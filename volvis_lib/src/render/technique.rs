use std::{fmt, str::FromStr, sync::Arc};

use log::info;

use crate::{
    camera::OrbitCamera, error::RenderError, transfer_function::TransferLut, volumetric::Volume,
};

use super::{
    Device, FrameBuffer, ObjectAlignedSlicing, RayMarching, RenderOptions, ViewAlignedSlicing,
};

/// Available volume rendering strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TechniqueKind {
    ObjectAlignedSlicing,
    ViewAlignedSlicing,
    RayMarching,
}

impl TechniqueKind {
    pub const ALL: [TechniqueKind; 3] = [
        TechniqueKind::ObjectAlignedSlicing,
        TechniqueKind::ViewAlignedSlicing,
        TechniqueKind::RayMarching,
    ];

    /// Short identifier, as accepted by [`FromStr`]
    pub fn name(&self) -> &'static str {
        match self {
            TechniqueKind::ObjectAlignedSlicing => "object-aligned",
            TechniqueKind::ViewAlignedSlicing => "view-aligned",
            TechniqueKind::RayMarching => "ray-marching",
        }
    }
}

impl Default for TechniqueKind {
    fn default() -> Self {
        TechniqueKind::ObjectAlignedSlicing
    }
}

impl fmt::Display for TechniqueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TechniqueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "object-aligned" | "object" | "oas" => Ok(TechniqueKind::ObjectAlignedSlicing),
            "view-aligned" | "view" | "vas" => Ok(TechniqueKind::ViewAlignedSlicing),
            "ray-marching" | "raymarching" | "ray" => Ok(TechniqueKind::RayMarching),
            _ => Err(format!(
                "unknown technique {s:?}, expected one of object-aligned, view-aligned, ray-marching"
            )),
        }
    }
}

/// A volume rendering strategy
///
/// Owns every device resource it allocates. Resources are released by
/// [`RenderTechnique::cleanup`], dropping the technique releases them as well.
pub trait RenderTechnique: Send {
    fn kind(&self) -> TechniqueKind;

    /// Use new lookup tables from the next frame on
    fn update_transfer_function(&mut self, lut: Arc<TransferLut>);

    /// Composite one frame, the technique clears `frame` itself
    fn render(&mut self, frame: &mut FrameBuffer);

    /// Release device resources, rendering afterwards draws only the background
    fn cleanup(&mut self);

    fn camera(&self) -> &OrbitCamera;

    fn camera_mut(&mut self) -> &mut OrbitCamera;

    fn set_camera(&mut self, camera: OrbitCamera) {
        *self.camera_mut() = camera;
    }

    fn options(&self) -> &RenderOptions;

    fn set_options(&mut self, options: RenderOptions);
}

/// Construct a technique of `kind` for `volume`
pub fn create_technique(
    kind: TechniqueKind,
    device: &Device,
    volume: Arc<Volume>,
    lut: Arc<TransferLut>,
    options: RenderOptions,
) -> Result<Box<dyn RenderTechnique>, RenderError> {
    let technique: Box<dyn RenderTechnique> = match kind {
        TechniqueKind::ObjectAlignedSlicing => {
            Box::new(ObjectAlignedSlicing::new(device, volume, lut, options)?)
        }
        TechniqueKind::ViewAlignedSlicing => {
            Box::new(ViewAlignedSlicing::new(device, volume, lut, options)?)
        }
        TechniqueKind::RayMarching => Box::new(RayMarching::new(device, volume, lut, options)?),
    };
    info!("Technique {kind} ready");
    Ok(technique)
}
