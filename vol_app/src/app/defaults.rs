//! # Default values
//!
//! Used when the matching argument is left out.

use volvis_lib::render::TechniqueKind;

// Render resolution
pub const RENDER_WIDTH: usize = 512;
pub const RENDER_HEIGHT: usize = 512;

pub const VOLUME_PATH: &str = "volumes/a.vtk";
pub const OUTPUT_DIR: &str = "frames";

/// Frames written for each technique
pub const FRAMES: usize = 1;
/// Horizontal drag applied between frames, in pixels
pub const ORBIT_STEP: f32 = 20.0;

pub const FRAME_INTERVAL_MS: u64 = 16;
/// Give up waiting for the loader after this long
pub const LOAD_TIMEOUT_S: u64 = 120;

pub const TECHNIQUE: TechniqueKind = TechniqueKind::ObjectAlignedSlicing;
