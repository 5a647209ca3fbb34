use std::{
    error::Error,
    path::{Path, PathBuf},
};

use image::RgbaImage;
use volvis_lib::render::{FrameBuffer, TechniqueKind};

/// `<dir>/<technique>_<index>.png`
pub fn volume_frame_path(dir: &Path, kind: TechniqueKind, index: usize) -> PathBuf {
    dir.join(format!("{}_{index:03}.png", kind.name()))
}

/// `<dir>/landscape_<index>.png`
pub fn landscape_frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("landscape_{index:03}.png"))
}

/// Encode frame as PNG, row 0 is the top of the image
pub fn write_png(frame: &FrameBuffer, path: &Path) -> Result<(), Box<dyn Error>> {
    let image = RgbaImage::from_raw(
        frame.width() as u32,
        frame.height() as u32,
        frame.to_rgba8(),
    )
    .ok_or("frame buffer does not match its size")?;
    image.save(path)?;
    Ok(())
}
