//! Transfer function editor and its sampled lookup tables

mod editor;
mod lut;

pub use editor::{
    default_highlight_color, new_point_color, ControlPoint, HighlightWindow, TransferFunction,
    MIN_HIGHLIGHT_WIDTH, NEW_POINT_ISO, NEW_POINT_OPACITY,
};
pub use lut::{TransferLut, LUT_SIZE};
