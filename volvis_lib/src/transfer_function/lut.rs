use nalgebra::vector;

use crate::color::{self, RGB};

/// Number of entries of both lookup tables
pub const LUT_SIZE: usize = 256;

/// Sampled transfer function
///
/// Two tables indexed by isovalue: RGBA8 color (alpha always 255) and R8 opacity.
/// Snapshots are immutable; the editor publishes a new one after every edit.
#[derive(Clone, PartialEq)]
pub struct TransferLut {
    color: Vec<[u8; 4]>,
    opacity: Vec<u8>,
}

impl std::fmt::Debug for TransferLut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferLut")
            .field("first", &(self.color[0], self.opacity[0]))
            .field("last", &(self.color[LUT_SIZE - 1], self.opacity[LUT_SIZE - 1]))
            .finish()
    }
}

impl TransferLut {
    /// Fill tables from per-entry color and opacity in [0,1]
    pub fn from_fn(mut entry: impl FnMut(f32) -> (RGB, f32)) -> TransferLut {
        let mut color = Vec::with_capacity(LUT_SIZE);
        let mut opacity = Vec::with_capacity(LUT_SIZE);
        for i in 0..LUT_SIZE {
            let iso = i as f32 / (LUT_SIZE - 1) as f32;
            let (c, o) = entry(iso);
            color.push([
                color::to_byte(c.x),
                color::to_byte(c.y),
                color::to_byte(c.z),
                255,
            ]);
            opacity.push(color::to_byte(o));
        }
        TransferLut { color, opacity }
    }

    /// Raw RGBA8 color table
    pub fn color_table(&self) -> &[[u8; 4]] {
        &self.color
    }

    /// Raw R8 opacity table
    pub fn opacity_table(&self) -> &[u8] {
        &self.opacity
    }

    // entry index and blend factor, linear filtering with clamp to edge
    fn texel(t: f32) -> (usize, usize, f32) {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * (LUT_SIZE - 1) as f32;
        let i0 = pos.floor() as usize;
        let i1 = usize::min(i0 + 1, LUT_SIZE - 1);
        (i0, i1, pos - i0 as f32)
    }

    /// Linearly filtered color at isovalue `t`
    pub fn color_at(&self, t: f32) -> RGB {
        let (i0, i1, f) = Self::texel(t);
        let c0 = self.color[i0];
        let c1 = self.color[i1];
        let ch = |k: usize| {
            let a = color::from_byte(c0[k]);
            let b = color::from_byte(c1[k]);
            a + (b - a) * f
        };
        vector![ch(0), ch(1), ch(2)]
    }

    /// Linearly filtered opacity at isovalue `t`
    pub fn opacity_at(&self, t: f32) -> f32 {
        let (i0, i1, f) = Self::texel(t);
        let a = color::from_byte(self.opacity[i0]);
        let b = color::from_byte(self.opacity[i1]);
        a + (b - a) * f
    }
}
