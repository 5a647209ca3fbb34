use crate::color::{self, RGBA};

/// How an incoming fragment combines with the stored color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Overwrite
    Replace,
    /// Straight alpha: `src * a + dst * (1 - a)`
    AlphaOver,
    /// Premultiplied source: `src + dst * (1 - a)`
    PremultipliedOver,
}

/// Color and depth buffer a frame is composited into
///
/// Row 0 is the top of the image.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    color: Vec<RGBA>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> FrameBuffer {
        let len = width * height;
        FrameBuffer {
            width,
            height,
            color: vec![color::zero(); len],
            depth: vec![1.0; len],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_empty()
    }

    /// Reallocate for new size, returns `true` if the size changed
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        *self = FrameBuffer::new(width, height);
        true
    }

    /// Fill color and reset depth to the far plane
    pub fn clear(&mut self, clear_color: RGBA) {
        self.color.fill(clear_color);
        self.depth.fill(1.0);
    }

    pub fn get(&self, x: usize, y: usize) -> RGBA {
        self.color[y * self.width + x]
    }

    pub fn pixels(&self) -> &[RGBA] {
        &self.color
    }

    pub fn depth(&self, x: usize, y: usize) -> f32 {
        self.depth[y * self.width + x]
    }

    /// Less-than depth test, stores `depth` when it passes
    pub fn depth_test(&mut self, x: usize, y: usize, depth: f32) -> bool {
        let stored = &mut self.depth[y * self.width + x];
        if depth < *stored {
            *stored = depth;
            true
        } else {
            false
        }
    }

    pub fn blend(&mut self, x: usize, y: usize, src: RGBA, mode: BlendMode) {
        let dst = &mut self.color[y * self.width + x];
        let a = src.w;
        *dst = match mode {
            BlendMode::Replace => src,
            BlendMode::AlphaOver => {
                let rgb = src.xyz() * a + dst.xyz() * (1.0 - a);
                color::new(rgb.x, rgb.y, rgb.z, a + dst.w * (1.0 - a))
            }
            BlendMode::PremultipliedOver => src + *dst * (1.0 - a),
        };
    }

    /// Tightly packed RGBA8, rows top to bottom
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.color
            .iter()
            .flat_map(|c| [c.x, c.y, c.z, c.w].map(color::to_byte))
            .collect()
    }

    /// Tightly packed RGB8, rows top to bottom
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.color
            .iter()
            .flat_map(|c| [c.x, c.y, c.z].map(color::to_byte))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn blending() {
        let mut fb = FrameBuffer::new(2, 1);
        fb.clear(color::white());

        fb.blend(0, 0, color::new(1.0, 0.0, 0.0, 0.5), BlendMode::AlphaOver);
        assert_eq!(fb.get(0, 0), color::new(1.0, 0.5, 0.5, 1.0));

        // premultiplied: red at half coverage is (0.5, 0, 0, 0.5)
        fb.blend(1, 0, color::new(0.5, 0.0, 0.0, 0.5), BlendMode::PremultipliedOver);
        assert_eq!(fb.get(1, 0), color::new(1.0, 0.5, 0.5, 1.0));

        assert_eq!(fb.to_rgba8(), vec![255, 128, 128, 255, 255, 128, 128, 255]);
    }

    #[test]
    fn depth_and_resize() {
        let mut fb = FrameBuffer::new(3, 2);
        assert!(fb.depth_test(1, 1, 0.4));
        assert!(!fb.depth_test(1, 1, 0.6));
        assert_eq!(fb.depth(1, 1), 0.4);

        assert!(!fb.resize(3, 2));
        assert!(fb.resize(4, 4));
        assert_eq!(fb.pixels().len(), 16);
        assert_eq!(fb.depth(1, 1), 1.0);
        assert_eq!(fb.aspect(), 1.0);
    }
}
