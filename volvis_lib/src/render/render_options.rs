use std::ops::RangeInclusive;

use log::warn;

use crate::error::RenderError;

pub const RAY_STEP_RANGE: RangeInclusive<f32> = 1e-4..=0.1;
pub const SLICE_COUNT_RANGE: RangeInclusive<usize> = 32..=512;
pub const OPACITY_MULTIPLIER_RANGE: RangeInclusive<f32> = 0.0..=50.0;
pub const BRIGHTNESS_RANGE: RangeInclusive<f32> = 0.0..=10.0;

pub const DEFAULT_RAY_STEP: f32 = 0.005;
pub const DEFAULT_SLICE_COUNT: usize = 128;
pub const DEFAULT_OPACITY_MULTIPLIER: f32 = 5.0;
pub const DEFAULT_BRIGHTNESS: f32 = 1.0;

/// Runtime knobs shared by all techniques
///
/// Every technique reads the knobs it understands and ignores the rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Ray marching step in texture space
    pub ray_step: f32,
    /// Number of view aligned slices
    pub slice_count: usize,
    /// Opacity scale of view aligned slices
    pub opacity_multiplier: f32,
    /// Intensity multiplier applied before the transfer function lookup
    pub brightness: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            ray_step: DEFAULT_RAY_STEP,
            slice_count: DEFAULT_SLICE_COUNT,
            opacity_multiplier: DEFAULT_OPACITY_MULTIPLIER,
            brightness: DEFAULT_BRIGHTNESS,
        }
    }
}

fn clamp_knob(
    option: &'static str,
    value: f32,
    range: &RangeInclusive<f32>,
) -> Result<f32, RenderError> {
    if value.is_nan() {
        return Err(RenderError::InvalidOption { option, value });
    }
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        warn!("{option} {value} out of range, clamped to {clamped}");
    }
    Ok(clamped)
}

impl RenderOptions {
    pub fn builder() -> RenderOptionsBuilder {
        RenderOptionsBuilder::default()
    }

    /// Set ray step, clamped into [`RAY_STEP_RANGE`]. NaN is rejected
    pub fn set_ray_step(&mut self, step: f32) -> Result<(), RenderError> {
        self.ray_step = clamp_knob("ray_step", step, &RAY_STEP_RANGE)?;
        Ok(())
    }

    pub fn set_slice_count(&mut self, count: usize) {
        let clamped = count.clamp(*SLICE_COUNT_RANGE.start(), *SLICE_COUNT_RANGE.end());
        if clamped != count {
            warn!("slice_count {count} out of range, clamped to {clamped}");
        }
        self.slice_count = clamped;
    }

    pub fn set_opacity_multiplier(&mut self, multiplier: f32) -> Result<(), RenderError> {
        self.opacity_multiplier =
            clamp_knob("opacity_multiplier", multiplier, &OPACITY_MULTIPLIER_RANGE)?;
        Ok(())
    }

    pub fn set_brightness(&mut self, brightness: f32) -> Result<(), RenderError> {
        self.brightness = clamp_knob("brightness", brightness, &BRIGHTNESS_RANGE)?;
        Ok(())
    }

    /// Slice count clamped into [`SLICE_COUNT_RANGE`]
    pub fn effective_slice_count(&self) -> usize {
        self.slice_count
            .clamp(*SLICE_COUNT_RANGE.start(), *SLICE_COUNT_RANGE.end())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RenderOptionsBuilder {
    ray_step: Option<f32>,
    slice_count: Option<usize>,
    opacity_multiplier: Option<f32>,
    brightness: Option<f32>,
}

impl RenderOptionsBuilder {
    pub fn ray_step(mut self, step: f32) -> Self {
        self.ray_step = Some(step);
        self
    }

    pub fn slice_count(mut self, count: usize) -> Self {
        self.slice_count = Some(count);
        self
    }

    pub fn opacity_multiplier(mut self, multiplier: f32) -> Self {
        self.opacity_multiplier = Some(multiplier);
        self
    }

    pub fn brightness(mut self, brightness: f32) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Validate and clamp every knob that was set
    pub fn build(self) -> Result<RenderOptions, RenderError> {
        let mut opts = RenderOptions::default();
        if let Some(step) = self.ray_step {
            opts.set_ray_step(step)?;
        }
        if let Some(count) = self.slice_count {
            opts.set_slice_count(count);
        }
        if let Some(multiplier) = self.opacity_multiplier {
            opts.set_opacity_multiplier(multiplier)?;
        }
        if let Some(brightness) = self.brightness {
            opts.set_brightness(brightness)?;
        }
        Ok(opts)
    }

    /// Take values as they are, defaults for the rest
    pub fn build_unchecked(self) -> RenderOptions {
        let defaults = RenderOptions::default();
        RenderOptions {
            ray_step: self.ray_step.unwrap_or(defaults.ray_step),
            slice_count: self.slice_count.unwrap_or(defaults.slice_count),
            opacity_multiplier: self
                .opacity_multiplier
                .unwrap_or(defaults.opacity_multiplier),
            brightness: self.brightness.unwrap_or(defaults.brightness),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_clamps() {
        let opts = RenderOptions::builder()
            .ray_step(1.0)
            .slice_count(4)
            .opacity_multiplier(-3.0)
            .brightness(2.0)
            .build()
            .unwrap();
        assert_eq!(opts.ray_step, 0.1);
        assert_eq!(opts.slice_count, 32);
        assert_eq!(opts.opacity_multiplier, 0.0);
        assert_eq!(opts.brightness, 2.0);
    }

    #[test]
    fn nan_rejected() {
        let err = RenderOptions::builder().brightness(f32::NAN).build();
        assert!(matches!(
            err,
            Err(RenderError::InvalidOption {
                option: "brightness",
                ..
            })
        ));

        let mut opts = RenderOptions::default();
        assert!(opts.set_ray_step(f32::NAN).is_err());
        assert_eq!(opts.ray_step, DEFAULT_RAY_STEP);
    }

    #[test]
    fn unchecked_keeps_values() {
        let opts = RenderOptions::builder().slice_count(2000).build_unchecked();
        assert_eq!(opts.slice_count, 2000);
        assert_eq!(opts.effective_slice_count(), 512);
        assert_eq!(opts.ray_step, DEFAULT_RAY_STEP);
    }
}
