use std::sync::Arc;

use log::debug;
use nalgebra::vector;

use crate::{
    color::{self, RGB},
    error::TransferFunctionError,
};

use super::TransferLut;

/// Isovalue of a newly added point
pub const NEW_POINT_ISO: f32 = 0.5;
pub const NEW_POINT_OPACITY: f32 = 0.5;

/// Guard used when two neighbouring points share an isovalue
const MIN_ISO_RANGE: f32 = 1e-5;

/// Narrowest highlight band
pub const MIN_HIGHLIGHT_WIDTH: f32 = 0.001;
/// Strength of the highlight color at the band center
const HIGHLIGHT_COLOR_BLEND: f32 = 0.65;
/// Opacity added at the band center
const HIGHLIGHT_OPACITY_BOOST: f32 = 0.35;

pub fn new_point_color() -> RGB {
    vector![1.0, 0.3, 0.3]
}

pub fn default_highlight_color() -> RGB {
    vector![1.0, 0.4, 0.1]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    /// Isovalue in [0,1]
    pub iso: f32,
    pub color: RGB,
    pub opacity: f32,
}

impl ControlPoint {
    pub fn new(iso: f32, color: RGB, opacity: f32) -> ControlPoint {
        ControlPoint {
            iso,
            color,
            opacity,
        }
    }
}

/// Band around an isovalue painted with a highlight color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightWindow {
    pub iso: f32,
    pub width: f32,
    pub color: RGB,
}

/// Editable transfer function
///
/// Control points are kept sorted by isovalue, the first one pinned at 0 and the last
/// one at 1. Every successful edit rebuilds the lookup tables and bumps [`Self::revision`].
#[derive(Debug, Clone)]
pub struct TransferFunction {
    points: Vec<ControlPoint>,
    selected: usize,
    highlight: Option<HighlightWindow>,
    lut: Arc<TransferLut>,
    revision: u64,
}

fn check_number(v: f32) -> Result<f32, TransferFunctionError> {
    if v.is_nan() {
        Err(TransferFunctionError::NotANumber)
    } else {
        Ok(v.clamp(0.0, 1.0))
    }
}

impl TransferFunction {
    /// Transparent white at 0 up to opaque black at 1
    pub fn new() -> TransferFunction {
        let points = vec![
            ControlPoint::new(0.0, vector![1.0, 1.0, 1.0], 0.0),
            ControlPoint::new(1.0, vector![0.0, 0.0, 0.0], 1.0),
        ];
        TransferFunction::from_sorted(points)
    }

    /// Build from points, boundary isovalues are forced to 0 and 1
    ///
    /// Returns `None` for fewer than two points.
    pub fn from_points(mut points: Vec<ControlPoint>) -> Option<TransferFunction> {
        if points.len() < 2 {
            return None;
        }
        for p in points.iter_mut() {
            p.iso = p.iso.clamp(0.0, 1.0);
            p.opacity = p.opacity.clamp(0.0, 1.0);
        }
        points.sort_by(|a, b| a.iso.total_cmp(&b.iso));
        points.dedup_by(|a, b| a.iso == b.iso);
        if points.len() < 2 {
            return None;
        }
        let last = points.len() - 1;
        points[0].iso = 0.0;
        points[last].iso = 1.0;
        Some(TransferFunction::from_sorted(points))
    }

    fn from_sorted(points: Vec<ControlPoint>) -> TransferFunction {
        let selected = points.len() - 1;
        let mut tf = TransferFunction {
            points,
            selected,
            highlight: None,
            lut: Arc::new(TransferLut::from_fn(|_| (vector![0.0, 0.0, 0.0], 0.0))),
            revision: 0,
        };
        tf.rebuild();
        tf
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select(&mut self, index: usize) -> Result<(), TransferFunctionError> {
        self.check_index(index)?;
        self.selected = index;
        Ok(())
    }

    /// Point closest to (`iso`, `opacity`) in the editor plane, if within `max_dist`
    pub fn nearest_point(&self, iso: f32, opacity: f32, max_dist: f32) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, vector![p.iso - iso, p.opacity - opacity].norm()))
            .filter(|&(_, d)| d < max_dist)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Counter bumped by every change of the lookup tables
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Current lookup tables, shared read-only
    pub fn lut(&self) -> Arc<TransferLut> {
        Arc::clone(&self.lut)
    }

    pub fn highlight(&self) -> Option<&HighlightWindow> {
        self.highlight.as_ref()
    }

    fn check_index(&self, index: usize) -> Result<(), TransferFunctionError> {
        if index < self.points.len() {
            Ok(())
        } else {
            Err(TransferFunctionError::NoSuchPoint(index))
        }
    }

    fn is_boundary(&self, index: usize) -> bool {
        index == 0 || index == self.points.len() - 1
    }

    fn position_for(&self, iso: f32) -> usize {
        self.points.partition_point(|p| p.iso < iso)
    }

    fn iso_taken(&self, iso: f32, except: Option<usize>) -> bool {
        self.points
            .iter()
            .enumerate()
            .any(|(i, p)| Some(i) != except && p.iso == iso)
    }

    /// Insert a point at iso 0.5, or in the middle of the widest gap if 0.5 is taken.
    /// The new point becomes selected; returns its index.
    pub fn add_point(&mut self) -> usize {
        let iso = if self.iso_taken(NEW_POINT_ISO, None) {
            let (start, gap) = self
                .points
                .windows(2)
                .map(|w| (w[0].iso, w[1].iso - w[0].iso))
                .fold((0.0, f32::NEG_INFINITY), |best, cur| {
                    if cur.1 > best.1 {
                        cur
                    } else {
                        best
                    }
                });
            start + 0.5 * gap
        } else {
            NEW_POINT_ISO
        };

        let index = self.position_for(iso);
        self.points.insert(
            index,
            ControlPoint::new(iso, new_point_color(), NEW_POINT_OPACITY),
        );
        self.selected = index;
        debug!("Added control point {index} at iso {iso}");
        self.rebuild();
        index
    }

    /// Remove an interior point, boundary points stay
    pub fn remove_point(&mut self, index: usize) -> Result<ControlPoint, TransferFunctionError> {
        self.check_index(index)?;
        if self.is_boundary(index) {
            return Err(TransferFunctionError::BoundaryRemoval(index));
        }
        let removed = self.points.remove(index);
        if index < self.selected {
            self.selected -= 1;
        }
        self.selected = usize::min(self.selected, self.points.len() - 1);
        self.rebuild();
        Ok(removed)
    }

    /// Move a point, both values are clamped to [0,1]
    ///
    /// Boundary points may change opacity but not isovalue.
    /// Returns the index of the moved point after re-sorting.
    pub fn move_point(
        &mut self,
        index: usize,
        iso: f32,
        opacity: f32,
    ) -> Result<usize, TransferFunctionError> {
        self.check_index(index)?;
        let iso = check_number(iso)?;
        let opacity = check_number(opacity)?;

        if self.is_boundary(index) {
            let pinned = self.points[index].iso;
            if iso != pinned {
                return Err(TransferFunctionError::PinnedBoundary { index, pinned });
            }
            self.points[index].opacity = opacity;
            self.selected = index;
            self.rebuild();
            return Ok(index);
        }

        // interior points may not take over the pinned isovalues
        if iso == 0.0 || iso == 1.0 || self.iso_taken(iso, Some(index)) {
            return Err(TransferFunctionError::DuplicateIso(iso));
        }

        let mut point = self.points.remove(index);
        point.iso = iso;
        point.opacity = opacity;
        let new_index = self.position_for(iso);
        self.points.insert(new_index, point);
        self.selected = new_index;
        self.rebuild();
        Ok(new_index)
    }

    pub fn set_color(&mut self, index: usize, color: RGB) -> Result<(), TransferFunctionError> {
        self.check_index(index)?;
        if color.iter().any(|c| c.is_nan()) {
            return Err(TransferFunctionError::NotANumber);
        }
        self.points[index].color = color.map(|c| c.clamp(0.0, 1.0));
        self.rebuild();
        Ok(())
    }

    /// Set color from `#rrggbb`
    pub fn set_color_hex(&mut self, index: usize, hex: &str) -> Result<(), TransferFunctionError> {
        let color = color::hex_to_rgb(hex).ok_or(TransferFunctionError::NotANumber)?;
        self.set_color(index, color)
    }

    pub fn set_opacity(&mut self, index: usize, opacity: f32) -> Result<(), TransferFunctionError> {
        self.check_index(index)?;
        self.points[index].opacity = check_number(opacity)?;
        self.rebuild();
        Ok(())
    }

    /// Bracketing points and the blend factor between them
    fn bracket(&self, t: f32) -> (&ControlPoint, &ControlPoint, f32) {
        let first = &self.points[0];
        let last = &self.points[self.points.len() - 1];
        if t.is_nan() || t <= first.iso {
            return (first, first, 0.0);
        }
        if t >= last.iso {
            return (last, last, 0.0);
        }

        // first point with iso >= t, at least 1 here
        let upper = self.points.partition_point(|p| p.iso < t);
        let p0 = &self.points[upper - 1];
        let p1 = &self.points[upper];
        let mut range = p1.iso - p0.iso;
        if range == 0.0 {
            range = MIN_ISO_RANGE;
        }
        (p0, p1, (t - p0.iso) / range)
    }

    /// Piecewise-linear color at isovalue `t`
    pub fn sample_color(&self, t: f32) -> RGB {
        let (p0, p1, f) = self.bracket(t);
        p0.color + (p1.color - p0.color) * f
    }

    /// Piecewise-linear opacity at isovalue `t`
    pub fn sample_opacity(&self, t: f32) -> f32 {
        let (p0, p1, f) = self.bracket(t);
        p0.opacity + (p1.opacity - p0.opacity) * f
    }

    /// Paint a band of `width` around `iso` with `color`, without touching control points
    pub fn set_highlight_window(&mut self, iso: f32, width: f32, color: Option<RGB>) {
        if iso.is_nan() || width.is_nan() {
            return;
        }
        self.highlight = Some(HighlightWindow {
            iso: iso.clamp(0.0, 1.0),
            width: f32::max(width, MIN_HIGHLIGHT_WIDTH),
            color: color.unwrap_or_else(default_highlight_color),
        });
        self.rebuild();
    }

    pub fn clear_highlight_window(&mut self) {
        if self.highlight.take().is_some() {
            self.rebuild();
        }
    }

    /// Color and opacity at `t` including the highlight band
    pub fn evaluate(&self, t: f32) -> (RGB, f32) {
        let mut color = self.sample_color(t);
        let mut opacity = self.sample_opacity(t);

        if let Some(hw) = &self.highlight {
            let dist = (t - hw.iso).abs();
            if dist <= hw.width {
                let k = 1.0 - dist / hw.width;
                let blend = HIGHLIGHT_COLOR_BLEND * k;
                color = color * (1.0 - blend) + hw.color * blend;
                opacity = (opacity + HIGHLIGHT_OPACITY_BOOST * k).clamp(0.0, 1.0);
            }
        }
        (color, opacity)
    }

    fn rebuild(&mut self) {
        self.lut = Arc::new(TransferLut::from_fn(|t| self.evaluate(t)));
        self.revision += 1;
    }
}

impl Default for TransferFunction {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn three_points() -> TransferFunction {
        TransferFunction::from_points(vec![
            ControlPoint::new(0.0, vector![0.0, 0.0, 0.0], 0.0),
            ControlPoint::new(0.4, vector![1.0, 0.5, 0.0], 0.8),
            ControlPoint::new(1.0, vector![0.0, 1.0, 1.0], 0.2),
        ])
        .unwrap()
    }

    #[test]
    fn midpoint_is_mean() {
        let tf = three_points();
        let pts = tf.points().to_vec();
        for w in pts.windows(2) {
            let mid = 0.5 * (w[0].iso + w[1].iso);
            let expected_color = (w[0].color + w[1].color) * 0.5;
            let expected_opacity = 0.5 * (w[0].opacity + w[1].opacity);
            assert!((tf.sample_color(mid) - expected_color).norm() < 1e-6);
            assert!((tf.sample_opacity(mid) - expected_opacity).abs() < 1e-6);
        }
    }

    #[test]
    fn clamps_outside_range() {
        let tf = three_points();
        assert_eq!(tf.sample_opacity(-0.5), 0.0);
        assert_eq!(tf.sample_opacity(3.0), 0.2);
        assert_eq!(tf.sample_color(1.0), vector![0.0, 1.0, 1.0]);
    }

    #[test]
    fn boundary_points_are_pinned() {
        let mut tf = TransferFunction::new();
        assert!(matches!(
            tf.move_point(0, 0.2, 0.5),
            Err(TransferFunctionError::PinnedBoundary { index: 0, .. })
        ));
        assert!(matches!(
            tf.move_point(1, 0.7, 0.5),
            Err(TransferFunctionError::PinnedBoundary { index: 1, .. })
        ));
        assert_eq!(tf.points()[0].iso, 0.0);
        assert_eq!(tf.points()[1].iso, 1.0);

        // opacity of a boundary point can still change
        assert_eq!(tf.move_point(1, 1.0, 0.3), Ok(1));
        assert_eq!(tf.points()[1].opacity, 0.3);

        assert_eq!(
            tf.remove_point(0),
            Err(TransferFunctionError::BoundaryRemoval(0))
        );
        assert_eq!(
            tf.remove_point(1),
            Err(TransferFunctionError::BoundaryRemoval(1))
        );
        assert_eq!(tf.len(), 2);
    }

    #[test]
    fn add_move_remove() {
        let mut tf = TransferFunction::new();
        let rev = tf.revision();

        let i = tf.add_point();
        assert_eq!(i, 1);
        assert_eq!(tf.selected(), 1);
        assert_eq!(tf.points()[1].iso, 0.5);
        assert_eq!(tf.points()[1].color, new_point_color());
        assert!(tf.revision() > rev);

        // second add avoids the taken isovalue
        let j = tf.add_point();
        assert_eq!(tf.points()[j].iso, 0.25);

        // moving past a neighbour re-sorts, iso clamped
        let k = tf.move_point(j, 0.9, 2.0).unwrap();
        assert_eq!(k, 2);
        assert_eq!(tf.points()[k].opacity, 1.0);
        let isos: Vec<f32> = tf.points().iter().map(|p| p.iso).collect();
        assert_eq!(isos, vec![0.0, 0.5, 0.9, 1.0]);

        assert_eq!(
            tf.move_point(1, 0.9, 0.5),
            Err(TransferFunctionError::DuplicateIso(0.9))
        );
        assert_eq!(
            tf.move_point(1, -4.0, 0.5),
            Err(TransferFunctionError::DuplicateIso(0.0))
        );
        assert_eq!(tf.move_point(1, f32::NAN, 0.5), Err(TransferFunctionError::NotANumber));

        let removed = tf.remove_point(1).unwrap();
        assert_eq!(removed.iso, 0.5);
        assert_eq!(tf.len(), 3);
        assert!(tf.remove_point(7).is_err());
    }

    #[test]
    fn removal_keeps_selected_point() {
        let mut tf = TransferFunction::from_points(vec![
            ControlPoint::new(0.0, vector![0.0, 0.0, 0.0], 0.0),
            ControlPoint::new(0.2, vector![1.0, 0.0, 0.0], 0.2),
            ControlPoint::new(0.4, vector![0.0, 1.0, 0.0], 0.4),
            ControlPoint::new(0.6, vector![0.0, 0.0, 1.0], 0.6),
            ControlPoint::new(1.0, vector![1.0, 1.0, 1.0], 1.0),
        ])
        .unwrap();
        tf.select(2).unwrap();

        tf.remove_point(1).unwrap();
        assert_eq!(tf.selected(), 1);
        assert_eq!(tf.points()[tf.selected()].iso, 0.4);

        // removing the selected point selects its successor
        tf.remove_point(1).unwrap();
        assert_eq!(tf.points()[tf.selected()].iso, 0.6);
    }

    #[test]
    fn lut_follows_edits() {
        let mut tf = TransferFunction::new();
        let before = tf.lut();
        tf.set_color(1, vector![1.0, 0.0, 0.0]).unwrap();
        let after = tf.lut();
        assert_ne!(*before, *after);
        assert_eq!(after.color_table()[255], [255, 0, 0, 255]);
        // the old snapshot is untouched
        assert_eq!(before.color_table()[255], [0, 0, 0, 255]);
    }

    #[test]
    fn highlight_window() {
        let mut tf = TransferFunction::new();
        let plain = tf.evaluate(0.5);

        tf.set_highlight_window(0.5, 0.05, None);
        let (color, opacity) = tf.evaluate(0.5);
        let expected = plain.0 * 0.35 + default_highlight_color() * 0.65;
        assert!((color - expected).norm() < 1e-6);
        assert!((opacity - (plain.1 + 0.35)).abs() < 1e-6);

        // outside the band nothing changes
        assert_eq!(tf.evaluate(0.6), (tf.sample_color(0.6), tf.sample_opacity(0.6)));

        // control points are untouched
        assert_eq!(tf.len(), 2);

        tf.set_highlight_window(0.5, 0.0, None);
        assert_eq!(tf.highlight().unwrap().width, MIN_HIGHLIGHT_WIDTH);

        tf.clear_highlight_window();
        assert!(tf.highlight().is_none());
        assert_eq!(tf.evaluate(0.5), plain);
    }

    #[test]
    fn pick_nearest() {
        let tf = TransferFunction::new();
        assert_eq!(tf.nearest_point(0.98, 0.97, 0.1), Some(1));
        assert_eq!(tf.nearest_point(0.5, 0.5, 0.1), None);
    }

    #[test]
    fn points_constructor_pins_ends() {
        let tf = TransferFunction::from_points(vec![
            ControlPoint::new(0.9, vector![0.0, 0.0, 0.0], 0.4),
            ControlPoint::new(0.2, vector![1.0, 1.0, 1.0], 0.1),
        ])
        .unwrap();
        assert_eq!(tf.points()[0].iso, 0.0);
        assert_eq!(tf.points()[0].opacity, 0.1);
        assert_eq!(tf.points()[1].iso, 1.0);

        assert!(TransferFunction::from_points(vec![]).is_none());
    }
}
