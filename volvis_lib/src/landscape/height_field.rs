//! Scattered node values resampled to a regular grid
//!
//! Inverse distance weighting: `height = Σ w_i v_i / Σ w_i` with
//! `w_i = 1 / (d_i² + ε)^(p/2)`.

use nalgebra::{vector, Vector3};

use crate::common::ValueRange;

use super::Node;

/// Cells per side of the reference grid
pub const GRID_RESOLUTION: usize = 80;
pub const IDW_POWER: f64 = 2.0;
pub const IDW_EPSILON: f64 = 1e-6;

/// Heights on a `resolution x resolution` grid spanning the node bounding box
#[derive(Debug, Clone)]
pub struct HeightField {
    resolution: usize,
    x_range: ValueRange,
    y_range: ValueRange,
    // row major, row = j (data y), column = i (data x)
    heights: Vec<f64>,
    height_range: ValueRange,
}

fn idw_weight(dist_sq: f64) -> f64 {
    1.0 / (dist_sq + IDW_EPSILON).powf(IDW_POWER * 0.5)
}

/// Weighted mean of node values at `pos`
///
/// Accumulated as a running mean, so equal values reproduce themselves exactly.
pub fn idw_at(nodes: &[Node], pos: [f64; 2]) -> f64 {
    let mut weight_sum = 0.0;
    let mut mean = 0.0;
    for node in nodes {
        let dx = node.position[0] - pos[0];
        let dy = node.position[1] - pos[1];
        let w = idw_weight(dx * dx + dy * dy);
        weight_sum += w;
        mean += (w / weight_sum) * (node.value - mean);
    }
    mean
}

impl HeightField {
    /// `None` without nodes
    pub fn from_nodes(nodes: &[Node], resolution: usize) -> Option<HeightField> {
        if nodes.is_empty() {
            return None;
        }
        let resolution = resolution.max(2);

        let x_range = ValueRange::from_samples(nodes.iter().map(|n| n.position[0] as f32));
        let y_range = ValueRange::from_samples(nodes.iter().map(|n| n.position[1] as f32));

        let mut field = HeightField {
            resolution,
            x_range,
            y_range,
            heights: Vec::with_capacity(resolution * resolution),
            height_range: ValueRange::empty(),
        };

        for j in 0..resolution {
            for i in 0..resolution {
                let h = idw_at(nodes, field.cell_position(i, j));
                field.heights.push(h);
                field.height_range.extend(h as f32);
            }
        }
        Some(field)
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Raw interpolated height
    pub fn height(&self, i: usize, j: usize) -> f64 {
        self.heights[j * self.resolution + i]
    }

    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    pub fn height_range(&self) -> ValueRange {
        self.height_range
    }

    /// Height mapped so that the field minimum is 0 and the maximum 1
    pub fn normalized_height(&self, i: usize, j: usize) -> f32 {
        self.height_range.normalize(self.height(i, j) as f32)
    }

    /// Map a function value into the normalized height frame
    pub fn normalize_value(&self, value: f64) -> f32 {
        self.height_range.normalize(value as f32)
    }

    /// Data coordinates of grid vertex `(i, j)`
    pub fn cell_position(&self, i: usize, j: usize) -> [f64; 2] {
        let steps = (self.resolution - 1) as f64;
        let x = self.x_range.low as f64 + self.x_range.span_or_one() as f64 * i as f64 / steps;
        let y = self.y_range.low as f64 + self.y_range.span_or_one() as f64 * j as f64 / steps;
        [x, y]
    }

    /// Data coordinates to the `[-1, 1]` frame shared by surface, nodes and contours
    pub fn to_frame(&self, pos: [f64; 2]) -> [f32; 2] {
        [
            self.x_range.normalize(pos[0] as f32) * 2.0 - 1.0,
            self.y_range.normalize(pos[1] as f32) * 2.0 - 1.0,
        ]
    }

    /// Grid vertex `(i, j)` in the normalized frame, y up
    pub fn vertex(&self, i: usize, j: usize) -> Vector3<f32> {
        let steps = (self.resolution - 1) as f32;
        vector![
            i as f32 / steps * 2.0 - 1.0,
            self.normalized_height(i, j),
            j as f32 / steps * 2.0 - 1.0
        ]
    }

    /// Surface normal from central differences, one-sided on the border
    pub fn normal(&self, i: usize, j: usize) -> Vector3<f32> {
        let last = self.resolution - 1;
        let spacing = 2.0 / last as f32;

        let (i0, i1) = (i.saturating_sub(1), usize::min(i + 1, last));
        let (j0, j1) = (j.saturating_sub(1), usize::min(j + 1, last));

        let dx = (self.normalized_height(i1, j) - self.normalized_height(i0, j))
            / ((i1 - i0) as f32 * spacing);
        let dz = (self.normalized_height(i, j1) - self.normalized_height(i, j0))
            / ((j1 - j0) as f32 * spacing);

        vector![-dx, 1.0, -dz].normalize()
    }
}
