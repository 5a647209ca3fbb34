use log::{debug, info, warn};

use crate::{
    color::{self, RGB},
    common::Pending,
};

use super::{
    mesh::{build_geometry, node_color},
    HeightField, LandscapeData, LandscapeGeometry, GRID_RESOLUTION,
};

/// Color of the selected node
pub fn selected_node_color() -> RGB {
    color::rgb(1.0, 0.4, 0.1)
}

/// Color of the neighbours of the selected node
pub fn neighbour_node_color() -> RGB {
    color::rgb(1.0, 0.8, 0.2)
}

/// Node picked elsewhere in the application
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub node: usize,
    /// Function value of the selected node
    pub value: f64,
    pub neighbours: Vec<usize>,
}

/// Turns landscape payloads into cached geometry
///
/// The height field and the geometry are rebuilt only when new data arrives.
#[derive(Debug)]
pub struct LandscapeSurfaceBuilder {
    resolution: usize,
    field: Option<HeightField>,
    geometry: Option<LandscapeGeometry>,
    surface_visible: bool,
    selection: Option<Selection>,
    pending_selection: Pending<Selection>,
}

impl Default for LandscapeSurfaceBuilder {
    fn default() -> Self {
        LandscapeSurfaceBuilder::new()
    }
}

impl LandscapeSurfaceBuilder {
    pub fn new() -> LandscapeSurfaceBuilder {
        LandscapeSurfaceBuilder {
            resolution: GRID_RESOLUTION,
            field: None,
            geometry: None,
            surface_visible: true,
            selection: None,
            pending_selection: Pending::new(),
        }
    }

    /// Grid resolution of the height field, at least 2
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution.max(2);
        self
    }

    /// Rebuild the height field and geometry from `data`
    ///
    /// A selection that arrived before the first geometry is applied now.
    pub fn set_data(&mut self, data: &LandscapeData) {
        info!(
            "Building landscape: {} nodes, {} links, {} contour levels",
            data.nodes.len(),
            data.links.len(),
            data.contours.len()
        );

        self.field = HeightField::from_nodes(&data.nodes, self.resolution);
        let geometry = match &self.field {
            Some(field) => build_geometry(data, field),
            None => {
                debug!("Landscape has no nodes, geometry is empty");
                LandscapeGeometry::default()
            }
        };
        self.geometry = Some(geometry);
        self.selection = None;

        if let Some(selection) = self.pending_selection.take() {
            debug!("Applying buffered selection of node {}", selection.node);
            self.apply_selection(selection);
        }
    }

    /// Geometry of the last payload, `None` before the first one
    pub fn geometry(&self) -> Option<&LandscapeGeometry> {
        self.geometry.as_ref()
    }

    pub fn height_field(&self) -> Option<&HeightField> {
        self.field.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.geometry.is_some()
    }

    /// Surface and contours, nodes and links are always shown
    pub fn surface_visible(&self) -> bool {
        self.surface_visible
    }

    pub fn set_surface_visible(&mut self, visible: bool) {
        self.surface_visible = visible;
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn has_pending_selection(&self) -> bool {
        self.pending_selection.is_pending()
    }

    /// Recolor the selected node and its neighbours
    ///
    /// Returns `false` if there is no geometry yet, the selection is then kept
    /// (replacing an older one) until [`LandscapeSurfaceBuilder::set_data`] runs.
    pub fn highlight_selection(&mut self, selection: Selection) -> bool {
        if self.geometry.is_none() {
            debug!("No landscape yet, buffering selection of node {}", selection.node);
            self.pending_selection.put(selection);
            return false;
        }
        self.apply_selection(selection);
        true
    }

    /// Restore the base node colors
    pub fn clear_selection(&mut self) {
        self.selection = None;
        if let Some(geometry) = &mut self.geometry {
            for node in &mut geometry.nodes {
                node.color = node_color(node.position.y);
            }
        }
    }

    fn apply_selection(&mut self, selection: Selection) {
        self.clear_selection();
        let geometry = match &mut self.geometry {
            Some(g) => g,
            None => return,
        };
        let node_count = geometry.nodes.len();

        for &n in &selection.neighbours {
            match geometry.nodes.get_mut(n) {
                Some(node) => node.color = neighbour_node_color(),
                None => warn!("Selected neighbour {n} out of range, {node_count} nodes present"),
            }
        }
        match geometry.nodes.get_mut(selection.node) {
            Some(node) => node.color = selected_node_color(),
            None => warn!(
                "Selected node {} out of range, {node_count} nodes present",
                selection.node
            ),
        }
        self.selection = Some(selection);
    }
}
