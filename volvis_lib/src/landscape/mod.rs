//! Landscape view: scattered graph nodes resampled into a shaded height surface,
//! with contour lines and the node graph drawn on top.

pub mod builder;
pub mod contour;
mod height_field;
mod mesh;
mod payload;
mod renderer;

pub use builder::{LandscapeSurfaceBuilder, Selection};
pub use contour::{triangulate, FillKind, Triangulation};
pub use height_field::{idw_at, HeightField, GRID_RESOLUTION, IDW_EPSILON, IDW_POWER};
pub use mesh::{
    build_geometry, node_color, Contour, LandscapeGeometry, NodePoint, SurfaceVertex,
    CONTOUR_OFFSET,
};
pub use payload::{parse_link, ContourLevel, LandscapeData, Node};
pub use renderer::{LandscapeRenderer, AMBIENT, NODE_SIZE};
