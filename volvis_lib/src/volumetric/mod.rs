pub mod export;
mod linear_volume;
pub mod parse;
mod vol_builder;
mod volume;

pub use export::{convert_to_point_list, point_list, write_point_list, GridPoint};
pub use linear_volume::Volume;
pub use vol_builder::{from_file, parse_volume, voxel_count, NormalizationPolicy, VolumeBuilder};
pub use volume::{grid_cell, lerp, VolumeGrid};
