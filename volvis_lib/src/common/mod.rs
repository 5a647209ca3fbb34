mod bound_box;
mod pending;
mod value_range;
mod viewport_box;

pub use bound_box::{BoundBox, BoundBoxIterator, BOX_EDGES};
pub use pending::Pending;
pub use value_range::ValueRange;
pub use viewport_box::ViewportBox;
