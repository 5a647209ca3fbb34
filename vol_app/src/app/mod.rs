//! Frame loop and its configuration

mod config;
pub mod defaults;
mod output;
mod session;

pub use config::AppConfig;
pub use output::{landscape_frame_path, volume_frame_path, write_png};
pub use session::{selection_for, Session};
