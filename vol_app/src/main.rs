//! Volume and landscape rendering app
//!
//! Loads a volume on a worker thread, drives the controller frame by frame
//! and writes every frame as PNG, for example:
//! `cargo run --release --bin vol_app -- volumes/a.vtk -l landscape.json -n 36`

use log::{error, info};

mod app;
mod args;

use app::{AppConfig, Session};

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = args::get_command().get_matches();
    let config = match AppConfig::from_args(&args) {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid arguments: {e}");
            std::process::exit(1);
        }
    };
    let output_dir = config.output_dir.clone();

    match Session::new(config).run() {
        Ok(written) => info!("{written} frames written to {output_dir:?}"),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
