use std::path::PathBuf;

use config::Config;
use log::{error, info};
use volvis_lib::volumetric::convert_to_point_list;

mod args;
mod config;
mod file;
mod generators;
mod header;

use crate::{args::get_command, generators::generate_vol};

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = get_command().get_matches();

    if let Some(("convert", sub)) = args.subcommand() {
        let path = |key| sub.value_of_os(key).map(PathBuf::from).unwrap_or_default();
        if let Err(e) = convert_to_point_list(path("input"), path("output")) {
            error!("Converting failed: {e}");
            std::process::exit(1);
        }
        return;
    }

    let cfg = match Config::from_args(args) {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid arguments: {e}");
            std::process::exit(1);
        }
    };

    info!("Generating volume {:?}", cfg);

    if let Err(e) = generate_vol(&cfg) {
        error!("Generating failed: {e}");
        std::process::exit(1);
    }
}
