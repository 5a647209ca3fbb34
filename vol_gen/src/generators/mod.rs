use std::{
    error::Error,
    fmt::Write as _,
    io::{BufWriter, Write},
};

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use nalgebra::Vector3;
use rayon::prelude::*;

use crate::{
    config::{Config, GeneratorConfig},
    file::open_create_file,
    header::generate_header,
};

mod shapes;
mod solid;
mod sphere;

// Samples per line of output
const LINE_LENGTH: usize = 16;

// Generates one sample at a time, at any location
pub trait SampleGenerator: Sync {
    fn sample_at(&self, coords: Vector3<u32>) -> u8;
}

pub fn get_sample_generator(config: &Config) -> Box<dyn SampleGenerator> {
    match config.generator {
        GeneratorConfig::Shapes { .. } => Box::new(shapes::ShapesGenerator::from_config(config)),
        GeneratorConfig::Sphere => Box::new(sphere::SphereGenerator::from_config(config)),
        GeneratorConfig::Solid { .. } => Box::new(solid::SolidGenerator::from_config(config)),
    }
}

/// Text of one z slice, x varies fastest
fn slice_text(sg: &dyn SampleGenerator, dims: Vector3<u32>, z: u32) -> String {
    let mut text = String::with_capacity(4 * (dims.x * dims.y) as usize);
    let mut on_line = 0;
    for y in 0..dims.y {
        for x in 0..dims.x {
            let sample = sg.sample_at(Vector3::new(x, y, z));
            // writing into a String cannot fail
            let _ = write!(text, "{sample}");
            on_line += 1;
            if on_line == LINE_LENGTH {
                text.push('\n');
                on_line = 0;
            } else {
                text.push(' ');
            }
        }
    }
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Whole file contents, slices are produced in parallel
pub fn generate_text(sg: &dyn SampleGenerator, config: &Config, progress: &ProgressBar) -> String {
    let dims = config.dims;
    let slices: Vec<String> = (0..dims.z)
        .into_par_iter()
        .map(|z| {
            let text = slice_text(sg, dims, z);
            progress.inc(1);
            text
        })
        .collect();

    let mut out = generate_header(config);
    for slice in slices {
        out.push_str(&slice);
    }
    out
}

pub fn generate_vol(config: &Config) -> Result<(), Box<dyn Error>> {
    let gen = get_sample_generator(config);

    let progress = ProgressBar::new(config.dims.z as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} slices")
            .progress_chars("=> "),
    );
    let text = generate_text(gen.as_ref(), config, &progress);
    progress.finish_and_clear();

    let file = open_create_file(&config.file_name)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;

    info!(
        "Generating finished, {} samples written to {:?}",
        config.voxel_count(),
        config.file_name
    );
    Ok(())
}
