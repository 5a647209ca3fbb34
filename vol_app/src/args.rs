//! Argument parsing and validation

use clap::{Arg, Command, ValueHint};

pub fn is_positive_number(num: &str) -> Result<(), String> {
    match num.parse::<usize>() {
        Ok(n) if n > 0 => Ok(()),
        Ok(_) => Err("Number must be greater than 0".into()),
        Err(_) => Err("Number required".into()),
    }
}

pub fn is_float_number(num: &str) -> Result<(), String> {
    match num.parse::<f32>() {
        Ok(n) if n.is_finite() => Ok(()),
        _ => Err("Finite number required".into()),
    }
}

pub const TECHNIQUE_NAMES: &[&str] = &["object-aligned", "view-aligned", "ray-marching", "all"];
pub const POLICY_NAMES: &[&str] = &["rescale", "clamp"];

pub fn get_command<'a>() -> Command<'a> {
    Command::new("vol_app")
        .version("0.1.0")
        .about("Renders a volume and a topological landscape into PNG frames")
        .arg(
            Arg::new("volume")
                .help("Structured points volume file")
                .value_name("FILE")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("landscape")
                .help("Landscape JSON payload")
                .long("landscape")
                .short('l')
                .value_name("FILE")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("technique")
                .help("Rendering technique")
                .long("technique")
                .short('t')
                .value_name("NAME")
                .possible_values(TECHNIQUE_NAMES)
                .default_value("all"),
        )
        .arg(
            Arg::new("size")
                .help("Frame size in pixels")
                .long("size")
                .number_of_values(2)
                .value_names(&["WIDTH", "HEIGHT"])
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .require_equals(true)
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("frames")
                .help("Frames written per technique, the camera orbits between them")
                .long("frames")
                .short('n')
                .value_name("N")
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("output-dir")
                .help("Directory for written frames")
                .long("output-dir")
                .short('o')
                .value_name("DIR")
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("policy")
                .help("Normalization of raw samples")
                .long("policy")
                .value_name("POLICY")
                .possible_values(POLICY_NAMES)
                .default_value("rescale"),
        )
        .arg(
            Arg::new("select")
                .help("Select a landscape node, highlights its value in the volume")
                .long("select")
                .value_name("NODE")
                .requires("landscape")
                .validator(|s| s.parse::<usize>().map(|_| ()).map_err(|e| e.to_string())),
        )
        .arg(
            Arg::new("brightness")
                .help("Intensity multiplier")
                .long("brightness")
                .value_name("FACTOR")
                .validator(is_float_number),
        )
        .arg(
            Arg::new("no-3d")
                .help("Pack volumes into a 2D atlas instead of 3D textures")
                .long("no-3d"),
        )
        .arg(
            Arg::new("hide-surface")
                .help("Draw only the landscape graph")
                .long("hide-surface"),
        )
}
