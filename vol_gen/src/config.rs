use std::{ffi::OsString, str::FromStr};

use clap::ArgMatches;
use nalgebra::{vector, Vector3};

/// Transform `Values` into `Vector`
fn values_to_vector3<T>(args: &ArgMatches, key: &str) -> Result<Vector3<T>, String>
where
    T: FromStr + Copy,
{
    let vals = args
        .values_of(key)
        .ok_or_else(|| format!("missing {key}"))?
        .map(|v| v.parse::<T>().map_err(|_| format!("cannot parse {key} value {v:?}")))
        .collect::<Result<Vec<T>, String>>()?;
    match vals[..] {
        [x, y, z] => Ok(vector![x, y, z]),
        _ => Err(format!("{key} needs 3 values")),
    }
}

fn parse_value<T: FromStr>(args: &ArgMatches, key: &str) -> Result<T, String> {
    let raw = args
        .value_of(key)
        .ok_or_else(|| format!("missing --{key}"))?;
    raw.parse()
        .map_err(|_| format!("cannot parse --{key} value {raw:?}"))
}

/// App configuration
/// Config is built from args parsed by `clap`
#[derive(Debug)]
pub struct Config {
    /// Dimensions of volume
    pub dims: Vector3<u32>,
    /// Distance between samples
    pub spacing: Vector3<f32>,
    /// Type of generator to be used
    pub generator: GeneratorConfig,
    // Output file name
    pub file_name: OsString,
    /// Optional seed for RNG, to replicate results
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_args(args: ArgMatches) -> Result<Config, String> {
        let dims = values_to_vector3(&args, "dims")?;
        let spacing = values_to_vector3(&args, "spacing")?;
        let generator = GeneratorConfig::from_args(&args)?;
        let file_name = args
            .value_of_os("output-file")
            .ok_or("missing output file")?
            .into();
        let seed = match args.value_of("seed") {
            Some(_) => Some(parse_value(&args, "seed")?),
            None => None,
        };

        Ok(Config {
            dims,
            spacing,
            generator,
            file_name,
            seed,
        })
    }

    pub fn voxel_count(&self) -> usize {
        self.dims.iter().map(|&d| d as usize).product()
    }
}

/// Settings specific to generator variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeneratorConfig {
    /// Randomly placed cuboids and spheres
    Shapes {
        n_of_shapes: usize,
        sample: u8,
        obj_size: u32,
    },
    /// Radial gradient, 255 in the center falling to 0 at the faces
    Sphere,
    /// Solid block with an empty border
    Solid { sample: u8 },
}

impl GeneratorConfig {
    pub fn from_args(args: &ArgMatches) -> Result<GeneratorConfig, String> {
        let name = args.value_of("generator").ok_or("missing --generator")?;
        match name {
            "shapes" => Ok(GeneratorConfig::Shapes {
                n_of_shapes: parse_value(args, "n-of-shapes")?,
                sample: parse_value(args, "sample")?,
                obj_size: parse_value(args, "object-size")?,
            }),
            "sphere" => Ok(GeneratorConfig::Sphere),
            "solid" => Ok(GeneratorConfig::Solid {
                sample: parse_value(args, "sample")?,
            }),
            other => Err(format!("unknown generator {other:?}")),
        }
    }
}
