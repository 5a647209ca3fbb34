//! Point list export
//!
//! Writes every grid point as one `x y z f` line: world position from origin and
//! spacing, followed by the raw sample. Points run with x fastest, then y, then z.

use std::{
    io::{self, Write},
    path::Path,
};

use log::{info, warn};
use nalgebra::{point, vector, Point3};

use crate::error::LoadError;

use super::{parse::parse_structured_points_lenient, vol_builder::voxel_count, VolumeBuilder};

/// Grid point in world space with its raw value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub position: Point3<f32>,
    pub value: f32,
}

/// All grid points of a parsed volume
///
/// Points without a sample get the value 0.
pub fn point_list(builder: &VolumeBuilder) -> Result<Vec<GridPoint>, LoadError> {
    let size = builder.size.ok_or(LoadError::MissingDimensions)?;
    let count =
        voxel_count(&size).ok_or(LoadError::InvalidDimensions(size.x, size.y, size.z))?;
    let spacing = builder.spacing.unwrap_or_else(|| vector![1.0, 1.0, 1.0]);
    let origin = builder.origin.unwrap_or_else(|| point![0.0, 0.0, 0.0]);
    let samples = builder.samples.as_deref().unwrap_or_default();

    if samples.len() != count {
        warn!(
            "Expected {count} samples, got {}, missing values are written as 0",
            samples.len()
        );
    }

    let mut points = Vec::with_capacity(count);
    for z in 0..size.z {
        for y in 0..size.y {
            for x in 0..size.x {
                let offset = vector![x as f32, y as f32, z as f32].component_mul(&spacing);
                points.push(GridPoint {
                    position: origin + offset,
                    value: samples.get(points.len()).copied().unwrap_or(0.0),
                });
            }
        }
    }
    Ok(points)
}

/// Write `points` as `x y z f` lines, returns the number of lines
pub fn write_point_list<W: Write>(points: &[GridPoint], mut writer: W) -> io::Result<usize> {
    for p in points {
        writeln!(
            writer,
            "{} {} {} {}",
            p.position.x, p.position.y, p.position.z, p.value
        )?;
    }
    writer.flush()?;
    Ok(points.len())
}

/// Convert a structured points file into a point list file
///
/// Malformed sample tokens are skipped. Returns the number of written points.
pub fn convert_to_point_list<P, Q>(input: P, output: Q) -> Result<usize, LoadError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (input, output) = (input.as_ref(), output.as_ref());
    let text = std::fs::read_to_string(input).map_err(|source| LoadError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let points = point_list(&parse_structured_points_lenient(&text)?)?;

    let write_error = |source: io::Error| LoadError::Write {
        path: output.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(output).map_err(write_error)?;
    let written = write_point_list(&points, io::BufWriter::new(file)).map_err(write_error)?;
    info!("Converted {written} points from {input:?} to {output:?}");
    Ok(written)
}

#[cfg(test)]
mod test {
    use super::*;

    const SHIFTED: &str = "# vtk DataFile Version 3.0
shifted
ASCII
DATASET STRUCTURED_POINTS
DIMENSIONS 2 2 1
SPACING 0.5 2 1
ORIGIN 1 0 -1
POINT_DATA 4
SCALARS s float 1
LOOKUP_TABLE default
1.5 bad 2 3
-4
";

    fn read_back(text: &str) -> Vec<[f32; 4]> {
        text.lines()
            .map(|line| {
                let v: Vec<f32> = line.split(' ').map(|t| t.parse().unwrap()).collect();
                [v[0], v[1], v[2], v[3]]
            })
            .collect()
    }

    #[test]
    fn positions_follow_spacing_and_origin() {
        let builder = parse_structured_points_lenient(SHIFTED).unwrap();
        let points = point_list(&builder).unwrap();

        let mut out = Vec::new();
        assert_eq!(write_point_list(&points, &mut out).unwrap(), 4);
        let lines = read_back(&String::from_utf8(out).unwrap());
        assert_eq!(
            lines,
            vec![
                [1.0, 0.0, -1.0, 1.5],
                [1.5, 0.0, -1.0, 2.0],
                [1.0, 2.0, -1.0, 3.0],
                [1.5, 2.0, -1.0, -4.0],
            ]
        );
    }

    #[test]
    fn missing_samples_become_zero() {
        let builder = VolumeBuilder::new()
            .with_size(vector![3, 1, 1])
            .with_samples(vec![7.0]);
        let values: Vec<f32> = point_list(&builder)
            .unwrap()
            .iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, vec![7.0, 0.0, 0.0]);
    }

    #[test]
    fn file_round_trip() {
        let dir = std::env::temp_dir().join("volvis_point_list");
        std::fs::create_dir_all(&dir).unwrap();
        let (input, output) = (dir.join("in.vtk"), dir.join("out.txt"));
        std::fs::write(&input, SHIFTED).unwrap();

        assert_eq!(convert_to_point_list(&input, &output).unwrap(), 4);
        let lines = read_back(&std::fs::read_to_string(&output).unwrap());
        let values: Vec<f32> = lines.iter().map(|l| l[3]).collect();
        assert_eq!(values, vec![1.5, 2.0, 3.0, -4.0]);

        assert!(matches!(
            convert_to_point_list(dir.join("none.vtk"), &output),
            Err(LoadError::Io { .. })
        ));
    }
}
