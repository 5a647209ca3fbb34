//! Parser of ASCII structured points volumes
//!
//! Recognized header lines:
//! ```text
//! DIMENSIONS nx ny nz
//! SPACING sx sy sz        (ASPECT_RATIO is accepted as an alias)
//! ORIGIN ox oy oz
//! ```
//! Samples follow the first line containing `LOOKUP_TABLE` or `COLOR_SCALARS`,
//! separated by any whitespace. Other header lines are skipped.

use log::{debug, warn};
use nalgebra::{point, vector, Vector3};
use nom::{
    bytes::complete::tag_no_case,
    character::complete::{space0, space1, u64 as parse_u64},
    combinator::{map, opt},
    number::complete::float,
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::LoadError;

use super::{vol_builder::voxel_count, VolumeBuilder};

const DATA_MARKERS: [&str; 2] = ["LOOKUP_TABLE", "COLOR_SCALARS"];

/// Three whitespace separated values
fn triple<'a, T, F>(mut item: F) -> impl FnMut(&'a str) -> IResult<&'a str, Vector3<T>>
where
    T: nalgebra::Scalar,
    F: FnMut(&'a str) -> IResult<&'a str, T>,
{
    move |s: &'a str| {
        let (s, x) = item(s)?;
        let (s, y) = preceded(space1, &mut item)(s)?;
        let (s, z) = preceded(space1, &mut item)(s)?;
        Ok((s, vector![x, y, z]))
    }
}

/// `KEYWORD a b c`, keyword case insensitive
fn keyword_line<'a, T, F>(
    keyword: &'static str,
    item: F,
) -> impl FnMut(&'a str) -> IResult<&'a str, Vector3<T>>
where
    T: nalgebra::Scalar,
    F: FnMut(&'a str) -> IResult<&'a str, T>,
{
    preceded(tuple((space0, tag_no_case(keyword), space1)), triple(item))
}

fn dimensions(s: &str) -> IResult<&str, Vector3<usize>> {
    keyword_line("DIMENSIONS", map(parse_u64, |v| v as usize))(s)
}

fn spacing(s: &str) -> IResult<&str, Vector3<f32>> {
    // ASPECT_RATIO is what older writers emit
    let (s, v) = opt(keyword_line("SPACING", float))(s)?;
    match v {
        Some(v) => Ok((s, v)),
        None => keyword_line("ASPECT_RATIO", float)(s),
    }
}

fn origin(s: &str) -> IResult<&str, Vector3<f32>> {
    keyword_line("ORIGIN", float)(s)
}

fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    line.trim_start()
        .get(..keyword.len())
        .map_or(false, |head| head.eq_ignore_ascii_case(keyword))
}

/// Parse a header line into `builder`, lines without a known keyword are ignored
fn header_line(line: &str, builder: &mut VolumeBuilder) -> Result<(), LoadError> {
    let invalid = |keyword| LoadError::InvalidHeader {
        keyword,
        line: line.trim().to_owned(),
    };

    if starts_with_keyword(line, "DIMENSIONS") {
        let (_, dims) = dimensions(line).map_err(|_| invalid("DIMENSIONS"))?;
        builder.size = Some(dims);
    } else if starts_with_keyword(line, "SPACING") || starts_with_keyword(line, "ASPECT_RATIO") {
        let (_, sp) = spacing(line).map_err(|_| invalid("SPACING"))?;
        builder.spacing = Some(sp);
    } else if starts_with_keyword(line, "ORIGIN") {
        let (_, o) = origin(line).map_err(|_| invalid("ORIGIN"))?;
        builder.origin = Some(point![o.x, o.y, o.z]);
    }
    Ok(())
}

/// Header lines up to the data block marker, returns the builder and expected sample count
fn read_header<'a, I>(lines: &mut I) -> Result<(VolumeBuilder, usize), LoadError>
where
    I: Iterator<Item = &'a str>,
{
    let mut builder = VolumeBuilder::new();
    let mut found_data = false;

    for line in lines {
        if DATA_MARKERS.iter().any(|marker| line.contains(marker)) {
            found_data = true;
            break;
        }
        header_line(line, &mut builder)?;
    }

    let size = builder.size.ok_or(LoadError::MissingDimensions)?;
    let expected =
        voxel_count(&size).ok_or(LoadError::InvalidDimensions(size.x, size.y, size.z))?;
    if !found_data {
        return Err(LoadError::MissingDataBlock);
    }
    Ok((builder, expected))
}

/// Parse the whole file into a builder
///
/// Only the first `nx * ny * nz` tokens of the data block are read, anything after them is ignored.
/// Missing samples are reported by [`VolumeBuilder::build`].
pub fn parse_structured_points(text: &str) -> Result<VolumeBuilder, LoadError> {
    let mut lines = text.lines();
    let (mut builder, expected) = read_header(&mut lines)?;

    let mut tokens = lines.flat_map(str::split_whitespace);
    let samples = tokens
        .by_ref()
        .take(expected)
        .enumerate()
        .map(|(index, token)| {
            token.parse::<f32>().map_err(|_| LoadError::InvalidSample {
                index,
                token: token.to_owned(),
            })
        })
        .collect::<Result<Vec<f32>, LoadError>>()?;

    let surplus = tokens.count();
    if surplus > 0 {
        debug!("Ignoring {surplus} tokens after the data block");
    }

    builder.samples = Some(samples);
    Ok(builder)
}

/// Like [`parse_structured_points`], but tokens that are not numbers are skipped
///
/// Reading stops once `nx * ny * nz` samples are collected. The sample count
/// is not checked, there may be fewer samples than grid points.
pub fn parse_structured_points_lenient(text: &str) -> Result<VolumeBuilder, LoadError> {
    let mut lines = text.lines();
    let (mut builder, expected) = read_header(&mut lines)?;

    let mut samples = Vec::new();
    let mut skipped = 0;
    for token in lines.flat_map(str::split_whitespace) {
        if samples.len() == expected {
            break;
        }
        match token.parse::<f32>() {
            Ok(v) => samples.push(v),
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("Skipped {skipped} malformed sample tokens");
    }

    builder.samples = Some(samples);
    Ok(builder)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn header_lines() {
        assert_eq!(
            dimensions("DIMENSIONS 10 20 3").unwrap().1,
            vector![10, 20, 3]
        );
        assert_eq!(
            spacing("  spacing 1.5 2 1e-1").unwrap().1,
            vector![1.5, 2.0, 0.1]
        );
        assert_eq!(
            spacing("ASPECT_RATIO 1 1 2").unwrap().1,
            vector![1.0, 1.0, 2.0]
        );
        assert_eq!(origin("ORIGIN -1 0 0.5").unwrap().1, vector![-1.0, 0.0, 0.5]);
        assert!(dimensions("DIMENSIONS 10 20").is_err());
    }

    #[test]
    fn malformed_dimensions() {
        let text = "DIMENSIONS 2 x 2\nLOOKUP_TABLE default\n1 2 3 4";
        assert!(matches!(
            parse_structured_points(text),
            Err(LoadError::InvalidHeader {
                keyword: "DIMENSIONS",
                ..
            })
        ));
    }

    #[test]
    fn missing_parts() {
        let text = "SPACING 1 1 1\nLOOKUP_TABLE default\n1 2";
        assert!(matches!(
            parse_structured_points(text),
            Err(LoadError::MissingDimensions)
        ));

        let text = "DIMENSIONS 1 1 2\nSCALARS s float\n1 2";
        assert!(matches!(
            parse_structured_points(text),
            Err(LoadError::MissingDataBlock)
        ));
    }

    #[test]
    fn bad_sample_token() {
        let text = "DIMENSIONS 2 1 1\nLOOKUP_TABLE default\n1 abc";
        match parse_structured_points(text) {
            Err(LoadError::InvalidSample { index, token }) => {
                assert_eq!(index, 1);
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn trailing_text_after_samples() {
        let text = "DIMENSIONS 2 1 1\nLOOKUP_TABLE default\n1 2\nFIELD FieldData 1\n";
        let builder = parse_structured_points(text).unwrap();
        assert_eq!(builder.samples, Some(vec![1.0, 2.0]));
    }

    #[test]
    fn huge_dimensions_rejected() {
        let text = "DIMENSIONS 4294967296 4294967296 2\nLOOKUP_TABLE default\n1 2";
        assert!(matches!(
            parse_structured_points(text),
            Err(LoadError::InvalidDimensions(_, _, 2))
        ));
    }

    #[test]
    fn lenient_skips_bad_tokens() {
        let text = "DIMENSIONS 3 1 1\nLOOKUP_TABLE default\n1 n/a 2 3 4";
        let builder = parse_structured_points_lenient(text).unwrap();
        assert_eq!(builder.samples, Some(vec![1.0, 2.0, 3.0]));

        let short = "DIMENSIONS 3 1 1\nLOOKUP_TABLE default\n1 x";
        let builder = parse_structured_points_lenient(short).unwrap();
        assert_eq!(builder.samples, Some(vec![1.0]));

        let headless = "LOOKUP_TABLE default\n1 2 3";
        assert!(matches!(
            parse_structured_points_lenient(headless),
            Err(LoadError::MissingDimensions)
        ));
    }

    #[test]
    fn color_scalars_marker() {
        let text = "DIMENSIONS 2 1 1\nCOLOR_SCALARS c 1\n0.25\n0.75\n";
        let builder = parse_structured_points(text).unwrap();
        assert_eq!(builder.samples, Some(vec![0.25, 0.75]));
        assert_eq!(builder.spacing, None);
    }
}
