//! Error types of the library
//!
//! Every fallible operation reports one of the enums below.
//! [`VolvisError`] unifies them for callers that do not care which stage failed.

use std::path::PathBuf;

use thiserror::Error;

use crate::render::TechniqueKind;

/// Failure while reading or parsing a volume file.
///
/// No partially parsed volume is ever produced alongside an error.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read volume file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("volume header has no DIMENSIONS line")]
    MissingDimensions,
    #[error("volume dimensions {0}x{1}x{2} must be nonzero and their product must fit in memory")]
    InvalidDimensions(usize, usize, usize),
    #[error("malformed {keyword} line: {line:?}")]
    InvalidHeader { keyword: &'static str, line: String },
    #[error("volume has no data block (no LOOKUP_TABLE or COLOR_SCALARS line)")]
    MissingDataBlock,
    #[error("data block holds {found} samples, {expected} expected")]
    SampleCount { expected: usize, found: usize },
    #[error("sample {index} is not a number: {token:?}")]
    InvalidSample { index: usize, token: String },
}

/// Rejected edit of the transfer function.
#[derive(Debug, Error, PartialEq)]
pub enum TransferFunctionError {
    #[error("control point {0} does not exist")]
    NoSuchPoint(usize),
    #[error("control point {0} is a boundary point and cannot be removed")]
    BoundaryRemoval(usize),
    #[error("boundary point {index} is pinned at iso {pinned}")]
    PinnedBoundary { index: usize, pinned: f32 },
    #[error("another control point already sits at iso {0}")]
    DuplicateIso(f32),
    #[error("value is not a number")]
    NotANumber,
}

/// Failure of a rendering technique or of the device backing it.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{technique} is not supported: {reason}")]
    Unsupported {
        technique: TechniqueKind,
        reason: String,
    },
    #[error("texture of {width}x{height} exceeds device limit {limit}")]
    TextureTooLarge {
        width: usize,
        height: usize,
        limit: usize,
    },
    #[error("invalid value {value} for {option}")]
    InvalidOption { option: &'static str, value: f32 },
}

/// Failure while decoding a landscape payload.
#[derive(Debug, Error)]
pub enum LandscapeError {
    #[error("cannot decode landscape payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read landscape payload {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Any error produced by this library.
#[derive(Debug, Error)]
pub enum VolvisError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    TransferFunction(#[from] TransferFunctionError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Landscape(#[from] LandscapeError),
}

pub type Result<T, E = VolvisError> = std::result::Result<T, E>;
