//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, GDAL and JSON errors, and provides semantic variants
//! for malformed input, degenerate normalization bounds and reprojection failures.
use thiserror::Error;

use crate::types::Stage;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::GdalError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No asset with role `{role}` and suffix `{suffix}`")]
    MissingAsset { role: String, suffix: String },

    #[error("Multiple assets with role `{role}` and suffix `{suffix}`: {matches:?}")]
    AmbiguousAsset {
        role: String,
        suffix: String,
        matches: Vec<String>,
    },

    #[error("Band shape mismatch: co-pol is {co_pol:?}, cross-pol is {cross_pol:?}")]
    ShapeMismatch {
        co_pol: (usize, usize),
        cross_pol: (usize, usize),
    },

    #[error("Degenerate normalization range: vmin={vmin}, vmax={vmax} (vmax must exceed vmin)")]
    DegenerateRange { vmin: f64, vmax: f64 },

    #[error("Unsupported CRS `{crs}`: {reason}")]
    UnsupportedCrs { crs: String, reason: String },

    #[error("Warp failed: {0}")]
    Warp(String),

    #[error("Cannot derive output name from `{0}`")]
    InvalidName(String),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Processing error: {0}")]
    Processing(String),
}

/// Failure of a single item, tagged with the stage that failed.
#[derive(Debug, Error)]
#[error("item `{item}` failed during {stage}: {source}")]
pub struct ItemError {
    pub item: String,
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl ItemError {
    pub fn new(item: impl Into<String>, stage: Stage, source: Error) -> Self {
        Self {
            item: item.into(),
            stage,
            source,
        }
    }
}
