use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by loading, binning and classification.
///
/// Precondition violations (empty distributions, bad palette sizes, coordinates
/// outside the globe) are reported here rather than producing a partial heatmap.
#[derive(Error, Debug)]
pub enum HeatmapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid coordinate: {0}")]
    InvalidLatLng(#[from] h3o::error::InvalidLatLng),

    #[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
    CoordinateOutOfRange { latitude: f64, longitude: f64 },

    #[error("cannot compute quantiles of an empty distribution")]
    EmptyDistribution,

    #[error("palette size must be positive, got {0}")]
    InvalidPaletteSize(usize),

    #[error("invalid color literal: {0:?}")]
    InvalidColor(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("missing column {column:?} in {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("malformed row at {path}:{line}: {reason}")]
    MalformedRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, HeatmapError>;
