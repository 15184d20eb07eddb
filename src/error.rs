use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum ZonalStatsError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("String contains an interior nul byte: {0}")]
    Nul(#[from] std::ffi::NulError),

    #[error("Rasters do not overlap: {landcover} and {sample}")]
    NoOverlap { landcover: PathBuf, sample: PathBuf },

    #[error("Raster has invalid pixel size: {0}")]
    InvalidPixelSize(f64),

    #[error("GDALWarp failed for {path}: {message}")]
    Warp { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, ZonalStatsError>;
