use dominant_tiles::{PlanError, ReduceError};
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{PixelFormat, SectionId};
use crate::services::worker_pool::TaskFailure;

/// Top-level error for a downscale run.
#[derive(Debug, Error)]
pub enum ScaleError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Failed to start worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("{} of {total} sections failed", .failures.len())]
    SectionsFailed {
        total: usize,
        failures: Vec<TaskFailure<SectionId>>,
    },
}

/// Invalid arguments, configuration or input geometry.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("factor must be a positive integer, got '{0}'")]
    InvalidFactor(String),

    #[error("thread count must be at least 1")]
    ZeroThreads,

    #[error("{0}")]
    Plan(#[from] PlanError),

    #[error("{0}")]
    Pixels(#[from] ReduceError),

    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Unsupported pixel layout: {0}")]
    UnsupportedLayout(String),

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid in-memory image operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("Pixel buffer has {actual} bytes, expected {expected} for {width}x{height} {format}")]
    BufferLength {
        width: u32,
        height: u32,
        format: PixelFormat,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported band count: {0}")]
    UnsupportedBands(usize),

    #[error("Region {width}x{height} at ({x}, {y}) lies outside the {bounds_width}x{bounds_height} image")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        bounds_width: u32,
        bounds_height: u32,
    },

    #[error("Block {width}x{height} at ({x}, {y}) overlaps an earlier block")]
    Overlap {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// Failure of a single section task.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Region error: {0}")]
    Region(#[from] ImageError),

    #[error("Reduce error: {0}")]
    Reduce(#[from] ReduceError),

    #[error("Task panicked: {0}")]
    Panicked(String),
}
