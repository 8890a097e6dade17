use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HdrError {
    #[error("Failed to read input: {0}")]
    InputRead(String),

    #[error("Failed to write output file: {0}")]
    OutputWrite(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("No images with extensions {extensions:?} found in {dir}")]
    NoImagesFound { dir: PathBuf, extensions: Vec<String> },

    #[error("No exposure time metadata in {0}")]
    MissingExposure(PathBuf),

    #[error("Invalid exposure time {time} for image {index}")]
    InvalidExposureTime { index: usize, time: f32 },

    #[error("Expected {expected} exposure times, got {found}")]
    ExposureCountMismatch { expected: usize, found: usize },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(u32, u32),

    #[error("Image {index} is {found:?}, expected {expected:?} like the first image")]
    DimensionMismatch {
        index: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("Calibration precondition failed: {0}")]
    CalibrationPrecondition(String),

    #[error("Invalid camera response: {0}")]
    InvalidResponse(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported tonemap operator: {0}")]
    UnsupportedOperator(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Least squares solve failed: {0}")]
    Solver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HdrError>;
