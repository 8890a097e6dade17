use std::path::PathBuf;

use crate::image_pipeline::common::error::Result;

pub trait ExposureReader {
    /// One exposure time in seconds per file, in the same order as `files`.
    fn read_exposures(&self, files: &[PathBuf]) -> Result<Vec<f32>>;
}
