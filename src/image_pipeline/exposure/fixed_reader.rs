use std::path::PathBuf;

use crate::image_pipeline::common::error::{HdrError, Result};
use crate::image_pipeline::exposure::reader::ExposureReader;

/// Exposure times supplied by the caller, paired with files by position.
#[derive(Debug, Clone)]
pub struct FixedExposureReader {
    times: Vec<f32>,
}

impl FixedExposureReader {
    pub fn new(times: Vec<f32>) -> Self {
        Self { times }
    }

    pub fn times(&self) -> &[f32] {
        &self.times
    }
}

impl ExposureReader for FixedExposureReader {
    fn read_exposures(&self, files: &[PathBuf]) -> Result<Vec<f32>> {
        if files.len() != self.times.len() {
            return Err(HdrError::ExposureCountMismatch {
                expected: files.len(),
                found: self.times.len(),
            });
        }
        Ok(self.times.clone())
    }
}
