//! Image processing pipeline module
//!
//! This module turns a bracket of differently exposed photographs into a
//! radiance map and tonemapped renderings, with separate modules for loading,
//! exposure metadata, alignment, calibration, merging, tonemapping, output and
//! orchestration.

pub mod align;
pub mod calibrate;
pub mod common;
pub mod conversions;
pub mod exposure;
pub mod load;
pub mod merge;
pub mod persist;
pub mod tonemap;

#[cfg(test)]
pub(crate) mod test_utils;

pub use common::{HdrError, Result};

pub use load::{DirectoryLoader, ExposureSet};

pub use exposure::{ExifExposureReader, ExposureReader, FixedExposureReader};

pub use align::{AlignedExposures, AlignmentConfig, MtbAligner, Shift};

pub use calibrate::{CalibrationConfig, CameraResponse, DebevecCalibrator};

pub use merge::{DebevecMerger, RadianceMap};

pub use tonemap::{
    DragoParams, MantiukParams, ReinhardParams, TonemapConfig, TonemapOperator, ToneMappedImage,
    Tonemapper,
};

pub use persist::{
    ImageWriter, RadianceFormat, StandardImageWriter, TiffCompression, read_radiance, save_ldr,
    save_radiance,
};

pub use conversions::{BatchReport, HdrConfig, HdrConfigBuilder, HdrOutputs, HdrPipeline, PipelineTimings};
