//! Exposure metadata module
//!
//! This module derives one exposure time per input file, either from EXIF or
//! from an explicit list.

mod exif_reader;
mod fixed_reader;
mod reader;

pub use exif_reader::{ExifExposureReader, exposure_seconds, shutter_speed_seconds};
pub use fixed_reader::FixedExposureReader;
pub use reader::ExposureReader;
