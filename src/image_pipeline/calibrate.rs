//! Radiometric calibration module
//!
//! Recovers the camera response function relating pixel values to exposure.

pub mod debevec;
pub mod types;

pub use debevec::DebevecCalibrator;
pub use types::{CalibrationConfig, CameraResponse, LDR_SIZE, triangle_weight};
