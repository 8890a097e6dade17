//! Pipeline orchestration module
//!
//! This module drives a bracket through load, align, calibrate, merge, tonemap
//! and persist, and records how long each stage took.

pub mod config;
mod hdr_fusion;
pub mod timing;


pub use config::{HdrConfig, HdrConfigBuilder, RADIANCE_STEM};
pub use hdr_fusion::{BatchReport, HdrOutputs, HdrPipeline, output_dir_for};
pub use timing::PipelineTimings;
