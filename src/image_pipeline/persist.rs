//! Output module
//!
//! This module writes radiance maps (Radiance RGBE or float TIFF) and tonemapped
//! renderings (JPEG) through a pluggable writer.

mod files;
mod standard_image_writer;
pub mod types;
mod writer;

pub use files::{read_radiance, save_ldr, save_radiance};
pub use standard_image_writer::StandardImageWriter;
pub use types::{DEFAULT_JPEG_QUALITY, RadianceFormat, TiffCompression};
pub use writer::ImageWriter;
