use std::io::Write;

use image::RgbImage;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::merge::RadianceMap;
use crate::image_pipeline::persist::types::RadianceFormat;

pub trait ImageWriter {
    fn write_radiance(&self, map: &RadianceMap, format: RadianceFormat, output: &mut dyn Write) -> Result<()>;
    fn write_ldr(&self, image: &RgbImage, output: &mut dyn Write) -> Result<()>;
}
