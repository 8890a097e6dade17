use std::io::{Cursor, Write};

use image::codecs::hdr::HdrEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{Compression, TiffEncoder, colortype};
use tracing::debug;

use crate::image_pipeline::common::error::{HdrError, Result};
use crate::image_pipeline::merge::RadianceMap;
use crate::image_pipeline::persist::types::{DEFAULT_JPEG_QUALITY, RadianceFormat, TiffCompression};
use crate::image_pipeline::persist::writer::ImageWriter;

/// Writes radiance maps as RGBE or float TIFF and LDR images as JPEG.
#[derive(Debug, Clone, Copy)]
pub struct StandardImageWriter {
    jpeg_quality: u8,
    tiff_compression: TiffCompression,
}

impl Default for StandardImageWriter {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY, TiffCompression::default())
    }
}

impl StandardImageWriter {
    /// `jpeg_quality` is clamped to 1..=100.
    pub fn new(jpeg_quality: u8, tiff_compression: TiffCompression) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
            tiff_compression,
        }
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    fn write_hdr(&self, map: &RadianceMap, output: &mut dyn Write) -> Result<()> {
        let pixels: Vec<Rgb<f32>> = map
            .data()
            .chunks_exact(3)
            .map(|p| Rgb([p[0], p[1], p[2]]))
            .collect();

        let mut buffer = Vec::new();
        HdrEncoder::new(&mut buffer)
            .encode(&pixels, map.width() as usize, map.height() as usize)
            .map_err(|e| HdrError::Encode(e.to_string()))?;

        output.write_all(&buffer)?;
        Ok(())
    }

    fn write_tiff(&self, map: &RadianceMap, output: &mut dyn Write) -> Result<()> {
        let compression = match self.tiff_compression {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        };

        let mut buffer = Vec::new();
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| HdrError::Encode(e.to_string()))?
            .with_compression(compression);

        encoder
            .write_image::<colortype::RGB32Float>(map.width(), map.height(), map.data())
            .map_err(|e| HdrError::Encode(e.to_string()))?;

        output.write_all(&buffer)?;
        Ok(())
    }
}

impl ImageWriter for StandardImageWriter {
    fn write_radiance(&self, map: &RadianceMap, format: RadianceFormat, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding {}x{} radiance map as {:?}", map.width(), map.height(), format);
        match format {
            RadianceFormat::Hdr => self.write_hdr(map, output),
            RadianceFormat::Tiff => self.write_tiff(map, output),
        }
    }

    fn write_ldr(&self, image: &RgbImage, output: &mut dyn Write) -> Result<()> {
        debug!(
            "Encoding {}x{} JPEG at quality {}",
            image.width(),
            image.height(),
            self.jpeg_quality
        );

        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, self.jpeg_quality)
            .encode_image(image)
            .map_err(|e| HdrError::Encode(e.to_string()))?;

        output.write_all(&buffer)?;
        Ok(())
    }
}
