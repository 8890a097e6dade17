//! Path level helpers around [`ImageWriter`].

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use image::RgbImage;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::info;

use crate::image_pipeline::common::error::{HdrError, Result};
use crate::image_pipeline::merge::RadianceMap;
use crate::image_pipeline::persist::types::RadianceFormat;
use crate::image_pipeline::persist::writer::ImageWriter;

fn output_error(path: &Path, e: impl std::fmt::Display) -> HdrError {
    HdrError::OutputWrite(format!("{}: {}", path.display(), e))
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| output_error(parent, e))?;
    }
    Ok(())
}

/// Encodes in memory first; `path` is only created once encoding succeeded.
fn write_file(path: &Path, encode: impl FnOnce(&mut dyn Write) -> Result<()>) -> Result<()> {
    let mut encoded = Vec::new();
    encode(&mut encoded)?;

    create_parent(path)?;
    let mut output = BufWriter::new(File::create(path).map_err(|e| output_error(path, e))?);
    output
        .write_all(&encoded)
        .and_then(|_| output.flush())
        .map_err(|e| output_error(path, e))?;
    info!("saved {}", path.display());
    Ok(())
}

/// Writes `map` to `path` in the format named by its extension.
pub fn save_radiance<W: ImageWriter + ?Sized>(writer: &W, map: &RadianceMap, path: &Path) -> Result<()> {
    let format = RadianceFormat::from_path(path)?;
    write_file(path, |output| writer.write_radiance(map, format, output))
}

pub fn save_ldr<W: ImageWriter + ?Sized>(writer: &W, image: &RgbImage, path: &Path) -> Result<()> {
    write_file(path, |output| writer.write_ldr(image, output))
}

/// Reads back a radiance map written by [`save_radiance`].
pub fn read_radiance(path: &Path) -> Result<RadianceMap> {
    match RadianceFormat::from_path(path)? {
        RadianceFormat::Hdr => {
            let image = image::open(path)
                .map_err(|e| HdrError::Decode(format!("{}: {}", path.display(), e)))?;
            RadianceMap::from_rgb32f(image.to_rgb32f())
        }
        RadianceFormat::Tiff => {
            let file = File::open(path)
                .map_err(|e| HdrError::InputRead(format!("{}: {}", path.display(), e)))?;
            let mut decoder = Decoder::new(BufReader::new(file))
                .map_err(|e| HdrError::Decode(format!("{}: {}", path.display(), e)))?;
            let (width, height) = decoder
                .dimensions()
                .map_err(|e| HdrError::Decode(format!("{}: {}", path.display(), e)))?;

            match decoder.read_image() {
                Ok(DecodingResult::F32(data)) => RadianceMap::new(width, height, data),
                Ok(_) => Err(HdrError::Decode(format!(
                    "{}: not a 32-bit float image",
                    path.display()
                ))),
                Err(e) => Err(HdrError::Decode(format!("{}: {}", path.display(), e))),
            }
        }
    }
}
