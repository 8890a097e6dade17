//! Output format types

use std::path::Path;
use std::str::FromStr;

use crate::image_pipeline::common::error::{HdrError, Result};

pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Container used for the floating point radiance map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RadianceFormat {
    /// Radiance RGBE (`.hdr`), shared exponent, about 1% precision
    #[default]
    Hdr,
    /// 32-bit float RGB TIFF, lossless
    Tiff,
}

impl RadianceFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            RadianceFormat::Hdr => "hdr",
            RadianceFormat::Tiff => "tiff",
        }
    }

    /// Picks the format from a file extension (`.hdr`, `.tif`, `.tiff`).
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| HdrError::UnsupportedFormat(path.display().to_string()))?
            .parse()
            .map_err(|_| HdrError::UnsupportedFormat(path.display().to_string()))
    }
}

impl FromStr for RadianceFormat {
    type Err = HdrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "hdr" => Ok(RadianceFormat::Hdr),
            "tif" | "tiff" => Ok(RadianceFormat::Tiff),
            _ => Err(HdrError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    #[default]
    None,
    /// LZW compression (slow, good compression)
    Lzw,
    /// Deflate compression - fast level
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

impl FromStr for TiffCompression {
    type Err = HdrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(TiffCompression::None),
            "lzw" => Ok(TiffCompression::Lzw),
            "deflate-fast" => Ok(TiffCompression::DeflateFast),
            "deflate" | "deflate-balanced" => Ok(TiffCompression::DeflateBalanced),
            "deflate-best" => Ok(TiffCompression::DeflateBest),
            _ => Err(HdrError::UnsupportedFormat(format!("tiff compression {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radiance_format_from_path() {
        assert_eq!(RadianceFormat::from_path(Path::new("out/hdrDebevec.hdr")).unwrap(), RadianceFormat::Hdr);
        assert_eq!(RadianceFormat::from_path(Path::new("a.TIF")).unwrap(), RadianceFormat::Tiff);
        assert_eq!(RadianceFormat::from_path(Path::new("a.tiff")).unwrap(), RadianceFormat::Tiff);

        assert!(matches!(
            RadianceFormat::from_path(Path::new("a.exr")).unwrap_err(),
            HdrError::UnsupportedFormat(_)
        ));
        assert!(RadianceFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_compression_names() {
        assert_eq!("LZW".parse::<TiffCompression>().unwrap(), TiffCompression::Lzw);
        assert_eq!("deflate".parse::<TiffCompression>().unwrap(), TiffCompression::DeflateBalanced);
        assert!("zstd".parse::<TiffCompression>().is_err());
    }
}
