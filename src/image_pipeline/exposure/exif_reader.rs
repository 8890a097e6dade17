//! Exposure reader backed by EXIF metadata.
//!
//! Uses the kamadak-exif crate to pull the `ExposureTime` tag out of each file's
//! container (JPEG, TIFF, HEIF, PNG and WebP are understood by the parser).

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use exif::{In, Tag, Value};
use tracing::debug;

use crate::image_pipeline::common::error::{HdrError, Result};
use crate::image_pipeline::exposure::reader::ExposureReader;

/// Reads exposure times from the primary IFD of each image.
///
/// A file without EXIF, or with EXIF but no exposure tag, is an error. There is
/// no default sequence to fall back on; callers that know the times should use
/// [`FixedExposureReader`](crate::image_pipeline::exposure::FixedExposureReader).
pub struct ExifExposureReader;

/// Converts an EXIF `ExposureTime` value to seconds.
///
/// Returns `None` for an empty value, a zero denominator or a value that is
/// not an unsigned rational.
pub fn exposure_seconds(value: &Value) -> Option<f64> {
    match value {
        Value::Rational(values) => values
            .first()
            .filter(|r| r.denom != 0)
            .map(|r| r.to_f64()),
        _ => None,
    }
}

/// Converts an APEX `ShutterSpeedValue` (`Tv = -log2(t)`) to seconds.
pub fn shutter_speed_seconds(value: &Value) -> Option<f64> {
    match value {
        Value::SRational(values) => values
            .first()
            .filter(|r| r.denom != 0)
            .map(|r| (-r.to_f64()).exp2()),
        _ => None,
    }
}

impl ExifExposureReader {
    fn read_one(&self, index: usize, path: &Path) -> Result<f32> {
        let file = File::open(path)
            .map_err(|e| HdrError::InputRead(format!("{}: {}", path.display(), e)))?;
        let mut reader = BufReader::new(&file);

        let exif = match exif::Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => {
                return Err(HdrError::MissingExposure(path.to_path_buf()));
            }
            Err(exif::Error::Io(e)) => {
                return Err(HdrError::InputRead(format!("{}: {}", path.display(), e)));
            }
            Err(e) => {
                return Err(HdrError::Decode(format!("{}: {}", path.display(), e)));
            }
        };

        let seconds = exif
            .get_field(Tag::ExposureTime, In::PRIMARY)
            .and_then(|f| exposure_seconds(&f.value))
            .or_else(|| {
                exif.get_field(Tag::ShutterSpeedValue, In::PRIMARY)
                    .and_then(|f| shutter_speed_seconds(&f.value))
            })
            .ok_or_else(|| HdrError::MissingExposure(path.to_path_buf()))?;

        let time = seconds as f32;
        if !time.is_finite() || time <= 0.0 {
            return Err(HdrError::InvalidExposureTime { index, time });
        }

        debug!("{}: exposure {}s", path.display(), time);
        Ok(time)
    }
}

impl ExposureReader for ExifExposureReader {
    fn read_exposures(&self, files: &[PathBuf]) -> Result<Vec<f32>> {
        files
            .iter()
            .enumerate()
            .map(|(index, path)| self.read_one(index, path))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exif::experimental::Writer;
    use exif::{Field, Rational, SRational};
    use image::codecs::jpeg::JpegEncoder;
    use std::io::Cursor;

    /// A small JPEG carrying `fields` in an APP1 Exif segment.
    fn jpeg_with_exif(fields: &[Field]) -> Vec<u8> {
        let mut tiff = Cursor::new(Vec::new());
        let mut writer = Writer::new();
        for field in fields {
            writer.push_field(field);
        }
        writer.write(&mut tiff, false).unwrap();
        let tiff = tiff.into_inner();

        let mut jpeg = Vec::new();
        JpegEncoder::new(&mut jpeg)
            .encode_image(&image::RgbImage::new(8, 8))
            .unwrap();

        let mut app1 = vec![0xFF, 0xE1];
        app1.extend(((2 + 6 + tiff.len()) as u16).to_be_bytes());
        app1.extend(b"Exif\0\0");
        app1.extend(tiff);

        // Right after SOI.
        let mut out = jpeg[..2].to_vec();
        out.extend(app1);
        out.extend(&jpeg[2..]);
        out
    }

    fn field(tag: Tag, value: Value) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value,
        }
    }

    #[test]
    fn test_exposure_seconds_from_rational() {
        let value = Value::Rational(vec![Rational { num: 1, denom: 30 }]);
        let seconds = exposure_seconds(&value).unwrap();
        assert!((seconds - 1.0 / 30.0).abs() < 1e-12);

        let value = Value::Rational(vec![Rational { num: 5, denom: 2 }]);
        assert_eq!(exposure_seconds(&value), Some(2.5));
    }

    #[test]
    fn test_exposure_seconds_rejects_bad_values() {
        assert_eq!(
            exposure_seconds(&Value::Rational(vec![Rational { num: 1, denom: 0 }])),
            None
        );
        assert_eq!(exposure_seconds(&Value::Rational(vec![])), None);
        assert_eq!(exposure_seconds(&Value::Short(vec![30])), None);
    }

    #[test]
    fn test_shutter_speed_seconds() {
        let value = Value::SRational(vec![SRational { num: 5, denom: 1 }]);
        let seconds = shutter_speed_seconds(&value).unwrap();
        assert!((seconds - 1.0 / 32.0).abs() < 1e-12);
    }

    #[test]
    fn test_reads_exposure_time_from_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let short = dir.path().join("short.jpg");
        let long = dir.path().join("long.jpg");
        std::fs::write(
            &short,
            jpeg_with_exif(&[field(Tag::ExposureTime, Value::Rational(vec![Rational { num: 1, denom: 30 }]))]),
        )
        .unwrap();
        std::fs::write(
            &long,
            jpeg_with_exif(&[field(Tag::ExposureTime, Value::Rational(vec![Rational { num: 15, denom: 1 }]))]),
        )
        .unwrap();

        let times = ExifExposureReader.read_exposures(&[short, long]).unwrap();

        assert!((times[0] - 1.0 / 30.0).abs() < 1e-6, "{}", times[0]);
        assert_eq!(times[1], 15.0);
    }

    #[test]
    fn test_falls_back_to_shutter_speed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apex.jpg");
        std::fs::write(
            &path,
            jpeg_with_exif(&[field(Tag::ShutterSpeedValue, Value::SRational(vec![SRational { num: 5, denom: 1 }]))]),
        )
        .unwrap();

        let times = ExifExposureReader.read_exposures(&[path]).unwrap();

        assert!((times[0] - 1.0 / 32.0).abs() < 1e-6, "{}", times[0]);
    }

    #[test]
    fn test_exif_without_exposure_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iso-only.jpg");
        std::fs::write(
            &path,
            jpeg_with_exif(&[field(Tag::PhotographicSensitivity, Value::Short(vec![100]))]),
        )
        .unwrap();

        let result = ExifExposureReader.read_exposures(&[path.clone()]);
        assert!(matches!(result.unwrap_err(), HdrError::MissingExposure(p) if p == path));
    }

    #[test]
    fn test_missing_exif_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.jpg");
        image::RgbImage::new(8, 8).save(&path).unwrap();

        let result = ExifExposureReader.read_exposures(&[path.clone()]);
        match result.unwrap_err() {
            HdrError::MissingExposure(p) => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ExifExposureReader.read_exposures(&[dir.path().join("missing.jpg")]);
        assert!(matches!(result.unwrap_err(), HdrError::InputRead(_)));
    }
}
