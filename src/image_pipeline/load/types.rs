//! Exposure set types

use image::RgbImage;

use crate::image_pipeline::common::error::{HdrError, Result};

/// An ordered bracket of 8-bit RGB frames paired with their exposure times.
///
/// All frames share the dimensions of the first one and every exposure time is
/// a finite, positive number of seconds. Both invariants are checked when the
/// set is built, so later stages never see a mismatched batch.
#[derive(Debug, Clone)]
pub struct ExposureSet {
    images: Vec<RgbImage>,
    times: Vec<f32>,
}

impl ExposureSet {
    pub fn new(images: Vec<RgbImage>, times: Vec<f32>) -> Result<Self> {
        // An empty bracket has no frame to take dimensions from.
        if images.is_empty() {
            return Err(HdrError::InvalidDimensions(0, 0));
        }

        if images.len() != times.len() {
            return Err(HdrError::ExposureCountMismatch {
                expected: images.len(),
                found: times.len(),
            });
        }

        for (index, &time) in times.iter().enumerate() {
            if !time.is_finite() || time <= 0.0 {
                return Err(HdrError::InvalidExposureTime { index, time });
            }
        }

        let expected = images[0].dimensions();
        if expected.0 == 0 || expected.1 == 0 {
            return Err(HdrError::InvalidDimensions(expected.0, expected.1));
        }

        for (index, image) in images.iter().enumerate().skip(1) {
            let found = image.dimensions();
            if found != expected {
                return Err(HdrError::DimensionMismatch {
                    index,
                    expected,
                    found,
                });
            }
        }

        Ok(Self { images, times })
    }

    pub fn images(&self) -> &[RgbImage] {
        &self.images
    }

    pub fn times(&self) -> &[f32] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Common `(width, height)` of every frame.
    pub fn dimensions(&self) -> (u32, u32) {
        self.images[0].dimensions()
    }

    /// Number of different exposure times in the set.
    pub fn distinct_times(&self) -> usize {
        let mut sorted = self.times.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted.dedup();
        sorted.len()
    }

    /// Rejects frames larger than `max` on either side.
    pub fn check_max_dimension(&self, max: Option<u32>) -> Result<()> {
        let (width, height) = self.dimensions();
        match max {
            Some(max) if width > max || height > max => {
                Err(HdrError::InvalidDimensions(width, height))
            }
            _ => Ok(()),
        }
    }

    /// Checks what Debevec calibration needs: two frames and two distinct times.
    pub fn check_calibration_preconditions(&self) -> Result<()> {
        if self.len() < 2 {
            return Err(HdrError::CalibrationPrecondition(format!(
                "at least 2 images are required, got {}",
                self.len()
            )));
        }

        let distinct = self.distinct_times();
        if distinct < 2 {
            return Err(HdrError::CalibrationPrecondition(format!(
                "at least 2 distinct exposure times are required, got {}",
                distinct
            )));
        }

        Ok(())
    }

    /// Builds a set with replaced frames and the same exposure times.
    pub fn with_images(&self, images: Vec<RgbImage>) -> Result<Self> {
        Self::new(images, self.times.clone())
    }

    pub fn into_parts(self) -> (Vec<RgbImage>, Vec<f32>) {
        (self.images, self.times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32) -> RgbImage {
        RgbImage::new(width, height)
    }

    #[test]
    fn test_valid_set() {
        let set = ExposureSet::new(vec![frame(4, 3), frame(4, 3)], vec![0.5, 1.0]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.dimensions(), (4, 3));
        assert_eq!(set.distinct_times(), 2);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let result = ExposureSet::new(
            vec![frame(4, 3), frame(4, 3), frame(3, 4)],
            vec![0.5, 1.0, 2.0],
        );
        assert!(matches!(
            result.unwrap_err(),
            HdrError::DimensionMismatch {
                index: 2,
                expected: (4, 3),
                found: (3, 4)
            }
        ));
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let result = ExposureSet::new(vec![frame(2, 2), frame(2, 2)], vec![1.0]);
        assert!(matches!(
            result.unwrap_err(),
            HdrError::ExposureCountMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_non_positive_time_rejected() {
        let result = ExposureSet::new(vec![frame(2, 2), frame(2, 2)], vec![1.0, 0.0]);
        assert!(matches!(
            result.unwrap_err(),
            HdrError::InvalidExposureTime { index: 1, .. }
        ));

        let result = ExposureSet::new(vec![frame(2, 2)], vec![f32::NAN]);
        assert!(matches!(
            result.unwrap_err(),
            HdrError::InvalidExposureTime { index: 0, .. }
        ));
    }

    #[test]
    fn test_empty_set_rejected() {
        let result = ExposureSet::new(Vec::new(), Vec::new());
        assert!(matches!(result.unwrap_err(), HdrError::InvalidDimensions(0, 0)));
    }

    #[test]
    fn test_empty_frame_rejected() {
        let result = ExposureSet::new(vec![frame(0, 0)], vec![1.0]);
        assert!(matches!(result.unwrap_err(), HdrError::InvalidDimensions(0, 0)));
    }

    #[test]
    fn test_calibration_needs_distinct_times() {
        let set = ExposureSet::new(vec![frame(2, 2), frame(2, 2)], vec![0.25, 0.25]).unwrap();
        assert_eq!(set.distinct_times(), 1);
        assert!(matches!(
            set.check_calibration_preconditions().unwrap_err(),
            HdrError::CalibrationPrecondition(_)
        ));

        let single = ExposureSet::new(vec![frame(2, 2)], vec![0.25]).unwrap();
        assert!(single.check_calibration_preconditions().is_err());
    }

    #[test]
    fn test_max_dimension() {
        let set = ExposureSet::new(vec![frame(10, 5)], vec![1.0]).unwrap();
        assert!(set.check_max_dimension(None).is_ok());
        assert!(set.check_max_dimension(Some(10)).is_ok());
        assert!(matches!(
            set.check_max_dimension(Some(8)).unwrap_err(),
            HdrError::InvalidDimensions(10, 5)
        ));
    }
}
