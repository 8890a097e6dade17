//! Median threshold bitmap (MTB) alignment.
//!
//! Ward's exposure invariant registration: every frame is reduced to a bitmap
//! of "brighter than the median" pixels, which looks the same whatever the
//! exposure. Translations are searched coarse-to-fine over an image pyramid,
//! testing the 3x3 neighbourhood of the doubled estimate at each level.

use image::RgbImage;
use tracing::{debug, info};

use crate::image_pipeline::align::types::{AlignedExposures, AlignmentConfig, Shift};
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::load::ExposureSet;

const HISTOGRAM_SIZE: usize = 256;

/// Single channel 8-bit plane used for bitmap computation.
#[derive(Debug, Clone)]
pub(crate) struct GrayPlane {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayPlane {
    pub fn from_rgb(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let data = image
            .pixels()
            .map(|p| {
                let [r, g, b] = p.0;
                let luma = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
                ((luma + 500) / 1000) as u8
            })
            .collect();

        Self {
            width: width as usize,
            height: height as usize,
            data,
        }
    }

    /// Halves both sides with a 2x2 box filter. Odd trailing rows/columns are dropped.
    pub fn downsample(&self) -> Self {
        let width = self.width / 2;
        let height = self.height / 2;
        let mut data = Vec::with_capacity(width * height);

        for y in 0..height {
            let top = 2 * y * self.width;
            let bottom = top + self.width;
            for x in 0..width {
                let sum = self.data[top + 2 * x] as u32
                    + self.data[top + 2 * x + 1] as u32
                    + self.data[bottom + 2 * x] as u32
                    + self.data[bottom + 2 * x + 1] as u32;
                data.push(((sum + 2) / 4) as u8);
            }
        }

        Self {
            width,
            height,
            data,
        }
    }

    /// Histogram median, counted the way OpenCV's MTB does: the first bin
    /// index past which at least half of the pixels have been seen.
    pub fn median(&self) -> i32 {
        let mut histogram = [0usize; HISTOGRAM_SIZE];
        for &v in &self.data {
            histogram[v as usize] += 1;
        }

        let threshold = self.data.len() / 2;
        let mut median = 0;
        let mut sum = 0;
        while sum < threshold && median < HISTOGRAM_SIZE {
            sum += histogram[median];
            median += 1;
        }
        median as i32
    }
}

/// Threshold and exclusion bitmaps of one pyramid level.
struct Bitmaps {
    width: usize,
    height: usize,
    threshold: Vec<bool>,
    exclusion: Vec<bool>,
}

impl Bitmaps {
    fn compute(plane: &GrayPlane, exclude_range: u8) -> Self {
        let median = plane.median();
        let exclude_range = exclude_range as i32;

        let threshold = plane.data.iter().map(|&v| v as i32 > median).collect();
        let exclusion = plane
            .data
            .iter()
            .map(|&v| (v as i32 - median).abs() > exclude_range)
            .collect();

        Self {
            width: plane.width,
            height: plane.height,
            threshold,
            exclusion,
        }
    }

    /// Counts mismatching, non-excluded pixels once `other` is translated by `shift`.
    /// Pixels uncovered by the translation are treated as excluded.
    fn error(&self, other: &Bitmaps, shift: Shift) -> usize {
        let mut count = 0;
        for y in 0..self.height {
            let sy = y as i64 - shift.dy as i64;
            if sy < 0 || sy >= other.height as i64 {
                continue;
            }
            let row = y * self.width;
            let other_row = sy as usize * other.width;

            for x in 0..self.width {
                let sx = x as i64 - shift.dx as i64;
                if sx < 0 || sx >= other.width as i64 {
                    continue;
                }
                let i = row + x;
                let j = other_row + sx as usize;
                if (self.threshold[i] ^ other.threshold[j]) && self.exclusion[i] && other.exclusion[j]
                {
                    count += 1;
                }
            }
        }
        count
    }
}

/// Translates `image` by `shift`, replicating edge pixels into the uncovered border.
pub fn shift_image(image: &RgbImage, shift: Shift) -> RgbImage {
    if shift == Shift::ZERO {
        return image.clone();
    }

    let (width, height) = image.dimensions();
    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;

    RgbImage::from_fn(width, height, |x, y| {
        let sx = (x as i64 - shift.dx as i64).clamp(0, max_x);
        let sy = (y as i64 - shift.dy as i64).clamp(0, max_y);
        *image.get_pixel(sx as u32, sy as u32)
    })
}

pub struct MtbAligner {
    config: AlignmentConfig,
}

impl MtbAligner {
    pub fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    fn pyramid_depth(&self, width: usize, height: usize) -> i32 {
        let longest = width.max(height).max(1) as f64;
        let depth = longest.log2().floor() as i32 - 1;
        depth.min(self.config.max_bits as i32 - 1)
    }

    fn pyramid(plane: GrayPlane, depth: i32) -> Vec<GrayPlane> {
        let mut levels = vec![plane];
        for _ in 0..depth.max(0) {
            let next = levels[levels.len() - 1].downsample();
            levels.push(next);
        }
        levels
    }

    /// Estimates the translation that maps `moving` onto `reference`.
    ///
    /// The candidate equal to the current estimate is scored first and only a
    /// strictly smaller error replaces it, so featureless frames stay put.
    pub fn calculate_shift(&self, reference: &RgbImage, moving: &RgbImage) -> Shift {
        let reference = GrayPlane::from_rgb(reference);
        let moving = GrayPlane::from_rgb(moving);
        let depth = self.pyramid_depth(reference.width, reference.height);

        let reference_levels = Self::pyramid(reference, depth);
        let moving_levels = Self::pyramid(moving, depth);

        let mut shift = Shift::ZERO;
        for level in (0..reference_levels.len()).rev() {
            shift = Shift::new(shift.dx * 2, shift.dy * 2);

            let reference_bits = Bitmaps::compute(&reference_levels[level], self.config.exclude_range);
            let moving_bits = Bitmaps::compute(&moving_levels[level], self.config.exclude_range);

            let mut best = shift;
            let mut best_error = reference_bits.error(&moving_bits, shift);
            for i in -1..=1 {
                for j in -1..=1 {
                    let candidate = Shift::new(shift.dx + i, shift.dy + j);
                    let error = reference_bits.error(&moving_bits, candidate);
                    if error < best_error {
                        best = candidate;
                        best_error = error;
                    }
                }
            }
            shift = best;
        }

        shift
    }

    /// Aligns every frame of `exposures` to the middle one.
    ///
    /// Returns a new set; the input is left untouched. Alignment quality is not
    /// judged here, only logged.
    pub fn process(&self, exposures: &ExposureSet) -> Result<AlignedExposures> {
        let images = exposures.images();
        let reference_index = images.len() / 2;
        let reference = &images[reference_index];
        info!(
            "Aligning {} images to image {}",
            images.len(),
            reference_index
        );

        let mut aligned = Vec::with_capacity(images.len());
        let mut shifts = Vec::with_capacity(images.len());

        for (index, image) in images.iter().enumerate() {
            let shift = if index == reference_index {
                Shift::ZERO
            } else {
                self.calculate_shift(reference, image)
            };
            debug!("Image {}: shift ({}, {})", index, shift.dx, shift.dy);

            aligned.push(shift_image(image, shift));
            shifts.push(shift);
        }

        Ok(AlignedExposures {
            exposures: exposures.with_images(aligned)?,
            shifts,
            reference_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Hashed noise in 4x4 blocks, with its content moved by `(dx, dy)`.
    fn pattern(width: u32, height: u32, dx: i32, dy: i32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let bx = (x as i32 - dx).div_euclid(4) as u32;
            let by = (y as i32 - dy).div_euclid(4) as u32;
            let mut h = bx.wrapping_mul(0x9E37_79B1) ^ by.wrapping_mul(0x85EB_CA77);
            h ^= h >> 15;
            h = h.wrapping_mul(0x2C1B_3C6D);
            h ^= h >> 12;
            let v = (h >> 24) as u8;
            Rgb([v, v, v])
        })
    }

    fn small_search() -> AlignmentConfig {
        AlignmentConfig {
            max_bits: 3,
            ..AlignmentConfig::default()
        }
    }

    #[test]
    fn test_median_matches_histogram_rule() {
        let plane = GrayPlane {
            width: 4,
            height: 1,
            data: vec![10, 10, 200, 200],
        };
        assert_eq!(plane.median(), 11);

        let flat = GrayPlane {
            width: 2,
            height: 2,
            data: vec![7; 4],
        };
        assert_eq!(flat.median(), 8);
    }

    #[test]
    fn test_downsample_averages_blocks() {
        let plane = GrayPlane {
            width: 5,
            height: 2,
            data: vec![0, 4, 8, 8, 255, 4, 8, 8, 8, 255],
        };
        let half = plane.downsample();
        assert_eq!((half.width, half.height), (2, 1));
        assert_eq!(half.data, vec![4, 8]);
    }

    #[test]
    fn test_identical_images_have_zero_shift() {
        let aligner = MtbAligner::new(AlignmentConfig::default());
        let image = pattern(96, 80, 0, 0);
        assert_eq!(aligner.calculate_shift(&image, &image), Shift::ZERO);
    }

    #[test]
    fn test_flat_images_do_not_drift() {
        let aligner = MtbAligner::new(AlignmentConfig::default());
        let flat = RgbImage::from_pixel(64, 64, Rgb([90, 90, 90]));
        assert_eq!(aligner.calculate_shift(&flat, &flat), Shift::ZERO);
    }

    #[test]
    fn test_recovers_known_translation() {
        let aligner = MtbAligner::new(small_search());
        let reference = pattern(128, 128, 0, 0);
        let moved = pattern(128, 128, 3, -2);

        assert_eq!(aligner.calculate_shift(&reference, &moved), Shift::new(-3, 2));
    }

    #[test]
    fn test_recovers_translation_across_exposures() {
        let aligner = MtbAligner::new(small_search());
        let reference = pattern(128, 128, 0, 0);
        let moved = pattern(128, 128, -2, 1);
        let darker = RgbImage::from_fn(128, 128, |x, y| {
            let Rgb([v, _, _]) = *moved.get_pixel(x, y);
            let d = (v as f32 * 0.6).round() as u8;
            Rgb([d, d, d])
        });

        assert_eq!(aligner.calculate_shift(&reference, &darker), Shift::new(2, -1));
    }

    #[test]
    fn test_recovers_assorted_translations() {
        let aligner = MtbAligner::new(AlignmentConfig::default());
        let reference = pattern(256, 256, 0, 0);

        for (dx, dy) in [(3, -2), (-2, 1), (0, -1), (5, 4), (-7, 0), (0, 6)] {
            let moved = pattern(256, 256, dx, dy);
            assert_eq!(
                aligner.calculate_shift(&reference, &moved),
                Shift::new(-dx, -dy),
                "content moved by ({}, {})",
                dx,
                dy
            );
        }
    }

    #[test]
    fn test_shift_image_replicates_edges() {
        let image = RgbImage::from_fn(3, 1, |x, _| Rgb([x as u8 * 10, 0, 0]));
        let shifted = shift_image(&image, Shift::new(1, 0));
        let row: Vec<u8> = shifted.pixels().map(|p| p.0[0]).collect();
        assert_eq!(row, vec![0, 0, 10]);

        let shifted = shift_image(&image, Shift::new(-2, 0));
        let row: Vec<u8> = shifted.pixels().map(|p| p.0[0]).collect();
        assert_eq!(row, vec![20, 20, 20]);
    }

    #[test]
    fn test_process_keeps_dimensions_and_reference() {
        let aligner = MtbAligner::new(small_search());
        let images = vec![
            pattern(128, 96, 2, 0),
            pattern(128, 96, 0, 0),
            pattern(128, 96, 0, 1),
        ];
        let set = ExposureSet::new(images.clone(), vec![0.1, 0.2, 0.4]).unwrap();

        let aligned = aligner.process(&set).unwrap();

        assert_eq!(aligned.reference_index, 1);
        assert_eq!(aligned.shifts[1], Shift::ZERO);
        assert_eq!(aligned.shifts[0], Shift::new(-2, 0));
        assert_eq!(aligned.shifts[2], Shift::new(0, -1));
        assert_eq!(aligned.exposures.dimensions(), (128, 96));
        assert_eq!(aligned.exposures.images()[1], images[1]);
        assert_eq!(aligned.exposures.times(), set.times());
    }

    #[test]
    fn test_tiny_images_do_not_panic() {
        let aligner = MtbAligner::new(AlignmentConfig::default());
        let a = RgbImage::from_pixel(1, 1, Rgb([1, 2, 3]));
        let b = RgbImage::from_pixel(1, 1, Rgb([4, 5, 6]));
        assert_eq!(aligner.calculate_shift(&a, &b), Shift::ZERO);

        let wide = RgbImage::from_pixel(64, 2, Rgb([1, 2, 3]));
        assert_eq!(aligner.calculate_shift(&wide, &wide), Shift::ZERO);
    }
}
