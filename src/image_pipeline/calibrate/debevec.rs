//! Debevec & Malik camera response recovery.
//!
//! For each channel the log response `g(z)` and the log radiance of every
//! sample location are found together by least squares:
//!
//! ```text
//! w(z_ij) * (g(z_ij) - ln E_i) = w(z_ij) * ln t_j     one row per sample and image
//! g(128) = 0                                          fixes the scale
//! lambda * w(z) * (g(z-1) - 2 g(z) + g(z+1)) = 0      smoothness, z = 1..=254
//! ```
//!
//! The system is sparse and small (256 + samples unknowns), so it is reduced
//! to normal equations and solved in f64.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, info, warn};

use crate::image_pipeline::calibrate::types::{
    CalibrationConfig, CameraResponse, LDR_SIZE, triangle_weight,
};
use crate::image_pipeline::common::error::{HdrError, Result};
use crate::image_pipeline::load::ExposureSet;

/// Accumulates `A^T A` and `A^T b` one sparse row at a time.
struct NormalEquations {
    ata: DMatrix<f64>,
    atb: DVector<f64>,
}

impl NormalEquations {
    fn new(unknowns: usize) -> Self {
        Self {
            ata: DMatrix::zeros(unknowns, unknowns),
            atb: DVector::zeros(unknowns),
        }
    }

    fn add_row(&mut self, entries: &[(usize, f64)], rhs: f64) {
        for &(i, a_i) in entries {
            self.atb[i] += a_i * rhs;
            for &(j, a_j) in entries {
                self.ata[(i, j)] += a_i * a_j;
            }
        }
    }

    fn solve(self) -> Result<DVector<f64>> {
        if let Some(cholesky) = self.ata.clone().cholesky() {
            let solution = cholesky.solve(&self.atb);
            if solution.iter().all(|v| v.is_finite()) {
                return Ok(solution);
            }
        }

        warn!("Normal equations are not positive definite, using SVD");
        let svd = self.ata.svd(true, true);
        let eps = svd.singular_values.max() * 1e-12;
        svd.solve(&self.atb, eps)
            .map_err(|e| HdrError::Solver(e.to_string()))
    }
}

pub struct DebevecCalibrator {
    config: CalibrationConfig,
}

impl DebevecCalibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Regular grid of roughly `samples` locations, matching the frame's aspect ratio.
    pub fn sample_points(&self, width: u32, height: u32) -> Vec<(u32, u32)> {
        let samples = self.config.samples;
        let aspect = width as f64 / height.max(1) as f64;
        let x_points = ((samples as f64 * aspect).sqrt() as usize).clamp(1, width.max(1) as usize);
        let y_points = (samples / x_points).clamp(1, height.max(1) as usize);
        let step_x = width as usize / x_points;
        let step_y = height as usize / y_points;

        let mut points = Vec::with_capacity(x_points * y_points);
        for i in 0..x_points {
            let x = step_x / 2 + i * step_x;
            for j in 0..y_points {
                let y = step_y / 2 + j * step_y;
                if x < width as usize && y < height as usize {
                    points.push((x as u32, y as u32));
                }
            }
        }
        points
    }

    fn solve_channel(
        &self,
        exposures: &ExposureSet,
        points: &[(u32, u32)],
        channel: usize,
    ) -> Result<[f32; LDR_SIZE]> {
        let lambda = self.config.lambda as f64;
        let mut equations = NormalEquations::new(LDR_SIZE + points.len());

        for (i, &(x, y)) in points.iter().enumerate() {
            for (image, &time) in exposures.images().iter().zip(exposures.times()) {
                let z = image.get_pixel(x, y).0[channel];
                let w = triangle_weight(z) as f64;
                equations.add_row(&[(z as usize, w), (LDR_SIZE + i, -w)], w * (time as f64).ln());
            }
        }

        equations.add_row(&[(LDR_SIZE / 2, 1.0)], 0.0);

        for z in 0..LDR_SIZE - 2 {
            let w = lambda * triangle_weight((z + 1) as u8) as f64;
            equations.add_row(&[(z, w), (z + 1, -2.0 * w), (z + 2, w)], 0.0);
        }

        let solution = equations.solve()?;

        let mut curve = [0.0f32; LDR_SIZE];
        for (z, v) in curve.iter_mut().enumerate() {
            *v = solution[z].exp() as f32;
        }
        Ok(curve)
    }

    /// Recovers the camera response of an exposure set.
    ///
    /// # Returns
    ///
    /// * `Ok(CameraResponse)` - One curve per channel, `g(128)` normalized to 1
    /// * `Err(HdrError::CalibrationPrecondition)` - Fewer than 2 images, fewer than
    ///   2 distinct exposure times, or no sample locations
    /// * `Err(HdrError::Solver)` - The least squares system could not be solved
    pub fn process(&self, exposures: &ExposureSet) -> Result<CameraResponse> {
        exposures.check_calibration_preconditions()?;

        if self.config.samples == 0 {
            return Err(HdrError::CalibrationPrecondition(
                "sample count must be positive".to_string(),
            ));
        }

        let (width, height) = exposures.dimensions();
        let points = self.sample_points(width, height);
        info!(
            "Calibrating camera response from {} samples x {} images",
            points.len(),
            exposures.len()
        );

        let mut curves = [[0.0f32; LDR_SIZE]; 3];
        for (channel, curve) in curves.iter_mut().enumerate() {
            *curve = self.solve_channel(exposures, &points, channel)?;
            debug!(
                "Channel {}: response range {:.4e}..{:.4e}",
                channel, curve[0], curve[LDR_SIZE - 1]
            );
        }

        CameraResponse::from_curves(curves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::test_utils::{BRACKET_TIMES, gamma_camera, synthetic_bracket};
    use image::RgbImage;

    #[test]
    fn test_sample_grid() {
        let calibrator = DebevecCalibrator::new(CalibrationConfig::default());
        let points = calibrator.sample_points(100, 100);

        assert_eq!(points.len(), 64);
        assert_eq!(points[0], (6, 6));
        assert_eq!(points[1], (6, 18));
        assert!(points.iter().all(|&(x, y)| x < 100 && y < 100));
    }

    #[test]
    fn test_sample_grid_degenerate_aspect() {
        let calibrator = DebevecCalibrator::new(CalibrationConfig::default());
        let points = calibrator.sample_points(1, 500);
        assert!(!points.is_empty());
        assert!(points.iter().all(|&(x, y)| x == 0 && y < 500));
    }

    #[test]
    fn test_single_exposure_time_is_rejected() {
        let images = vec![RgbImage::new(8, 8), RgbImage::new(8, 8)];
        let set = ExposureSet::new(images, vec![0.5, 0.5]).unwrap();
        let calibrator = DebevecCalibrator::new(CalibrationConfig::default());

        assert!(matches!(
            calibrator.process(&set).unwrap_err(),
            HdrError::CalibrationPrecondition(_)
        ));
    }

    #[test]
    fn test_single_image_is_rejected() {
        let set = ExposureSet::new(vec![RgbImage::new(8, 8)], vec![0.5]).unwrap();
        let calibrator = DebevecCalibrator::new(CalibrationConfig::default());

        assert!(matches!(
            calibrator.process(&set).unwrap_err(),
            HdrError::CalibrationPrecondition(_)
        ));
    }

    #[test]
    fn test_zero_samples_is_rejected() {
        let set = synthetic_bracket(16, 16, &[0.5, 1.0], gamma_camera);
        let config = CalibrationConfig {
            samples: 0,
            ..CalibrationConfig::default()
        };

        assert!(matches!(
            DebevecCalibrator::new(config).process(&set).unwrap_err(),
            HdrError::CalibrationPrecondition(_)
        ));
    }

    #[test]
    fn test_recovers_gamma_response() {
        let set = synthetic_bracket(100, 100, &BRACKET_TIMES, gamma_camera);
        let calibrator = DebevecCalibrator::new(CalibrationConfig::default());
        let response = calibrator.process(&set).unwrap();

        for channel in 0..3 {
            let curve = response.curve(channel);
            assert!((curve[128] - 1.0).abs() < 1e-4);

            for z in 30..225 {
                assert!(
                    curve[z + 1] >= curve[z],
                    "channel {channel} not monotone at {z}"
                );
            }

            // A 1/2.2 camera doubles its output for 2^2.2 times the light.
            let ratio = curve[200] / curve[100];
            assert!(ratio > 3.0 && ratio < 6.5, "ratio {ratio}");
        }
    }

    #[test]
    fn test_calibration_is_deterministic() {
        let set = synthetic_bracket(40, 30, &BRACKET_TIMES, gamma_camera);
        let calibrator = DebevecCalibrator::new(CalibrationConfig::default());
        assert_eq!(calibrator.process(&set).unwrap(), calibrator.process(&set).unwrap());
    }
}
