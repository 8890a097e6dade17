use tracing::info;

use crate::image_pipeline::calibrate::{CameraResponse, LDR_SIZE, triangle_weight};
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::load::ExposureSet;
use crate::image_pipeline::merge::types::RadianceMap;

/// Fuses an exposure set into a radiance map with Debevec's weighted average
/// of log exposures.
///
/// Each pixel of each frame votes `ln f(z) - ln t` per channel, weighted by the
/// mean hat weight of its three channels. The result is `exp` of the weighted
/// mean, so it is linear in scene radiance.
#[derive(Debug, Default, Clone, Copy)]
pub struct DebevecMerger;

impl DebevecMerger {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, exposures: &ExposureSet, response: &CameraResponse) -> Result<RadianceMap> {
        let (width, height) = exposures.dimensions();
        info!(
            "Merging {} images of {}x{} into a radiance map",
            exposures.len(),
            width,
            height
        );

        let mut weights = [0.0f32; LDR_SIZE];
        for (z, w) in weights.iter_mut().enumerate() {
            *w = triangle_weight(z as u8);
        }

        let mut log_response = [[0.0f32; LDR_SIZE]; 3];
        for (channel, curve) in log_response.iter_mut().enumerate() {
            for (z, v) in curve.iter_mut().enumerate() {
                *v = response.value(channel, z as u8).ln();
            }
        }

        let pixels = width as usize * height as usize;
        let mut sums = vec![0.0f32; pixels * 3];
        let mut weight_sums = vec![0.0f32; pixels];

        for (image, &time) in exposures.images().iter().zip(exposures.times()) {
            let log_time = time.ln();
            let samples = image.as_raw();

            for (p, (rgb, sum)) in samples.chunks_exact(3).zip(sums.chunks_exact_mut(3)).enumerate() {
                let w = (weights[rgb[0] as usize] + weights[rgb[1] as usize] + weights[rgb[2] as usize]) / 3.0;
                for c in 0..3 {
                    sum[c] += w * (log_response[c][rgb[c] as usize] - log_time);
                }
                weight_sums[p] += w;
            }
        }

        let mut data = Vec::with_capacity(pixels * 3);
        for (sum, &w) in sums.chunks_exact(3).zip(&weight_sums) {
            data.extend(sum.iter().map(|s| (s / w).exp()));
        }

        RadianceMap::new(width, height, data)
    }
}
