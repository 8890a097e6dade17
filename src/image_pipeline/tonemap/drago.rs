use tracing::debug;

use crate::image_pipeline::merge::RadianceMap;
use crate::image_pipeline::tonemap::plane::{self, Plane};
use crate::image_pipeline::tonemap::types::DragoParams;

/// Adaptive logarithmic mapping.
///
/// Luminance is scaled by its log-average, then compressed with a log whose
/// base moves from 2 to 10 as the pixel approaches the brightest value. `bias`
/// controls how fast the base moves.
#[derive(Debug, Clone, Copy)]
pub struct DragoTonemapper {
    params: DragoParams,
}

impl DragoTonemapper {
    pub fn new(params: DragoParams) -> Self {
        Self { params }
    }

    /// Returns interleaved RGB in [0, 1].
    pub fn process(&self, map: &RadianceMap) -> Vec<f32> {
        let (width, height) = (map.width() as usize, map.height() as usize);
        let mut rgb = map.data().to_vec();
        plane::normalize(&mut rgb);

        let gray = plane::luminance(&rgb, width, height);
        let log_mean = (plane::log_floor(&gray).sum() / gray.len() as f64) as f32;
        let scaled = gray.map(|v| v / log_mean.exp());

        let max = scaled.max();
        if !(max > 0.0) {
            debug!("Drago: radiance map is black");
            return vec![0.0; rgb.len()];
        }

        let exponent = self.params.bias.ln() / 0.5f32.ln();
        let mapped = Plane {
            width,
            height,
            data: scaled
                .data
                .iter()
                .map(|&l| {
                    let base = (2.0 + 8.0 * (l / max).powf(exponent)).ln();
                    (l + 1.0).ln() / base
                })
                .collect(),
        };

        plane::map_luminance(&mut rgb, &scaled, &mapped, self.params.saturation);
        plane::normalize_with_gamma(&mut rgb, self.params.gamma);
        rgb
    }
}
