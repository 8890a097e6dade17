use crate::image_pipeline::merge::RadianceMap;
use crate::image_pipeline::tonemap::plane;
use crate::image_pipeline::tonemap::types::ReinhardParams;

/// Global photoreceptor model.
///
/// Every channel value `v` becomes `v / (v + (i * a)^m)` where `a` is the
/// adaptation level blended from pixel, channel and global statistics, `i`
/// the intensity factor and `m` a key derived from the log luminance range.
#[derive(Debug, Clone, Copy)]
pub struct ReinhardTonemapper {
    params: ReinhardParams,
}

impl ReinhardTonemapper {
    pub fn new(params: ReinhardParams) -> Self {
        Self { params }
    }

    pub fn process(&self, map: &RadianceMap) -> Vec<f32> {
        let (width, height) = (map.width() as usize, map.height() as usize);
        let mut rgb = map.data().to_vec();
        plane::normalize(&mut rgb);

        let gray = plane::luminance(&rgb, width, height);
        let log_gray = plane::log_floor(&gray);
        let pixels = gray.len() as f64;

        let log_mean = (log_gray.sum() / pixels) as f32;
        let (log_min, log_max) = log_gray
            .data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let key = if log_max - log_min > f32::EPSILON {
            (log_max - log_mean) / (log_max - log_min)
        } else {
            0.0
        };
        let map_key = 0.3 + 0.7 * key.powf(1.4);

        let intensity = (-self.params.intensity).exp();
        let light = self.params.light_adapt;
        let color = self.params.color_adapt;

        let mut channel_sums = [0.0f64; 3];
        for p in rgb.chunks_exact(3) {
            for c in 0..3 {
                channel_sums[c] += p[c] as f64;
            }
        }
        let channel_means = channel_sums.map(|s| (s / pixels) as f32);
        let gray_mean = (gray.sum() / pixels) as f32;

        for (p, &g) in rgb.chunks_exact_mut(3).zip(&gray.data) {
            for c in 0..3 {
                let v = p[c];
                let global = color * channel_means[c] + (1.0 - color) * gray_mean;
                let local = color * v + (1.0 - color) * g;
                let adapt = (intensity * (light * local + (1.0 - light) * global)).powf(map_key);
                let denom = adapt + v;
                p[c] = if denom > 0.0 { v / denom } else { 0.0 };
            }
        }

        plane::normalize_with_gamma(&mut rgb, self.params.gamma);
        rgb
    }
}
