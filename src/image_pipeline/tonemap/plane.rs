//! Single channel float planes and the per-pixel helpers the operators share.

use image::RgbImage;

/// Floor applied before taking logarithms or dividing by luminance.
pub const LUMINANCE_FLOOR: f32 = 1e-4;

const GRAY_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl Plane {
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                out.data[x * self.height + y] = self.data[y * self.width + x];
            }
        }
        out
    }

    /// Bilinear resampling with pixel-centre alignment and clamped borders.
    pub fn resize(&self, width: usize, height: usize) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }

        let xs = sample_positions(self.width, width);
        let ys = sample_positions(self.height, height);
        let mut out = Self::zeros(width, height);

        for (dy, &(y0, fy)) in ys.iter().enumerate() {
            let y1 = (y0 + 1).min(self.height - 1);
            for (dx, &(x0, fx)) in xs.iter().enumerate() {
                let x1 = (x0 + 1).min(self.width - 1);
                let top = self.data[y0 * self.width + x0] * (1.0 - fx) + self.data[y0 * self.width + x1] * fx;
                let bottom = self.data[y1 * self.width + x0] * (1.0 - fx) + self.data[y1 * self.width + x1] * fx;
                out.data[dy * width + dx] = top * (1.0 - fy) + bottom * fy;
            }
        }
        out
    }

    pub fn dot(&self, other: &Plane) -> f64 {
        self.data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| a as f64 * b as f64)
            .sum()
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }

    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// `self += scale * other`
    pub fn add_scaled(&mut self, other: &Plane, scale: f32) {
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a += scale * b;
        }
    }
}

/// Source index and blend fraction for every destination column (or row).
fn sample_positions(src: usize, dst: usize) -> Vec<(usize, f32)> {
    let scale = src as f32 / dst as f32;
    (0..dst)
        .map(|d| {
            let f = (d as f32 + 0.5) * scale - 0.5;
            let i = f.floor();
            if i < 0.0 {
                (0, 0.0)
            } else if i as usize >= src - 1 {
                (src - 1, 0.0)
            } else {
                (i as usize, f - i)
            }
        })
        .collect()
}

/// Stretches `data` linearly onto [0, 1]. Flat data is left as is.
pub fn normalize(data: &mut [f32]) {
    let (min, max) = data
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let range = max - min;
    if range > f32::EPSILON {
        for v in data.iter_mut() {
            *v = (*v - min) / range;
        }
    }
}

/// Linear normalization followed by `v^(1/gamma)`.
pub fn normalize_with_gamma(data: &mut [f32], gamma: f32) {
    normalize(data);
    let exponent = 1.0 / gamma;
    for v in data.iter_mut() {
        *v = v.max(0.0).powf(exponent);
    }
}

/// Luminance of an interleaved RGB buffer.
pub fn luminance(rgb: &[f32], width: usize, height: usize) -> Plane {
    Plane {
        width,
        height,
        data: rgb
            .chunks_exact(3)
            .map(|p| GRAY_WEIGHTS[0] * p[0] + GRAY_WEIGHTS[1] * p[1] + GRAY_WEIGHTS[2] * p[2])
            .collect(),
    }
}

pub fn log_floor(plane: &Plane) -> Plane {
    plane.map(|v| v.max(LUMINANCE_FLOOR).ln())
}

/// Replaces the luminance of every pixel: `c' = (c / lum)^saturation * new_lum`.
pub fn map_luminance(rgb: &mut [f32], lum: &Plane, new_lum: &Plane, saturation: f32) {
    for ((p, &l), &nl) in rgb.chunks_exact_mut(3).zip(&lum.data).zip(&new_lum.data) {
        let l = l.max(LUMINANCE_FLOOR);
        for c in p.iter_mut() {
            *c = (c.max(0.0) / l).powf(saturation) * nl;
        }
    }
}

/// Scales normalized RGB by `gain` into 8 bits, saturating at both ends.
pub fn quantize(rgb: &[f32], width: u32, height: u32, gain: f32) -> Option<RgbImage> {
    let bytes = rgb
        .iter()
        .map(|&v| (v * gain * 255.0).round().clamp(0.0, 255.0) as u8)
        .collect();
    RgbImage::from_raw(width, height, bytes)
}
