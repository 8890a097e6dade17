use tracing::debug;

use crate::image_pipeline::merge::RadianceMap;
use crate::image_pipeline::tonemap::plane::{self, Plane};
use crate::image_pipeline::tonemap::types::MantiukParams;

/// Exponent of the contrast response curve.
const RESPONSE_POWER: f32 = 0.4185;
const TARGET_ERROR: f64 = 1e-3;
const MAX_ITERATIONS: usize = 100;

/// Contrast mapping in the gradient domain.
///
/// Log luminance gradients are taken over a pyramid, compressed through a
/// power-law response scaled by `scale`, and a new log luminance whose
/// pyramid gradients match the compressed ones is recovered with conjugate
/// gradients.
#[derive(Debug, Clone, Copy)]
pub struct MantiukTonemapper {
    params: MantiukParams,
}

struct ContrastPyramid {
    x: Vec<Plane>,
    /// Gradients of the transposed layers.
    y: Vec<Plane>,
}

impl MantiukTonemapper {
    pub fn new(params: MantiukParams) -> Self {
        Self { params }
    }

    pub fn process(&self, map: &RadianceMap) -> Vec<f32> {
        let (width, height) = (map.width() as usize, map.height() as usize);
        let mut rgb = map.data().to_vec();
        plane::normalize(&mut rgb);

        let gray = plane::luminance(&rgb, width, height);
        let log_gray = plane::log_floor(&gray);

        let mut target = contrast_pyramid(&log_gray);
        for level in target.x.iter_mut().chain(target.y.iter_mut()) {
            self.map_contrast(level);
        }
        let right = sum_contrast(&target, width, height);

        let solved = solve(&right, log_gray);
        let new_lum = solved.map(f32::exp);

        plane::map_luminance(&mut rgb, &gray, &new_lum, self.params.saturation);
        plane::normalize_with_gamma(&mut rgb, self.params.gamma);
        rgb
    }

    fn map_contrast(&self, contrast: &mut Plane) {
        for v in contrast.data.iter_mut() {
            *v = signed_pow(signed_pow(*v, RESPONSE_POWER) * self.params.scale, 1.0 / RESPONSE_POWER);
        }
    }
}

fn signed_pow(v: f32, power: f32) -> f32 {
    let magnitude = v.abs().powf(power);
    if v > 0.0 { magnitude } else { -magnitude }
}

/// `out[x] = src[x + 1] - src[x]`, last column zero.
fn gradient_forward(src: &Plane) -> Plane {
    let mut out = Plane::zeros(src.width, src.height);
    for y in 0..src.height {
        let row = &src.data[y * src.width..(y + 1) * src.width];
        let dst = &mut out.data[y * src.width..(y + 1) * src.width];
        for x in 0..src.width.saturating_sub(1) {
            dst[x] = row[x + 1] - row[x];
        }
    }
    out
}

/// `out[0] = src[0]`, `out[x] = src[x] - src[x - 1]`.
fn gradient_backward(src: &Plane) -> Plane {
    let mut out = Plane::zeros(src.width, src.height);
    for y in 0..src.height {
        let row = &src.data[y * src.width..(y + 1) * src.width];
        let dst = &mut out.data[y * src.width..(y + 1) * src.width];
        if let Some(&first) = row.first() {
            dst[0] = first;
        }
        for x in 1..src.width {
            dst[x] = row[x] - row[x - 1];
        }
    }
    out
}

fn pyramid_levels(width: usize, height: usize) -> usize {
    let shortest = width.min(height);
    if shortest == 0 { 0 } else { shortest.ilog2() as usize }
}

fn contrast_pyramid(src: &Plane) -> ContrastPyramid {
    let levels = pyramid_levels(src.width, src.height);
    let mut pyramid = ContrastPyramid {
        x: Vec::with_capacity(levels),
        y: Vec::with_capacity(levels),
    };

    let mut layer = src.clone();
    for _ in 0..levels {
        pyramid.x.push(gradient_forward(&layer));
        pyramid.y.push(gradient_forward(&layer.transpose()));
        layer = layer.resize(layer.width / 2, layer.height / 2);
    }
    pyramid
}

/// Collapses a contrast pyramid back into a plane of `width` x `height`,
/// coarsest level first. An empty pyramid sums to zero.
fn sum_contrast(pyramid: &ContrastPyramid, width: usize, height: usize) -> Plane {
    let Some(last) = pyramid.x.last() else {
        return Plane::zeros(width, height);
    };

    let mut sum = Plane::zeros(last.width, last.height);
    for (x_level, y_level) in pyramid.x.iter().zip(&pyramid.y).rev() {
        let grad_x = gradient_backward(x_level);
        let grad_y = gradient_backward(y_level).transpose();
        sum = sum.resize(x_level.width, x_level.height);
        sum.add_scaled(&grad_x, 1.0);
        sum.add_scaled(&grad_y, 1.0);
    }
    sum
}

fn apply(src: &Plane) -> Plane {
    sum_contrast(&contrast_pyramid(src), src.width, src.height)
}

/// Conjugate gradients on `apply(x) = right`, starting from `x`.
fn solve(right: &Plane, mut x: Plane) -> Plane {
    let mut r = right.clone();
    r.add_scaled(&apply(&x), -1.0);
    let mut p = r.clone();

    let target = right.dot(right) * TARGET_ERROR * TARGET_ERROR;
    let mut rr = r.dot(&r);

    for iteration in 0..MAX_ITERATIONS {
        if rr <= target {
            debug!("Mantiuk: converged after {} iterations", iteration);
            break;
        }

        let product = apply(&p);
        let dprod = p.dot(&product);
        let alpha = rr / dprod;
        if dprod == 0.0 || !alpha.is_finite() {
            debug!("Mantiuk: search direction collapsed at iteration {}", iteration);
            break;
        }

        r.add_scaled(&product, -(alpha as f32));
        x.add_scaled(&p, alpha as f32);

        let new_rr = r.dot(&r);
        let beta = (new_rr / rr) as f32;
        for (pv, &rv) in p.data.iter_mut().zip(&r.data) {
            *pv = rv + beta * *pv;
        }
        rr = new_rr;
    }

    x
}
