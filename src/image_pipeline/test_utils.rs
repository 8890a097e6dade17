//! Synthetic brackets shared by unit tests.

use image::{Rgb, RgbImage};

use crate::image_pipeline::load::ExposureSet;

/// Exposure times of the reference four-shot bracket.
pub const BRACKET_TIMES: [f32; 4] = [1.0 / 30.0, 2.5, 15.0, 0.25];

const CHANNEL_TINT: [f32; 3] = [1.0, 0.8, 0.6];

/// Scene radiance sweeping 0.01..100 along the diagonal.
pub fn scene_radiance(x: u32, y: u32, width: u32, height: u32) -> f32 {
    let span = (width + height).saturating_sub(2).max(1) as f32;
    let t = (x + y) as f32 / span;
    10f32.powf(-2.0 + 4.0 * t)
}

/// Camera with a 1/2.2 power response.
pub fn gamma_camera(exposure: f32) -> u8 {
    (255.0 * exposure.clamp(0.0, 1.0).powf(1.0 / 2.2)).round() as u8
}

/// Camera with a linear response.
pub fn linear_camera(exposure: f32) -> u8 {
    (255.0 * exposure.clamp(0.0, 1.0)).round() as u8
}

pub fn capture(width: u32, height: u32, time: f32, camera: fn(f32) -> u8) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let e = scene_radiance(x, y, width, height);
        Rgb(CHANNEL_TINT.map(|tint| camera(e * tint * time)))
    })
}

pub fn synthetic_bracket(width: u32, height: u32, times: &[f32], camera: fn(f32) -> u8) -> ExposureSet {
    let images = times
        .iter()
        .map(|&t| capture(width, height, t, camera))
        .collect();
    ExposureSet::new(images, times.to_vec()).unwrap()
}
