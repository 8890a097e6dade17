//! Radiance map type

use image::Rgb32FImage;

use crate::image_pipeline::common::error::{HdrError, Result};

/// Floating point HDR image with interleaved RGB samples, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RadianceMap {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl RadianceMap {
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(HdrError::InvalidDimensions(width, height));
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(HdrError::Decode(format!(
                "radiance map {}x{} needs {} samples, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> [f32; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    pub fn to_rgb32f(&self) -> Result<Rgb32FImage> {
        Rgb32FImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or(HdrError::InvalidDimensions(self.width, self.height))
    }

    pub fn from_rgb32f(image: Rgb32FImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }
}
