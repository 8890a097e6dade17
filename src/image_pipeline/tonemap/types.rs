//! Tonemapping configuration types

use std::fmt;
use std::str::FromStr;

use image::RgbImage;

use crate::image_pipeline::common::error::{HdrError, Result};

/// The closed set of tonemapping operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TonemapOperator {
    /// Adaptive logarithmic mapping (Drago et al. 2003)
    Drago,
    /// Global photoreceptor model (Reinhard & Devlin 2005)
    Reinhard,
    /// Gradient domain contrast mapping (Mantiuk et al. 2006)
    Mantiuk,
}

impl TonemapOperator {
    pub const ALL: [TonemapOperator; 3] = [
        TonemapOperator::Drago,
        TonemapOperator::Reinhard,
        TonemapOperator::Mantiuk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TonemapOperator::Drago => "drago",
            TonemapOperator::Reinhard => "reinhard",
            TonemapOperator::Mantiuk => "mantiuk",
        }
    }
}

impl fmt::Display for TonemapOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TonemapOperator {
    type Err = HdrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drago" => Ok(TonemapOperator::Drago),
            "reinhard" => Ok(TonemapOperator::Reinhard),
            "mantiuk" => Ok(TonemapOperator::Mantiuk),
            _ => Err(HdrError::UnsupportedOperator(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragoParams {
    pub gamma: f32,
    /// Exponent applied to colour ratios; below 1 desaturates.
    pub saturation: f32,
    /// Bias of the log base interpolation, usually 0.7..0.9.
    pub bias: f32,
    /// Multiplier applied before quantizing to 8 bits.
    pub output_gain: f32,
}

impl Default for DragoParams {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            saturation: 0.7,
            bias: 0.85,
            output_gain: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReinhardParams {
    pub gamma: f32,
    /// Overall brightness in stops, -8..8.
    pub intensity: f32,
    /// 0 adapts to the global mean, 1 to each pixel.
    pub light_adapt: f32,
    /// 0 adapts all channels alike, 1 adapts each channel separately.
    pub color_adapt: f32,
    pub output_gain: f32,
}

impl Default for ReinhardParams {
    fn default() -> Self {
        Self {
            gamma: 1.5,
            intensity: 0.0,
            light_adapt: 0.0,
            color_adapt: 0.0,
            output_gain: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MantiukParams {
    pub gamma: f32,
    /// Contrast scale factor, 0.6..0.9 are typical.
    pub scale: f32,
    pub saturation: f32,
    pub output_gain: f32,
}

impl Default for MantiukParams {
    fn default() -> Self {
        Self {
            gamma: 2.2,
            scale: 0.85,
            saturation: 1.2,
            output_gain: 3.0,
        }
    }
}

/// Parameters of every operator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TonemapConfig {
    pub drago: DragoParams,
    pub reinhard: ReinhardParams,
    pub mantiuk: MantiukParams,
}

impl TonemapConfig {
    pub fn output_gain(&self, operator: TonemapOperator) -> f32 {
        match operator {
            TonemapOperator::Drago => self.drago.output_gain,
            TonemapOperator::Reinhard => self.reinhard.output_gain,
            TonemapOperator::Mantiuk => self.mantiuk.output_gain,
        }
    }

    /// Rejects parameters that would poison every pixel (zero gamma, NaN, ...).
    pub fn validate(&self, operator: TonemapOperator) -> Result<()> {
        let checks: &[(&str, f32)] = match operator {
            TonemapOperator::Drago => &[
                ("drago.gamma", self.drago.gamma),
                ("drago.saturation", self.drago.saturation),
                ("drago.bias", self.drago.bias),
                ("drago.output_gain", self.drago.output_gain),
            ],
            TonemapOperator::Reinhard => &[
                ("reinhard.gamma", self.reinhard.gamma),
                ("reinhard.output_gain", self.reinhard.output_gain),
            ],
            TonemapOperator::Mantiuk => &[
                ("mantiuk.gamma", self.mantiuk.gamma),
                ("mantiuk.scale", self.mantiuk.scale),
                ("mantiuk.saturation", self.mantiuk.saturation),
                ("mantiuk.output_gain", self.mantiuk.output_gain),
            ],
        };

        for &(name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(HdrError::InvalidParameter(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if operator == TonemapOperator::Drago && self.drago.bias >= 1.0 {
            return Err(HdrError::InvalidParameter(format!(
                "drago.bias must be below 1, got {}",
                self.drago.bias
            )));
        }

        if operator == TonemapOperator::Reinhard {
            let r = &self.reinhard;
            for (name, value) in [
                ("reinhard.intensity", r.intensity),
                ("reinhard.light_adapt", r.light_adapt),
                ("reinhard.color_adapt", r.color_adapt),
            ] {
                if !value.is_finite() {
                    return Err(HdrError::InvalidParameter(format!(
                        "{} must be finite",
                        name
                    )));
                }
            }
            if !(0.0..=1.0).contains(&r.light_adapt) || !(0.0..=1.0).contains(&r.color_adapt) {
                return Err(HdrError::InvalidParameter(
                    "reinhard adaptation factors must be within 0..=1".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// An 8-bit rendering of a radiance map by one operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneMappedImage {
    pub operator: TonemapOperator,
    pub image: RgbImage,
}
