//! Camera response types

use crate::image_pipeline::common::error::{HdrError, Result};

/// Number of representable 8-bit intensities.
pub const LDR_SIZE: usize = 256;

/// Hat weighting of an 8-bit intensity: trusts mid-tones, distrusts clipped ends.
///
/// Never zero, so every pixel keeps some influence on the solve and the merge.
pub fn triangle_weight(z: u8) -> f32 {
    let z = z as usize;
    if z < LDR_SIZE / 2 {
        (z + 1) as f32
    } else {
        (LDR_SIZE - z) as f32
    }
}

/// Settings for Debevec response recovery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationConfig {
    /// Recover the response from the data. When off, the merge uses a linear response.
    pub enabled: bool,
    /// Approximate number of sample locations taken on a regular grid.
    pub samples: usize,
    /// Weight of the smoothness term.
    pub lambda: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            samples: 70,
            lambda: 10.0,
        }
    }
}

/// Per-channel lookup from 8-bit intensity to relative exposure (`E * t`).
#[derive(Debug, Clone, PartialEq)]
pub struct CameraResponse {
    curves: [[f32; LDR_SIZE]; 3],
}

impl CameraResponse {
    /// Builds a response from explicit curves. Every entry must be finite and positive.
    pub fn from_curves(curves: [[f32; LDR_SIZE]; 3]) -> Result<Self> {
        for (channel, curve) in curves.iter().enumerate() {
            if let Some(z) = curve.iter().position(|v| !v.is_finite() || *v <= 0.0) {
                return Err(HdrError::InvalidResponse(format!(
                    "channel {} has value {} at intensity {}",
                    channel, curve[z], z
                )));
            }
        }
        Ok(Self { curves })
    }

    /// Identity response, floored at 1 so its logarithm stays finite.
    pub fn linear() -> Self {
        let mut curve = [0.0f32; LDR_SIZE];
        for (z, v) in curve.iter_mut().enumerate() {
            *v = (z as f32).max(1.0);
        }
        Self {
            curves: [curve; 3],
        }
    }

    pub fn curve(&self, channel: usize) -> &[f32; LDR_SIZE] {
        &self.curves[channel]
    }

    pub fn curves(&self) -> &[[f32; LDR_SIZE]; 3] {
        &self.curves
    }

    pub fn value(&self, channel: usize, z: u8) -> f32 {
        self.curves[channel][z as usize]
    }
}
