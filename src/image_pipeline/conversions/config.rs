//! HDR fusion configuration types

use crate::image_pipeline::align::AlignmentConfig;
use crate::image_pipeline::calibrate::CalibrationConfig;
use crate::image_pipeline::persist::{DEFAULT_JPEG_QUALITY, RadianceFormat, TiffCompression};
use crate::image_pipeline::tonemap::{TonemapConfig, TonemapOperator};

/// File name stem of the radiance map inside a run's output directory
pub const RADIANCE_STEM: &str = "hdrDebevec";

/// Configuration for exposure fusion
#[derive(Debug, Clone, PartialEq)]
pub struct HdrConfig {
    pub alignment: AlignmentConfig,
    /// Response recovery; when disabled the merge uses the linear response
    pub calibration: CalibrationConfig,
    pub tonemap: TonemapConfig,
    /// Operators rendered, in output order
    pub operators: Vec<TonemapOperator>,
    pub radiance_format: RadianceFormat,
    /// Only used when `radiance_format` is TIFF
    pub tiff_compression: TiffCompression,
    pub jpeg_quality: u8,
    /// Reject frames wider or taller than this
    pub max_dimension: Option<u32>,
}

impl Default for HdrConfig {
    fn default() -> Self {
        Self {
            alignment: AlignmentConfig::default(),
            calibration: CalibrationConfig::default(),
            tonemap: TonemapConfig::default(),
            operators: TonemapOperator::ALL.to_vec(),
            radiance_format: RadianceFormat::Hdr,
            tiff_compression: TiffCompression::None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_dimension: None,
        }
    }
}

impl HdrConfig {
    pub fn builder() -> HdrConfigBuilder {
        HdrConfigBuilder::default()
    }

    /// `hdrDebevec.hdr` or `hdrDebevec.tiff`
    pub fn radiance_file_name(&self) -> String {
        format!("{}.{}", RADIANCE_STEM, self.radiance_format.extension())
    }

    /// `ldr-<operator>.jpg`
    pub fn ldr_file_name(operator: TonemapOperator) -> String {
        format!("ldr-{}.jpg", operator)
    }
}

/// Builder for HdrConfig
#[derive(Default)]
pub struct HdrConfigBuilder {
    alignment: Option<AlignmentConfig>,
    calibration: Option<CalibrationConfig>,
    tonemap: Option<TonemapConfig>,
    operators: Option<Vec<TonemapOperator>>,
    radiance_format: Option<RadianceFormat>,
    tiff_compression: Option<TiffCompression>,
    jpeg_quality: Option<u8>,
    max_dimension: Option<Option<u32>>,
}

impl HdrConfigBuilder {
    pub fn alignment(mut self, alignment: AlignmentConfig) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn calibration(mut self, calibration: CalibrationConfig) -> Self {
        self.calibration = Some(calibration);
        self
    }

    pub fn tonemap(mut self, tonemap: TonemapConfig) -> Self {
        self.tonemap = Some(tonemap);
        self
    }

    pub fn operators(mut self, operators: Vec<TonemapOperator>) -> Self {
        self.operators = Some(operators);
        self
    }

    pub fn radiance_format(mut self, format: RadianceFormat) -> Self {
        self.radiance_format = Some(format);
        self
    }

    pub fn tiff_compression(mut self, compression: TiffCompression) -> Self {
        self.tiff_compression = Some(compression);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = Some(quality);
        self
    }

    pub fn max_dimension(mut self, max: Option<u32>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn build(self) -> HdrConfig {
        let default = HdrConfig::default();
        HdrConfig {
            alignment: self.alignment.unwrap_or(default.alignment),
            calibration: self.calibration.unwrap_or(default.calibration),
            tonemap: self.tonemap.unwrap_or(default.tonemap),
            operators: self.operators.unwrap_or(default.operators),
            radiance_format: self.radiance_format.unwrap_or(default.radiance_format),
            tiff_compression: self.tiff_compression.unwrap_or(default.tiff_compression),
            jpeg_quality: self.jpeg_quality.unwrap_or(default.jpeg_quality),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
        }
    }
}
