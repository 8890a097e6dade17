use tracing::{info, instrument};

use crate::image_pipeline::common::error::{HdrError, Result};
use crate::image_pipeline::merge::RadianceMap;
use crate::image_pipeline::tonemap::drago::DragoTonemapper;
use crate::image_pipeline::tonemap::mantiuk::MantiukTonemapper;
use crate::image_pipeline::tonemap::plane;
use crate::image_pipeline::tonemap::reinhard::ReinhardTonemapper;
use crate::image_pipeline::tonemap::types::{TonemapConfig, TonemapOperator, ToneMappedImage};

/// Renders radiance maps to 8-bit images with any of the supported operators.
#[derive(Debug, Clone, Default)]
pub struct Tonemapper {
    config: TonemapConfig,
}

impl Tonemapper {
    pub fn new(config: TonemapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TonemapConfig {
        &self.config
    }

    #[instrument(skip(self, map), fields(width = map.width(), height = map.height()))]
    pub fn process(&self, map: &RadianceMap, operator: TonemapOperator) -> Result<ToneMappedImage> {
        self.config.validate(operator)?;

        let normalized = match operator {
            TonemapOperator::Drago => DragoTonemapper::new(self.config.drago).process(map),
            TonemapOperator::Reinhard => ReinhardTonemapper::new(self.config.reinhard).process(map),
            TonemapOperator::Mantiuk => MantiukTonemapper::new(self.config.mantiuk).process(map),
        };

        let gain = self.config.output_gain(operator);
        let image = plane::quantize(&normalized, map.width(), map.height(), gain)
            .ok_or(HdrError::InvalidDimensions(map.width(), map.height()))?;

        info!("Tonemapped with {} (gain {})", operator, gain);
        Ok(ToneMappedImage { operator, image })
    }

    /// Same as [`Tonemapper::process`] with the operator given by name.
    pub fn process_named(&self, map: &RadianceMap, operator: &str) -> Result<ToneMappedImage> {
        self.process(map, operator.parse()?)
    }
}
