use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, info_span, instrument};

use crate::image_pipeline::{
    align::{MtbAligner, Shift},
    calibrate::{CameraResponse, DebevecCalibrator},
    common::error::Result,
    conversions::{
        config::HdrConfig,
        timing::PipelineTimings,
    },
    exposure::{ExifExposureReader, ExposureReader},
    load::{DirectoryLoader, ExposureSet},
    merge::{DebevecMerger, RadianceMap},
    persist::{ImageWriter, StandardImageWriter, save_ldr, save_radiance},
    tonemap::{ToneMappedImage, Tonemapper},
};

/// Everything one bracket produces, before anything is written.
#[derive(Debug, Clone)]
pub struct HdrOutputs {
    pub radiance: RadianceMap,
    pub response: CameraResponse,
    /// One rendering per configured operator, in configuration order
    pub tonemapped: Vec<ToneMappedImage>,
    /// Translation applied to each input frame; all zero when alignment is off
    pub shifts: Vec<Shift>,
}

/// Files written by [`HdrPipeline::run`].
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub radiance_path: PathBuf,
    pub ldr_paths: Vec<PathBuf>,
    pub timings: PipelineTimings,
}

/// Joins `input_dir` below `output_root`, keeping only its normal components so
/// absolute or `..` inputs cannot escape the output root.
pub fn output_dir_for(output_root: &Path, input_dir: &Path) -> PathBuf {
    let mut dir = output_root.to_path_buf();
    for component in input_dir.components() {
        if let Component::Normal(part) = component {
            dir.push(part);
        }
    }
    dir
}

pub struct HdrPipeline<E: ExposureReader, W: ImageWriter> {
    exposure_reader: E,
    writer: W,
    config: HdrConfig,
}

impl HdrPipeline<ExifExposureReader, StandardImageWriter> {
    pub fn new(config: HdrConfig) -> Self {
        Self {
            exposure_reader: ExifExposureReader,
            writer: StandardImageWriter::new(config.jpeg_quality, config.tiff_compression),
            config,
        }
    }
}

impl<E: ExposureReader, W: ImageWriter> HdrPipeline<E, W> {
    pub fn with_custom(exposure_reader: E, writer: W, config: HdrConfig) -> Self {
        Self {
            exposure_reader,
            writer,
            config,
        }
    }

    pub fn config(&self) -> &HdrConfig {
        &self.config
    }

    /// Checks that fail fast, before any alignment work is spent on the set.
    fn validate(&self, exposures: &ExposureSet) -> Result<()> {
        exposures.check_max_dimension(self.config.max_dimension)?;
        if self.config.calibration.enabled {
            exposures.check_calibration_preconditions()?;
        }
        Ok(())
    }

    /// Lists, decodes and times the accepted files of `input_dir`.
    #[instrument(skip(self, input_dir, extensions, timings), fields(input = %input_dir.display()))]
    pub fn load<S: AsRef<str>>(
        &self,
        input_dir: &Path,
        extensions: &[S],
        timings: &mut PipelineTimings,
    ) -> Result<ExposureSet> {
        let loader = DirectoryLoader::new(extensions);

        let (paths, images) = timings.time("decode", || -> Result<_> {
            let _span = info_span!("decode").entered();
            let paths = loader.list(input_dir)?;
            info!("Found {} images", paths.len());
            let images = loader.read_all(&paths)?;
            Ok((paths, images))
        })?;

        let times = timings.time("exposure", || {
            let _span = info_span!("read_exposures").entered();
            self.exposure_reader.read_exposures(&paths)
        })?;

        for (path, time) in paths.iter().zip(&times) {
            debug!("{}: {}s", path.display(), time);
        }

        ExposureSet::new(images, times)
    }

    pub fn process(&self, exposures: ExposureSet) -> Result<HdrOutputs> {
        let mut timings = PipelineTimings::new();
        self.process_with_timings(exposures, &mut timings)
    }

    /// Runs align, calibrate, merge and tonemap on an in-memory bracket.
    #[instrument(skip(self, exposures, timings), fields(images = exposures.len()))]
    pub fn process_with_timings(
        &self,
        exposures: ExposureSet,
        timings: &mut PipelineTimings,
    ) -> Result<HdrOutputs> {
        let (width, height) = exposures.dimensions();
        info!("Starting exposure fusion: {} images of {}x{}", exposures.len(), width, height);

        timings.time("validate", || {
            let _span = info_span!("validate", width, height).entered();
            self.validate(&exposures)
        })?;

        let (exposures, shifts) = timings.time("align", || -> Result<(ExposureSet, Vec<Shift>)> {
            let _span = info_span!("align").entered();
            if !self.config.alignment.enabled {
                info!("Alignment disabled");
                let shifts = vec![Shift::ZERO; exposures.len()];
                return Ok((exposures, shifts));
            }
            let aligned = MtbAligner::new(self.config.alignment).process(&exposures)?;
            for (index, shift) in aligned.shifts.iter().enumerate() {
                info!("Image {} shifted by ({}, {})", index, shift.dx, shift.dy);
            }
            Ok((aligned.exposures, aligned.shifts))
        })?;

        let response = timings.time("calibrate", || -> Result<CameraResponse> {
            let _span = info_span!("calibrate").entered();
            if !self.config.calibration.enabled {
                info!("Calibration disabled, merging with the linear response");
                return Ok(CameraResponse::linear());
            }
            DebevecCalibrator::new(self.config.calibration).process(&exposures)
        })?;

        let radiance = timings.time("merge", || {
            let _span = info_span!("merge").entered();
            DebevecMerger::new().process(&exposures, &response)
        })?;

        let tonemapper = Tonemapper::new(self.config.tonemap);
        let mut tonemapped = Vec::with_capacity(self.config.operators.len());
        for &operator in &self.config.operators {
            let ldr = timings.time(&format!("tonemap_{}", operator), || {
                let _span = info_span!("tonemap", %operator).entered();
                tonemapper.process(&radiance, operator)
            })?;
            tonemapped.push(ldr);
        }

        info!(
            width,
            height,
            operators = tonemapped.len(),
            "Exposure fusion complete"
        );

        Ok(HdrOutputs {
            radiance,
            response,
            tonemapped,
            shifts,
        })
    }

    /// Writes the radiance map and every rendering into `dir`.
    ///
    /// Returns the radiance path and the LDR paths in rendering order.
    pub fn write_outputs(&self, outputs: &HdrOutputs, dir: &Path) -> Result<(PathBuf, Vec<PathBuf>)> {
        let _span = info_span!("persist", dir = %dir.display()).entered();

        let radiance_path = dir.join(self.config.radiance_file_name());
        save_radiance(&self.writer, &outputs.radiance, &radiance_path)?;

        let mut ldr_paths = Vec::with_capacity(outputs.tonemapped.len());
        for ldr in &outputs.tonemapped {
            let path = dir.join(HdrConfig::ldr_file_name(ldr.operator));
            save_ldr(&self.writer, &ldr.image, &path)?;
            ldr_paths.push(path);
        }

        Ok((radiance_path, ldr_paths))
    }

    /// Fuses the bracket in `input_dir` and writes the results below
    /// `output_root/<input_dir>`.
    #[instrument(skip(self, input_dir, output_root, extensions))]
    pub fn run<S: AsRef<str>>(
        &self,
        input_dir: &Path,
        output_root: &Path,
        extensions: &[S],
    ) -> Result<BatchReport> {
        let output_dir = output_dir_for(output_root, input_dir);
        info!(
            input = %input_dir.display(),
            output = %output_dir.display(),
            "Processing bracket"
        );

        let mut timings = PipelineTimings::new();
        let exposures = self.load(input_dir, extensions, &mut timings)?;
        let outputs = self.process_with_timings(exposures, &mut timings)?;
        let (radiance_path, ldr_paths) =
            timings.time("persist", || self.write_outputs(&outputs, &output_dir))?;

        Ok(BatchReport {
            output_dir,
            radiance_path,
            ldr_paths,
            timings,
        })
    }
}
