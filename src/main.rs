mod cli;

use anyhow::{Context, Result};

use hdr_fusion_rs::image_pipeline::{
    BatchReport, FixedExposureReader, HdrPipeline, StandardImageWriter,
};
use hdr_fusion_rs::logger::{self, info};

use crate::cli::CliOptions;

fn main() -> Result<()> {
    let matches = cli::create_cmd_args().get_matches();
    logger::init_with_default(cli::log_level(&matches));

    let options = CliOptions::from_matches(&matches)?;

    info!("Starting hdr-fusion...");
    info!("Input: {}", options.input_dir.display());
    info!(
        "Operators: {}",
        options
            .config
            .operators
            .iter()
            .map(|op| op.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let report = run(&options)
        .with_context(|| format!("failed to process {}", options.input_dir.display()))?;

    if options.timings {
        report.timings.log_summary();
    }
    info!(
        "Wrote {} files to {}",
        report.ldr_paths.len() + 1,
        report.output_dir.display()
    );

    Ok(())
}

fn run(options: &CliOptions) -> hdr_fusion_rs::image_pipeline::Result<BatchReport> {
    let config = options.config.clone();
    match &options.exposure_times {
        Some(times) => {
            info!("Exposure times: {:?} (from the command line)", times);
            let writer = StandardImageWriter::new(config.jpeg_quality, config.tiff_compression);
            HdrPipeline::with_custom(FixedExposureReader::new(times.clone()), writer, config).run(
                &options.input_dir,
                &options.output_dir,
                &options.formats,
            )
        }
        None => {
            info!("Exposure times: from EXIF");
            HdrPipeline::new(config).run(&options.input_dir, &options.output_dir, &options.formats)
        }
    }
}
