use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use hdr_fusion_rs::image_pipeline::{
    AlignmentConfig, CalibrationConfig, HdrConfig, RadianceFormat, TiffCompression, TonemapConfig,
    TonemapOperator,
};

/// Everything `main` needs, resolved from the command line.
pub struct CliOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub formats: Vec<String>,
    pub exposure_times: Option<Vec<f32>>,
    pub timings: bool,
    pub config: HdrConfig,
}

#[rustfmt::skip]
pub fn create_cmd_args() -> Command {
    Command::new("hdr-fusion")
        .about("Fuse a bracket of exposures into an HDR radiance map and tonemapped JPEGs")
        .arg(Arg::new("input-dir")
            .long("input-dir")
            .short('i')
            .value_parser(value_parser!(PathBuf))
            .required(true)
            .help("Directory holding the bracketed exposures"))
        .arg(Arg::new("output-dir")
            .long("output-dir")
            .short('o')
            .value_parser(value_parser!(PathBuf))
            .default_value("build/output")
            .help("Root directory for results; the input path is recreated below it"))
        .arg(Arg::new("format")
            .long("format")
            .action(ArgAction::Append)
            .value_delimiter(',')
            .default_value(".jpg")
            .help("Accepted input extensions, case-insensitive"))
        .arg(Arg::new("exposure-times")
            .long("exposure-times")
            .action(ArgAction::Append)
            .value_delimiter(',')
            .value_parser(value_parser!(f32))
            .help("Exposure time in seconds of each file in name order, instead of EXIF"))
        .arg(Arg::new("operators")
            .long("operators")
            .action(ArgAction::Append)
            .value_delimiter(',')
            .default_values(["drago", "reinhard", "mantiuk"])
            .help("Tonemapping operators to render"))
        .arg(Arg::new("radiance-format")
            .long("radiance-format")
            .value_parser(["hdr", "tiff"])
            .default_value("hdr")
            .help("Container for the radiance map"))
        .arg(Arg::new("tiff-compression")
            .long("tiff-compression")
            .value_parser(["none", "lzw", "deflate-fast", "deflate", "deflate-best"])
            .default_value("none")
            .help("Compression of a TIFF radiance map"))
        .arg(Arg::new("jpeg-quality")
            .long("jpeg-quality")
            .value_parser(value_parser!(u8).range(1..=100))
            .default_value("95")
            .help("Quality of the tonemapped JPEGs"))
        .arg(Arg::new("timings")
            .long("timings")
            .action(ArgAction::SetTrue)
            .help("Log how long each stage took"))
        .arg(Arg::new("no-align")
            .long("no-align")
            .action(ArgAction::SetTrue)
            .help_heading("PIPELINE")
            .help("Skip MTB alignment, for tripod brackets"))
        .arg(Arg::new("no-calibrate")
            .long("no-calibrate")
            .action(ArgAction::SetTrue)
            .help_heading("PIPELINE")
            .help("Merge with a linear response instead of calibrating one"))
        .arg(Arg::new("samples")
            .long("samples")
            .value_parser(value_parser!(usize))
            .help_heading("PIPELINE")
            .help("Number of pixel locations sampled for calibration [default: 70]"))
        .arg(Arg::new("lambda")
            .long("lambda")
            .value_parser(value_parser!(f32))
            .help_heading("PIPELINE")
            .help("Smoothness weight of the response curve [default: 10]"))
        .arg(Arg::new("max-dimension")
            .long("max-dimension")
            .value_parser(value_parser!(u32))
            .help_heading("PIPELINE")
            .help("Reject frames wider or taller than this"))
        .arg(operator_arg("drago-gamma", "Drago output gamma [default: 1.0]"))
        .arg(operator_arg("drago-saturation", "Drago colour saturation [default: 0.7]"))
        .arg(operator_arg("drago-bias", "Drago bias, 0.7..0.9 [default: 0.85]"))
        .arg(operator_arg("reinhard-gamma", "Reinhard output gamma [default: 1.5]"))
        .arg(operator_arg("reinhard-intensity", "Reinhard intensity, -8..8 [default: 0]"))
        .arg(operator_arg("reinhard-light-adapt", "Reinhard light adaptation, 0..1 [default: 0]"))
        .arg(operator_arg("reinhard-color-adapt", "Reinhard chromatic adaptation, 0..1 [default: 0]"))
        .arg(operator_arg("mantiuk-gamma", "Mantiuk output gamma [default: 2.2]"))
        .arg(operator_arg("mantiuk-scale", "Mantiuk contrast scale [default: 0.85]"))
        .arg(operator_arg("mantiuk-saturation", "Mantiuk colour saturation [default: 1.2]"))
        .arg(Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display debug information and higher"))
        .arg(Arg::new("trace")
            .long("trace")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display very verbose information"))
}

fn operator_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_parser(value_parser!(f32))
        .allow_negative_numbers(true)
        .help_heading("TONEMAPPING")
        .help(help)
}

/// Default log directive picked by `--debug` / `--trace`.
pub fn log_level(matches: &ArgMatches) -> &'static str {
    if matches.get_flag("trace") {
        "trace"
    } else if matches.get_flag("debug") {
        "debug"
    } else {
        "info"
    }
}

fn override_f32(matches: &ArgMatches, name: &str, target: &mut f32) {
    if let Some(&value) = matches.get_one::<f32>(name) {
        *target = value;
    }
}

fn tonemap_config(matches: &ArgMatches) -> TonemapConfig {
    let mut config = TonemapConfig::default();
    override_f32(matches, "drago-gamma", &mut config.drago.gamma);
    override_f32(matches, "drago-saturation", &mut config.drago.saturation);
    override_f32(matches, "drago-bias", &mut config.drago.bias);
    override_f32(matches, "reinhard-gamma", &mut config.reinhard.gamma);
    override_f32(matches, "reinhard-intensity", &mut config.reinhard.intensity);
    override_f32(matches, "reinhard-light-adapt", &mut config.reinhard.light_adapt);
    override_f32(matches, "reinhard-color-adapt", &mut config.reinhard.color_adapt);
    override_f32(matches, "mantiuk-gamma", &mut config.mantiuk.gamma);
    override_f32(matches, "mantiuk-scale", &mut config.mantiuk.scale);
    override_f32(matches, "mantiuk-saturation", &mut config.mantiuk.saturation);
    config
}

fn strings(matches: &ArgMatches, name: &str) -> Vec<String> {
    matches
        .get_many::<String>(name)
        .map(|values| values.filter(|v| !v.trim().is_empty()).cloned().collect())
        .unwrap_or_default()
}

impl CliOptions {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let input_dir = matches
            .get_one::<PathBuf>("input-dir")
            .cloned()
            .context("--input-dir is required")?;
        let output_dir = matches
            .get_one::<PathBuf>("output-dir")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("build/output"));

        let operators = strings(matches, "operators")
            .iter()
            .map(|name| name.parse::<TonemapOperator>())
            .collect::<Result<Vec<_>, _>>()
            .context("invalid --operators")?;

        let radiance_format = matches
            .get_one::<String>("radiance-format")
            .map(|s| s.parse::<RadianceFormat>())
            .transpose()?
            .unwrap_or_default();
        let tiff_compression = matches
            .get_one::<String>("tiff-compression")
            .map(|s| s.parse::<TiffCompression>())
            .transpose()?
            .unwrap_or_default();

        let alignment = AlignmentConfig {
            enabled: !matches.get_flag("no-align"),
            ..AlignmentConfig::default()
        };

        let mut calibration = CalibrationConfig {
            enabled: !matches.get_flag("no-calibrate"),
            ..CalibrationConfig::default()
        };
        if let Some(&samples) = matches.get_one::<usize>("samples") {
            calibration.samples = samples;
        }
        override_f32(matches, "lambda", &mut calibration.lambda);

        let config = HdrConfig::builder()
            .alignment(alignment)
            .calibration(calibration)
            .tonemap(tonemap_config(matches))
            .operators(operators)
            .radiance_format(radiance_format)
            .tiff_compression(tiff_compression)
            .jpeg_quality(matches.get_one::<u8>("jpeg-quality").copied().unwrap_or(95))
            .max_dimension(matches.get_one::<u32>("max-dimension").copied())
            .build();

        Ok(Self {
            input_dir,
            output_dir,
            formats: strings(matches, "format"),
            exposure_times: matches
                .get_many::<f32>("exposure-times")
                .map(|values| values.copied().collect()),
            timings: matches.get_flag("timings"),
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        let matches = create_cmd_args().try_get_matches_from(args)?;
        CliOptions::from_matches(&matches)
    }

    #[test]
    fn test_defaults() {
        let options = parse(&["hdr-fusion", "--input-dir", "data/set1"]).unwrap();
        assert_eq!(options.input_dir, PathBuf::from("data/set1"));
        assert_eq!(options.output_dir, PathBuf::from("build/output"));
        assert_eq!(options.formats, vec![".jpg"]);
        assert!(options.exposure_times.is_none());
        assert_eq!(options.config, HdrConfig::default());
    }

    #[test]
    fn test_overrides() {
        let options = parse(&[
            "hdr-fusion",
            "-i", "in",
            "--format", ".JPG,png",
            "--exposure-times", "0.033,2.5,15,0.25",
            "--operators", "mantiuk,drago",
            "--radiance-format", "tiff",
            "--no-align",
            "--samples", "120",
            "--reinhard-intensity", "-1.5",
            "--mantiuk-scale", "0.7",
        ])
        .unwrap();

        assert_eq!(options.formats, vec![".JPG", "png"]);
        assert_eq!(options.exposure_times, Some(vec![0.033, 2.5, 15.0, 0.25]));
        assert_eq!(
            options.config.operators,
            vec![TonemapOperator::Mantiuk, TonemapOperator::Drago]
        );
        assert_eq!(options.config.radiance_format, RadianceFormat::Tiff);
        assert!(!options.config.alignment.enabled);
        assert_eq!(options.config.calibration.samples, 120);
        assert_eq!(options.config.tonemap.reinhard.intensity, -1.5);
        assert_eq!(options.config.tonemap.mantiuk.scale, 0.7);
    }

    #[test]
    fn test_unknown_operator() {
        assert!(parse(&["hdr-fusion", "-i", "in", "--operators", "drago,fattal"]).is_err());
    }

    #[test]
    fn test_log_level() {
        let matches = create_cmd_args()
            .try_get_matches_from(["hdr-fusion", "-i", "in", "--debug"])
            .unwrap();
        assert_eq!(log_level(&matches), "debug");
    }
}
