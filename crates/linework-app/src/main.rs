// SPDX-License-Identifier: MIT
//
// Linework — print-resolution image enhancement and line-art outlines.
//
// Entry point. Initialises logging, parses the command line, runs one
// pipeline operation, and prints the JSON processing report.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use linework_core::config::EngineConfig;
use linework_core::human_errors::humanize_error;
use linework_core::types::{
    DetailLevel, EnhanceParams, OutlineParams, OutlineStrategy, OutputFormat, ProcessingReport,
};
use linework_imaging::{InterpolationUpscaler, UpscalerHandle, enhance_image, extract_outline, image_info};

#[derive(Parser)]
#[command(name = "linework", version, about = "Upscale images for print and trace line-art outlines")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upscale an image and declare its print resolution.
    Enhance {
        input: PathBuf,
        output: PathBuf,
        /// Target width in pixels.
        #[arg(long)]
        width: Option<u32>,
        /// Target height in pixels.
        #[arg(long)]
        height: Option<u32>,
        /// Print resolution in pixels per inch (both axes unless
        /// --ppi-vertical is given); defaults to the engine configuration.
        #[arg(long)]
        ppi: Option<u32>,
        /// Vertical print resolution, when it differs from --ppi.
        #[arg(long)]
        ppi_vertical: Option<u32>,
        /// Use the target dimensions verbatim instead of reconciling them
        /// against the source aspect ratio.
        #[arg(long)]
        ignore_aspect: bool,
        /// Output format; defaults to the output file extension.
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        /// Native scale factor of the upscaling model; defaults to the
        /// engine configuration.
        #[arg(long)]
        scale: Option<u32>,
    },
    /// Extract a black-on-white line-art outline.
    Outline {
        input: PathBuf,
        output: PathBuf,
        /// Line thickness in pixels (clamped to 1-5); defaults to the
        /// engine configuration.
        #[arg(long)]
        thickness: Option<i32>,
        /// Threshold selection strategy.
        #[arg(long, value_enum, default_value = "fixed")]
        strategy: StrategyArg,
        /// Detail preset; implies --strategy detail.
        #[arg(long, value_enum)]
        detail: Option<DetailArg>,
        /// Lower Canny threshold (fixed strategy).
        #[arg(long)]
        low: Option<f32>,
        /// Upper Canny threshold (fixed strategy).
        #[arg(long)]
        high: Option<f32>,
    },
    /// Print dimensions, format, and declared density of an image.
    Info { input: PathBuf },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
    Bmp,
    Tiff,
    Webp,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => Self::Png,
            FormatArg::Jpeg => Self::Jpeg,
            FormatArg::Bmp => Self::Bmp,
            FormatArg::Tiff => Self::Tiff,
            FormatArg::Webp => Self::WebP,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Fixed,
    Adaptive,
    Detail,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DetailArg {
    Low,
    Medium,
    High,
}

impl From<DetailArg> for DetailLevel {
    fn from(arg: DetailArg) -> Self {
        match arg {
            DetailArg::Low => Self::Low,
            DetailArg::Medium => Self::Medium,
            DetailArg::High => Self::High,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Linework starting");

    let cli = Cli::parse();
    let config = EngineConfig::default();

    match cli.command {
        Command::Enhance {
            input,
            output,
            width,
            height,
            ppi,
            ppi_vertical,
            ignore_aspect,
            format,
            scale,
        } => {
            let ppi = ppi.unwrap_or(config.default_ppi);
            let params = EnhanceParams {
                target_width: width,
                target_height: height,
                ppi_horizontal: ppi,
                ppi_vertical: ppi_vertical.unwrap_or(ppi),
                maintain_aspect: !ignore_aspect,
                format: format
                    .map(OutputFormat::from)
                    .unwrap_or_else(|| OutputFormat::from_path(&output)),
            };

            // The model is installed once and stays resident; a single CLI
            // invocation only needs one inference, but the handle is the
            // same one a long-running host would hold on to.
            let models = UpscalerHandle::empty();
            models.install(Box::new(InterpolationUpscaler::new(
                scale.unwrap_or(config.model_scale),
            )));

            let result = models.with(|model| match model {
                Some(model) => enhance_image(model, &input, &output, &params, &config),
                None => Err(linework_core::LineworkError::ModelUnavailable(
                    "no model installed".into(),
                )),
            });
            models.unload();
            finish(result)
        }

        Command::Outline {
            input,
            output,
            thickness,
            strategy,
            detail,
            low,
            high,
        } => {
            let strategy = match (strategy, detail) {
                (StrategyArg::Adaptive, _) => OutlineStrategy::Adaptive,
                (StrategyArg::Detail, level) | (StrategyArg::Fixed, level @ Some(_)) => {
                    OutlineStrategy::Detail(level.map(DetailLevel::from).unwrap_or(DetailLevel::Medium))
                }
                (StrategyArg::Fixed, None) => OutlineStrategy::Fixed,
            };

            let params = OutlineParams {
                low_threshold: low.unwrap_or(config.canny_low),
                high_threshold: high.unwrap_or(config.canny_high),
                thickness: thickness.unwrap_or(config.default_thickness),
                strategy,
            };

            finish(extract_outline(&input, &output, &params))
        }

        Command::Info { input } => match image_info(&input) {
            Ok(info) => {
                println!("{}", to_json(&info));
                ExitCode::SUCCESS
            }
            Err(err) => {
                let human = humanize_error(&err);
                eprintln!("{} {}", human.message, human.suggestion);
                ExitCode::FAILURE
            }
        },
    }
}

/// Print the processing report and turn it into an exit code.
fn finish(result: linework_core::error::Result<linework_core::types::OutputInfo>) -> ExitCode {
    if let Err(err) = &result {
        let human = humanize_error(err);
        eprintln!("{} {}", human.message, human.suggestion);
    }

    let report = ProcessingReport::from_result(result);
    println!("{}", to_json(&report));

    if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn to_json(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".into())
}
