// SPDX-License-Identifier: MIT
//
// Core domain types for the Linework engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{LineworkError, Result};

/// A validated pixel size: both axes are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Construct a size, rejecting zero on either axis.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LineworkError::InvalidParameter(format!(
                "dimensions must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    /// Width / height as a floating-point ratio.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Supported output image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Bmp,
    Tiff,
    WebP,
}

impl OutputFormat {
    /// Parse a file extension (without the dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Format implied by a destination path. Unrecognised or missing
    /// extensions fall back to PNG, the lossless default.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(Self::Png)
    }

    /// Canonical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::WebP => "webp",
        }
    }

    /// MIME type string for HTTP responses.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::WebP => "image/webp",
        }
    }

    /// Whether the format preserves pixel data exactly.
    pub fn is_lossless(&self) -> bool {
        !matches!(self, Self::Jpeg | Self::WebP)
    }
}

/// How much fine structure the outline keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailLevel {
    /// Heavy smoothing, only dominant contours survive.
    Low,
    /// Balanced smoothing with the configured thresholds.
    Medium,
    /// Light smoothing, fine texture is kept.
    High,
}

/// Which parameter family drives the outline extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlineStrategy {
    /// Gaussian denoise with explicitly configured Canny thresholds.
    Fixed,
    /// Edge-preserving bilateral denoise with thresholds derived from the
    /// filtered image itself.
    Adaptive,
    /// Gaussian denoise with a kernel/threshold preset per detail level.
    Detail(DetailLevel),
}

/// Parameters for one outline extraction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OutlineParams {
    /// Lower Canny hysteresis threshold.
    pub low_threshold: f32,
    /// Upper Canny hysteresis threshold.
    pub high_threshold: f32,
    /// Requested line thickness in pixels. Clamped to [1, 5] before any
    /// kernel is built; out-of-range values are absorbed, never an error.
    pub thickness: i32,
    pub strategy: OutlineStrategy,
}

impl OutlineParams {
    /// Defaults taken from the engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            low_threshold: config.canny_low,
            high_threshold: config.canny_high,
            thickness: config.default_thickness,
            strategy: OutlineStrategy::Fixed,
        }
    }

    /// The thickness that actually reaches the morphology step.
    pub fn clamped_thickness(&self) -> u32 {
        self.thickness.clamp(1, 5) as u32
    }

    /// Check the explicit-threshold invariant. Strategies that derive or
    /// preset their own thresholds ignore the configured pair, so only the
    /// strategies that actually read it are validated against it.
    pub fn validate(&self) -> Result<()> {
        let thresholds_used = matches!(
            self.strategy,
            OutlineStrategy::Fixed | OutlineStrategy::Detail(DetailLevel::Medium)
        );
        if thresholds_used && self.low_threshold >= self.high_threshold {
            return Err(LineworkError::InvalidParameter(format!(
                "low threshold {} must be below high threshold {}",
                self.low_threshold, self.high_threshold
            )));
        }
        Ok(())
    }
}

/// Parameters for one enhancement (upscale + resize + density) operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnhanceParams {
    pub target_width: Option<u32>,
    pub target_height: Option<u32>,
    /// Declared horizontal print resolution, pixels per inch.
    pub ppi_horizontal: u32,
    /// Declared vertical print resolution, pixels per inch.
    pub ppi_vertical: u32,
    /// Reconcile target dimensions against the source aspect ratio.
    pub maintain_aspect: bool,
    pub format: OutputFormat,
}

impl EnhanceParams {
    /// Defaults: no explicit target size, configured PPI on both axes,
    /// aspect ratio locked, configured output format.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            target_width: None,
            target_height: None,
            ppi_horizontal: config.default_ppi,
            ppi_vertical: config.default_ppi,
            maintain_aspect: true,
            format: config.default_format,
        }
    }

    /// Reject out-of-range PPI and zero target dimensions before any pixel
    /// work starts.
    pub fn validate(&self, config: &EngineConfig) -> Result<()> {
        for (axis, ppi) in [("horizontal", self.ppi_horizontal), ("vertical", self.ppi_vertical)] {
            if ppi < config.min_ppi || ppi > config.max_ppi {
                return Err(LineworkError::InvalidParameter(format!(
                    "{} PPI {} outside allowed range {}..={}",
                    axis, ppi, config.min_ppi, config.max_ppi
                )));
            }
        }
        if self.target_width == Some(0) || self.target_height == Some(0) {
            return Err(LineworkError::InvalidParameter(
                "target dimensions must be at least 1 pixel".into(),
            ));
        }
        Ok(())
    }
}

/// Physical print size implied by pixel dimensions and declared PPI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSize {
    /// Width in inches, rounded to 2 decimals.
    pub width_in: f64,
    /// Height in inches, rounded to 2 decimals.
    pub height_in: f64,
}

impl PhysicalSize {
    /// `pixels / ppi` per axis. PPI is validated upstream, never zero here.
    pub fn from_pixels(dimensions: Dimensions, ppi_horizontal: u32, ppi_vertical: u32) -> Self {
        Self {
            width_in: round2(dimensions.width as f64 / ppi_horizontal as f64),
            height_in: round2(dimensions.height as f64 / ppi_vertical as f64),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Description of a finished output file, consumed by the interface layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputInfo {
    pub dimensions: Dimensions,
    /// Present for enhancement outputs, where a print size was declared.
    pub physical_size: Option<PhysicalSize>,
    /// Present for outline outputs: the clamped line thickness used.
    pub thickness: Option<u32>,
    pub format: OutputFormat,
    pub file_path: PathBuf,
}

/// Basic facts about a source image, reported at upload time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Container format name, when recognised.
    pub format: Option<String>,
    pub file_size_bytes: u64,
    pub file_size_mb: f64,
    /// Declared density, falling back to 72x72 when the container carries none.
    pub ppi_horizontal: u32,
    pub ppi_vertical: u32,
    pub megapixels: f64,
    pub aspect_ratio: f64,
}

impl ImageInfo {
    pub fn new(
        dimensions: Dimensions,
        format: Option<String>,
        file_size_bytes: u64,
        density: Option<(u32, u32)>,
    ) -> Self {
        let (ppi_h, ppi_v) = density.unwrap_or((72, 72));
        Self {
            width: dimensions.width,
            height: dimensions.height,
            format,
            file_size_bytes,
            file_size_mb: round2(file_size_bytes as f64 / (1024.0 * 1024.0)),
            ppi_horizontal: ppi_h,
            ppi_vertical: ppi_v,
            megapixels: round2(dimensions.width as f64 * dimensions.height as f64 / 1_000_000.0),
            aspect_ratio: (dimensions.aspect_ratio() * 1000.0).round() / 1000.0,
        }
    }
}

/// Uniform result envelope for the interface layer. Failures are carried as
/// data; the engine never aborts the host process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingReport {
    pub fn from_result(result: Result<OutputInfo>) -> Self {
        match result {
            Ok(output) => Self {
                success: true,
                output: Some(output),
                error: None,
            },
            Err(err) => Self {
                success: false,
                output: None,
                error: Some(err.to_string()),
            },
        }
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_reject_zero() {
        assert!(Dimensions::new(0, 100).is_err());
        assert!(Dimensions::new(100, 0).is_err());
        assert!(Dimensions::new(1, 1).is_ok());
    }

    #[test]
    fn format_from_path_falls_back_to_png() {
        assert_eq!(OutputFormat::from_path(Path::new("out.jpeg")), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_path(Path::new("out.TIF")), OutputFormat::Tiff);
        assert_eq!(OutputFormat::from_path(Path::new("out.xyz")), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::Png);
    }

    #[test]
    fn thickness_clamps_to_valid_range() {
        let mut params = OutlineParams::from_config(&EngineConfig::default());
        params.thickness = 7;
        assert_eq!(params.clamped_thickness(), 5);
        params.thickness = -3;
        assert_eq!(params.clamped_thickness(), 1);
        params.thickness = 3;
        assert_eq!(params.clamped_thickness(), 3);
    }

    #[test]
    fn inverted_thresholds_rejected_when_used() {
        let mut params = OutlineParams::from_config(&EngineConfig::default());
        params.low_threshold = 200.0;
        params.high_threshold = 100.0;
        assert!(params.validate().is_err());

        // Adaptive derives its own thresholds; the configured pair is inert.
        params.strategy = OutlineStrategy::Adaptive;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn enhance_params_ppi_bounds() {
        let config = EngineConfig::default();
        let mut params = EnhanceParams::from_config(&config);
        assert!(params.validate(&config).is_ok());

        params.ppi_horizontal = 0;
        assert!(params.validate(&config).is_err());

        params.ppi_horizontal = config.max_ppi + 1;
        assert!(params.validate(&config).is_err());
    }

    #[test]
    fn physical_size_rounds_to_two_decimals() {
        let dims = Dimensions::new(1000, 500).unwrap();
        let size = PhysicalSize::from_pixels(dims, 300, 300);
        assert_eq!(size.width_in, 3.33);
        assert_eq!(size.height_in, 1.67);
    }

    #[test]
    fn report_captures_error_message() {
        let report = ProcessingReport::from_result(Err(LineworkError::ModelUnavailable(
            "not loaded".into(),
        )));
        assert!(!report.success);
        assert!(report.error.unwrap().contains("model unavailable"));
    }
}
