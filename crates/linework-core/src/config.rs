// SPDX-License-Identifier: MIT
//
// Engine configuration.

use serde::{Deserialize, Serialize};

use crate::types::OutputFormat;

/// Tunable engine settings.
///
/// The defaults reproduce the values the pipeline was calibrated with; the
/// interface layer may load overrides from its own configuration source and
/// pass the struct down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Density assumed when the caller declares none (pixels per inch).
    pub default_ppi: u32,
    /// Lowest accepted print resolution.
    pub min_ppi: u32,
    /// Highest accepted print resolution.
    pub max_ppi: u32,
    /// Default lower Canny hysteresis threshold.
    pub canny_low: f32,
    /// Default upper Canny hysteresis threshold.
    pub canny_high: f32,
    /// Default outline line thickness in pixels.
    pub default_thickness: i32,
    /// Native integer scale factor of the super-resolution model.
    pub model_scale: u32,
    /// Longest axis allowed for in-memory outline previews.
    pub preview_max_dimension: u32,
    /// Format used when a destination path has no recognised extension.
    pub default_format: OutputFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_ppi: 72,
            min_ppi: 1,
            max_ppi: 1200,
            canny_low: 50.0,
            canny_high: 150.0,
            default_thickness: 1,
            model_scale: 4,
            preview_max_dimension: 1920,
            default_format: OutputFormat::Png,
        }
    }
}
