// SPDX-License-Identifier: MIT
//
// Top-level pipeline operations: enhancement (model upscale + precision
// resize + density metadata), outline extraction, and source inspection.
// Each operation is a single synchronous pass that owns its image values;
// failures come back as typed errors, never as a half-written output file.

use std::path::Path;

use image::GrayImage;
use tracing::{info, instrument};

use linework_core::config::EngineConfig;
use linework_core::error::{LineworkError, Result};
use linework_core::types::{
    Dimensions, EnhanceParams, ImageInfo, OutlineParams, OutputFormat, OutputInfo, PhysicalSize,
};

use crate::codec::{self, EncodeOptions, density};
use crate::dimensions::resolve_dimensions;
use crate::model::Upscaler;
use crate::outline::OutlineExtractor;
use crate::resample::{resample, shrink_to_fit};

/// Enhance an image: super-resolution upscale, precision resize to the
/// reconciled target dimensions, then encode with the declared print
/// density.
///
/// The model always runs before the precision resize — resizing first would
/// throw away the quality the model adds. An unloaded model fails the whole
/// operation up front; nothing is decoded and no output file is created.
#[instrument(skip_all, fields(input = %input.as_ref().display(), output = %output.as_ref().display()))]
pub fn enhance_image(
    model: &dyn Upscaler,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    params: &EnhanceParams,
    config: &EngineConfig,
) -> Result<OutputInfo> {
    params.validate(config)?;

    if !model.is_loaded() {
        return Err(LineworkError::ModelUnavailable(format!(
            "model '{}' is not loaded",
            model.name()
        )));
    }

    let original = codec::decode_image(input.as_ref())?;
    let target = resolve_dimensions(
        original.width(),
        original.height(),
        params.target_width,
        params.target_height,
        params.maintain_aspect,
    )?;
    info!(%target, model = model.name(), "Enhancing image");

    let upscaled = model.enhance(&original)?;
    let finished = resample(&upscaled, target);

    let written = codec::encode_image(
        &finished,
        output.as_ref(),
        params.format,
        &EncodeOptions {
            density: Some((params.ppi_horizontal, params.ppi_vertical)),
        },
    )?;

    Ok(OutputInfo {
        dimensions: written,
        physical_size: Some(PhysicalSize::from_pixels(
            written,
            params.ppi_horizontal,
            params.ppi_vertical,
        )),
        thickness: None,
        format: params.format,
        file_path: output.as_ref().to_path_buf(),
    })
}

/// Extract a line-art outline and write it to `output`. The output format
/// follows the destination extension, defaulting to PNG.
#[instrument(skip_all, fields(input = %input.as_ref().display(), output = %output.as_ref().display()))]
pub fn extract_outline(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    params: &OutlineParams,
) -> Result<OutputInfo> {
    params.validate()?;

    let image = codec::decode_image(input.as_ref())?;
    let outline = OutlineExtractor::new(*params).extract(&image);

    let format = OutputFormat::from_path(output.as_ref());
    let written = codec::encode_image(
        &image::DynamicImage::ImageLuma8(outline),
        output.as_ref(),
        format,
        &EncodeOptions::default(),
    )?;

    Ok(OutputInfo {
        dimensions: written,
        physical_size: None,
        thickness: Some(params.clamped_thickness()),
        format,
        file_path: output.as_ref().to_path_buf(),
    })
}

/// In-memory outline preview for interactive use: the image is reduced to
/// the configured preview size first so large uploads stay responsive.
pub fn preview_outline(input: impl AsRef<Path>, config: &EngineConfig) -> Result<GrayImage> {
    let image = codec::decode_image(input.as_ref())?;
    let reduced = shrink_to_fit(&image, config.preview_max_dimension);
    Ok(OutlineExtractor::preview(
        &reduced,
        config.canny_low,
        config.canny_high,
    ))
}

/// Inspect a source image: dimensions, container format, file size, and
/// declared print density (72x72 when the container carries none).
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn image_info(path: impl AsRef<Path>) -> Result<ImageInfo> {
    let bytes = std::fs::read(path.as_ref())?;

    let format = image::guess_format(&bytes).ok();
    let image = image::load_from_memory(&bytes).map_err(|err| {
        LineworkError::Decode(format!("{}: {}", path.as_ref().display(), err))
    })?;

    let dimensions = Dimensions::new(image.width(), image.height())?;
    let declared = density::read_density(&bytes);

    Ok(ImageInfo::new(
        dimensions,
        format.map(|f| format!("{:?}", f).to_ascii_uppercase()),
        bytes.len() as u64,
        declared,
    ))
}

// -- Tests --------------------------------------------------------------------
