// SPDX-License-Identifier: MIT
//
// Image codec — decode sources, encode results with per-format quality
// knobs, and stamp print-density metadata into the output.
//
// Writes are atomic: the encoded bytes go to a temporary file in the
// destination directory which is renamed into place, so a failure at any
// point leaves no partial output behind.

pub mod density;

use std::io::{Cursor, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, PngEncoder};
use image::{DynamicImage, ImageFormat};
use tracing::{debug, info, instrument};

use linework_core::error::{LineworkError, Result};
use linework_core::types::{Dimensions, OutputFormat};

/// Quality factor for lossy formats (JPEG, WebP).
const LOSSY_QUALITY: u8 = 95;

/// Encoding knobs beyond the format itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Declared print density (horizontal, vertical PPI), stamped into
    /// containers that carry one.
    pub density: Option<(u32, u32)>,
}

/// Decode an image from disk. Unreadable or corrupt files fail with a
/// `Decode` error; nothing is written anywhere.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn decode_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|err| {
        LineworkError::Decode(format!("{}: {}", path.display(), err))
    })?;
    debug!(width = image.width(), height = image.height(), "Image decoded");
    Ok(image)
}

/// Encode `image` to `path` in the given format and atomically move it into
/// place. Returns the pixel dimensions of the written image.
#[instrument(skip_all, fields(path = %path.as_ref().display(), format = ?format))]
pub fn encode_image(
    image: &DynamicImage,
    path: impl AsRef<Path>,
    format: OutputFormat,
    options: &EncodeOptions,
) -> Result<Dimensions> {
    let path = path.as_ref();

    let mut encoded = encode_to_memory(image, format)?;
    if let Some((ppi_h, ppi_v)) = options.density {
        encoded = density::write_density(encoded, format, ppi_h, ppi_v)?;
    }

    write_atomically(path, &encoded)?;
    info!(bytes = encoded.len(), "Image written");

    Dimensions::new(image.width(), image.height())
}

/// Encode into memory with the per-format quality policy: lossless formats
/// get maximum compression, lossy formats a fixed high quality factor.
fn encode_to_memory(image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    match format {
        OutputFormat::Png => {
            let encoder = PngEncoder::new_with_quality(
                Cursor::new(&mut buffer),
                CompressionType::Best,
                image::codecs::png::FilterType::Adaptive,
            );
            image
                .write_with_encoder(encoder)
                .map_err(|err| LineworkError::Encode(format!("PNG encoding failed: {}", err)))?;
        }
        OutputFormat::Jpeg => {
            let rgb = image.to_rgb8();
            let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buffer), LOSSY_QUALITY);
            rgb.write_with_encoder(encoder)
                .map_err(|err| LineworkError::Encode(format!("JPEG encoding failed: {}", err)))?;
        }
        OutputFormat::WebP => {
            let rgb = image.to_rgb8();
            let encoded =
                webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height())
                    .encode(LOSSY_QUALITY as f32);
            buffer.extend_from_slice(&encoded);
        }
        OutputFormat::Bmp => {
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            rgb.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Bmp)
                .map_err(|err| LineworkError::Encode(format!("BMP encoding failed: {}", err)))?;
        }
        OutputFormat::Tiff => {
            image
                .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Tiff)
                .map_err(|err| LineworkError::Encode(format!("TIFF encoding failed: {}", err)))?;
        }
    }

    Ok(buffer)
}

/// Write bytes via a temporary file in the destination directory, renamed
/// over the target path once fully written.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.persist(path).map_err(|err| LineworkError::Io(err.error))?;
    Ok(())
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn test_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(31, 17, |x, y| {
            Rgb([(x * 8) as u8, (y * 15) as u8, 120])
        }))
    }

    #[test]
    fn round_trip_preserves_dimensions_in_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let image = test_image();

        for format in [
            OutputFormat::Png,
            OutputFormat::Jpeg,
            OutputFormat::Bmp,
            OutputFormat::Tiff,
            OutputFormat::WebP,
        ] {
            let path = dir.path().join(format!("out.{}", format.extension()));
            let written =
                encode_image(&image, &path, format, &EncodeOptions::default()).unwrap();
            assert_eq!((written.width, written.height), (31, 17));

            let decoded = decode_image(&path).unwrap();
            assert_eq!(
                (decoded.width(), decoded.height()),
                (31, 17),
                "dimension mismatch for {:?}",
                format
            );
        }
    }

    #[test]
    fn density_survives_the_png_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dense.png");

        encode_image(
            &test_image(),
            &path,
            OutputFormat::Png,
            &EncodeOptions {
                density: Some((300, 300)),
            },
        )
        .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(density::read_density(&bytes), Some((300, 300)));
    }

    #[test]
    fn grayscale_images_encode_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let mask = DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 10, Luma([255u8])));

        encode_image(&mask, &path, OutputFormat::Png, &EncodeOptions::default()).unwrap();
        let decoded = decode_image(&path).unwrap();
        assert!(decoded.to_luma8().pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn unwritable_destination_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-subdir").join("out.png");

        let result = encode_image(
            &test_image(),
            &path,
            OutputFormat::Png,
            &EncodeOptions::default(),
        );
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn decode_rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-an-image.png");
        std::fs::write(&path, b"definitely not pixels").unwrap();

        assert!(matches!(
            decode_image(&path),
            Err(LineworkError::Decode(_))
        ));
    }

    #[test]
    fn decode_rejects_missing_files() {
        assert!(matches!(
            decode_image("/nonexistent/nowhere.png"),
            Err(LineworkError::Decode(_))
        ));
    }
}
