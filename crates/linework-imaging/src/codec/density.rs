// SPDX-License-Identifier: MIT
//
// Print-density metadata, read and written at the container level.
//
// The `image` crate's encoders do not expose resolution metadata, so the
// density is stamped after encoding by editing the container directly: a
// `pHYs` chunk for PNG (pixels per metre) and the JFIF APP0 density fields
// for JPEG (dots per inch). Containers we do not edit simply carry no
// density, which is allowed — readers fall back to 72 PPI.

use img_parts::jpeg::{Jpeg, JpegSegment, markers};
use img_parts::png::{Png, PngChunk};
use img_parts::Bytes;
use tracing::debug;

use linework_core::error::{LineworkError, Result};
use linework_core::types::OutputFormat;

const INCHES_PER_METRE: f64 = 39.370_078_740_157_48;

const PNG_PHYS: [u8; 4] = *b"pHYs";
const PNG_IDAT: [u8; 4] = *b"IDAT";
const JFIF_IDENTIFIER: [u8; 5] = *b"JFIF\0";

/// Stamp the declared PPI into encoded image bytes.
///
/// Only PNG and JPEG containers are edited; other formats are passed through
/// unchanged (dropping the density is not an error).
pub fn write_density(
    encoded: Vec<u8>,
    format: OutputFormat,
    ppi_horizontal: u32,
    ppi_vertical: u32,
) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Png => stamp_png(encoded, ppi_horizontal, ppi_vertical),
        OutputFormat::Jpeg => stamp_jpeg(encoded, ppi_horizontal, ppi_vertical),
        _ => {
            debug!(?format, "container not edited for density metadata");
            Ok(encoded)
        }
    }
}

/// Recover a declared density (PPI per axis) from encoded image bytes.
///
/// Understands PNG `pHYs` (metre unit only) and JFIF APP0 (inch and
/// centimetre units). Returns `None` when the container declares nothing
/// usable.
pub fn read_density(encoded: &[u8]) -> Option<(u32, u32)> {
    if encoded.starts_with(&[0x89, b'P', b'N', b'G']) {
        return read_png_density(encoded);
    }
    if encoded.starts_with(&[0xFF, 0xD8]) {
        return read_jpeg_density(encoded);
    }
    None
}

// -- PNG ----------------------------------------------------------------------

fn stamp_png(encoded: Vec<u8>, ppi_horizontal: u32, ppi_vertical: u32) -> Result<Vec<u8>> {
    let mut png = Png::from_bytes(Bytes::from(encoded))
        .map_err(|err| LineworkError::Encode(format!("PNG container edit failed: {}", err)))?;

    let ppm_x = (ppi_horizontal as f64 * INCHES_PER_METRE).round() as u32;
    let ppm_y = (ppi_vertical as f64 * INCHES_PER_METRE).round() as u32;

    let mut contents = Vec::with_capacity(9);
    contents.extend_from_slice(&ppm_x.to_be_bytes());
    contents.extend_from_slice(&ppm_y.to_be_bytes());
    contents.push(1); // unit: metre

    let chunks = png.chunks_mut();
    chunks.retain(|chunk| chunk.kind() != PNG_PHYS);

    // pHYs must precede the image data.
    let position = chunks
        .iter()
        .position(|chunk| chunk.kind() == PNG_IDAT)
        .unwrap_or(chunks.len());
    chunks.insert(position, PngChunk::new(PNG_PHYS, Bytes::from(contents)));

    let mut output = Vec::new();
    png.encoder()
        .write_to(&mut output)
        .map_err(|err| LineworkError::Encode(format!("PNG container write failed: {}", err)))?;
    Ok(output)
}

fn read_png_density(encoded: &[u8]) -> Option<(u32, u32)> {
    let png = Png::from_bytes(Bytes::copy_from_slice(encoded)).ok()?;
    let chunk = png.chunks().iter().find(|chunk| chunk.kind() == PNG_PHYS)?;
    let contents = chunk.contents();
    if contents.len() != 9 || contents[8] != 1 {
        return None;
    }

    let ppm_x = u32::from_be_bytes(contents[0..4].try_into().ok()?);
    let ppm_y = u32::from_be_bytes(contents[4..8].try_into().ok()?);
    Some((
        (ppm_x as f64 / INCHES_PER_METRE).round() as u32,
        (ppm_y as f64 / INCHES_PER_METRE).round() as u32,
    ))
}

// -- JPEG ---------------------------------------------------------------------

fn stamp_jpeg(encoded: Vec<u8>, ppi_horizontal: u32, ppi_vertical: u32) -> Result<Vec<u8>> {
    let mut jpeg = Jpeg::from_bytes(Bytes::from(encoded))
        .map_err(|err| LineworkError::Encode(format!("JPEG container edit failed: {}", err)))?;

    let mut contents = Vec::with_capacity(14);
    contents.extend_from_slice(&JFIF_IDENTIFIER);
    contents.extend_from_slice(&[1, 2]); // JFIF version 1.02
    contents.push(1); // density unit: dots per inch
    contents.extend_from_slice(&(clamp_u16(ppi_horizontal)).to_be_bytes());
    contents.extend_from_slice(&(clamp_u16(ppi_vertical)).to_be_bytes());
    contents.extend_from_slice(&[0, 0]); // no thumbnail

    let segments = jpeg.segments_mut();
    segments.retain(|segment| {
        !(segment.marker() == markers::APP0
            && segment.contents().starts_with(&JFIF_IDENTIFIER))
    });
    segments.insert(0, JpegSegment::new_with_contents(markers::APP0, Bytes::from(contents)));

    let mut output = Vec::new();
    jpeg.encoder()
        .write_to(&mut output)
        .map_err(|err| LineworkError::Encode(format!("JPEG container write failed: {}", err)))?;
    Ok(output)
}

fn read_jpeg_density(encoded: &[u8]) -> Option<(u32, u32)> {
    let jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(encoded)).ok()?;
    let segment = jpeg.segments().iter().find(|segment| {
        segment.marker() == markers::APP0 && segment.contents().starts_with(&JFIF_IDENTIFIER)
    })?;

    let contents = segment.contents();
    if contents.len() < 12 {
        return None;
    }
    let x = u16::from_be_bytes([contents[8], contents[9]]) as u32;
    let y = u16::from_be_bytes([contents[10], contents[11]]) as u32;

    match contents[7] {
        // Dots per inch.
        1 => Some((x, y)),
        // Dots per centimetre.
        2 => Some((
            (x as f64 * 2.54).round() as u32,
            (y as f64 * 2.54).round() as u32,
        )),
        _ => None,
    }
}

fn clamp_u16(value: u32) -> u16 {
    value.min(u16::MAX as u32) as u16
}

// -- Tests --------------------------------------------------------------------
