// SPDX-License-Identifier: MIT
//
// Low-level raster primitives for the outline pipeline: separable Gaussian
// smoothing with an explicit kernel size, an edge-preserving bilateral
// filter, binary morphology over elliptical structuring elements, and the
// thresholding helpers that keep outline masks strictly two-valued.

use image::{GrayImage, Luma};

// -- Gaussian smoothing -------------------------------------------------------

/// Build a normalised 1-D Gaussian kernel of the given odd size.
///
/// The kernel size is explicit rather than derived from sigma because the
/// detail-level presets vary the window (3/5/7) while keeping sigma fixed.
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    debug_assert!(size % 2 == 1, "gaussian kernel size must be odd");
    let half = (size / 2) as i32;
    let denom = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (-half..=half)
        .map(|x| (-(x * x) as f32 / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Separable Gaussian blur with reflected (edge-excluding) borders.
pub fn gaussian_blur(image: &GrayImage, kernel_size: u32, sigma: f32) -> GrayImage {
    let kernel = gaussian_kernel(kernel_size, sigma);
    let half = (kernel_size / 2) as i32;
    let (width, height) = image.dimensions();

    // Horizontal pass into a float buffer, then vertical pass back to u8.
    let mut horizontal = vec![0.0f32; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = reflect_101(x as i32 + k as i32 - half, width);
                acc += weight * image.get_pixel(sx, y).0[0] as f32;
            }
            horizontal[(y * width + x) as usize] = acc;
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let mut acc = 0.0f32;
        for (k, weight) in kernel.iter().enumerate() {
            let sy = reflect_101(y as i32 + k as i32 - half, height);
            acc += weight * horizontal[(sy * width + x) as usize];
        }
        Luma([acc.round().clamp(0.0, 255.0) as u8])
    })
}

/// Reflect an out-of-bounds index without repeating the edge sample
/// (`gfedcb | abcdefgh | gfedcba`).
fn reflect_101(index: i32, size: u32) -> u32 {
    let n = size as i32;
    if n == 1 {
        return 0;
    }
    let mut i = index;
    while i < 0 || i >= n {
        if i < 0 {
            i = -i;
        }
        if i >= n {
            i = 2 * n - i - 2;
        }
    }
    i as u32
}

// -- Bilateral filtering ------------------------------------------------------

/// Edge-preserving smoothing: each output pixel is a weighted average of its
/// circular neighbourhood, where the weight falls off with both spatial
/// distance and intensity difference. Flat regions are smoothed while sharp
/// transitions survive, which keeps the subsequent edge detector honest.
///
/// `diameter` is the full window width in pixels (the neighbourhood radius
/// is `diameter / 2`).
pub fn bilateral_filter(
    image: &GrayImage,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> GrayImage {
    let radius = (diameter / 2) as i32;
    let (width, height) = image.dimensions();

    let color_coeff = -0.5 / (sigma_color * sigma_color);
    let space_coeff = -0.5 / (sigma_space * sigma_space);

    // Precompute spatial weights for the circular window.
    let mut offsets: Vec<(i32, i32, f32)> = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let dist_sq = (dx * dx + dy * dy) as f32;
            if dist_sq.sqrt() > radius as f32 {
                continue;
            }
            offsets.push((dx, dy, (dist_sq * space_coeff).exp()));
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let center = image.get_pixel(x, y).0[0] as f32;
        let mut sum = 0.0f32;
        let mut total_weight = 0.0f32;

        for &(dx, dy, space_weight) in &offsets {
            let sx = reflect_101(x as i32 + dx, width);
            let sy = reflect_101(y as i32 + dy, height);
            let sample = image.get_pixel(sx, sy).0[0] as f32;

            let diff = sample - center;
            let weight = space_weight * (diff * diff * color_coeff).exp();
            sum += sample * weight;
            total_weight += weight;
        }

        Luma([(sum / total_weight).round().clamp(0.0, 255.0) as u8])
    })
}

// -- Binary morphology --------------------------------------------------------

/// Anchor-relative offsets of a filled elliptical structuring element of
/// `size x size` pixels, computed from the inscribed-ellipse row spans.
///
/// A 1x1 element is a single pixel, 3x3 is a cross, 5x5 is a disc with the
/// corners cut. The row-span construction also handles even sizes.
pub fn elliptical_kernel(size: u32) -> Vec<(i32, i32)> {
    let rows = size as i32;
    let r = rows / 2;
    let c = rows / 2;
    let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };

    let mut offsets = Vec::new();
    for i in 0..rows {
        let dy = i - r;
        if dy.abs() > r {
            continue;
        }
        let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as i32;
        let j1 = (c - dx).max(0);
        let j2 = (c + dx + 1).min(rows);
        for j in j1..j2 {
            offsets.push((j - c, i - r));
        }
    }
    offsets
}

/// Binary dilation: a pixel takes the maximum over its kernel neighbourhood.
/// Out-of-bounds neighbours do not contribute.
pub fn dilate_mask(mask: &GrayImage, kernel: &[(i32, i32)]) -> GrayImage {
    let (width, height) = mask.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let mut max = 0u8;
        for &(dx, dy) in kernel {
            let sx = x as i32 + dx;
            let sy = y as i32 + dy;
            if sx < 0 || sy < 0 || sx >= width as i32 || sy >= height as i32 {
                continue;
            }
            max = max.max(mask.get_pixel(sx as u32, sy as u32).0[0]);
        }
        Luma([max])
    })
}

/// Binary erosion: a pixel takes the minimum over its kernel neighbourhood.
/// Out-of-bounds neighbours do not constrain the result.
pub fn erode_mask(mask: &GrayImage, kernel: &[(i32, i32)]) -> GrayImage {
    let (width, height) = mask.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let mut min = 255u8;
        for &(dx, dy) in kernel {
            let sx = x as i32 + dx;
            let sy = y as i32 + dy;
            if sx < 0 || sy < 0 || sx >= width as i32 || sy >= height as i32 {
                continue;
            }
            min = min.min(mask.get_pixel(sx as u32, sy as u32).0[0]);
        }
        Luma([min])
    })
}

/// Morphological closing (dilate, then erode): bridges small gaps between
/// nearby edge fragments without thickening the surviving strokes.
pub fn close_mask(mask: &GrayImage, kernel: &[(i32, i32)]) -> GrayImage {
    erode_mask(&dilate_mask(mask, kernel), kernel)
}

// -- Thresholding -------------------------------------------------------------

/// Compute the Otsu threshold for a grayscale image: the cut that maximises
/// the between-class variance of the dark and light pixel populations.
pub fn otsu_threshold(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total = image.width() as u64 * image.height() as u64;
    if total == 0 {
        return 128;
    }

    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(value, &count)| value as f64 * count as f64)
        .sum();

    let mut dark_weight = 0u64;
    let mut dark_sum = 0.0f64;
    let mut best = (0.0f64, 0u8);

    for (t, &count) in histogram.iter().enumerate() {
        dark_weight += count;
        if dark_weight == 0 {
            continue;
        }
        let light_weight = total - dark_weight;
        if light_weight == 0 {
            break;
        }

        dark_sum += t as f64 * count as f64;
        let dark_mean = dark_sum / dark_weight as f64;
        let light_mean = (weighted_total - dark_sum) / light_weight as f64;

        let between = dark_weight as f64
            * light_weight as f64
            * (dark_mean - light_mean)
            * (dark_mean - light_mean);

        if between > best.0 {
            best = (between, t as u8);
        }
    }

    best.1
}

/// Binary threshold: strictly brighter than `threshold` becomes white,
/// everything else black.
pub fn threshold_binary(image: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([if image.get_pixel(x, y).0[0] > threshold { 255 } else { 0 }])
    })
}

/// Force a mask to pure black/white at the midpoint. Applying this to its
/// own output is a no-op, which downstream stages rely on.
pub fn binarize_mask(image: &GrayImage) -> GrayImage {
    threshold_binary(image, 127)
}

/// Photographic negative: edge masks become black lines on white paper.
pub fn invert_mask(image: &GrayImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([255 - image.get_pixel(x, y).0[0]])
    })
}

/// Median intensity of an image. For an even pixel count the two middle
/// samples are averaged, so a half-black/half-white mask reports 127.5.
pub fn median_intensity(image: &GrayImage) -> f64 {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total = image.width() as u64 * image.height() as u64;
    if total == 0 {
        return 0.0;
    }

    let lower = value_at_rank(&histogram, (total - 1) / 2);
    let upper = value_at_rank(&histogram, total / 2);
    (lower as f64 + upper as f64) / 2.0
}

fn value_at_rank(histogram: &[u64; 256], rank: u64) -> u8 {
    let mut seen = 0u64;
    for (value, &count) in histogram.iter().enumerate() {
        seen += count;
        if seen > rank {
            return value as u8;
        }
    }
    255
}

// -- Tests --------------------------------------------------------------------
