// SPDX-License-Identifier: MIT
//
// Outline extraction — turns a photograph into pencil-style line art.
//
// The pipeline is linear: grayscale, denoise, Canny edge detection,
// morphological thickness control, then invert and re-threshold so the
// result is strictly black lines on white paper. The three strategies share
// this skeleton and differ only in how the denoise step and the Canny
// thresholds are chosen.

use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use tracing::{debug, info, instrument};

use linework_core::types::{DetailLevel, OutlineParams, OutlineStrategy};

use crate::filter::{
    bilateral_filter, binarize_mask, close_mask, dilate_mask, elliptical_kernel, gaussian_blur,
    invert_mask, median_intensity, otsu_threshold, threshold_binary,
};

/// Sigma shared by every Gaussian denoise preset.
const BLUR_SIGMA: f32 = 1.4;

/// Bilateral window diameter for the adaptive strategy.
const BILATERAL_DIAMETER: u32 = 9;
/// Bilateral intensity and spatial falloff.
const BILATERAL_SIGMA: f32 = 75.0;

/// Runs the outline pipeline for one parameter set.
pub struct OutlineExtractor {
    params: OutlineParams,
}

impl OutlineExtractor {
    pub fn new(params: OutlineParams) -> Self {
        Self { params }
    }

    /// Extract a black-on-white outline from an image.
    ///
    /// The output has the same dimensions as the input and contains only the
    /// values 0 and 255.
    #[instrument(skip_all, fields(strategy = ?self.params.strategy))]
    pub fn extract(&self, image: &DynamicImage) -> GrayImage {
        let gray = image.to_luma8();
        info!(
            width = gray.width(),
            height = gray.height(),
            thickness = self.params.clamped_thickness(),
            "Extracting outline"
        );

        let edges = match self.params.strategy {
            OutlineStrategy::Fixed => self.detect_fixed(&gray),
            OutlineStrategy::Adaptive => self.detect_adaptive(&gray),
            OutlineStrategy::Detail(level) => self.detect_with_detail(&gray, level),
        };

        let thickened = self.thicken(edges);

        // Invert (black lines on white paper), then force the result back to
        // pure two-valued: the detector and the morphology can both leave
        // gray fringes behind.
        binarize_mask(&invert_mask(&thickened))
    }

    /// Fixed strategy: Gaussian denoise, explicitly configured thresholds.
    fn detect_fixed(&self, gray: &GrayImage) -> GrayImage {
        let blurred = gaussian_blur(gray, 5, BLUR_SIGMA);
        canny(&blurred, self.params.low_threshold, self.params.high_threshold)
    }

    /// Adaptive strategy: bilateral denoise, thresholds derived from an Otsu
    /// binarization of the filtered image, and a closing pass to reconnect
    /// fragmented strokes.
    ///
    /// The threshold derivation takes the median of the *binarized* image,
    /// which is almost always 0, 127.5, or 255 — so the derived thresholds
    /// are coarse. This reproduces the behaviour the pipeline was calibrated
    /// against; see DESIGN.md before changing it.
    fn detect_adaptive(&self, gray: &GrayImage) -> GrayImage {
        let filtered = bilateral_filter(gray, BILATERAL_DIAMETER, BILATERAL_SIGMA, BILATERAL_SIGMA);

        let binary = threshold_binary(&filtered, otsu_threshold(&filtered));
        let median = median_intensity(&binary);
        let low = (median * 0.33).trunc() as f32;
        let high = (median * 0.66).trunc() as f32;
        debug!(median, low, high, "Derived adaptive thresholds");

        let edges = canny(&filtered, low, high);
        close_mask(&edges, &elliptical_kernel(3))
    }

    /// Detail-level strategy: Gaussian denoise with a window/threshold preset
    /// per level. Medium is the fixed strategy under another name.
    fn detect_with_detail(&self, gray: &GrayImage, level: DetailLevel) -> GrayImage {
        let (kernel_size, low, high) = match level {
            DetailLevel::Low => (7, 100.0, 200.0),
            DetailLevel::Medium => (5, self.params.low_threshold, self.params.high_threshold),
            DetailLevel::High => (3, 30.0, 100.0),
        };
        debug!(kernel_size, low, high, "Detail preset selected");

        let blurred = gaussian_blur(gray, kernel_size, BLUR_SIGMA);
        canny(&blurred, low, high)
    }

    /// Dilate the edge mask up to the requested line thickness. A thickness
    /// of 1 leaves the detector output untouched.
    fn thicken(&self, edges: GrayImage) -> GrayImage {
        let thickness = self.params.clamped_thickness();
        if thickness <= 1 {
            return edges;
        }
        dilate_mask(&edges, &elliptical_kernel(thickness))
    }

    /// Quick fixed-strategy edge preview: grayscale, default blur, Canny,
    /// invert. Skips the thickness morphology and the final re-threshold
    /// since the result is for on-screen inspection, not export.
    pub fn preview(image: &DynamicImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
        let gray = image.to_luma8();
        let blurred = gaussian_blur(&gray, 5, BLUR_SIGMA);
        invert_mask(&canny(&blurred, low_threshold, high_threshold))
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use linework_core::EngineConfig;

    fn params() -> OutlineParams {
        OutlineParams::from_config(&EngineConfig::default())
    }

    fn uniform(value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 64, Luma([value])))
    }

    /// Black background with a bright 24x24 square in the middle.
    fn square_scene() -> DynamicImage {
        let mut img = GrayImage::from_pixel(64, 64, Luma([10u8]));
        for y in 20..44 {
            for x in 20..44 {
                img.put_pixel(x, y, Luma([230u8]));
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    fn black_count(outline: &GrayImage) -> usize {
        outline.pixels().filter(|p| p.0[0] == 0).count()
    }

    #[test]
    fn uniform_image_yields_blank_page_for_every_strategy() {
        let strategies = [
            OutlineStrategy::Fixed,
            OutlineStrategy::Adaptive,
            OutlineStrategy::Detail(DetailLevel::Low),
            OutlineStrategy::Detail(DetailLevel::Medium),
            OutlineStrategy::Detail(DetailLevel::High),
        ];
        for strategy in strategies {
            let mut p = params();
            p.strategy = strategy;
            let outline = OutlineExtractor::new(p).extract(&uniform(128));
            assert!(
                outline.pixels().all(|px| px.0[0] == 255),
                "strategy {:?} produced edges on a flat image",
                strategy
            );
        }
    }

    #[test]
    fn square_produces_black_lines_on_white() {
        let outline = OutlineExtractor::new(params()).extract(&square_scene());
        assert_eq!(outline.dimensions(), (64, 64));
        assert!(black_count(&outline) > 0, "no edges found around the square");
        // Far corner stays paper-white.
        assert_eq!(outline.get_pixel(1, 1).0[0], 255);
    }

    #[test]
    fn output_is_strictly_two_valued() {
        let mut p = params();
        p.thickness = 3;
        let outline = OutlineExtractor::new(p).extract(&square_scene());
        assert!(outline.pixels().all(|px| px.0[0] == 0 || px.0[0] == 255));
    }

    #[test]
    fn overlong_thickness_behaves_like_the_clamp_limit() {
        let mut requested = params();
        requested.thickness = 7;
        let mut clamped = params();
        clamped.thickness = 5;

        let scene = square_scene();
        let a = OutlineExtractor::new(requested).extract(&scene);
        let b = OutlineExtractor::new(clamped).extract(&scene);
        assert_eq!(a, b);
    }

    #[test]
    fn negative_thickness_behaves_like_one() {
        let mut requested = params();
        requested.thickness = -3;
        let mut unit = params();
        unit.thickness = 1;

        let scene = square_scene();
        let a = OutlineExtractor::new(requested).extract(&scene);
        let b = OutlineExtractor::new(unit).extract(&scene);
        assert_eq!(a, b);
    }

    #[test]
    fn thicker_lines_cover_more_pixels() {
        let mut thin = params();
        thin.thickness = 1;
        let mut thick = params();
        thick.thickness = 5;

        let scene = square_scene();
        let a = OutlineExtractor::new(thin).extract(&scene);
        let b = OutlineExtractor::new(thick).extract(&scene);
        assert!(black_count(&b) > black_count(&a));
    }

    #[test]
    fn high_detail_keeps_edges_low_detail_discards() {
        // A strong stripe both presets find, and a faint stripe whose
        // gradient clears the high-detail thresholds but not the low-detail
        // ones. Vertical stripes avoid corner gradients, which would let the
        // low preset in through hysteresis.
        let mut img = GrayImage::from_pixel(64, 64, Luma([60u8]));
        for y in 0..64 {
            for x in 20..28 {
                img.put_pixel(x, y, Luma([160u8])); // faint
            }
            for x in 40..48 {
                img.put_pixel(x, y, Luma([255u8])); // strong
            }
        }
        let scene = DynamicImage::ImageLuma8(img);

        let mut low = params();
        low.strategy = OutlineStrategy::Detail(DetailLevel::Low);
        let mut high = params();
        high.strategy = OutlineStrategy::Detail(DetailLevel::High);

        let coarse = OutlineExtractor::new(low).extract(&scene);
        let fine = OutlineExtractor::new(high).extract(&scene);
        assert!(
            black_count(&fine) > black_count(&coarse),
            "high detail ({}) should out-draw low detail ({})",
            black_count(&fine),
            black_count(&coarse)
        );
    }

    #[test]
    fn adaptive_strategy_draws_the_square() {
        let mut p = params();
        p.strategy = OutlineStrategy::Adaptive;
        let outline = OutlineExtractor::new(p).extract(&square_scene());
        assert!(black_count(&outline) > 0);
        assert!(outline.pixels().all(|px| px.0[0] == 0 || px.0[0] == 255));
    }
}
