// SPDX-License-Identifier: MIT
//
// Direction-aware resampling.
//
// Enlarging and shrinking want different interpolation: smooth higher-order
// filtering when growing (bicubic-style), area-averaging when reducing so
// fine detail is absorbed instead of aliasing. The choice is made from the
// dimension pair alone, which keeps it trivially testable.

use image::DynamicImage;
use image::imageops::FilterType;
use tracing::debug;

use linework_core::types::Dimensions;

/// Pick the interpolation filter for a source → target resize.
///
/// If the target exceeds the source on either axis the resize counts as an
/// enlargement and uses Catmull-Rom (bicubic-equivalent). A strict shrink
/// uses Triangle, which with the `image` crate's support scaling behaves as
/// an anti-aliasing area average.
pub fn interpolation_for(source: Dimensions, target: Dimensions) -> FilterType {
    if target.width > source.width || target.height > source.height {
        FilterType::CatmullRom
    } else {
        FilterType::Triangle
    }
}

/// Resize to exactly `target`, choosing the filter by direction. Returns the
/// input unchanged when the dimensions already match.
pub fn resample(image: &DynamicImage, target: Dimensions) -> DynamicImage {
    let source = Dimensions {
        width: image.width(),
        height: image.height(),
    };
    if source == target {
        return image.clone();
    }

    let filter = interpolation_for(source, target);
    debug!(%source, %target, ?filter, "Resampling");
    image.resize_exact(target.width, target.height, filter)
}

/// Shrink an image so its longest axis is at most `max_dimension`, keeping
/// the aspect ratio. Images already within the limit pass through unchanged.
pub fn shrink_to_fit(image: &DynamicImage, max_dimension: u32) -> DynamicImage {
    let longest = image.width().max(image.height());
    if longest <= max_dimension || max_dimension == 0 {
        return image.clone();
    }

    let ratio = max_dimension as f64 / longest as f64;
    let target = Dimensions {
        width: ((image.width() as f64 * ratio) as u32).max(1),
        height: ((image.height() as f64 * ratio) as u32).max(1),
    };
    resample(image, target)
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions::new(width, height).unwrap()
    }

    fn gradient_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| {
            Luma([((x * 7 + y * 13) % 256) as u8])
        }))
    }

    #[test]
    fn enlarging_uses_catmull_rom() {
        assert!(matches!(
            interpolation_for(dims(100, 100), dims(200, 200)),
            FilterType::CatmullRom
        ));
        // Growing on a single axis still counts as enlarging.
        assert!(matches!(
            interpolation_for(dims(100, 100), dims(200, 50)),
            FilterType::CatmullRom
        ));
    }

    #[test]
    fn shrinking_uses_triangle() {
        assert!(matches!(
            interpolation_for(dims(400, 300), dims(200, 150)),
            FilterType::Triangle
        ));
    }

    #[test]
    fn resample_hits_exact_target() {
        let out = resample(&gradient_image(320, 200), dims(123, 77));
        assert_eq!((out.width(), out.height()), (123, 77));

        let up = resample(&gradient_image(50, 40), dims(500, 400));
        assert_eq!((up.width(), up.height()), (500, 400));
    }

    #[test]
    fn matching_dimensions_pass_through() {
        let original = gradient_image(64, 48);
        let out = resample(&original, dims(64, 48));
        assert_eq!(out.to_luma8(), original.to_luma8());
    }

    #[test]
    fn shrink_to_fit_caps_the_longest_axis() {
        let out = shrink_to_fit(&gradient_image(4000, 1000), 1920);
        assert_eq!(out.width(), 1920);
        assert_eq!(out.height(), 480);

        let untouched = shrink_to_fit(&gradient_image(800, 600), 1920);
        assert_eq!((untouched.width(), untouched.height()), (800, 600));
    }
}
