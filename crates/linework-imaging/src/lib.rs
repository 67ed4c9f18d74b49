// SPDX-License-Identifier: MIT
//
// linework-imaging — the Linework processing engine.
//
// Provides dimension reconciliation, the outline-extraction pipeline
// (grayscale, denoise, Canny, morphology, binarize/invert), direction-aware
// resampling around an external super-resolution model, and an image codec
// that stamps print-density metadata into the encoded output.

pub mod codec;
pub mod dimensions;
pub mod filter;
pub mod model;
pub mod outline;
pub mod pipeline;
pub mod resample;

// Re-export the primary entry points so callers can use
// `linework_imaging::extract_outline` etc.
pub use model::{InterpolationUpscaler, Upscaler, UpscalerHandle};
pub use outline::OutlineExtractor;
pub use pipeline::{enhance_image, extract_outline, image_info};
