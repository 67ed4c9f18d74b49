// SPDX-License-Identifier: MIT
//
// Dimension reconciliation shared by the resize and enhancement paths.
//
// All math here is pure and testable without touching pixel data. Derived
// axes use f64 division truncated toward zero; the exact pixel counts this
// produces are load-bearing for downstream size reporting, so the truncation
// must not be swapped for rounding.

use linework_core::error::{LineworkError, Result};
use linework_core::types::Dimensions;

/// Aspect ratios closer than this are treated as equal.
const ASPECT_TOLERANCE: f64 = 0.01;

/// Reconcile requested target dimensions against an original size.
///
/// With `maintain_aspect` unset, each axis independently takes the target
/// value if present, falling back to the original. With it set:
///
/// * one target given — the other axis is derived from the original aspect
///   ratio;
/// * both given — if the implied aspect ratio matches the original within
///   tolerance, both are accepted; otherwise the axis with the larger
///   `target/original` scale factor is kept and the other is recomputed, so
///   the result fits inside the request instead of cropping it;
/// * neither given — the original dimensions are returned unchanged.
pub fn resolve_dimensions(
    original_width: u32,
    original_height: u32,
    target_width: Option<u32>,
    target_height: Option<u32>,
    maintain_aspect: bool,
) -> Result<Dimensions> {
    if original_width == 0 || original_height == 0 {
        return Err(LineworkError::InvalidParameter(format!(
            "original dimensions must be non-zero, got {}x{}",
            original_width, original_height
        )));
    }

    if !maintain_aspect {
        return Dimensions::new(
            target_width.unwrap_or(original_width),
            target_height.unwrap_or(original_height),
        );
    }

    let aspect = original_width as f64 / original_height as f64;

    let (width, height) = match (target_width, target_height) {
        (Some(w), None) => (w, truncate(w as f64 / aspect)),
        (None, Some(h)) => (truncate(h as f64 * aspect), h),
        (Some(w), Some(h)) => {
            let target_aspect = w as f64 / h as f64;
            if (aspect - target_aspect).abs() < ASPECT_TOLERANCE {
                (w, h)
            } else if w as f64 / original_width as f64 > h as f64 / original_height as f64 {
                // Height is the limiting axis: keep it, derive the width.
                (truncate(h as f64 * aspect), h)
            } else {
                // Width is the limiting axis: keep it, derive the height.
                (w, truncate(w as f64 / aspect))
            }
        }
        (None, None) => (original_width, original_height),
    };

    Dimensions::new(width.max(1), height.max(1))
}

/// Truncate toward zero, clamping negatives away. Matches the original
/// behaviour of casting the division result to an integer.
fn truncate(value: f64) -> u32 {
    value.max(0.0) as u32
}

// -- Tests --------------------------------------------------------------------
