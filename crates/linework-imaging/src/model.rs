// SPDX-License-Identifier: MIT
//
// Super-resolution model capability.
//
// The engine never talks to a concrete model directly: enhancement is
// expressed against the `Upscaler` trait, and callers pass the model in as
// an explicit handle. The model is expensive to load, so the intended
// lifecycle is load-once / many-inferences / explicit unload, managed by
// `UpscalerHandle`.

use std::sync::Mutex;

use image::DynamicImage;
use tracing::{debug, info};

use linework_core::error::{LineworkError, Result};

/// An image upscaling model with a fixed native integer scale factor.
pub trait Upscaler: Send {
    /// Short identifier for logs and reports.
    fn name(&self) -> &str;

    /// Whether weights are resident and `enhance` can run.
    fn is_loaded(&self) -> bool;

    /// Native scale factor; `enhance` output is exactly this many times
    /// larger on both axes.
    fn scale(&self) -> u32;

    /// Run one inference pass. Fails with `ModelUnavailable` when the model
    /// is not loaded; never falls back to plain interpolation.
    fn enhance(&self, image: &DynamicImage) -> Result<DynamicImage>;

    /// Release weights and device memory. `is_loaded` reports false after.
    fn unload(&mut self);
}

/// Process-wide resident slot for the active model.
///
/// Install once, run many inferences, unload explicitly. The interior mutex
/// doubles as the inference lock: callers that enhance through `with` are
/// serialised, which is the concurrency contract the engine assumes.
pub struct UpscalerHandle {
    slot: Mutex<Option<Box<dyn Upscaler>>>,
}

impl UpscalerHandle {
    /// A handle with no model installed.
    pub fn empty() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Install (or replace) the resident model.
    pub fn install(&self, model: Box<dyn Upscaler>) {
        info!(model = model.name(), scale = model.scale(), "Installing upscaler");
        *self.lock() = Some(model);
    }

    /// Whether a model is installed and reports itself loaded.
    pub fn is_loaded(&self) -> bool {
        self.lock().as_ref().is_some_and(|m| m.is_loaded())
    }

    /// Run `f` with the installed model (or `None`) while holding the
    /// inference lock.
    pub fn with<T>(&self, f: impl FnOnce(Option<&dyn Upscaler>) -> T) -> T {
        let guard = self.lock();
        f(guard.as_deref())
    }

    /// Unload and drop the resident model, releasing its memory.
    pub fn unload(&self) {
        if let Some(mut model) = self.lock().take() {
            info!(model = model.name(), "Unloading upscaler");
            model.unload();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Box<dyn Upscaler>>> {
        // A poisoned lock only means a previous inference panicked; the slot
        // itself is still usable.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for UpscalerHandle {
    fn default() -> Self {
        Self::empty()
    }
}

/// Reference `Upscaler` backed by Lanczos interpolation.
///
/// This is the model the CLI ships with: deterministic, dependency-free, and
/// honest about being interpolation rather than reconstruction. A learned
/// super-resolution backend plugs in through the same trait without touching
/// the pipeline.
pub struct InterpolationUpscaler {
    scale: u32,
    loaded: bool,
}

impl InterpolationUpscaler {
    pub fn new(scale: u32) -> Self {
        Self {
            scale: scale.max(1),
            loaded: true,
        }
    }
}

impl Upscaler for InterpolationUpscaler {
    fn name(&self) -> &str {
        "lanczos-interpolation"
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn scale(&self) -> u32 {
        self.scale
    }

    fn enhance(&self, image: &DynamicImage) -> Result<DynamicImage> {
        if !self.loaded {
            return Err(LineworkError::ModelUnavailable(
                "interpolation upscaler has been unloaded".into(),
            ));
        }

        let width = image.width().checked_mul(self.scale).ok_or_else(|| {
            LineworkError::InvalidParameter(format!(
                "upscaled width overflows at {}x scale",
                self.scale
            ))
        })?;
        let height = image.height().checked_mul(self.scale).ok_or_else(|| {
            LineworkError::InvalidParameter(format!(
                "upscaled height overflows at {}x scale",
                self.scale
            ))
        })?;

        debug!(width, height, "Interpolation upscale");
        Ok(image.resize_exact(width, height, image::imageops::FilterType::Lanczos3))
    }

    fn unload(&mut self) {
        self.loaded = false;
    }
}

// -- Tests --------------------------------------------------------------------
