// SPDX-License-Identifier: MIT
//
// Unified error types for Linework.

use thiserror::Error;

/// Top-level error type for all Linework operations.
///
/// Each pipeline stage maps its own failure into the matching variant with a
/// message naming the stage, so callers can always tell where an operation
/// stopped. No stage leaves a partially written output file behind.
#[derive(Debug, Error)]
pub enum LineworkError {
    /// The source file could not be read or is not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// A caller-supplied parameter is out of range (zero dimension,
    /// non-positive PPI, inverted thresholds).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The super-resolution model is not loaded; enhancement cannot run.
    #[error("super-resolution model unavailable: {0}")]
    ModelUnavailable(String),

    /// Encoding or writing the output image failed.
    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LineworkError>;
