// SPDX-License-Identifier: MIT
//
// Linework — Core types, errors, and configuration shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::EngineConfig;
pub use error::LineworkError;
pub use types::*;
