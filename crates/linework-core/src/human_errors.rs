// SPDX-License-Identifier: MIT
//
// Human-readable error messages for the interface layer.
//
// Every engine error is mapped to plain English with a suggestion the user
// can act on, plus a severity that drives presentation and retry behaviour.

use crate::error::LineworkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// May succeed on a retry without any change (e.g. model still loading).
    Transient,
    /// User must change something (different file, different settings).
    ActionRequired,
    /// Cannot be fixed by retrying or changing inputs.
    Permanent,
}

/// A plain-English error with an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Summary shown as a heading.
    pub message: String,
    /// What the user should try, shown as body text.
    pub suggestion: String,
    /// Whether the interface layer may retry automatically.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `LineworkError` into something a non-technical user can act on.
pub fn humanize_error(err: &LineworkError) -> HumanError {
    match err {
        LineworkError::Decode(_) => HumanError {
            message: "This image could not be read.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try re-saving it as a PNG or JPEG and uploading again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LineworkError::InvalidParameter(detail) => HumanError {
            message: "One of the settings is out of range.".into(),
            suggestion: format!("Check the size and resolution values and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LineworkError::ModelUnavailable(_) => HumanError {
            message: "The enhancement model isn't ready.".into(),
            suggestion: "The upscaling model hasn't finished loading. Wait a moment and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        LineworkError::Encode(detail) => HumanError {
            message: "The result could not be saved.".into(),
            suggestion: format!("Try a different output format, such as PNG. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LineworkError::Io(_) => HumanError {
            message: "A file could not be read or written.".into(),
            suggestion: "Check that there is free disk space and that the file still exists, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_unavailable_is_retriable() {
        let human = humanize_error(&LineworkError::ModelUnavailable("not loaded".into()));
        assert!(human.retriable);
        assert_eq!(human.severity, Severity::Transient);
    }

    #[test]
    fn invalid_parameter_carries_detail() {
        let human = humanize_error(&LineworkError::InvalidParameter("ppi 0".into()));
        assert!(human.suggestion.contains("ppi 0"));
        assert!(!human.retriable);
    }
}
