//! Error types for display capture and tool dispatch
//!
//! Every failure a tool call can produce is a [`CaptureError`]. Variants map
//! onto a small [`ErrorKind`] taxonomy so callers (and tests) can tell
//! argument problems from backend faults without matching on message text.
//! Each error also carries a remediation hint aimed at the calling agent.

use serde::{Deserialize, Serialize};

use crate::model::Region;

/// Result type alias for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// High-level error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Argument outside its declared range or of the wrong type
    Validation,
    /// Display index does not name an enumerated display
    InvalidDisplay,
    /// Region is not contained in any display
    InvalidRegion,
    /// The OS capture or enumeration primitive failed
    Backend,
    /// `latest` was called before anything was captured
    EmptyState,
}

/// Error type for capture and dispatch operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum CaptureError {
    /// Argument rejected before the backend was touched
    #[error("Invalid parameter '{parameter}': {reason}")]
    Validation {
        /// Wire name of the offending argument
        parameter: String,
        /// What was wrong with it
        reason:    String,
    },

    /// Display index beyond the enumerated display count
    #[error("Display {index} not found ({available} display(s) available)")]
    InvalidDisplay {
        /// Requested display index
        index:     u32,
        /// Number of displays currently enumerated
        available: usize,
    },

    /// Region does not fit inside a single display
    #[error("Invalid region {region}: {reason}")]
    InvalidRegion {
        /// Requested region in desktop coordinates
        region: Region,
        /// Why the region was rejected
        reason: String,
    },

    /// OS capture or enumeration failure
    #[error("Screen capture backend failed to {operation}: {reason}")]
    Backend {
        /// Operation that failed (e.g. "enumerate displays")
        operation: String,
        /// Underlying error message
        reason:    String,
    },

    /// Image encoding failed
    #[error("Failed to encode image as {format}: {reason}")]
    EncodingFailed {
        /// Image format that failed
        format: String,
        /// Reason for encoding failure
        reason: String,
    },

    /// Image processing error (resize, crop)
    #[error("Image processing error: {0}")]
    ImageError(String),

    /// No capture has been stored yet
    #[error("No capture available. Use screen.capture or screen.capture_region first.")]
    NoCaptureAvailable,
}

impl CaptureError {
    /// Builds a [`CaptureError::Validation`]
    pub fn validation(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        CaptureError::Validation {
            parameter: parameter.into(),
            reason:    reason.into(),
        }
    }

    /// Builds a [`CaptureError::Backend`]
    pub fn backend(operation: impl Into<String>, reason: impl ToString) -> Self {
        CaptureError::Backend {
            operation: operation.into(),
            reason:    reason.to_string(),
        }
    }

    /// Returns the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            CaptureError::Validation { .. } => ErrorKind::Validation,
            CaptureError::InvalidDisplay { .. } => ErrorKind::InvalidDisplay,
            CaptureError::InvalidRegion { .. } => ErrorKind::InvalidRegion,
            CaptureError::Backend { .. }
            | CaptureError::EncodingFailed { .. }
            | CaptureError::ImageError(_) => ErrorKind::Backend,
            CaptureError::NoCaptureAvailable => ErrorKind::EmptyState,
        }
    }

    /// True for the normal "nothing captured yet" outcome of `latest`
    pub fn is_empty_state(&self) -> bool {
        self.kind() == ErrorKind::EmptyState
    }

    /// Returns a user-facing remediation hint for this error
    ///
    /// # Examples
    ///
    /// ```
    /// use third_eye_core::error::CaptureError;
    ///
    /// let error = CaptureError::InvalidDisplay { index: 3, available: 1 };
    /// assert!(error.remediation_hint().contains("screen.list_displays"));
    /// ```
    pub fn remediation_hint(&self) -> &str {
        match self {
            CaptureError::Validation { parameter, .. } => match parameter.as_str() {
                "maxWidth" => "maxWidth must be between 100 and 4096.",
                "delay" => "delay must be between 0 and 10 seconds.",
                "displayIndex" => "displayIndex must be between 0 and 4294967295.",
                "x" | "y" => "Region coordinates must be between 0 and 4294967295.",
                "width" | "height" => "Region width and height must be between 1 and 4294967295.",
                _ => "Check the argument against the tool's input schema.",
            },
            CaptureError::InvalidDisplay { .. } => {
                "Call screen.list_displays to see the valid display indices."
            }
            CaptureError::InvalidRegion { .. } => {
                "Regions must lie entirely within one display. Call screen.list_displays for \
                 display positions and sizes."
            }
            CaptureError::Backend { .. } => {
                "The operating system refused or failed the capture. Check screen recording \
                 permissions and that a graphical session is running."
            }
            CaptureError::EncodingFailed { .. } | CaptureError::ImageError(_) => {
                "Image processing failed. Retry with a smaller maxWidth or region."
            }
            CaptureError::NoCaptureAvailable => {
                "Capture a screenshot with screen.capture or screen.capture_region first."
            }
        }
    }
}
