//! Argument limits and defaults shared by the capture tools.
//!
//! | Argument   | Default | Range        |
//! |------------|---------|--------------|
//! | `maxWidth` | 1920    | 100..=4096   |
//! | `delay`    | 0       | 0..=10 (s)   |
//! | `displayIndex` | 0   | >= 0         |

/// Default output width cap for captured images.
pub const DEFAULT_MAX_WIDTH: u32 = 1920;

/// Smallest accepted `maxWidth`.
pub const MIN_MAX_WIDTH: u32 = 100;

/// Largest accepted `maxWidth`.
pub const MAX_MAX_WIDTH: u32 = 4096;

/// Longest accepted pre-capture delay, in seconds.
pub const MAX_DELAY_SECS: f64 = 10.0;

/// MIME type of every image produced by the capture tools.
pub const PNG_MIME_TYPE: &str = "image/png";
