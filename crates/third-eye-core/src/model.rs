//! Data models and type definitions for Third Eye
//!
//! This module defines the core types used throughout the application:
//! - Display descriptors and capture regions
//! - Capture metadata, capture output and the stored latest capture
//! - Tool parameter types with their defaults, schemas and validation

use std::time::Duration;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    capture::constants::{DEFAULT_MAX_WIDTH, MAX_DELAY_SECS, MAX_MAX_WIDTH, MIN_MAX_WIDTH},
    error::{CaptureError, CaptureResult},
};

/// One OS-enumerated monitor with its position and pixel size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    /// Display index (0-based, enumeration order)
    pub index:      u32,
    /// Display name reported by the OS
    pub name:       String,
    /// X position of the display's top-left corner on the desktop
    pub x:          i32,
    /// Y position of the display's top-left corner on the desktop
    pub y:          i32,
    /// Width in pixels
    pub width:      u32,
    /// Height in pixels
    pub height:     u32,
    /// Whether this is the primary display
    pub is_primary: bool,
}

impl DisplayInfo {
    /// Returns true when `region` lies entirely inside this display
    ///
    /// # Examples
    ///
    /// ```
    /// use third_eye_core::model::{DisplayInfo, Region};
    ///
    /// let display = DisplayInfo {
    ///     index:      0,
    ///     name:       "eDP-1".to_string(),
    ///     x:          0,
    ///     y:          0,
    ///     width:      1920,
    ///     height:     1080,
    ///     is_primary: true,
    /// };
    /// assert!(display.contains(&Region::new(0, 0, 1920, 1080)));
    /// assert!(!display.contains(&Region::new(1900, 0, 100, 100)));
    /// ```
    pub fn contains(&self, region: &Region) -> bool {
        let left = i64::from(self.x);
        let top = i64::from(self.y);
        let right = left + i64::from(self.width);
        let bottom = top + i64::from(self.height);

        let r_left = i64::from(region.x);
        let r_top = i64::from(region.y);

        r_left >= left
            && r_top >= top
            && r_left + i64::from(region.width) <= right
            && r_top + i64::from(region.height) <= bottom
    }

    /// Translates a desktop-space region into this display's pixel space
    ///
    /// The caller must have checked [`DisplayInfo::contains`] first.
    pub fn to_local(&self, region: &Region) -> Region {
        Region {
            x:      (i64::from(region.x) - i64::from(self.x)) as u32,
            y:      (i64::from(region.y) - i64::from(self.y)) as u32,
            width:  region.width,
            height: region.height,
        }
    }
}

/// Finds the display that fully contains `region`
pub fn containing_display<'a>(displays: &'a [DisplayInfo], region: &Region) -> Option<&'a DisplayInfo> {
    displays.iter().find(|display| display.contains(region))
}

/// Pixel rectangle in desktop coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Region {
    /// X coordinate of the top-left corner
    pub x:      u32,
    /// Y coordinate of the top-left corner
    pub y:      u32,
    /// Width in pixels
    pub width:  u32,
    /// Height in pixels
    pub height: u32,
}

impl Region {
    /// Creates a new Region
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Maps a display-local region onto a bitmap of a different size
    ///
    /// Scaled displays report logical sizes while the captured bitmap holds
    /// physical pixels. Edges are rounded outward and clamped to the bitmap.
    /// Identical sizes return the region unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use third_eye_core::model::Region;
    ///
    /// let logical = Region::new(100, 50, 200, 100);
    /// assert_eq!(logical.scale_to((1440, 900), (2880, 1800)), Region::new(200, 100, 400, 200));
    /// ```
    pub fn scale_to(&self, logical: (u32, u32), physical: (u32, u32)) -> Region {
        if logical == physical || logical.0 == 0 || logical.1 == 0 {
            return *self;
        }

        let axis = |start: u32, len: u32, from: u32, to: u32| -> (u32, u32) {
            let (from, to) = (u64::from(from), u64::from(to));
            let lo = (u64::from(start) * to / from).min(to);
            let hi = ((u64::from(start) + u64::from(len)) * to).div_ceil(from).min(to);
            (lo as u32, hi.saturating_sub(lo).max(1) as u32)
        };

        let (x, width) = axis(self.x, self.width, logical.0, physical.0);
        let (y, height) = axis(self.y, self.height, logical.1, physical.1);
        Region {
            x,
            y,
            width,
            height,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.height, self.x, self.y)
    }
}

/// Metadata returned alongside every captured image
///
/// `width` and `height` describe the final image after any downscaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptureMetadata {
    /// Image width in pixels
    pub width:         u32,
    /// Image height in pixels
    pub height:        u32,
    /// Display index captured (full-display captures only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_index: Option<u32>,
    /// RFC 3339 timestamp of capture completion
    pub timestamp:     String,
    /// Sponsored message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsored:     Option<String>,
}

/// Result of a single capture: base64 PNG plus metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOutput {
    /// Base64-encoded PNG image
    pub image_base64: String,
    /// Capture metadata
    pub metadata:     CaptureMetadata,
}

/// The single retained capture served by `screen.latest`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCapture {
    /// Base64-encoded PNG image
    pub image_base64: String,
    /// Capture metadata
    pub metadata:     CaptureMetadata,
    /// When the capture was stored
    pub captured_at:  DateTime<Utc>,
}

impl StoredCapture {
    /// Returns the image and metadata as a [`CaptureOutput`]
    pub fn to_output(&self) -> CaptureOutput {
        CaptureOutput {
            image_base64: self.image_base64.clone(),
            metadata:     self.metadata.clone(),
        }
    }
}

/// What a validated capture request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTarget {
    /// Full display by index
    Display(u32),
    /// Rectangle in desktop coordinates
    Region(Region),
}

/// A capture request whose arguments passed validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRequest {
    /// Display or region to capture
    pub target:    CaptureTarget,
    /// Upper bound on output width
    pub max_width: u32,
    /// Wait before capturing; `None` when `instant` or zero
    pub delay:     Option<Duration>,
}

fn default_max_width() -> i64 {
    i64::from(DEFAULT_MAX_WIDTH)
}

/// Parameters for the `screen.capture` tool
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptureParams {
    /// Display index to capture (0-based, default: 0)
    #[serde(default)]
    #[schemars(range(min = 0))]
    pub display_index: i64,

    /// Maximum width for resizing (default: 1920)
    #[serde(default = "default_max_width")]
    #[schemars(range(min = 100, max = 4096))]
    pub max_width: i64,

    /// Delay in seconds before capture (default: 0)
    #[serde(default)]
    #[schemars(range(min = 0, max = 10))]
    pub delay: f64,

    /// Skip delay if true (default: false)
    #[serde(default)]
    pub instant: bool,
}

impl Default for CaptureParams {
    fn default() -> Self {
        Self {
            display_index: 0,
            max_width:     default_max_width(),
            delay:         0.0,
            instant:       false,
        }
    }
}

impl CaptureParams {
    /// Checks argument ranges and resolves defaults
    ///
    /// # Examples
    ///
    /// ```
    /// use third_eye_core::model::{CaptureParams, CaptureTarget};
    ///
    /// let request = CaptureParams::default().validate().unwrap();
    /// assert_eq!(request.target, CaptureTarget::Display(0));
    /// assert_eq!(request.max_width, 1920);
    /// assert!(request.delay.is_none());
    ///
    /// let bad = CaptureParams { max_width: 50, ..Default::default() };
    /// assert!(bad.validate().is_err());
    /// ```
    pub fn validate(&self) -> CaptureResult<CaptureRequest> {
        let display_index = bounded("displayIndex", self.display_index, 0)?;

        Ok(CaptureRequest {
            target:    CaptureTarget::Display(display_index),
            max_width: validate_max_width(self.max_width)?,
            delay:     validate_delay(self.delay, self.instant)?,
        })
    }
}

/// Parameters for the `screen.capture_region` tool
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRegionParams {
    /// X coordinate of the region
    #[schemars(range(min = 0))]
    pub x: i64,

    /// Y coordinate of the region
    #[schemars(range(min = 0))]
    pub y: i64,

    /// Width of the region in pixels
    #[schemars(range(min = 1))]
    pub width: i64,

    /// Height of the region in pixels
    #[schemars(range(min = 1))]
    pub height: i64,

    /// Maximum width for resizing (default: 1920)
    #[serde(default = "default_max_width")]
    #[schemars(range(min = 100, max = 4096))]
    pub max_width: i64,

    /// Delay in seconds before capture (default: 0)
    #[serde(default)]
    #[schemars(range(min = 0, max = 10))]
    pub delay: f64,

    /// Skip delay if true (default: false)
    #[serde(default)]
    pub instant: bool,
}

impl CaptureRegionParams {
    /// Creates region parameters with default width cap and no delay
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            max_width: default_max_width(),
            delay: 0.0,
            instant: false,
        }
    }

    /// Checks argument ranges and resolves defaults
    pub fn validate(&self) -> CaptureResult<CaptureRequest> {
        let region = Region {
            x:      coordinate("x", self.x)?,
            y:      coordinate("y", self.y)?,
            width:  extent("width", self.width)?,
            height: extent("height", self.height)?,
        };

        Ok(CaptureRequest {
            target:    CaptureTarget::Region(region),
            max_width: validate_max_width(self.max_width)?,
            delay:     validate_delay(self.delay, self.instant)?,
        })
    }
}

fn coordinate(name: &str, value: i64) -> CaptureResult<u32> {
    bounded(name, value, 0)
}

fn extent(name: &str, value: i64) -> CaptureResult<u32> {
    bounded(name, value, 1)
}

/// Accepts `min..=u32::MAX`
fn bounded(name: &str, value: i64, min: u32) -> CaptureResult<u32> {
    match u32::try_from(value) {
        Ok(v) if v >= min => Ok(v),
        _ => Err(CaptureError::validation(
            name,
            format!("must be between {} and {}, got {}", min, u32::MAX, value),
        )),
    }
}

fn validate_max_width(value: i64) -> CaptureResult<u32> {
    let range = i64::from(MIN_MAX_WIDTH)..=i64::from(MAX_MAX_WIDTH);
    if !range.contains(&value) {
        return Err(CaptureError::validation(
            "maxWidth",
            format!("must be between {} and {}, got {}", MIN_MAX_WIDTH, MAX_MAX_WIDTH, value),
        ));
    }
    Ok(value as u32)
}

/// Delay is range-checked even when `instant` discards it
fn validate_delay(delay: f64, instant: bool) -> CaptureResult<Option<Duration>> {
    if !delay.is_finite() || !(0.0..=MAX_DELAY_SECS).contains(&delay) {
        return Err(CaptureError::validation(
            "delay",
            format!("must be between 0 and {} seconds, got {}", MAX_DELAY_SECS, delay),
        ));
    }

    if instant || delay == 0.0 {
        return Ok(None);
    }
    Ok(Some(Duration::from_secs_f64(delay)))
}
