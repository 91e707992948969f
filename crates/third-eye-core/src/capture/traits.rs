//! Capability trait for display capture backends
//!
//! Backends only have to enumerate displays and grab a whole display.
//! Region capture has a default implementation that crops a full-display
//! grab; backends with a native region primitive can override it.

use async_trait::async_trait;

use super::ImageBuffer;
use crate::{
    error::CaptureResult,
    model::{DisplayInfo, Region},
};

/// Capability: Backend can enumerate and capture displays.
#[async_trait]
pub trait DisplayCapture: Send + Sync {
    /// Lists the displays currently attached, in enumeration order.
    ///
    /// `DisplayInfo::index` must equal the position in the returned list.
    async fn list_displays(&self) -> CaptureResult<Vec<DisplayInfo>>;

    /// Captures the full contents of `display` at native resolution.
    async fn capture_display(&self, display: &DisplayInfo) -> CaptureResult<ImageBuffer>;

    /// Captures `local`, a rectangle in `display`'s own pixel space.
    ///
    /// The output is exactly `local.width` x `local.height` pixels.
    async fn capture_region(
        &self,
        display: &DisplayInfo,
        local: Region,
    ) -> CaptureResult<ImageBuffer> {
        self.capture_display(display).await?.crop(local)
    }

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}
