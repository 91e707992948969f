//! OS display capture using xcap
//!
//! xcap talks to the platform capture API (X11/Wayland portal, CoreGraphics,
//! DXGI) synchronously, so every call runs inside
//! [`tokio::task::spawn_blocking`]. The backend keeps no state: monitors are
//! re-enumerated on every call so hot-plugged displays show up immediately.

use async_trait::async_trait;
use xcap::Monitor;

use super::{DisplayCapture, ImageBuffer};
use crate::{
    error::{CaptureError, CaptureResult},
    model::{DisplayInfo, Region},
};

/// Display capture backend built on `xcap::Monitor`
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapBackend;

impl XcapBackend {
    /// Creates a new XcapBackend
    pub fn new() -> Self {
        Self
    }
}

fn monitors() -> CaptureResult<Vec<Monitor>> {
    Monitor::all().map_err(|e| {
        tracing::error!("xcap failed to enumerate monitors: {}", e);
        CaptureError::backend("enumerate displays", e)
    })
}

fn describe(index: usize, monitor: &Monitor) -> CaptureResult<DisplayInfo> {
    let field = |e: xcap::XCapError| CaptureError::backend("read display properties", e);

    Ok(DisplayInfo {
        index:      index as u32,
        name:       monitor.name().map_err(field)?,
        x:          monitor.x().map_err(field)?,
        y:          monitor.y().map_err(field)?,
        width:      monitor.width().map_err(field)?,
        height:     monitor.height().map_err(field)?,
        is_primary: monitor.is_primary().map_err(field)?,
    })
}

fn grab(index: u32) -> CaptureResult<ImageBuffer> {
    let all = monitors()?;
    let available = all.len();
    let monitor = all
        .into_iter()
        .nth(index as usize)
        .ok_or(CaptureError::InvalidDisplay { index, available })?;

    let image = monitor.capture_image().map_err(|e| {
        tracing::error!("xcap capture of display {} failed: {}", index, e);
        CaptureError::backend("capture display", e)
    })?;

    Ok(ImageBuffer::from(image))
}

async fn blocking<T, F>(operation: &'static str, f: F) -> CaptureResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> CaptureResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CaptureError::backend(operation, format!("capture task failed: {}", e)))?
}

#[async_trait]
impl DisplayCapture for XcapBackend {
    async fn list_displays(&self) -> CaptureResult<Vec<DisplayInfo>> {
        blocking("enumerate displays", || {
            monitors()?
                .iter()
                .enumerate()
                .map(|(index, monitor)| describe(index, monitor))
                .collect()
        })
        .await
    }

    async fn capture_display(&self, display: &DisplayInfo) -> CaptureResult<ImageBuffer> {
        let index = display.index;
        let image = blocking("capture display", move || grab(index)).await?;
        tracing::debug!("Captured display {} at {}x{}", index, image.width(), image.height());
        Ok(image)
    }

    async fn capture_region(
        &self,
        display: &DisplayInfo,
        local: Region,
    ) -> CaptureResult<ImageBuffer> {
        let index = display.index;
        let logical = (display.width, display.height);
        blocking("capture region", move || {
            let image = grab(index)?;
            // HiDPI monitors capture at physical resolution
            let pixels = local.scale_to(logical, image.dimensions());
            if pixels != local {
                tracing::debug!("Scaled region {} to {} for display {}", local, pixels, index);
            }
            image.crop(pixels)
        })
        .await
    }

    fn name(&self) -> &'static str {
        "xcap"
    }
}
