//! Capture backend trait and implementations
//!
//! The dispatcher talks to a single [`DisplayCapture`] trait object:
//!
//! | Backend         | Feature          | Use                         |
//! |-----------------|------------------|-----------------------------|
//! | [`MockBackend`] | always           | tests, headless development |
//! | `XcapBackend`   | `system-capture` | real monitors via `xcap`    |
//!
//! # Core Types
//!
//! - [`DisplayCapture`] - Enumerate displays and grab pixels
//! - [`ImageBuffer`] - Image wrapper with downscale/crop transformations

use std::sync::Arc;

use crate::error::CaptureResult;

pub mod constants;
pub mod image_buffer;
pub mod mock;
pub mod traits;

#[cfg(feature = "system-capture")]
pub mod xcap_backend;

pub use image_buffer::ImageBuffer;
pub use mock::MockBackend;
pub use traits::DisplayCapture;
#[cfg(feature = "system-capture")]
pub use xcap_backend::XcapBackend;

/// Returns true when this build can capture real displays
pub const fn system_capture_available() -> bool {
    cfg!(feature = "system-capture")
}

/// Creates the OS-backed capture backend.
///
/// Fails with a backend error when the crate was built without the
/// `system-capture` feature.
pub fn create_system_backend() -> CaptureResult<Arc<dyn DisplayCapture>> {
    #[cfg(feature = "system-capture")]
    {
        Ok(Arc::new(XcapBackend::new()))
    }

    #[cfg(not(feature = "system-capture"))]
    {
        Err(crate::error::CaptureError::backend(
            "create system backend",
            "built without the system-capture feature",
        ))
    }
}
