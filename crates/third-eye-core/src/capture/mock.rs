//! Mock capture backend for testing
//!
//! `MockBackend` implements [`DisplayCapture`] without touching the OS. It
//! reports a configurable set of synthetic displays and returns gradient
//! test patterns at each display's native size.
//!
//! # Features
//!
//! - **Configurable Displays:** one 1920x1080 primary display by default
//! - **Configurable Delay:** simulate slow capture primitives
//! - **Error Injection:** every operation fails with the injected error
//! - **Call Counting:** observe whether a request reached the backend
//!
//! # Examples
//!
//! ```
//! use third_eye_core::capture::{DisplayCapture, MockBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = MockBackend::new();
//!
//!     let displays = backend.list_displays().await.unwrap();
//!     assert_eq!(displays.len(), 1);
//!
//!     let image = backend.capture_display(&displays[0]).await.unwrap();
//!     assert_eq!(image.dimensions(), (1920, 1080));
//!     assert_eq!(backend.call_count(), 2);
//! }
//! ```

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::sleep;

use super::{DisplayCapture, ImageBuffer};
use crate::{
    error::{CaptureError, CaptureResult},
    model::{DisplayInfo, Region},
};

/// Mock capture backend for testing and development
///
/// Thread-safe; share across tasks with `Arc`.
#[derive(Debug)]
pub struct MockBackend {
    /// Optional delay to simulate capture latency
    delay:           Option<Duration>,
    /// Optional error to inject for testing error handling
    error_injection: Option<CaptureError>,
    /// Synthetic displays, in enumeration order
    displays:        Vec<DisplayInfo>,
    /// Number of trait calls served (including failed ones)
    calls:           AtomicUsize,
}

impl MockBackend {
    /// Creates a MockBackend with a single 1920x1080 primary display
    pub fn new() -> Self {
        Self::with_display_sizes(&[(1920, 1080)])
    }

    /// Creates a MockBackend with displays of the given sizes
    ///
    /// Displays are laid out left to right starting at the desktop origin;
    /// the first one is primary.
    ///
    /// # Examples
    ///
    /// ```
    /// use third_eye_core::capture::MockBackend;
    ///
    /// let backend = MockBackend::with_display_sizes(&[(1920, 1080), (1280, 1024)]);
    /// assert_eq!(backend.displays()[1].x, 1920);
    /// ```
    pub fn with_display_sizes(sizes: &[(u32, u32)]) -> Self {
        let mut next_x: i64 = 0;
        let displays = sizes
            .iter()
            .enumerate()
            .map(|(index, &(width, height))| {
                let display = DisplayInfo {
                    index: index as u32,
                    name: format!("Mock Display {}", index + 1),
                    x: i32::try_from(next_x).unwrap_or(i32::MAX),
                    y: 0,
                    width,
                    height,
                    is_primary: index == 0,
                };
                next_x += i64::from(width);
                display
            })
            .collect();

        Self::with_displays(displays)
    }

    /// Creates a MockBackend reporting exactly `displays`
    pub fn with_displays(displays: Vec<DisplayInfo>) -> Self {
        Self {
            delay: None,
            error_injection: None,
            displays,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sets a delay applied before every operation returns
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Injects an error that will be returned by all operations
    ///
    /// # Examples
    ///
    /// ```
    /// use third_eye_core::{capture::MockBackend, error::CaptureError};
    ///
    /// let backend = MockBackend::new().with_error(CaptureError::backend("capture display", "denied"));
    /// ```
    pub fn with_error(mut self, error: CaptureError) -> Self {
        self.error_injection = Some(error);
        self
    }

    /// The synthetic displays this backend reports
    pub fn displays(&self) -> &[DisplayInfo] {
        &self.displays
    }

    /// Number of backend operations invoked so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Counts the call, applies the delay and any injected error
    async fn enter(&self) -> CaptureResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(duration) = self.delay {
            sleep(duration).await;
        }

        match &self.error_injection {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn known_display(&self, display: &DisplayInfo) -> CaptureResult<&DisplayInfo> {
        self.displays
            .get(display.index as usize)
            .ok_or(CaptureError::InvalidDisplay {
                index:     display.index,
                available: self.displays.len(),
            })
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DisplayCapture for MockBackend {
    async fn list_displays(&self) -> CaptureResult<Vec<DisplayInfo>> {
        self.enter().await?;
        Ok(self.displays.clone())
    }

    async fn capture_display(&self, display: &DisplayInfo) -> CaptureResult<ImageBuffer> {
        self.enter().await?;
        let known = self.known_display(display)?;
        tracing::debug!("Mock capture of display {} ({}x{})", known.index, known.width, known.height);
        Ok(ImageBuffer::from_test_pattern(known.width, known.height))
    }

    async fn capture_region(
        &self,
        display: &DisplayInfo,
        local: Region,
    ) -> CaptureResult<ImageBuffer> {
        self.enter().await?;
        let known = self.known_display(display)?;
        ImageBuffer::from_test_pattern(known.width, known.height).crop(local)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
