//! Tool dispatch: validation, capture pipeline and response shaping
//!
//! [`ToolDispatcher`] owns the four screen tools. The typed methods
//! (`list_displays`, `capture`, `capture_region`, `latest`) return a
//! [`CaptureResult`]; [`ToolDispatcher::dispatch`] routes a tool name and a raw
//! JSON argument object to them and never fails, folding every error into a
//! [`ToolResponse::Error`].
//!
//! A capture runs in this order:
//!
//! 1. validate arguments (the backend is not touched on failure)
//! 2. wait `delay` seconds unless `instant`
//! 3. enumerate displays and resolve the target
//! 4. grab pixels, downscale to `maxWidth`, PNG encode, base64
//! 5. attach metadata and store as the latest capture
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use third_eye_core::{
//!     capture::MockBackend,
//!     dispatch::{ToolDispatcher, ToolResponse},
//!     storage::StorageService,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let dispatcher =
//!         ToolDispatcher::new(Arc::new(MockBackend::new()), Arc::new(StorageService::new()), None);
//!
//!     let args = serde_json::json!({ "maxWidth": 800 });
//!     match dispatcher.dispatch("screen.capture", args.as_object().cloned()).await {
//!         ToolResponse::Image(output) => assert_eq!(output.metadata.width, 800),
//!         other => panic!("unexpected response: {:?}", other),
//!     }
//! }
//! ```

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    ads::AdProvider,
    capture::DisplayCapture,
    error::{CaptureError, CaptureResult},
    model::{
        CaptureMetadata, CaptureOutput, CaptureParams, CaptureRegionParams, CaptureRequest,
        CaptureTarget, DisplayInfo, containing_display,
    },
    storage::StorageService,
    util::encode::encode_png_base64,
};

/// Tool name: enumerate displays
pub const LIST_DISPLAYS: &str = "screen.list_displays";
/// Tool name: capture a full display
pub const CAPTURE: &str = "screen.capture";
/// Tool name: capture a desktop rectangle
pub const CAPTURE_REGION: &str = "screen.capture_region";
/// Tool name: return the most recent capture
pub const LATEST: &str = "screen.latest";

/// Every tool the dispatcher serves
pub const TOOL_NAMES: [&str; 4] = [LIST_DISPLAYS, CAPTURE, CAPTURE_REGION, LATEST];

/// Outcome of [`ToolDispatcher::dispatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResponse {
    /// Result of `screen.list_displays`
    Displays(Vec<DisplayInfo>),
    /// Image plus metadata from a capture or `screen.latest`
    Image(CaptureOutput),
    /// Failure, or the empty state of `screen.latest`
    Error {
        /// Human-readable message
        message:     String,
        /// True when `latest` had nothing to return; not a failure
        empty_state: bool,
    },
}

impl ToolResponse {
    /// True for real failures (the empty latest state is not one)
    pub fn is_error(&self) -> bool {
        matches!(self, ToolResponse::Error { empty_state: false, .. })
    }
}

impl From<CaptureError> for ToolResponse {
    fn from(error: CaptureError) -> Self {
        ToolResponse::Error {
            message:     error.to_string(),
            empty_state: error.is_empty_state(),
        }
    }
}

/// Routes tool calls to the capture backend and the latest-capture slot
pub struct ToolDispatcher {
    backend: Arc<dyn DisplayCapture>,
    storage: Arc<StorageService>,
    ads:     Option<Arc<dyn AdProvider>>,
}

impl std::fmt::Debug for ToolDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDispatcher")
            .field("backend", &self.backend.name())
            .field("ads_enabled", &self.ads.is_some())
            .finish()
    }
}

impl ToolDispatcher {
    /// Creates a dispatcher; pass `None` for `ads` to omit `sponsored`
    pub fn new(
        backend: Arc<dyn DisplayCapture>,
        storage: Arc<StorageService>,
        ads: Option<Arc<dyn AdProvider>>,
    ) -> Self {
        Self {
            backend,
            storage,
            ads,
        }
    }

    /// The latest-capture slot this dispatcher writes
    pub fn storage(&self) -> &Arc<StorageService> {
        &self.storage
    }

    /// Lists displays in backend enumeration order
    pub async fn list_displays(&self) -> CaptureResult<Vec<DisplayInfo>> {
        tracing::info!("Listing displays via {} backend", self.backend.name());
        let displays = self.backend.list_displays().await?;
        tracing::debug!("Found {} display(s)", displays.len());
        Ok(displays)
    }

    /// Captures a full display and stores it as the latest capture
    pub async fn capture(&self, params: &CaptureParams) -> CaptureResult<CaptureOutput> {
        let request = params.validate()?;
        self.execute(request).await
    }

    /// Captures a desktop rectangle and stores it as the latest capture
    ///
    /// The rectangle must lie entirely within one display.
    pub async fn capture_region(&self, params: &CaptureRegionParams) -> CaptureResult<CaptureOutput> {
        let request = params.validate()?;
        self.execute(request).await
    }

    /// Returns the most recent capture
    pub fn latest(&self) -> CaptureResult<CaptureOutput> {
        self.storage
            .get()
            .map(|stored| stored.to_output())
            .ok_or(CaptureError::NoCaptureAvailable)
    }

    /// Routes a tool call by wire name
    ///
    /// `arguments` is the raw JSON object from the client; missing keys take
    /// their defaults. Never fails.
    pub async fn dispatch(&self, name: &str, arguments: Option<Map<String, Value>>) -> ToolResponse {
        tracing::debug!("Dispatching tool call: {}", name);

        let result = match name {
            LIST_DISPLAYS => self.list_displays().await.map(ToolResponse::Displays),
            CAPTURE => match parse_arguments::<CaptureParams>(arguments) {
                Ok(params) => self.capture(&params).await.map(ToolResponse::Image),
                Err(e) => Err(e),
            },
            CAPTURE_REGION => match parse_arguments::<CaptureRegionParams>(arguments) {
                Ok(params) => self.capture_region(&params).await.map(ToolResponse::Image),
                Err(e) => Err(e),
            },
            LATEST => self.latest().map(ToolResponse::Image),
            unknown => {
                tracing::warn!("Unknown tool requested: {}", unknown);
                return ToolResponse::Error {
                    message:     format!("Unknown tool: {}", unknown),
                    empty_state: false,
                };
            }
        };

        result.unwrap_or_else(|error| {
            if error.is_empty_state() {
                tracing::info!("{}: {}", name, error);
            } else {
                tracing::warn!("{} failed: {} ({})", name, error, error.remediation_hint());
            }
            ToolResponse::from(error)
        })
    }

    async fn execute(&self, request: CaptureRequest) -> CaptureResult<CaptureOutput> {
        if let Some(delay) = request.delay {
            tracing::debug!("Waiting {:?} before capture", delay);
            tokio::time::sleep(delay).await;
        }

        let displays = self.backend.list_displays().await?;

        let (image, display_index) = match request.target {
            CaptureTarget::Display(index) => {
                tracing::info!("Capturing display {} (maxWidth {})", index, request.max_width);
                let target = displays.get(index as usize).ok_or(CaptureError::InvalidDisplay {
                    index,
                    available: displays.len(),
                })?;
                (self.backend.capture_display(target).await?, Some(target.index))
            }
            CaptureTarget::Region(region) => {
                tracing::info!("Capturing region {} (maxWidth {})", region, request.max_width);
                let target =
                    containing_display(&displays, &region).ok_or_else(|| CaptureError::InvalidRegion {
                        region,
                        reason: "must lie entirely within one display".to_string(),
                    })?;
                let local = target.to_local(&region);
                tracing::debug!("Region maps to {} on display {}", local, target.index);
                (self.backend.capture_region(target, local).await?, None)
            }
        };

        let fitted = image.fit_to_width(request.max_width)?;
        let (width, height) = fitted.dimensions();
        let image_base64 = encode_png_base64(&fitted)?;

        let metadata = CaptureMetadata {
            width,
            height,
            display_index,
            timestamp: chrono::Utc::now().to_rfc3339(),
            sponsored: self.ads.as_ref().map(|ads| ads.get_ad()),
        };

        let output = CaptureOutput {
            image_base64,
            metadata,
        };
        self.storage.put(output.clone());

        tracing::info!("Capture complete: {}x{}", width, height);
        Ok(output)
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: Option<Map<String, Value>>) -> CaptureResult<T> {
    serde_json::from_value(Value::Object(arguments.unwrap_or_default()))
        .map_err(|e| CaptureError::validation("arguments", e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{ads::RotatingAds, capture::MockBackend, error::ErrorKind};

    fn dispatcher_with(backend: MockBackend) -> (ToolDispatcher, Arc<MockBackend>) {
        let backend = Arc::new(backend);
        let dispatcher = ToolDispatcher::new(
            backend.clone(),
            Arc::new(StorageService::new()),
            Some(Arc::new(RotatingAds::new())),
        );
        (dispatcher, backend)
    }

    fn args(value: Value) -> Option<Map<String, Value>> {
        value.as_object().cloned()
    }

    #[tokio::test]
    async fn test_capture_defaults() {
        let (dispatcher, _) = dispatcher_with(MockBackend::new());
        let output = dispatcher.capture(&CaptureParams::default()).await.unwrap();

        assert_eq!((output.metadata.width, output.metadata.height), (1920, 1080));
        assert_eq!(output.metadata.display_index, Some(0));
        assert!(output.metadata.sponsored.is_some());
        assert!(chrono::DateTime::parse_from_rfc3339(&output.metadata.timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_capture_downscales() {
        let (dispatcher, _) = dispatcher_with(MockBackend::new());
        let params = CaptureParams {
            max_width: 800,
            ..Default::default()
        };
        let output = dispatcher.capture(&params).await.unwrap();
        assert_eq!((output.metadata.width, output.metadata.height), (800, 450));
    }

    #[tokio::test]
    async fn test_capture_invalid_display() {
        let (dispatcher, _) = dispatcher_with(MockBackend::new());
        let params = CaptureParams {
            display_index: 3,
            ..Default::default()
        };
        let error = dispatcher.capture(&params).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidDisplay);
        assert!(dispatcher.storage().is_empty());
    }

    #[tokio::test]
    async fn test_capture_region_spanning_displays_rejected() {
        let (dispatcher, _) = dispatcher_with(MockBackend::with_display_sizes(&[(1920, 1080), (1920, 1080)]));
        let error = dispatcher
            .capture_region(&CaptureRegionParams::new(1900, 0, 100, 100))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidRegion);
    }

    #[tokio::test]
    async fn test_capture_region_on_second_display() {
        let (dispatcher, _) = dispatcher_with(MockBackend::with_display_sizes(&[(1920, 1080), (1280, 1024)]));
        let output = dispatcher
            .capture_region(&CaptureRegionParams::new(2000, 100, 300, 200))
            .await
            .unwrap();
        assert_eq!((output.metadata.width, output.metadata.height), (300, 200));
        assert_eq!(output.metadata.display_index, None);
    }

    #[tokio::test]
    async fn test_ads_disabled_omits_sponsored() {
        let dispatcher =
            ToolDispatcher::new(Arc::new(MockBackend::new()), Arc::new(StorageService::new()), None);
        let output = dispatcher.capture(&CaptureParams::default()).await.unwrap();
        assert!(output.metadata.sponsored.is_none());
    }

    #[tokio::test]
    async fn test_latest_empty_state() {
        let (dispatcher, _) = dispatcher_with(MockBackend::new());
        let error = dispatcher.latest().unwrap_err();
        assert!(error.is_empty_state());

        match dispatcher.dispatch(LATEST, None).await {
            ToolResponse::Error {
                message,
                empty_state,
            } => {
                assert!(empty_state);
                assert!(message.contains("No capture available"));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_backend_failure_is_not_stored() {
        let (dispatcher, _) =
            dispatcher_with(MockBackend::new().with_error(CaptureError::backend("capture display", "denied")));
        let response = dispatcher.dispatch(CAPTURE, None).await;
        assert!(response.is_error());
        assert!(dispatcher.storage().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let (dispatcher, backend) = dispatcher_with(MockBackend::new());
        match dispatcher.dispatch("screen.record", None).await {
            ToolResponse::Error { message, .. } => assert_eq!(message, "Unknown tool: screen.record"),
            other => panic!("unexpected response: {:?}", other),
        }
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_wrong_argument_type() {
        let (dispatcher, backend) = dispatcher_with(MockBackend::new());
        let response = dispatcher
            .dispatch(CAPTURE, args(json!({ "maxWidth": "wide" })))
            .await;
        assert!(response.is_error());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_region_missing_required() {
        let (dispatcher, backend) = dispatcher_with(MockBackend::new());
        let response = dispatcher
            .dispatch(CAPTURE_REGION, args(json!({ "x": 0, "y": 0, "width": 10 })))
            .await;
        assert!(response.is_error());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_list_displays() {
        let (dispatcher, _) = dispatcher_with(MockBackend::with_display_sizes(&[(1920, 1080), (800, 600)]));
        match dispatcher.dispatch(LIST_DISPLAYS, None).await {
            ToolResponse::Displays(displays) => assert_eq!(displays.len(), 2),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_empty_state_response_is_not_error() {
        let response = ToolResponse::from(CaptureError::NoCaptureAvailable);
        assert!(!response.is_error());
        let failure = ToolResponse::from(CaptureError::validation("delay", "too long"));
        assert!(failure.is_error());
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(TOOL_NAMES.len(), 4);
        assert!(TOOL_NAMES.iter().all(|name| name.starts_with("screen.")));
    }
}
