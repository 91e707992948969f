//! Environment configuration for the Third Eye server
//!
//! | Variable                  | Values                       | Default                         |
//! |---------------------------|------------------------------|---------------------------------|
//! | `THIRD_EYE_BACKEND`       | `system`, `mock`             | `system` if compiled in, else `mock` |
//! | `THIRD_EYE_ADS`           | `on`, `off`                  | `on`                            |
//! | `THIRD_EYE_MOCK_DISPLAYS` | `WxH[,WxH...]`               | `1920x1080`                     |
//!
//! Empty values count as unset.

use std::{env, fmt, sync::Arc};

use third_eye_core::{
    ads::{AdProvider, RotatingAds},
    capture::{DisplayCapture, MockBackend, create_system_backend, system_capture_available},
    dispatch::ToolDispatcher,
    error::CaptureResult,
    storage::StorageService,
};

/// Selects the capture backend
pub const BACKEND_VAR: &str = "THIRD_EYE_BACKEND";
/// Enables or disables sponsor messages
pub const ADS_VAR: &str = "THIRD_EYE_ADS";
/// Display sizes reported by the mock backend
pub const MOCK_DISPLAYS_VAR: &str = "THIRD_EYE_MOCK_DISPLAYS";

/// Errors produced while reading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable holds a value outside its accepted set
    #[error("Invalid value '{value}' for {variable}: expected {expected}")]
    InvalidValue {
        /// Environment variable name
        variable: &'static str,
        /// Value that was read
        value:    String,
        /// Description of accepted values
        expected: &'static str,
    },
}

/// Which capture backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendChoice {
    /// OS capture through xcap (`system-capture` feature)
    System,
    /// Synthetic displays and test-pattern images
    Mock,
}

impl fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendChoice::System => write!(f, "system"),
            BackendChoice::Mock => write!(f, "mock"),
        }
    }
}

/// Runtime configuration resolved at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Capture backend
    pub backend:       BackendChoice,
    /// Attach sponsor messages to capture metadata
    pub ads_enabled:   bool,
    /// Display sizes for the mock backend, left to right
    pub mock_displays: Vec<(u32, u32)>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            backend:       default_backend(),
            ads_enabled:   true,
            mock_displays: vec![(1920, 1080)],
        }
    }
}

fn default_backend() -> BackendChoice {
    if system_capture_available() {
        BackendChoice::System
    } else {
        BackendChoice::Mock
    }
}

impl ServerConfig {
    /// Reads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Reads configuration through a custom variable provider
    ///
    /// # Examples
    ///
    /// ```
    /// use third_eye_mcp_server::config::{BackendChoice, ServerConfig};
    ///
    /// let config = ServerConfig::from_env_with(|key| match key {
    ///     "THIRD_EYE_BACKEND" => Some("mock".to_string()),
    ///     "THIRD_EYE_ADS" => Some("off".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.backend, BackendChoice::Mock);
    /// assert!(!config.ads_enabled);
    /// ```
    pub fn from_env_with<F>(env_provider: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| env_provider(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = read(BACKEND_VAR) {
            config.backend = match value.trim().to_ascii_lowercase().as_str() {
                "system" => BackendChoice::System,
                "mock" => BackendChoice::Mock,
                _ => return Err(invalid(BACKEND_VAR, value, "'system' or 'mock'")),
            };
        }

        if let Some(value) = read(ADS_VAR) {
            config.ads_enabled = match value.trim().to_ascii_lowercase().as_str() {
                "on" | "true" | "1" => true,
                "off" | "false" | "0" => false,
                _ => return Err(invalid(ADS_VAR, value, "'on' or 'off'")),
            };
        }

        if let Some(value) = read(MOCK_DISPLAYS_VAR) {
            config.mock_displays = parse_display_sizes(&value)
                .ok_or_else(|| invalid(MOCK_DISPLAYS_VAR, value, "comma-separated WIDTHxHEIGHT sizes"))?;
        }

        Ok(config)
    }

    /// Builds the configured capture backend
    pub fn build_backend(&self) -> CaptureResult<Arc<dyn DisplayCapture>> {
        match self.backend {
            BackendChoice::System => create_system_backend(),
            BackendChoice::Mock => Ok(Arc::new(MockBackend::with_display_sizes(&self.mock_displays))),
        }
    }

    /// Builds a dispatcher with a fresh latest-capture slot
    pub fn build_dispatcher(&self) -> CaptureResult<ToolDispatcher> {
        let backend = self.build_backend()?;
        let ads = self
            .ads_enabled
            .then(|| Arc::new(RotatingAds::new()) as Arc<dyn AdProvider>);
        Ok(ToolDispatcher::new(backend, Arc::new(StorageService::new()), ads))
    }
}

fn invalid(variable: &'static str, value: String, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        variable,
        value,
        expected,
    }
}

fn parse_display_sizes(value: &str) -> Option<Vec<(u32, u32)>> {
    value
        .split(',')
        .map(|entry| {
            let (width, height) = entry.trim().split_once(['x', 'X'])?;
            let width: u32 = width.trim().parse().ok()?;
            let height: u32 = height.trim().parse().ok()?;
            (width > 0 && height > 0).then_some((width, height))
        })
        .collect()
}
