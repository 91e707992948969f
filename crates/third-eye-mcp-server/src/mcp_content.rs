//! MCP content builders for tool responses
//!
//! Converts a dispatcher [`ToolResponse`] into the `CallToolResult` shapes
//! clients see:
//!
//! | Response                 | Content blocks                           | `isError` |
//! |--------------------------|------------------------------------------|-----------|
//! | capture / latest         | image (`image/png`) + metadata JSON text | `false`   |
//! | list displays            | JSON array text                          | `false`   |
//! | empty latest             | `{"error": ...}` text                    | `false`   |
//! | failure                  | `{"error": ...}` text                    | `true`    |
//!
//! JSON text is pretty-printed.
//!
//! # Examples
//!
//! ```
//! use third_eye_core::dispatch::ToolResponse;
//! use third_eye_mcp_server::mcp_content::build_tool_result;
//!
//! let response = ToolResponse::Error {
//!     message:     "Display 3 not found (1 display(s) available)".to_string(),
//!     empty_state: false,
//! };
//! let result = build_tool_result(&response).unwrap();
//! assert_eq!(result.is_error, Some(true));
//! assert_eq!(result.content.len(), 1);
//! ```

use rmcp::model::{CallToolResult, Content, ErrorData as McpError};
use serde::Serialize;
use third_eye_core::{
    capture::constants::PNG_MIME_TYPE,
    dispatch::ToolResponse,
    model::{CaptureOutput, DisplayInfo},
};

/// Builds MCP image content from an already base64-encoded PNG
///
/// # Examples
///
/// ```
/// use third_eye_mcp_server::mcp_content::build_image_content;
///
/// let content = build_image_content("iVBORw0KGgo=");
/// assert_eq!(content.as_image().unwrap().mime_type, "image/png");
/// ```
pub fn build_image_content(image_base64: &str) -> Content {
    Content::image(image_base64.to_string(), PNG_MIME_TYPE)
}

/// Builds a text block holding pretty-printed JSON
pub fn build_json_content<T: Serialize + ?Sized>(value: &T) -> Result<Content, McpError> {
    let json_str = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("Failed to serialize tool response: {}", e), None)
    })?;
    Ok(Content::text(json_str))
}

/// Builds the `{"error": message}` text block
pub fn build_error_content(message: &str) -> Result<Content, McpError> {
    build_json_content(&serde_json::json!({ "error": message }))
}

/// Image block followed by the metadata JSON block
pub fn build_capture_result(output: &CaptureOutput) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![
        build_image_content(&output.image_base64),
        build_json_content(&output.metadata)?,
    ]))
}

/// Single text block with the display array
pub fn build_displays_result(displays: &[DisplayInfo]) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![build_json_content(displays)?]))
}

/// Converts any dispatcher response into its MCP result
pub fn build_tool_result(response: &ToolResponse) -> Result<CallToolResult, McpError> {
    match response {
        ToolResponse::Displays(displays) => build_displays_result(displays),
        ToolResponse::Image(output) => build_capture_result(output),
        ToolResponse::Error {
            message,
            empty_state: true,
        } => Ok(CallToolResult::success(vec![build_error_content(message)?])),
        ToolResponse::Error { message, .. } => {
            Ok(CallToolResult::error(vec![build_error_content(message)?]))
        }
    }
}
