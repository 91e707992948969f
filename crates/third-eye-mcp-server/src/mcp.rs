//! MCP service implementation with tool routing
//!
//! `ThirdEyeMcpServer` exposes the four screen tools to MCP clients. The
//! `#[tool_router]` handlers carry the typed parameter structs, which is
//! where the advertised input schemas come from. Incoming `tools/call`
//! requests bypass the router's typed extraction and go to
//! [`ToolDispatcher::dispatch`] with the raw argument object, so wrong types,
//! missing fields and unknown tool names come back as `{"error": ...}` tool
//! results instead of JSON-RPC faults. Results are shaped by
//! [`crate::mcp_content`].

use std::sync::Arc;

use rmcp::{
    RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolRequestParam, CallToolResult, ErrorData as McpError, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_router,
};
use third_eye_core::{
    capture::MockBackend,
    dispatch::{ToolDispatcher, ToolResponse},
    error::CaptureResult,
    model::{CaptureParams, CaptureRegionParams},
    storage::StorageService,
};

use crate::mcp_content::build_tool_result;

/// Name advertised in the MCP handshake
pub const SERVER_NAME: &str = "third-eye-mcp";

const INSTRUCTIONS: &str = "Third Eye captures screenshots for agents. Call \
    'screen.list_displays' to see display indices, positions and sizes. \
    'screen.capture' grabs a whole display and 'screen.capture_region' a rectangle in desktop \
    coordinates that must lie within one display; both return a PNG plus metadata and accept \
    maxWidth (100-4096), delay (0-10 seconds) and instant. 'screen.latest' returns the most \
    recent capture again without re-capturing.";

/// Third Eye MCP server
///
/// # Tools
///
/// - `screen.list_displays`: Enumerate displays
/// - `screen.capture`: Capture a full display
/// - `screen.capture_region`: Capture a rectangle within one display
/// - `screen.latest`: Return the most recent capture
#[derive(Clone)]
pub struct ThirdEyeMcpServer {
    /// Source of the advertised tool list and schemas
    tool_router: ToolRouter<Self>,
    dispatcher:  Arc<ToolDispatcher>,
}

#[tool_router]
impl ThirdEyeMcpServer {
    /// Creates a server around an existing dispatcher
    pub fn new(dispatcher: Arc<ToolDispatcher>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            dispatcher,
        }
    }

    /// Creates a server with a one-display MockBackend, ads enabled
    ///
    /// # Examples
    ///
    /// ```
    /// use third_eye_mcp_server::mcp::ThirdEyeMcpServer;
    ///
    /// let server = ThirdEyeMcpServer::new_with_mock();
    /// ```
    pub fn new_with_mock() -> Self {
        let dispatcher = ToolDispatcher::new(
            Arc::new(MockBackend::new()),
            Arc::new(StorageService::new()),
            Some(Arc::new(third_eye_core::ads::RotatingAds::new())),
        );
        Self::new(Arc::new(dispatcher))
    }

    /// The dispatcher serving this server's tools
    pub fn dispatcher(&self) -> &Arc<ToolDispatcher> {
        &self.dispatcher
    }

    /// Runs a tool call by wire name with the client's raw arguments
    ///
    /// This is the `tools/call` path. It never produces a protocol error for
    /// bad arguments or unknown names; those become `isError` results.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.dispatcher.dispatch(name, arguments).await;
        build_tool_result(&response)
    }

    /// Lists the display layout
    ///
    /// # Example
    ///
    /// Request: `{"name": "screen.list_displays", "arguments": {}}`
    ///
    /// Response text block:
    ///
    /// ```json
    /// [{"index": 0, "name": "DP-1", "x": 0, "y": 0, "width": 1920, "height": 1080, "isPrimary": true}]
    /// ```
    #[tool(
        name = "screen.list_displays",
        description = "List all available displays/monitors with their properties (index, name, \
                       position, dimensions, primary status)"
    )]
    pub async fn list_displays(&self) -> Result<CallToolResult, McpError> {
        respond(
            "screen.list_displays",
            self.dispatcher.list_displays().await.map(ToolResponse::Displays),
        )
    }

    /// Captures a full display
    ///
    /// # Example
    ///
    /// Request: `{"name": "screen.capture", "arguments": {"displayIndex": 0, "maxWidth": 800}}`
    ///
    /// Response: an `image/png` block followed by
    /// `{"width": 800, "height": 450, "displayIndex": 0, "timestamp": "...", "sponsored": "..."}`
    #[tool(
        name = "screen.capture",
        description = "Capture a full screenshot of the specified display. Returns base64 PNG \
                       image with metadata. Free and unlimited - includes sponsored message in \
                       metadata."
    )]
    pub async fn capture(
        &self,
        Parameters(params): Parameters<CaptureParams>,
    ) -> Result<CallToolResult, McpError> {
        respond("screen.capture", self.dispatcher.capture(&params).await.map(ToolResponse::Image))
    }

    /// Captures a rectangle in desktop coordinates
    ///
    /// # Example
    ///
    /// Request:
    /// `{"name": "screen.capture_region", "arguments": {"x": 2000, "y": 100, "width": 300, "height": 200}}`
    ///
    /// Response: an `image/png` block at 300x200 plus metadata without
    /// `displayIndex`. A rectangle crossing a display edge returns
    /// `{"error": "Invalid region ..."}` with `isError: true`.
    #[tool(
        name = "screen.capture_region",
        description = "Capture a specific region of the screen. Returns base64 PNG image with \
                       metadata. Free and unlimited - includes sponsored message in metadata."
    )]
    pub async fn capture_region(
        &self,
        Parameters(params): Parameters<CaptureRegionParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "screen.capture_region",
            self.dispatcher.capture_region(&params).await.map(ToolResponse::Image),
        )
    }

    /// Returns the most recent capture again
    ///
    /// # Example
    ///
    /// Request: `{"name": "screen.latest", "arguments": {}}`
    ///
    /// Before any capture the response is a single
    /// `{"error": "No capture available. ..."}` block with `isError: false`.
    #[tool(
        name = "screen.latest",
        description = "Get the most recently captured screenshot. Returns the last capture with \
                       its metadata. Includes sponsored message in metadata."
    )]
    pub async fn latest(&self) -> Result<CallToolResult, McpError> {
        respond("screen.latest", self.dispatcher.latest().map(ToolResponse::Image))
    }
}

fn respond(tool: &str, result: CaptureResult<ToolResponse>) -> Result<CallToolResult, McpError> {
    let response = result.unwrap_or_else(|error| {
        if error.is_empty_state() {
            tracing::info!("{}: {}", tool, error);
        } else {
            tracing::warn!("{} failed: {} ({})", tool, error, error.remediation_hint());
        }
        ToolResponse::from(error)
    });
    build_tool_result(&response)
}

impl ServerHandler for ThirdEyeMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tool_router.list_all()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!("tools/call {}", request.name);
        self.call(&request.name, request.arguments).await
    }
}
