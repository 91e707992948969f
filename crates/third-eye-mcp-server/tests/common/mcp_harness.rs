//! MCP Server Test Harness
//!
//! Provides reusable fixtures for exercising the Third Eye MCP server with
//! the mock backend, and validators for the tool result shapes.
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::mcp_harness::{ContentValidator, McpTestContext};
//!
//! #[tokio::test]
//! async fn test_capture() {
//!     let ctx = McpTestContext::new_with_mock();
//!     let result = ctx.capture(CaptureParams::default()).await.unwrap();
//!     let parts = ContentValidator::validate_capture_result(&result).unwrap();
//!     assert!(ContentValidator::is_valid_png(&parts.image_bytes));
//! }
//! ```

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::GenericImageView;
use rmcp::{
    ServiceExt,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, ErrorData},
};
use serde_json::{Value, json};
use third_eye_core::{
    ads::{AdProvider, RotatingAds},
    capture::MockBackend,
    dispatch::ToolDispatcher,
    model::{CaptureParams, CaptureRegionParams},
    storage::StorageService,
};
use third_eye_mcp_server::mcp::ThirdEyeMcpServer;
use tokio::io::{
    AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf,
};

/// Test fixture for MCP server integration tests
pub struct McpTestContext {
    /// The MCP server instance
    pub server:  ThirdEyeMcpServer,
    /// Backend used by the server (for call counting)
    pub backend: Arc<MockBackend>,
}

impl McpTestContext {
    /// Create test context with a one-display MockBackend and ads enabled
    pub fn new_with_mock() -> Self {
        Self::new_with_configured_mock(MockBackend::new(), true)
    }

    /// Create test context with a configured MockBackend
    ///
    /// Use this to inject errors, delays or extra displays.
    pub fn new_with_configured_mock(mock: MockBackend, ads: bool) -> Self {
        let backend = Arc::new(mock);
        let dispatcher = ToolDispatcher::new(
            backend.clone(),
            Arc::new(StorageService::new()),
            ads.then(|| Arc::new(RotatingAds::new()) as Arc<dyn AdProvider>),
        );
        Self {
            server: ThirdEyeMcpServer::new(Arc::new(dispatcher)),
            backend,
        }
    }

    // --- Tool invocation helpers ---

    /// Call screen.list_displays
    pub async fn list_displays(&self) -> Result<CallToolResult, ErrorData> {
        self.server.list_displays().await
    }

    /// Call screen.capture
    pub async fn capture(&self, params: CaptureParams) -> Result<CallToolResult, ErrorData> {
        self.server.capture(Parameters(params)).await
    }

    /// Call screen.capture_region
    pub async fn capture_region(
        &self,
        params: CaptureRegionParams,
    ) -> Result<CallToolResult, ErrorData> {
        self.server.capture_region(Parameters(params)).await
    }

    /// Call screen.latest
    pub async fn latest(&self) -> Result<CallToolResult, ErrorData> {
        self.server.latest().await
    }

    /// Serve this context's server over an in-memory transport
    pub async fn connect(&self) -> WireClient {
        WireClient::connect(self.server.clone()).await
    }
}

// ============================================================================
// Wire Client
// ============================================================================

/// Minimal JSON-RPC client speaking newline-delimited MCP to a served server
///
/// Requests go through rmcp's real request decoding and `ServerHandler`
/// dispatch, exactly as a stdio client's would.
pub struct WireClient {
    reader:  Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer:  WriteHalf<DuplexStream>,
    next_id: u64,
}

impl WireClient {
    /// Spawn the server on a duplex pipe and complete the MCP handshake
    pub async fn connect(server: ThirdEyeMcpServer) -> Self {
        let (client_io, server_io) = tokio::io::duplex(1 << 20);
        tokio::spawn(async move {
            let running = server
                .serve(tokio::io::split(server_io))
                .await
                .expect("server should complete initialization");
            let _ = running.waiting().await;
        });

        let (read, writer) = tokio::io::split(client_io);
        let mut client = Self {
            reader: BufReader::new(read).lines(),
            writer,
            next_id: 0,
        };

        let init = client
            .request(
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "third-eye-tests", "version": "0.0.0" }
                }),
            )
            .await;
        assert_eq!(init["result"]["serverInfo"]["name"], "third-eye-mcp");

        client
            .send(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
            .await;
        client
    }

    async fn send(&mut self, message: Value) {
        let mut line = serde_json::to_vec(&message).expect("message should serialize");
        line.push(b'\n');
        self.writer.write_all(&line).await.expect("write to server");
        self.writer.flush().await.expect("flush to server");
    }

    /// Send a request and return the raw JSON-RPC response with the same id
    pub async fn request(&mut self, method: &str, params: Value) -> Value {
        self.next_id += 1;
        let id = self.next_id;
        self.send(json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }))
            .await;

        loop {
            let line = self
                .reader
                .next_line()
                .await
                .expect("read from server")
                .expect("server closed the stream");
            let message: Value = serde_json::from_str(&line).expect("server sent invalid JSON");
            if message["id"] == id {
                return message;
            }
        }
    }

    /// Send `tools/call`, asserting the server answered with a tool result
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> CallToolResult {
        let response = self
            .request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await;
        assert!(
            response.get("error").is_none(),
            "tools/call {} returned a JSON-RPC error: {}",
            name,
            response
        );
        serde_json::from_value(response["result"].clone()).expect("result should be a CallToolResult")
    }
}

// ============================================================================
// Content Validators
// ============================================================================

/// Parsed components of a capture result
#[derive(Debug)]
pub struct CaptureResultParts {
    /// Decoded PNG bytes
    pub image_bytes: Vec<u8>,
    /// Raw base64 payload as sent
    pub image_base64: String,
    /// Parsed metadata JSON
    pub metadata: serde_json::Value,
}

impl CaptureResultParts {
    /// Pixel dimensions of the decoded PNG
    pub fn image_dimensions(&self) -> (u32, u32) {
        image::load_from_memory(&self.image_bytes)
            .expect("image bytes should decode")
            .dimensions()
    }
}

/// Validation utilities for MCP tool responses
pub struct ContentValidator;

impl ContentValidator {
    /// Decode the base64 image in the first content block
    pub fn validate_base64_image(result: &CallToolResult) -> Result<(String, Vec<u8>), String> {
        let image = result
            .content
            .first()
            .ok_or("Missing image content")?
            .as_image()
            .ok_or("First content is not an image")?;

        if image.mime_type != "image/png" {
            return Err(format!("Expected MIME type 'image/png', got '{}'", image.mime_type));
        }

        let bytes = STANDARD
            .decode(&image.data)
            .map_err(|e| format!("Invalid base64: {}", e))?;
        Ok((image.data.clone(), bytes))
    }

    /// Parse the JSON text of the content block at `index`
    pub fn json_at(result: &CallToolResult, index: usize) -> Result<serde_json::Value, String> {
        let text = result
            .content
            .get(index)
            .ok_or_else(|| format!("Missing content block {}", index))?
            .as_text()
            .ok_or_else(|| format!("Content block {} is not text", index))?;

        serde_json::from_str(&text.text).map_err(|e| format!("Invalid JSON: {}", e))
    }

    /// Validate the image + metadata capture shape
    pub fn validate_capture_result(result: &CallToolResult) -> Result<CaptureResultParts, String> {
        if result.content.len() != 2 {
            return Err(format!("Expected 2 content items, got {}", result.content.len()));
        }

        if result.is_error.unwrap_or(false) {
            return Err("Result is marked as error".to_string());
        }

        let (image_base64, image_bytes) = Self::validate_base64_image(result)?;
        let metadata = Self::json_at(result, 1)?;

        for field in ["width", "height", "timestamp"] {
            if metadata.get(field).is_none() {
                return Err(format!("Metadata missing '{}'", field));
            }
        }

        Ok(CaptureResultParts {
            image_bytes,
            image_base64,
            metadata,
        })
    }

    /// Validate the `{"error": ...}` shape and return the message
    pub fn validate_error_result(
        result: &CallToolResult,
        expect_is_error: bool,
    ) -> Result<String, String> {
        if result.content.len() != 1 {
            return Err(format!("Expected 1 content item, got {}", result.content.len()));
        }

        if result.is_error.unwrap_or(false) != expect_is_error {
            return Err(format!(
                "Expected isError={}, got {:?}",
                expect_is_error, result.is_error
            ));
        }

        let json = Self::json_at(result, 0)?;
        json["error"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| "Missing 'error' field".to_string())
    }

    /// Verify PNG magic bytes
    ///
    /// PNG files start with: 0x89 0x50 0x4E 0x47 0x0D 0x0A 0x1A 0x0A
    pub fn is_valid_png(bytes: &[u8]) -> bool {
        bytes.len() >= 8 && bytes.starts_with(&[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a])
    }
}
