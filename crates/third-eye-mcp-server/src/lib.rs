//! third-eye-mcp-server: MCP server for Third Eye screen capture
//!
//! Thin protocol layer that wraps third-eye-core's dispatcher with rmcp tool
//! routing, response formatting and environment configuration.

pub mod config;
pub mod mcp;
pub mod mcp_content;
