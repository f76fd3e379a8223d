//! Error handling utilities for MCP server

use attune_core::ProgressionError;
use rmcp::ErrorData;

/// Helper to convert progression errors to MCP errors
pub fn to_mcp_error(message: &str, error: &ProgressionError) -> ErrorData {
    ErrorData::internal_error(format!("{message}: {error}"), None)
}
