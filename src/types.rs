//! Shared domain types for MCP server configuration files.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Top-level key holding the server mapping in every canonical config file.
pub const MCP_SERVERS_KEY: &str = "mcpServers";

/// Canonical configuration document: the server mapping and nothing else.
///
/// Entries are kept as raw JSON values so that malformed shapes reach the
/// validator (which reports every defect) instead of failing wholesale at
/// deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpConfig {
    #[serde(rename = "mcpServers", default)]
    pub mcp_servers: Map<String, Value>,
}

impl McpConfig {
    /// Extract the canonical document from arbitrary parsed file content.
    /// A missing or non-object `mcpServers` field yields an empty mapping.
    pub fn from_file_value(value: &Value) -> Self {
        let mcp_servers = value
            .get(MCP_SERVERS_KEY)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Self { mcp_servers }
    }
}

/// One managed server process definition, used where entries are known to
/// be well-formed (preset catalog, typed consumers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServer {
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}
