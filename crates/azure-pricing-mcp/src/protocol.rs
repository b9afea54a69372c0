//! JSON-RPC 2.0 message types and the MCP method surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorObject;

/// JSON-RPC version string expected on every message.
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision implemented by this server.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Incoming JSON-RPC request or notification.
///
/// Notifications carry no `id` and never produce a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    pub method: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Outgoing JSON-RPC response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,

    pub id: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl Response {
    pub fn success(result: Value, id: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(error: ErrorObject, id: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Parameters of the `initialize` request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: Option<String>,

    #[serde(default)]
    pub capabilities: Option<Value>,

    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,
}

/// Result of the `initialize` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub server_info: ServerInfo,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Capabilities advertised to clients. This server exposes tools only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolsCapability {}

/// Parameters of the `notifications/initialized` notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitializedParams {}

/// Parameters of the `ping` request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PingParams {}

/// Empty result returned for `ping`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PingResult {}

/// Parameters of the `tools/list` request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListToolsParams {}

/// Result of the `tools/list` request.
#[derive(Debug, Clone, Serialize)]
pub struct ListToolsResult {
    pub tools: Vec<ToolDefinition>,
}

/// A tool advertised through `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,

    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Parameters of the `tools/call` request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallToolParams {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Result of a `tools/call` request.
///
/// Domain failures are reported inline with `is_error: true`; protocol
/// failures become JSON-RPC error responses instead.
#[derive(Debug, Clone, Serialize)]
pub struct CallToolResult {
    pub content: Vec<ContentBlock>,

    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    pub fn success(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            is_error: Some(false),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(message)],
            is_error: Some(true),
        }
    }
}

/// A single content block inside a tool result.
#[derive(Debug, Clone, Serialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: String,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            block_type: "text".to_string(),
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_deserialization() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"method":"tools/list","params":{}}"#;
        let request: Request = serde_json::from_str(raw).unwrap();
        assert_eq!(request.jsonrpc, "2.0");
        assert_eq!(request.method, "tools/list");
        assert_eq!(request.id, Some(json!(1)));
    }

    #[test]
    fn test_notification_has_no_id() {
        let raw = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        let request: Request = serde_json::from_str(raw).unwrap();
        assert!(request.id.is_none());
        assert!(request.params.is_none());
    }

    #[test]
    fn test_success_response_omits_error() {
        let response = Response::success(json!({"ok": true}), Some(json!("init-1")));
        let raw = serde_json::to_string(&response).unwrap();
        assert!(raw.contains("\"result\""));
        assert!(!raw.contains("\"error\""));
        assert!(raw.contains("init-1"));
    }

    #[test]
    fn test_error_response_omits_result() {
        let response = Response::error(ErrorObject::method_not_found("nope"), Some(json!(7)));
        let raw = serde_json::to_string(&response).unwrap();
        assert!(raw.contains("-32601"));
        assert!(!raw.contains("\"result\""));
    }

    #[test]
    fn test_initialize_result_shape() {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info: ServerInfo {
                name: "azure-pricing".to_string(),
                version: "0.1.0".to_string(),
            },
            capabilities: ServerCapabilities::default(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(value["serverInfo"]["name"], "azure-pricing");
        assert!(value["capabilities"]["tools"].is_object());
    }

    #[test]
    fn test_call_tool_result_failure_marks_error() {
        let result = CallToolResult::failure("upstream unavailable");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["isError"], true);
        assert_eq!(value["content"][0]["type"], "text");
    }

    #[test]
    fn test_initialize_params_accept_probe_payload() {
        // Shape sent by SSE probe clients.
        let raw = r#"{
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "sse-list-tools", "version": "0.1.0"}
        }"#;
        let params: InitializeParams = serde_json::from_str(raw).unwrap();
        assert_eq!(params.protocol_version.as_deref(), Some("2024-11-05"));
        assert_eq!(params.client_info.unwrap().name, "sse-list-tools");
    }
}
