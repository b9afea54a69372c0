//! Request dispatch shared by the stdio and SSE transports.

use std::sync::Arc;

use azure_pricing_lib::RetailPriceClient;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::error::ErrorObject;
use crate::protocol::{
    CallToolParams, InitializeParams, InitializeResult, InitializedParams, ListToolsParams,
    ListToolsResult, PingParams, PingResult, Request, Response, ServerCapabilities, ServerInfo,
    JSONRPC_VERSION, PROTOCOL_VERSION,
};
use crate::tools;

/// MCP server state shared across transports.
///
/// Cheap to clone; the retail client is reference-counted.
#[derive(Debug, Clone)]
pub struct McpServer {
    client: Arc<RetailPriceClient>,
}

impl McpServer {
    pub fn new(client: RetailPriceClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Handle a parsed request.
    ///
    /// Returns `Ok(Some(result))` for requests, `Ok(None)` for notifications,
    /// and `Err` for protocol-level failures.
    #[instrument(skip(self, request), fields(request_id = ?request.id, method = %request.method))]
    pub async fn handle_request(&self, request: Request) -> Result<Option<Value>, ErrorObject> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Err(ErrorObject::invalid_request(format!(
                "Invalid jsonrpc version: {}",
                request.jsonrpc
            )));
        }

        match request.method.as_str() {
            "initialize" => {
                let params: InitializeParams =
                    deserialize_params(request.params, "initialize")?;
                if let Some(client_info) = &params.client_info {
                    info!(
                        client = %client_info.name,
                        client_version = client_info.version.as_deref().unwrap_or("unknown"),
                        "client initializing"
                    );
                }
                ok_some(self.initialize_result())
            }
            "initialized" | "notifications/initialized" => {
                let _params: InitializedParams =
                    deserialize_params(request.params, "initialized")?;
                info!("client reported initialized");
                Ok(None)
            }
            "ping" => {
                let _params: PingParams = deserialize_params(request.params, "ping")?;
                ok_some(PingResult::default())
            }
            "tools/list" => {
                let _params: ListToolsParams = deserialize_params(request.params, "tools/list")?;
                ok_some(ListToolsResult {
                    tools: tools::tool_definitions(),
                })
            }
            "tools/call" => {
                let params: CallToolParams = deserialize_params(request.params, "tools/call")?;
                let result = tools::handle_call(params, &self.client).await?;
                ok_some(result)
            }
            other => Err(ErrorObject::method_not_found(other)),
        }
    }

    /// Process one raw JSON-RPC message and produce the serialized response,
    /// if one is due.
    ///
    /// Notifications never produce a response, including when they fail;
    /// failures are logged instead.
    pub async fn process_message(&self, raw: &str) -> Option<String> {
        let request = match serde_json::from_str::<Request>(raw) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "failed to parse request");
                let response = Response::error(
                    ErrorObject::parse_error(format!("Failed to parse request: {}", e)),
                    None,
                );
                return serialize_response(response);
            }
        };

        let request_id = request.id.clone();
        let is_notification = request_id.is_none();

        match self.handle_request(request).await {
            Ok(Some(result)) => serialize_response(Response::success(result, request_id)),
            Ok(None) => None,
            Err(error) => {
                if is_notification {
                    warn!(code = error.code, message = %error.message, "notification failed");
                    None
                } else {
                    serialize_response(Response::error(error, request_id))
                }
            }
        }
    }

    fn initialize_result(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info: ServerInfo {
                name: "azure-pricing".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ServerCapabilities::default(),
        }
    }
}

fn serialize_response(response: Response) -> Option<String> {
    match serde_json::to_string(&response) {
        Ok(raw) => Some(raw),
        Err(e) => {
            warn!(error = %e, "failed to serialize response");
            let fallback = Response::error(
                ErrorObject::internal("Failed to serialize response"),
                response.id,
            );
            serde_json::to_string(&fallback).ok()
        }
    }
}

pub(crate) fn deserialize_params<T: serde::de::DeserializeOwned + Default>(
    params: Option<Value>,
    method: &str,
) -> Result<T, ErrorObject> {
    match params {
        None => Ok(T::default()),
        Some(value) => serde_json::from_value(value).map_err(|e| {
            ErrorObject::invalid_params(format!("Invalid params for {}: {}", method, e))
        }),
    }
}

fn ok_some<T: serde::Serialize>(value: T) -> Result<Option<Value>, ErrorObject> {
    serde_json::to_value(value)
        .map_err(|e| ErrorObject::internal(format!("Failed to serialize result: {}", e)))
        .map(Some)
}
