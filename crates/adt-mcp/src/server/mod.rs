//! Stdio MCP server shell: reads line-delimited JSON-RPC requests, routes
//! `initialize`/`ping`/`tools/list`/`tools/call`, writes one response line
//! per request with an explicit flush.

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::{McpError, McpResult};
use crate::protocol::{
    InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ServerCapabilities, ServerInfo, Tool,
    ToolsCallParams, ToolsCallResult, ToolsListResult, MCP_PROTOCOL_VERSION,
};
use crate::tools::{catalogue, ToolDispatcher, ToolMode};

const SERVER_NAME: &str = "adt-mcp";

pub struct McpServer {
    tools: Vec<Tool>,
    dispatcher: ToolDispatcher,
}

impl McpServer {
    pub fn new(mode: ToolMode, dispatcher: ToolDispatcher) -> Self {
        Self { tools: catalogue(mode), dispatcher }
    }

    /// Handles one parsed line. Returns `None` for notifications, which
    /// get no response per JSON-RPC 2.0.
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    JsonRpcError::parse_error(Some(Value::String(e.to_string()))),
                    None,
                ))
            }
        };

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        let id = request.id.clone();
        Some(match self.dispatch(&request).await {
            Ok(result) => JsonRpcResponse::success(result, id),
            Err(err) => JsonRpcResponse::error(err.to_json_rpc_error(), id),
        })
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "initialized" => tracing::debug!("client completed the initialization handshake"),
            other => tracing::debug!(method = other, "ignoring unrecognized notification"),
        }
    }

    async fn dispatch(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        match request.method.as_str() {
            "initialize" => self.initialize(request.params.clone()),
            "ping" => Ok(Value::Object(serde_json::Map::new())),
            "tools/list" => {
                let result = ToolsListResult { tools: self.tools.clone() };
                Ok(serde_json::to_value(result).expect("tool descriptors always serialize"))
            }
            "tools/call" => self.tools_call(request.params.clone()).await,
            other => Err(McpError::ToolNotFound(other.to_string())),
        }
    }

    fn initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let params = params.ok_or_else(|| McpError::Validation("initialize requires params".to_string()))?;
        let _: InitializeParams = serde_json::from_value(params).map_err(|e| McpError::Protocol(e.to_string()))?;

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo { name: SERVER_NAME.to_string(), version: env!("CARGO_PKG_VERSION").to_string() },
        };
        Ok(serde_json::to_value(result).expect("initialize result always serializes"))
    }

    async fn tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let params = params.ok_or_else(|| McpError::Validation("tools/call requires params".to_string()))?;
        let params: ToolsCallParams = serde_json::from_value(params).map_err(|e| McpError::Protocol(e.to_string()))?;

        if !self.tools.iter().any(|t| t.name == params.name) {
            return Err(McpError::ToolNotFound(params.name));
        }

        let arguments = params.arguments.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        let result = match self.dispatcher.call(&params.name, arguments).await {
            Ok(value) => ToolsCallResult::text(value.to_string()),
            Err(err) => ToolsCallResult::error(err.to_string()),
        };
        Ok(serde_json::to_value(result).expect("tool call result always serializes"))
    }

    /// Reads line-delimited JSON-RPC requests from stdin until EOF,
    /// writing one response line per request.
    pub async fn run_stdio(&self) -> McpResult<()> {
        tracing::info!("adt-mcp server ready on stdio");

        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    tracing::info!("stdin closed, shutting down");
                    break;
                }
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if let Some(response) = self.handle_message(trimmed).await {
                        let payload = serde_json::to_string(&response).map_err(|e| McpError::Protocol(e.to_string()))?;
                        stdout.write_all(payload.as_bytes()).await.map_err(|e| McpError::Transport(e.to_string()))?;
                        stdout.write_all(b"\n").await.map_err(|e| McpError::Transport(e.to_string()))?;
                        stdout.flush().await.map_err(|e| McpError::Transport(e.to_string()))?;
                    }
                }
                Err(e) => return Err(McpError::Transport(e.to_string())),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use adt_core::{AtomicOps, WorkflowComposer};
    use adt_transport::{AdtResponse, HttpMethod, Transport, TransportError};
    use async_trait::async_trait;
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::tools::ToolDispatcher;

    /// Records call count, fails every request with 404. Enough to drive
    /// the server/dispatch plumbing without a real backend.
    #[derive(Default)]
    struct CountingTransport {
        calls: AtomicUsize,
    }

    impl CountingTransport {
        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn request(
            &self,
            _method: HttpMethod,
            path: &str,
            _query: &[(&str, &str)],
            _body: Option<Vec<u8>>,
            _content_type: Option<&str>,
            _accept: Option<&str>,
        ) -> Result<AdtResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(TransportError::Status { status: 404, body: format!("no mock for {path}") })
        }

        fn base_url(&self) -> &Url {
            static URL: std::sync::OnceLock<Url> = std::sync::OnceLock::new();
            URL.get_or_init(|| Url::parse("https://mock.example.com").unwrap())
        }
    }

    fn test_server() -> McpServer {
        let mock = Arc::new(CountingTransport::default());
        let ops = Arc::new(AtomicOps::new(mock));
        let workflow = Arc::new(WorkflowComposer::new(ops.clone()));
        McpServer::new(ToolMode::Focused, ToolDispatcher::new(ops, workflow, None))
    }

    #[tokio::test]
    async fn initialize_round_trips_over_json_rpc() {
        let server = test_server();
        let request = json!({
            "jsonrpc": "2.0",
            "method": "initialize",
            "params": { "protocolVersion": MCP_PROTOCOL_VERSION, "capabilities": {} },
            "id": 1
        });
        let response = server.handle_message(&request.to_string()).await.unwrap();
        assert!(response.error.is_none());
        assert_eq!(response.result.unwrap()["serverInfo"]["name"], SERVER_NAME);
    }

    #[tokio::test]
    async fn notifications_produce_no_response() {
        let server = test_server();
        let request = json!({ "jsonrpc": "2.0", "method": "initialized" });
        assert!(server.handle_message(&request.to_string()).await.is_none());
    }

    #[tokio::test]
    async fn unknown_method_maps_to_method_not_found() {
        let server = test_server();
        let request = json!({ "jsonrpc": "2.0", "method": "bogus/thing", "id": 1 });
        let response = server.handle_message(&request.to_string()).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn tools_list_returns_the_focused_catalogue() {
        let server = test_server();
        let request = json!({ "jsonrpc": "2.0", "method": "tools/list", "id": 2 });
        let response = server.handle_message(&request.to_string()).await.unwrap();
        let tools = response.result.unwrap()["tools"].as_array().unwrap().len();
        assert_eq!(tools, catalogue(ToolMode::Focused).len());
    }

    #[tokio::test]
    async fn tools_call_on_unregistered_name_is_an_error() {
        let server = test_server();
        let request = json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": { "name": "NotARealTool", "arguments": {} },
            "id": 3
        });
        let response = server.handle_message(&request.to_string()).await.unwrap();
        assert!(response.error.is_some());
    }

    #[tokio::test]
    async fn write_source_without_mode_is_a_validation_error_before_any_http_call() {
        let mock = Arc::new(CountingTransport::default());
        let ops = Arc::new(AtomicOps::new(mock.clone()));
        let workflow = Arc::new(WorkflowComposer::new(ops.clone()));
        let server = McpServer::new(ToolMode::Focused, ToolDispatcher::new(ops, workflow, None));

        let request = json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": { "name": "WriteSource", "arguments": { "kind": "program", "name": "ZMCP_00001", "source": "REPORT zfoo." } },
            "id": 4
        });
        let response = server.handle_message(&request.to_string()).await.unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(mock.call_count(), 0);
    }
}
