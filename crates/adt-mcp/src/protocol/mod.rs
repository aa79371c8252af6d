//! JSON-RPC 2.0 framing plus the handful of MCP message bodies this
//! server speaks (initialize, tools/list, tools/call).

pub mod jsonrpc;
pub mod messages;

pub use jsonrpc::{JsonRpcError, JsonRpcErrorCode, JsonRpcRequest, JsonRpcResponse};
pub use messages::{
    ClientCapabilities, ClientInfo, InitializeParams, InitializeResult, ServerCapabilities, ServerInfo, Tool,
    ToolContent, ToolsCallParams, ToolsCallResult, ToolsListParams, ToolsListResult, ToolsCapability,
};

/// Protocol version this server reports during `initialize`.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
