//! MCP tool surface and stdio server shell for the ADT client.
//!
//! Wires `adt-core`'s atomic operations and workflow composer to a
//! line-delimited JSON-RPC 2.0 stdio loop, registering either the curated
//! focused tool set or the full expert set depending on the `mode` flag.

pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::{McpError, McpResult};
pub use protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ServerCapabilities, ServerInfo, Tool, MCP_PROTOCOL_VERSION,
};
pub use server::McpServer;
pub use tools::{ToolDispatcher, ToolMode};
