//! The closed error taxonomy surfaced to MCP clients.

use adt_core::CoreError;
use thiserror::Error;

use crate::protocol::JsonRpcError;

pub type McpResult<T> = Result<T, McpError>;

#[derive(Error, Debug)]
pub enum McpError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("ADT exception ({subtype}): {message}")]
    AdtException { message: String, subtype: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found")]
    NotFound,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("partial failure: activation reported {error_count} error(s)")]
    PartialFailure { error_count: usize, messages: String },
}

impl McpError {
    /// Maps the closed taxonomy onto a JSON-RPC error payload: a small
    /// machine-readable code plus a human message, per the server-error
    /// range (-32000..-32099) reserved for application errors.
    pub fn to_json_rpc_error(&self) -> JsonRpcError {
        let (code, kind) = match self {
            McpError::Configuration(_) => (-32000, "configuration_error"),
            McpError::Transport(_) => (-32001, "transport_error"),
            McpError::Authentication(_) => (-32002, "authentication_error"),
            McpError::Protocol(_) => (-32003, "protocol_error"),
            McpError::AdtException { .. } => (-32004, "adt_exception"),
            McpError::Conflict(_) => (-32005, "conflict"),
            McpError::NotFound => (-32006, "not_found"),
            McpError::Validation(_) => (-32007, "validation_error"),
            McpError::ToolNotFound(_) => (-32601, "method_not_found"),
            McpError::PartialFailure { .. } => (-32008, "partial_failure"),
        };
        JsonRpcError::server_error(code, self.to_string(), Some(serde_json::json!({ "kind": kind })))
    }
}

impl From<CoreError> for McpError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport(e) => McpError::Transport(e.to_string()),
            CoreError::Xml(e) => McpError::Protocol(e.to_string()),
            CoreError::NotFound => McpError::NotFound,
            CoreError::Conflict(msg) => McpError::Conflict(msg),
            CoreError::Validation(msg) => McpError::Validation(msg),
            CoreError::AdtException { message, subtype } => McpError::AdtException { message, subtype },
            CoreError::PartialFailure(outcome) => {
                let messages = outcome
                    .messages
                    .iter()
                    .map(|m| format!("[{:?}] {}", m.severity, m.text))
                    .collect::<Vec<_>>()
                    .join("; ");
                McpError::PartialFailure { error_count: outcome.error_count(), messages }
            }
        }
    }
}
