//! JSON-RPC 2.0 envelope types carried over line-delimited stdio.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(result: Value, id: Option<Value>) -> Self {
        Self { jsonrpc: JSONRPC_VERSION.to_string(), result: Some(result), error: None, id }
    }

    pub fn error(error: JsonRpcError, id: Option<Value>) -> Self {
        Self { jsonrpc: JSONRPC_VERSION.to_string(), result: None, error: Some(error), id }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self { code, message: message.into(), data }
    }

    pub fn parse_error(data: Option<Value>) -> Self {
        Self::new(JsonRpcErrorCode::ParseError as i32, "Parse error", data)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::MethodNotFound as i32,
            "Method not found",
            Some(Value::String(format!("method '{method}' not found"))),
        )
    }

    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidParams as i32, "Invalid params", Some(Value::String(details.into())))
    }

    pub fn internal_error(details: impl Into<String>) -> Self {
        Self::new(JsonRpcErrorCode::InternalError as i32, "Internal error", Some(Value::String(details.into())))
    }

    pub fn server_error(code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self::new(code, message, data)
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum JsonRpcErrorCode {
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notification_has_no_id() {
        let req = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: "initialized".to_string(),
            params: None,
            id: None,
        };
        assert!(req.is_notification());
    }

    #[test]
    fn response_success_round_trips() {
        let response = JsonRpcResponse::success(json!({"ok": true}), Some(json!(1)));
        let text = serde_json::to_string(&response).unwrap();
        let back: JsonRpcResponse = serde_json::from_str(&text).unwrap();
        assert_eq!(back, response);
        assert!(back.error.is_none());
    }

    #[test]
    fn method_not_found_carries_the_method_name_in_data() {
        let err = JsonRpcError::method_not_found("Bogus");
        assert_eq!(err.code, JsonRpcErrorCode::MethodNotFound as i32);
        assert_eq!(err.data, Some(json!("method 'Bogus' not found")));
    }
}
