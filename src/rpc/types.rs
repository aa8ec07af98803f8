//! Types for JSON-RPC communication with an Ethereum-compatible node.
//!
//! Follows the Ethereum JSON-RPC API and geth's `debug_*` tracing namespace.

use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 request structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
    pub id: u64,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request
    ///
    /// # Arguments
    /// * `method` - RPC method name (e.g. `debug_traceBlockByNumber`)
    /// * `params` - Positional parameters as a JSON array
    /// * `id` - Request ID (for response correlation)
    pub fn new(method: impl Into<String>, params: serde_json::Value, id: u64) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC 2.0 response structure
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub jsonrpc: String,
    pub id: u64,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Raw result payload, decoded later by the parser
pub type RawResult = serde_json::Value;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = JsonRpcRequest::new("debug_traceBlockByNumber", json!(["0x10"]), 7);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "jsonrpc": "2.0",
                "method": "debug_traceBlockByNumber",
                "params": ["0x10"],
                "id": 7
            })
        );
    }

    #[test]
    fn test_null_result_is_none() {
        let response: JsonRpcResponse<RawResult> =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": null})).unwrap();
        assert!(response.result.is_none());
        assert!(response.error.is_none());
    }
}
