//! HTTP client for communicating with a tracing-enabled node RPC endpoint.

use super::source::TraceSource;
use super::types::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RawResult};
use crate::parser::{
    block_number_hex, parse_block_trace, parse_block_transactions, parse_gas_value,
    parse_transaction_trace, TransactionTrace,
};
use crate::utils::config::{BULK_TRACE_TX_CAP, DEFAULT_RPC_TIMEOUT};
use crate::utils::error::{ParseError, RpcError, TraceSourceError};
use log::{debug, info};
use reqwest::blocking::Client;
use std::sync::atomic::{AtomicU64, Ordering};

/// RPC client for fetching struct-log traces from a node
pub struct RpcClient {
    client: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Create a new RPC client
    pub fn new(rpc_url: impl Into<String>) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(DEFAULT_RPC_TIMEOUT)
            .build()
            .map_err(RpcError::RequestFailed)?;

        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint this client talks to
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Perform one JSON-RPC call and return its (possibly null) result
    ///
    /// **Public** - generic entry point, the typed fetches build on it
    ///
    /// # Errors
    /// * `RpcError::RequestFailed` - transport failure or undecodable body
    /// * `RpcError::InvalidResponse` - non-2xx status or JSON-RPC error
    /// * `RpcError::NotFound` / `RpcError::MethodNotSupported` - mapped node errors
    pub fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Option<RawResult>, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(method, params, id);

        debug!("RPC request: {:?}", request);

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .map_err(RpcError::RequestFailed)?;

        // Check HTTP status
        if !response.status().is_success() {
            return Err(RpcError::InvalidResponse(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().unwrap_or_default()
            )));
        }

        let rpc_response: JsonRpcResponse<RawResult> =
            response.json().map_err(RpcError::RequestFailed)?;

        if let Some(error) = rpc_response.error {
            return Err(map_rpc_error(error, method));
        }

        Ok(rpc_response.result)
    }

    /// Like [`call`](Self::call), but a null result is an error
    fn call_required(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<RawResult, RpcError> {
        self.call(method, params)?
            .ok_or_else(|| RpcError::InvalidResponse(format!("{}: missing result field", method)))
    }
}

impl TraceSource for RpcClient {
    fn trace_block(&self, block: u64) -> Result<Vec<TransactionTrace>, TraceSourceError> {
        info!("Tracing block {}", block);
        let raw = self.call_required(
            "debug_traceBlockByNumber",
            serde_json::json!([block_number_hex(block)]),
        )?;
        Ok(parse_block_trace(block, raw, BULK_TRACE_TX_CAP)?)
    }

    fn block_transactions(&self, block: u64) -> Result<Vec<String>, TraceSourceError> {
        let raw = self
            .call(
                "eth_getBlockByNumber",
                serde_json::json!([block_number_hex(block), false]),
            )?
            .ok_or_else(|| RpcError::NotFound(format!("block {}", block)))?;
        Ok(parse_block_transactions(block, raw)?)
    }

    fn trace_transaction(&self, tx_hash: &str) -> Result<TransactionTrace, TraceSourceError> {
        let tx_hash = normalize_tx_hash(tx_hash);
        debug!("Tracing transaction {}", tx_hash);
        let raw = self
            .call("debug_traceTransaction", serde_json::json!([tx_hash]))?
            .ok_or_else(|| RpcError::NotFound(format!("transaction {}", tx_hash)))?;
        Ok(parse_transaction_trace(&tx_hash, raw)?)
    }

    fn latest_block(&self) -> Result<u64, TraceSourceError> {
        let raw = self.call_required("eth_blockNumber", serde_json::json!([]))?;
        let hex = raw.as_str().ok_or_else(|| {
            ParseError::InvalidFormat(format!("eth_blockNumber returned {}", raw))
        })?;
        Ok(parse_gas_value(hex)?)
    }
}

/// Normalize transaction hash to include 0x prefix
pub fn normalize_tx_hash(tx_hash: &str) -> String {
    if tx_hash.starts_with("0x") {
        tx_hash.to_string()
    } else {
        format!("0x{}", tx_hash)
    }
}

/// Map JSON-RPC error to our error type
fn map_rpc_error(error: JsonRpcError, method: &str) -> RpcError {
    match error.code {
        -32000 => {
            if error.message.to_lowercase().contains("not found") {
                RpcError::NotFound(format!("{}: {}", method, error.message))
            } else {
                RpcError::InvalidResponse(error.message)
            }
        }
        -32601 => RpcError::MethodNotSupported(method.to_string()),
        _ => RpcError::InvalidResponse(format!("{}: {}", error.code, error.message)),
    }
}
