//! Strict schema for struct-log execution traces.
//!
//! These mirror the payloads returned by `debug_traceBlockByNumber`,
//! `debug_traceTransaction` and `eth_getBlockByNumber` with the default
//! struct logger. Decoding is fallible; see [`super::trace`].

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One executed instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Program counter
    pub pc: u64,

    /// Opcode name (e.g. "SSTORE")
    pub op: String,

    /// Gas remaining before this instruction executes
    #[serde(deserialize_with = "deserialize_gas")]
    pub gas: u64,

    /// Declared gas cost. For call-type opcodes this is the allocation.
    #[serde(deserialize_with = "deserialize_gas")]
    pub gas_cost: u64,

    /// Call depth (1 for the top-level frame)
    pub depth: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<BTreeMap<String, String>>,
}

impl LogEntry {
    /// Minimal entry, mostly useful for building synthetic traces
    pub fn new(op: impl Into<String>, gas: u64, gas_cost: u64, depth: u32) -> Self {
        Self {
            pc: 0,
            op: op.into(),
            gas,
            gas_cost,
            depth,
            error: None,
            stack: None,
            memory: None,
            storage: None,
        }
    }
}

/// Struct-log trace of one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionTrace {
    /// Gas used by the transaction
    #[serde(default, deserialize_with = "deserialize_gas")]
    pub gas: u64,

    #[serde(default)]
    pub failed: bool,

    #[serde(default)]
    pub return_value: String,

    #[serde(default)]
    pub struct_logs: Vec<LogEntry>,
}

impl TransactionTrace {
    /// Trace made of the given entries
    pub fn from_logs(struct_logs: Vec<LogEntry>) -> Self {
        Self {
            gas: 0,
            failed: false,
            return_value: String::new(),
            struct_logs,
        }
    }
}

/// One element of a `debug_traceBlockByNumber` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTraceItem {
    #[serde(default)]
    pub tx_hash: Option<String>,

    #[serde(default)]
    pub result: Option<TransactionTrace>,

    /// Set by some nodes when a single transaction could not be traced
    #[serde(default)]
    pub error: Option<String>,
}

/// The parts of an `eth_getBlockByNumber(_, false)` response we use
#[derive(Debug, Clone, Deserialize)]
pub struct BlockTransactions {
    #[serde(default)]
    pub number: Option<String>,

    /// Transaction hashes, in block order
    pub transactions: Vec<String>,
}

/// Gas values are numbers from geth, but some nodes send hex or decimal strings
#[derive(Deserialize)]
#[serde(untagged)]
enum GasValue {
    Number(u64),
    Text(String),
}

fn deserialize_gas<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match GasValue::deserialize(deserializer)? {
        GasValue::Number(n) => Ok(n),
        GasValue::Text(s) => super::trace::parse_gas_value(&s).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_log_entry_wire_names() {
        let entry: LogEntry = serde_json::from_value(json!({
            "pc": 12,
            "op": "SLOAD",
            "gas": 90000,
            "gasCost": 2100,
            "depth": 1,
            "stack": ["0x0"]
        }))
        .unwrap();

        assert_eq!(entry.pc, 12);
        assert_eq!(entry.op, "SLOAD");
        assert_eq!(entry.gas, 90000);
        assert_eq!(entry.gas_cost, 2100);
        assert_eq!(entry.depth, 1);
        assert!(entry.error.is_none());
        assert_eq!(entry.stack.as_deref(), Some(&["0x0".to_string()][..]));
    }

    #[test]
    fn test_gas_as_string() {
        let entry: LogEntry = serde_json::from_value(json!({
            "pc": 0,
            "op": "PUSH1",
            "gas": "0x3e8",
            "gasCost": "3",
            "depth": 1
        }))
        .unwrap();

        assert_eq!(entry.gas, 1000);
        assert_eq!(entry.gas_cost, 3);
    }

    #[test]
    fn test_missing_op_is_rejected() {
        let result = serde_json::from_value::<LogEntry>(json!({
            "pc": 0,
            "gas": 10,
            "gasCost": 3,
            "depth": 1
        }));
        assert!(result.is_err());
    }
}
