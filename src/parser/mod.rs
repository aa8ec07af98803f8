//! Trace parsing and schema definitions.
//!
//! This module handles:
//! - Strict schema for struct-log entries and transaction traces
//! - Fallible decoding of raw JSON-RPC results

pub mod schema;
pub mod trace;

// Re-export main types
pub use schema::{LogEntry, TransactionTrace};
pub use trace::{
    block_number_hex, parse_block_trace, parse_block_transactions, parse_gas_value,
    parse_transaction_trace,
};
