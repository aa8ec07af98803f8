//! The trace source seam between the scan driver and the node.

use crate::parser::TransactionTrace;
use crate::utils::error::TraceSourceError;

/// Supplies struct-log traces for blocks and transactions.
///
/// Implemented by [`RpcClient`](super::RpcClient); tests substitute an
/// in-memory source. Any call may fail transiently.
pub trait TraceSource {
    /// Traces of every transaction in `block`, in block order
    /// (`debug_traceBlockByNumber`)
    fn trace_block(&self, block: u64) -> Result<Vec<TransactionTrace>, TraceSourceError>;

    /// Hashes of the transactions in `block`, in block order
    fn block_transactions(&self, block: u64) -> Result<Vec<String>, TraceSourceError>;

    /// Trace of a single transaction (`debug_traceTransaction`)
    fn trace_transaction(&self, tx_hash: &str) -> Result<TransactionTrace, TraceSourceError>;

    /// Head block number; used to check the node is reachable before scanning
    fn latest_block(&self) -> Result<u64, TraceSourceError>;
}
