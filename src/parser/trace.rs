//! Decoding of raw JSON-RPC trace results.
//!
//! Every shape error is reported as [`ParseError`] instead of being skipped,
//! so a bad payload can never silently drop entries from the statistics.

use super::schema::{BlockTraceItem, BlockTransactions, TransactionTrace};
use crate::utils::error::ParseError;
use log::debug;

/// Decode the first `limit` items of a `debug_traceBlockByNumber` result
///
/// **Public** - used by the RPC trace source
///
/// Items past `limit` are dropped undecoded, so a failed trace there cannot
/// fail the block.
///
/// # Errors
/// * `ParseError::MalformedTrace` - result is not an array, or a kept item has the wrong shape
/// * `ParseError::InvalidFormat` - a kept item carries an error or no result
pub fn parse_block_trace(
    block: u64,
    raw: serde_json::Value,
    limit: usize,
) -> Result<Vec<TransactionTrace>, ParseError> {
    let mut items: Vec<serde_json::Value> =
        serde_json::from_value(raw).map_err(|source| ParseError::MalformedTrace {
            context: format!("block {} trace", block),
            source,
        })?;

    debug!("Block {} trace holds {} transactions", block, items.len());
    if items.len() > limit {
        debug!("Block {}: keeping the first {} transaction traces", block, limit);
        items.truncate(limit);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, raw_item)| {
            let item: BlockTraceItem =
                serde_json::from_value(raw_item).map_err(|source| ParseError::MalformedTrace {
                    context: format!("block {} transaction {}", block, index),
                    source,
                })?;

            match (item.result, item.error) {
                (Some(trace), _) => Ok(trace),
                (None, Some(error)) => Err(ParseError::InvalidFormat(format!(
                    "block {} transaction {} ({}) failed to trace: {}",
                    block,
                    index,
                    item.tx_hash.as_deref().unwrap_or("unknown hash"),
                    error
                ))),
                (None, None) => Err(ParseError::InvalidFormat(format!(
                    "block {} transaction {} has no trace result",
                    block, index
                ))),
            }
        })
        .collect()
}

/// Decode a `debug_traceTransaction` result
pub fn parse_transaction_trace(
    tx_hash: &str,
    raw: serde_json::Value,
) -> Result<TransactionTrace, ParseError> {
    serde_json::from_value(raw).map_err(|source| ParseError::MalformedTrace {
        context: format!("transaction {} trace", tx_hash),
        source,
    })
}

/// Decode the transaction hashes of an `eth_getBlockByNumber(_, false)` result
pub fn parse_block_transactions(
    block: u64,
    raw: serde_json::Value,
) -> Result<Vec<String>, ParseError> {
    let parsed: BlockTransactions =
        serde_json::from_value(raw).map_err(|source| ParseError::MalformedTrace {
            context: format!("block {} transaction list", block),
            source,
        })?;
    Ok(parsed.transactions)
}

/// Parse a gas value from hex or decimal string
pub fn parse_gas_value(value: &str) -> Result<u64, ParseError> {
    // Handle hex values (0x prefix)
    if let Some(hex_str) = value.strip_prefix("0x") {
        u64::from_str_radix(hex_str, 16)
            .map_err(|e| ParseError::InvalidFormat(format!("Invalid hex gas value: {}", e)))
    } else {
        value
            .parse::<u64>()
            .map_err(|e| ParseError::InvalidFormat(format!("Invalid decimal gas value: {}", e)))
    }
}

/// Hex-encode a block number the way JSON-RPC expects ("0x" + lowercase hex)
pub fn block_number_hex(block: u64) -> String {
    format!("0x{:x}", block)
}
