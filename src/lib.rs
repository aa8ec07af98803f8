//! Opcode Gas Scan
//!
//! Per-opcode gas statistics for EVM chains, reconstructed from
//! `debug_traceBlockByNumber` struct-log traces.
//!
//! This crate provides the core implementation for the
//! `opcode-gas-scan` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! export BASE_RPC_URL=https://...
//! opcode-gas-scan scan --chain base --start-block 11443817 --end-block 11444817
//! opcode-gas-scan inspect --dir results/base/11443817_11444817
//! ```
//!
//! Long scans write a snapshot every 100 blocks; pass `--checkpoint <block>`
//! to continue from one.

pub mod aggregator;
pub mod attribution;
pub mod checkpoint;
pub mod commands;
pub mod parser;
pub mod rpc;
pub mod scan;
pub mod utils;
