//! Aggregation of attributed gas into per-opcode statistics.
//!
//! This module folds contributions into:
//! - Running count/total/min/max per opcode
//! - Derived averages
//! - Rankings and scan-wide totals for reporting

pub mod metrics;
pub mod stats;

// Re-export main types and functions
pub use metrics::{render_table, top_opcodes, GasDistribution, OpcodeSummary};
pub use stats::{OpcodeStat, OpcodeStats};
