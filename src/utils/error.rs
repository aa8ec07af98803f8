//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use crate::parser::schema::LogEntry;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during RPC communication
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not supported by this RPC endpoint: {0}")]
    MethodNotSupported(String),
}

/// Errors that can occur while decoding trace payloads
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed trace ({context}): {source}")]
    MalformedTrace {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid trace format: {0}")]
    InvalidFormat(String),
}

/// Errors surfaced by a [`TraceSource`](crate::rpc::TraceSource)
#[derive(Error, Debug)]
pub enum TraceSourceError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors raised while attributing gas to opcodes
#[derive(Error, Debug)]
pub enum AttributionError {
    /// A reconciled call cost came out negative.
    #[error(
        "Negative gas cost {cost} attributed to {operation}: preceding entry {preceding:?}, current entry {current:?}"
    )]
    InvariantViolation {
        operation: String,
        cost: i128,
        preceding: Box<LogEntry>,
        current: Box<LogEntry>,
    },
}

/// Errors that can occur while reading or writing snapshots
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Snapshot file {} is corrupt: {source}", .file.display())]
    Corrupt {
        file: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Snapshot is inconsistent: {0}")]
    Inconsistent(String),

    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize snapshot: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid snapshot path: {0}")]
    InvalidPath(String),
}

/// Errors in scan configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No RPC endpoint configured for chain '{chain}' (set {env_var}, pass --rpc, or add it to the config file)")]
    MissingEndpoint { chain: String, env_var: String },

    #[error("Invalid block range: start {start} is after end {end}")]
    InvalidRange { start: u64, end: u64 },

    #[error("Checkpoint {checkpoint} is outside the scan range ({start}, {end}]")]
    InvalidCheckpoint { checkpoint: u64, start: u64, end: u64 },

    #[error("Checkpoint interval must be greater than 0")]
    InvalidInterval,

    #[error("Failed to read config file {}: {source}", .path.display())]
    ConfigFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file parse error: {0}")]
    ConfigFileParse(#[from] toml::de::Error),

    #[error("Failed to load environment file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

/// Top-level error of a scan
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Bulk trace of block {block} failed: {source}")]
    BulkFetch {
        block: u64,
        #[source]
        source: TraceSourceError,
    },

    #[error("Fallback trace of block {block} failed: {source}")]
    FallbackFailed {
        block: u64,
        #[source]
        source: TraceSourceError,
    },

    #[error("Node is unreachable: {0}")]
    NodeUnreachable(#[source] TraceSourceError),

    #[error("Attribution failed in block {block}: {source}")]
    Attribution {
        block: u64,
        #[source]
        source: AttributionError,
    },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ScanError {
    /// Whether a caller may retry the operation that produced this error.
    ///
    /// Only bulk trace fetches are transient; everything else leaves the
    /// scan without a consistent state to continue from.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::BulkFetch { .. })
    }
}
