//! RPC client and trace source for tracing-enabled Ethereum nodes.

pub mod client;
pub mod source;
pub mod types;

// Re-export main types
pub use client::RpcClient;
pub use source::TraceSource;
