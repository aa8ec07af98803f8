use crate::attribution::AttributionMode;
use crate::utils::config::{
    Chain, DEFAULT_BLOCK, DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_RESULTS_DIR,
};
use std::path::PathBuf;

/// Arguments for the scan command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ScanArgs {
    pub chain: Chain,
    pub start_block: u64,
    pub end_block: u64,

    /// Resume from the snapshot taken at this block
    pub checkpoint: Option<u64>,

    /// Explicit RPC endpoint; overrides environment and config file
    pub rpc_url: Option<String>,

    /// TOML file with an `[endpoints]` table
    pub config_file: Option<PathBuf>,

    /// Root directory snapshots are written under
    pub results_dir: PathBuf,

    pub checkpoint_interval: u64,
    pub attribution: AttributionMode,

    /// Number of opcodes in the printed summary
    pub top_opcodes: usize,
}

impl Default for ScanArgs {
    fn default() -> Self {
        Self {
            chain: Chain::Base,
            start_block: DEFAULT_BLOCK,
            end_block: DEFAULT_BLOCK,
            checkpoint: None,
            rpc_url: None,
            config_file: None,
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            attribution: AttributionMode::default(),
            top_opcodes: 20,
        }
    }
}

/// Arguments for the inspect command
#[derive(Debug, Clone)]
pub struct InspectArgs {
    /// Snapshot directory holding the five JSON maps
    pub dir: PathBuf,

    /// Rows to print; `None` prints every opcode
    pub top_opcodes: Option<usize>,
}
