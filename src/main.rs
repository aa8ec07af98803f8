//! Opcode Gas Scan CLI
//!
//! Scans a block range of an EVM chain and records how much gas each
//! opcode costs, with resumable checkpoints.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::debug;
use std::path::PathBuf;

use opcode_gas_scan::attribution::AttributionMode;
use opcode_gas_scan::commands::{
    display_version, execute_inspect, execute_scan, validate_args, InspectArgs, ScanArgs,
};
use opcode_gas_scan::utils::config::{
    load_env_file, Chain, DEFAULT_BLOCK, DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_ENV_FILE,
    DEFAULT_RESULTS_DIR,
};

/// Opcode Gas Scan - per-opcode gas statistics from EVM traces
#[derive(Parser, Debug)]
#[command(name = "opcode-gas-scan")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a block range and write opcode gas statistics
    Scan {
        /// Chain to scan
        #[arg(long, value_enum, default_value_t = Chain::Base)]
        chain: Chain,

        /// First block of the range (inclusive)
        #[arg(long, default_value_t = DEFAULT_BLOCK)]
        start_block: u64,

        /// Last block of the range (inclusive)
        #[arg(long, default_value_t = DEFAULT_BLOCK)]
        end_block: u64,

        /// Resume from the snapshot taken at this block
        #[arg(long)]
        checkpoint: Option<u64>,

        /// RPC endpoint URL (overrides environment and config file)
        #[arg(short, long)]
        rpc: Option<String>,

        /// TOML config file with an [endpoints] table
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory snapshots are written under
        #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
        results_dir: PathBuf,

        /// Blocks between intermediate snapshots
        #[arg(long, default_value_t = DEFAULT_CHECKPOINT_INTERVAL)]
        checkpoint_interval: u64,

        /// How call-type opcodes are charged
        #[arg(long, value_enum, default_value_t = AttributionMode::SingleSlot)]
        attribution: AttributionMode,

        /// Number of opcodes in the printed summary
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Print a snapshot directory
    Inspect {
        /// Snapshot directory
        #[arg(short, long)]
        dir: PathBuf,

        /// Only print the most expensive opcodes
        #[arg(long)]
        top: Option<usize>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Endpoint variables may come from a dotenv file
    if load_env_file(DEFAULT_ENV_FILE)? {
        debug!("Loaded environment from {}", DEFAULT_ENV_FILE);
    }

    // Execute command
    match cli.command {
        Commands::Scan {
            chain,
            start_block,
            end_block,
            checkpoint,
            rpc,
            config,
            results_dir,
            checkpoint_interval,
            attribution,
            top,
        } => {
            let args = ScanArgs {
                chain,
                start_block,
                end_block,
                checkpoint,
                rpc_url: rpc,
                config_file: config,
                results_dir,
                checkpoint_interval,
                attribution,
                top_opcodes: top,
            };

            // Validate args first
            validate_args(&args)?;

            execute_scan(args)?;
        }

        Commands::Inspect { dir, top } => {
            execute_inspect(&InspectArgs {
                dir,
                top_opcodes: top,
            })?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
