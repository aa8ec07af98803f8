//! Scan command implementation.
//!
//! The scan command:
//! 1. Resolves the RPC endpoint for the chain
//! 2. Checks the node is reachable
//! 3. Runs the scan driver over the block range
//! 4. Prints a summary of the final statistics

use super::models::ScanArgs;
use crate::aggregator::{render_table, top_opcodes, GasDistribution};
use crate::checkpoint::JsonDirectorySink;
use crate::rpc::RpcClient;
use crate::scan::{ScanConfig, ScanDriver, ScanReport};
use crate::utils::config::{resolve_endpoint, EndpointConfig};
use anyhow::{Context, Result};
use log::{debug, info};

/// Execute the scan command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Scan command arguments
///
/// # Returns
/// The scan report once the final snapshot is written
///
/// # Errors
/// * No endpoint configured for the chain
/// * Node unreachable
/// * Checkpoint snapshot missing or corrupt
/// * Fallback tracing failure or a negative call cost
pub fn execute_scan(args: ScanArgs) -> Result<ScanReport> {
    // Step 1: Resolve endpoint
    let file_config = args
        .config_file
        .as_ref()
        .map(EndpointConfig::load)
        .transpose()
        .context("Failed to load config file")?;

    let rpc_url = resolve_endpoint(args.chain, args.rpc_url.as_deref(), file_config.as_ref())?;
    info!("RPC endpoint: {}", rpc_url);

    let client = RpcClient::new(rpc_url).context("Failed to create RPC client")?;
    let sink = JsonDirectorySink::new(&args.results_dir);

    let driver = ScanDriver::new(client, sink, scan_config(&args))
        .context("Failed to initialize scan")?;

    // Step 2: Check the node
    let head = driver.check_node()?;
    debug!("Node head block: {}", head);

    // Step 3: Scan
    let report = driver.run()?;

    info!(
        "✓ Results written to: {}",
        args.results_dir
            .join(report.final_snapshot.relative_dir())
            .display()
    );

    // Step 4: Summary
    print_summary(&report, args.top_opcodes);

    Ok(report)
}

fn scan_config(args: &ScanArgs) -> ScanConfig {
    let mut config = ScanConfig::new(args.chain, args.start_block, args.end_block);
    config.checkpoint = args.checkpoint;
    config.checkpoint_interval = args.checkpoint_interval;
    config.attribution = args.attribution;
    config
}

fn print_summary(report: &ScanReport, top_n: usize) {
    let distribution = GasDistribution::from_stats(&report.stats);

    println!("\n{}", "=".repeat(80));
    println!("SCAN SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Snapshot:     {}", report.final_snapshot);
    println!(
        "Blocks:       {} ({} bulk, {} fallback)",
        report.blocks_processed, report.bulk_blocks, report.fallback_blocks
    );
    println!("Transactions: {}", report.transactions);
    if report.unresolved_calls > 0 {
        println!("Unresolved calls: {}", report.unresolved_calls);
    }
    println!("{}", distribution.summary());
    println!("\n{}", render_table(&top_opcodes(&report.stats, top_n)));
    println!("{}", "=".repeat(80));
}

/// Validate scan arguments
///
/// **Public** - can be called before execute_scan for early validation
pub fn validate_args(args: &ScanArgs) -> Result<()> {
    scan_config(args).validate()?;

    if let Some(rpc_url) = &args.rpc_url {
        if rpc_url.is_empty() {
            anyhow::bail!("RPC URL cannot be empty");
        }

        if !rpc_url.starts_with("http://") && !rpc_url.starts_with("https://") {
            anyhow::bail!("RPC URL must start with http:// or https://");
        }
    }

    if args.top_opcodes == 0 {
        anyhow::bail!("top_opcodes must be greater than 0");
    }

    Ok(())
}
