//! Inspect command: print a snapshot written by an earlier scan.

use super::models::InspectArgs;
use crate::aggregator::{top_opcodes, GasDistribution, OpcodeStats, OpcodeSummary};
use crate::checkpoint::{read_manifest, read_snapshot_dir, SnapshotManifest};
use anyhow::{Context, Result};
use colored::*;

/// Load the snapshot in `args.dir` and print it
///
/// Uses the same loader as a resumed scan, so a snapshot that would fail
/// to resume fails here too.
pub fn execute_inspect(args: &InspectArgs) -> Result<OpcodeStats> {
    let stats = read_snapshot_dir(&args.dir)
        .and_then(|snapshot| snapshot.into_stats())
        .with_context(|| format!("Failed to load snapshot from {}", args.dir.display()))?;

    let manifest = read_manifest(&args.dir).context("Failed to read snapshot manifest")?;

    print!("{}", render_inspection(&stats, manifest.as_ref(), args.top_opcodes));
    Ok(stats)
}

/// Manifest header, totals line and a highlighted opcode table
pub fn render_inspection(
    stats: &OpcodeStats,
    manifest: Option<&SnapshotManifest>,
    top_n: Option<usize>,
) -> String {
    let mut out = String::new();

    out.push_str(&"Opcode Gas Snapshot".bold().to_string());
    out.push('\n');

    match manifest {
        Some(manifest) => {
            out.push_str(&format!("  Chain:     {}\n", manifest.chain));
            out.push_str(&format!(
                "  Range:     {}..={}\n",
                manifest.start_block, manifest.end_block
            ));
            match manifest.checkpoint_block {
                Some(block) => out.push_str(&format!(
                    "  Snapshot:  checkpoint at {} (blocks {}..{})\n",
                    block, manifest.start_block, block
                )),
                None => out.push_str("  Snapshot:  final\n"),
            }
            out.push_str(&format!("  Generated: {}\n", manifest.generated_at));
            out.push_str(&format!("  Schema:    v{}\n", manifest.version));
        }
        None => out.push_str(&format!("  {}\n", "No manifest".dimmed())),
    }

    out.push_str(&format!("  {}\n\n", GasDistribution::from_stats(stats).summary()));

    let rows = top_opcodes(stats, top_n.unwrap_or(stats.len()));
    out.push_str(
        &format!(
            "{:<16} {:>12} {:>16} {:>12} {:>10} {:>10} {:>7}",
            "OPCODE", "COUNT", "TOTAL", "AVG", "MIN", "MAX", "%"
        )
        .bold()
        .to_string(),
    );
    out.push('\n');

    for row in &rows {
        out.push_str(&format_row(row));
        out.push('\n');
    }

    out
}

fn format_row(row: &OpcodeSummary) -> String {
    let min = row
        .min
        .map_or_else(|| "-".to_string(), |min| format!("{:.0}", min));
    let line = format!(
        "{:<16} {:>12} {:>16.0} {:>12.2} {:>10} {:>10.0} {:>6.2}%",
        row.opcode, row.count, row.total, row.average, min, row.max, row.percentage
    );

    if row.percentage >= 10.0 {
        line.red().bold().to_string()
    } else if row.percentage >= 1.0 {
        line.yellow().to_string()
    } else {
        line
    }
}
