//! Summaries over aggregated opcode statistics.
//!
//! Ranks opcodes by the gas they account for. Used for the end-of-scan
//! report and by the `inspect` command.

use super::stats::OpcodeStats;
use log::debug;

/// One row of an opcode ranking
#[derive(Debug, Clone, PartialEq)]
pub struct OpcodeSummary {
    pub opcode: String,
    pub count: u64,
    pub total: f64,
    pub average: f64,
    pub min: Option<f64>,
    pub max: f64,

    /// Share of all recorded gas, in percent
    pub percentage: f64,
}

/// Top `top_n` opcodes by total gas, descending
///
/// **Public** - main entry point for ranking
///
/// Ties are broken by opcode name so output is stable.
pub fn top_opcodes(stats: &OpcodeStats, top_n: usize) -> Vec<OpcodeSummary> {
    debug!("Ranking top {} of {} opcodes", top_n, stats.len());

    let total_gas = stats.total_gas();

    let mut rows: Vec<OpcodeSummary> = stats
        .iter()
        .map(|(opcode, stat)| OpcodeSummary {
            opcode: opcode.clone(),
            count: stat.count,
            total: stat.total,
            average: stat.mean().unwrap_or(0.0),
            min: stat.min,
            max: stat.max,
            percentage: percentage_of(stat.total, total_gas),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.opcode.cmp(&b.opcode))
    });
    rows.truncate(top_n);
    rows
}

fn percentage_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        (part / whole) * 100.0
    } else {
        0.0
    }
}

/// Scan-wide totals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GasDistribution {
    /// Distinct opcodes seen
    pub opcode_count: usize,

    /// Contributions recorded
    pub observations: u64,

    /// Gas across all opcodes
    pub total_gas: f64,

    /// Share of gas taken by the single most expensive opcode
    pub top_opcode_percentage: f64,
}

impl GasDistribution {
    pub fn from_stats(stats: &OpcodeStats) -> Self {
        let top = top_opcodes(stats, 1);
        Self {
            opcode_count: stats.len(),
            observations: stats.total_count(),
            total_gas: stats.total_gas(),
            top_opcode_percentage: top.first().map_or(0.0, |row| row.percentage),
        }
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging
    pub fn summary(&self) -> String {
        format!(
            "Opcodes: {} | Observations: {} | Total gas: {:.0} | Top opcode: {:.1}%",
            self.opcode_count, self.observations, self.total_gas, self.top_opcode_percentage
        )
    }
}

/// Fixed-width text table of the top opcodes
pub fn render_table(rows: &[OpcodeSummary]) -> String {
    let mut out = format!(
        "{:<16} {:>12} {:>16} {:>12} {:>10} {:>10} {:>7}\n",
        "OPCODE", "COUNT", "TOTAL", "AVG", "MIN", "MAX", "%"
    );
    for row in rows {
        let min = row
            .min
            .map_or_else(|| "-".to_string(), |min| format!("{:.0}", min));
        out.push_str(&format!(
            "{:<16} {:>12} {:>16.0} {:>12.2} {:>10} {:>10.0} {:>6.2}%\n",
            row.opcode, row.count, row.total, row.average, min, row.max, row.percentage
        ));
    }
    out
}
