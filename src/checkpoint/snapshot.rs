//! Snapshot identity and contents.

use crate::aggregator::{OpcodeStat, OpcodeStats};
use crate::utils::config::Chain;
use crate::utils::error::SnapshotError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Identifies a snapshot: chain, overall scan range and, for intermediate
/// checkpoints, the block the snapshot was taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    pub chain: Chain,
    pub start_block: u64,
    pub end_block: u64,

    /// `None` for the final snapshot of a completed scan
    pub checkpoint: Option<u64>,
}

impl SnapshotKey {
    /// Key of an intermediate snapshot taken when the scan reached `block`
    pub fn checkpoint(chain: Chain, start_block: u64, end_block: u64, block: u64) -> Self {
        Self {
            chain,
            start_block,
            end_block,
            checkpoint: Some(block),
        }
    }

    /// Key of the final snapshot of a completed scan
    pub fn final_result(chain: Chain, start_block: u64, end_block: u64) -> Self {
        Self {
            chain,
            start_block,
            end_block,
            checkpoint: None,
        }
    }

    /// Directory relative to the results root:
    /// `<chain>/<start>_<end>` or `<chain>/<start>_<end>/<start>_<checkpoint>`
    pub fn relative_dir(&self) -> PathBuf {
        let mut dir = PathBuf::from(self.chain.name());
        dir.push(format!("{}_{}", self.start_block, self.end_block));
        if let Some(block) = self.checkpoint {
            dir.push(format!("{}_{}", self.start_block, block));
        }
        dir
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.checkpoint {
            Some(block) => write!(
                f,
                "{} {}..={} @ {}",
                self.chain, self.start_block, self.end_block, block
            ),
            None => write!(f, "{} {}..={}", self.chain, self.start_block, self.end_block),
        }
    }
}

/// The five per-opcode maps persisted for every snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub counts: BTreeMap<String, u64>,
    pub averages: BTreeMap<String, f64>,
    pub max: BTreeMap<String, f64>,
    pub min: BTreeMap<String, f64>,
    pub totals: BTreeMap<String, f64>,
}

impl Snapshot {
    /// Capture `stats` as-is. Averages are taken from the cached values,
    /// so callers recompute them first.
    pub fn from_stats(stats: &OpcodeStats) -> Self {
        let mut snapshot = Self::default();
        for (opcode, stat) in stats {
            snapshot.counts.insert(opcode.clone(), stat.count);
            snapshot.totals.insert(opcode.clone(), stat.total);
            snapshot.max.insert(opcode.clone(), stat.max);
            if let Some(min) = stat.min {
                snapshot.min.insert(opcode.clone(), min);
            }
            if stat.count > 0 {
                snapshot.averages.insert(opcode.clone(), stat.average);
            }
        }
        snapshot
    }

    /// Restore running statistics.
    ///
    /// # Errors
    /// * `SnapshotError::Inconsistent` - a cost map names an opcode with no count
    pub fn into_stats(self) -> Result<OpcodeStats, SnapshotError> {
        for (name, map) in [
            ("total", &self.totals),
            ("average", &self.averages),
            ("max", &self.max),
            ("min", &self.min),
        ] {
            if let Some(opcode) = map.keys().find(|op| !self.counts.contains_key(*op)) {
                return Err(SnapshotError::Inconsistent(format!(
                    "{} cost recorded for {} without a count",
                    name, opcode
                )));
            }
        }

        let mut stats = OpcodeStats::new();
        for (opcode, count) in &self.counts {
            let total = self.totals.get(opcode).copied().unwrap_or(0.0);
            let average = match self.averages.get(opcode) {
                Some(average) => *average,
                None if *count > 0 => total / *count as f64,
                None => 0.0,
            };
            stats.insert(
                opcode.clone(),
                OpcodeStat {
                    count: *count,
                    total,
                    min: self.min.get(opcode).copied(),
                    max: self.max.get(opcode).copied().unwrap_or(0.0),
                    average,
                },
            );
        }
        Ok(stats)
    }
}

/// Descriptive metadata written next to the five maps. Optional on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub version: String,
    pub chain: Chain,
    pub start_block: u64,
    pub end_block: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint_block: Option<u64>,
    pub opcode_count: usize,
    pub generated_at: String,
}
