//! Running per-opcode gas statistics.
//!
//! Count and total only ever grow. Averages are derived and refreshed by
//! [`OpcodeStats::recompute_averages`], which the checkpoint manager calls
//! before every snapshot.

use crate::attribution::{Attribution, GasContribution};
use std::collections::btree_map::{self, BTreeMap};

/// Statistics for a single opcode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpcodeStat {
    /// Number of contributions recorded
    pub count: u64,

    /// Sum of recorded costs
    pub total: f64,

    /// Smallest recorded cost; `None` until the first observation
    pub min: Option<f64>,

    /// Largest recorded cost
    pub max: f64,

    /// `total / count` as of the last recomputation
    pub average: f64,
}

impl OpcodeStat {
    fn record(&mut self, cost: f64) {
        self.max = if self.count == 0 {
            cost
        } else {
            self.max.max(cost)
        };
        self.min = Some(self.min.map_or(cost, |min| min.min(cost)));
        self.total += cost;
        self.count += 1;
    }

    /// `total / count`, computed now rather than read from the cached average
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total / self.count as f64)
    }
}

/// Per-opcode statistics keyed by opcode name (sorted)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpcodeStats {
    stats: BTreeMap<String, OpcodeStat>,
}

impl OpcodeStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one contribution for `opcode`
    pub fn record(&mut self, opcode: &str, cost: u64) {
        let cost = cost as f64;
        match self.stats.get_mut(opcode) {
            Some(stat) => stat.record(cost),
            None => {
                let mut stat = OpcodeStat::default();
                stat.record(cost);
                self.stats.insert(opcode.to_string(), stat);
            }
        }
    }

    /// Record every contribution in order
    pub fn record_all<'a>(&mut self, contributions: impl IntoIterator<Item = &'a GasContribution>) {
        for contribution in contributions {
            self.record(&contribution.opcode, contribution.cost);
        }
    }

    /// Record the contributions of an attributed transaction
    pub fn record_attribution(&mut self, attribution: &Attribution) {
        self.record_all(&attribution.contributions);
    }

    /// Set `average = total / count` for every opcode with observations
    pub fn recompute_averages(&mut self) {
        for stat in self.stats.values_mut() {
            if let Some(mean) = stat.mean() {
                stat.average = mean;
            }
        }
    }

    /// Insert restored statistics for `opcode`, replacing any existing entry
    pub fn insert(&mut self, opcode: impl Into<String>, stat: OpcodeStat) {
        self.stats.insert(opcode.into(), stat);
    }

    pub fn get(&self, opcode: &str) -> Option<&OpcodeStat> {
        self.stats.get(opcode)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, OpcodeStat> {
        self.stats.iter()
    }

    /// Number of distinct opcodes
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Total contributions recorded across all opcodes
    pub fn total_count(&self) -> u64 {
        self.stats.values().map(|s| s.count).sum()
    }

    /// Total gas recorded across all opcodes
    pub fn total_gas(&self) -> f64 {
        self.stats.values().map(|s| s.total).sum()
    }
}

impl<'a> IntoIterator for &'a OpcodeStats {
    type Item = (&'a String, &'a OpcodeStat);
    type IntoIter = btree_map::Iter<'a, String, OpcodeStat>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
