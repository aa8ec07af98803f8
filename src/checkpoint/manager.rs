//! Checkpoint scheduling and the fresh/resumed scan state machine.
//!
//! A checkpoint keyed at block `C` is written when the scan reaches `C`,
//! before `C` is processed, so it holds complete statistics for
//! `[start, C - 1]`. Resuming from `C` restores those statistics and
//! continues at `C`.

use super::sink::ResultSink;
use super::snapshot::{Snapshot, SnapshotKey};
use crate::aggregator::OpcodeStats;
use crate::utils::config::Chain;
use crate::utils::error::SnapshotError;
use log::info;

/// Where a scan's statistics came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// No prior snapshot; statistics start empty
    Fresh,
    /// Statistics restored from the snapshot taken at `checkpoint`
    Resumed { checkpoint: u64 },
}

/// Saves and restores snapshots for one scan range
#[derive(Debug)]
pub struct CheckpointManager<K> {
    sink: K,
    chain: Chain,
    start_block: u64,
    end_block: u64,
    interval: u64,
    state: ScanState,
    written: usize,
}

impl<K: ResultSink> CheckpointManager<K> {
    pub fn new(sink: K, chain: Chain, start_block: u64, end_block: u64, interval: u64) -> Self {
        Self {
            sink,
            chain,
            start_block,
            end_block,
            interval,
            state: ScanState::Fresh,
            written: 0,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Snapshots written by this manager so far
    pub fn snapshots_written(&self) -> usize {
        self.written
    }

    /// Key of the intermediate snapshot taken at `block`
    pub fn checkpoint_key(&self, block: u64) -> SnapshotKey {
        SnapshotKey::checkpoint(self.chain, self.start_block, self.end_block, block)
    }

    /// Key of the snapshot written at scan completion
    pub fn final_key(&self) -> SnapshotKey {
        SnapshotKey::final_result(self.chain, self.start_block, self.end_block)
    }

    /// First block the scan has to process
    pub fn first_block(&self) -> u64 {
        match self.state {
            ScanState::Fresh => self.start_block,
            ScanState::Resumed { checkpoint } => checkpoint,
        }
    }

    /// Whether a snapshot is due on reaching `block`.
    ///
    /// Every `interval` blocks after the start, except the block a resumed
    /// scan starts at (its snapshot already exists).
    pub fn is_due(&self, block: u64) -> bool {
        let offset = block.saturating_sub(self.start_block);
        if offset == 0 || self.interval == 0 || offset % self.interval != 0 {
            return false;
        }
        !matches!(self.state, ScanState::Resumed { checkpoint } if checkpoint == block)
    }

    /// Load the statistics saved at `checkpoint`
    ///
    /// # Errors
    /// * `SnapshotError::NotFound` - no snapshot for this range and block
    /// * `SnapshotError::Corrupt` / `SnapshotError::Inconsistent` - unusable snapshot
    pub fn load(&self, checkpoint: u64) -> Result<OpcodeStats, SnapshotError> {
        let key = self.checkpoint_key(checkpoint);
        info!("Loading checkpoint {}", key);
        let stats = self.sink.read_snapshot(&key)?.into_stats()?;
        info!(
            "Restored {} opcodes ({} observations)",
            stats.len(),
            stats.total_count()
        );
        Ok(stats)
    }

    /// Load the snapshot at `checkpoint` and move to [`ScanState::Resumed`]
    pub fn resume(&mut self, checkpoint: u64) -> Result<OpcodeStats, SnapshotError> {
        let stats = self.load(checkpoint)?;
        self.state = ScanState::Resumed { checkpoint };
        Ok(stats)
    }

    /// Recompute averages and write an intermediate snapshot at `block`
    pub fn save(
        &mut self,
        block: u64,
        stats: &mut OpcodeStats,
    ) -> Result<SnapshotKey, SnapshotError> {
        let key = self.checkpoint_key(block);
        self.write(key, stats)?;
        Ok(key)
    }

    /// Recompute averages and write the final snapshot
    pub fn save_final(&mut self, stats: &mut OpcodeStats) -> Result<SnapshotKey, SnapshotError> {
        let key = self.final_key();
        self.write(key, stats)?;
        Ok(key)
    }

    fn write(&mut self, key: SnapshotKey, stats: &mut OpcodeStats) -> Result<(), SnapshotError> {
        stats.recompute_averages();
        self.sink.write_snapshot(&key, &Snapshot::from_stats(stats))?;
        self.written += 1;
        info!("Checkpoint saved: {}", key);
        Ok(())
    }
}
