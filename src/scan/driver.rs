//! Block-by-block scan loop.
//!
//! The driver:
//! 1. Restores statistics from a checkpoint (if one is configured)
//! 2. Walks the block range in increasing order
//! 3. Fetches each block's traces, retrying and then falling back to per-transaction traces
//! 4. Attributes and folds every transaction into the running statistics
//! 5. Writes snapshots at checkpoint intervals and at the end

use crate::aggregator::OpcodeStats;
use crate::attribution::{Attribution, AttributionMode, GasAttributor};
use crate::checkpoint::{CheckpointManager, ResultSink, ScanState, SnapshotKey};
use crate::parser::TransactionTrace;
use crate::rpc::TraceSource;
use crate::utils::config::{
    Chain, BULK_TRACE_TX_CAP, DEFAULT_CHECKPOINT_INTERVAL, TRACE_FETCH_ATTEMPTS,
    TRACE_RETRY_DELAY,
};
use crate::utils::error::{ConfigError, ScanError};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// Retry budget for bulk block traces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: TRACE_FETCH_ATTEMPTS,
            delay: TRACE_RETRY_DELAY,
        }
    }
}

/// Everything a scan needs to know
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub chain: Chain,
    pub start_block: u64,
    pub end_block: u64,

    /// Resume from the snapshot taken at this block
    pub checkpoint: Option<u64>,

    pub checkpoint_interval: u64,
    pub attribution: AttributionMode,
    pub retry: RetryPolicy,
}

impl ScanConfig {
    pub fn new(chain: Chain, start_block: u64, end_block: u64) -> Self {
        Self {
            chain,
            start_block,
            end_block,
            checkpoint: None,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            attribution: AttributionMode::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Check the range, checkpoint and interval
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_block > self.end_block {
            return Err(ConfigError::InvalidRange {
                start: self.start_block,
                end: self.end_block,
            });
        }

        if let Some(checkpoint) = self.checkpoint {
            if checkpoint <= self.start_block || checkpoint > self.end_block {
                return Err(ConfigError::InvalidCheckpoint {
                    checkpoint,
                    start: self.start_block,
                    end: self.end_block,
                });
            }
        }

        if self.checkpoint_interval == 0 {
            return Err(ConfigError::InvalidInterval);
        }

        Ok(())
    }
}

/// Result of fetching one block's bulk trace
#[derive(Debug)]
pub enum FetchOutcome {
    /// Per-transaction traces from `debug_traceBlockByNumber`
    Bulk(Vec<TransactionTrace>),
    /// All attempts failed; `last_error` is the final attempt's error
    Fallback { last_error: ScanError },
}

/// Summary of a completed scan
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub blocks_processed: u64,
    pub bulk_blocks: u64,
    pub fallback_blocks: u64,
    pub transactions: u64,

    /// Call-type opcodes left pending at the end of a transaction
    pub unresolved_calls: u64,

    /// Intermediate and final snapshots written
    pub checkpoints_written: usize,

    pub final_snapshot: SnapshotKey,
    pub stats: OpcodeStats,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct Progress {
    blocks_processed: u64,
    bulk_blocks: u64,
    fallback_blocks: u64,
    transactions: u64,
    unresolved_calls: u64,
}

/// Drives a scan over a block range
pub struct ScanDriver<S, K> {
    source: S,
    checkpoints: CheckpointManager<K>,
    attributor: GasAttributor,
    fallback_attributor: GasAttributor,
    config: ScanConfig,
    stats: OpcodeStats,
}

impl<S: TraceSource, K: ResultSink> ScanDriver<S, K> {
    /// Validate `config` and restore statistics if it names a checkpoint
    ///
    /// # Errors
    /// * `ScanError::Config` - invalid range, checkpoint or interval
    /// * `ScanError::Snapshot` - the checkpoint snapshot is missing or corrupt
    pub fn new(source: S, sink: K, config: ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;

        let mut checkpoints = CheckpointManager::new(
            sink,
            config.chain,
            config.start_block,
            config.end_block,
            config.checkpoint_interval,
        );

        let stats = match config.checkpoint {
            Some(checkpoint) => checkpoints.resume(checkpoint)?,
            None => OpcodeStats::new(),
        };

        Ok(Self {
            source,
            checkpoints,
            attributor: GasAttributor::new(config.attribution),
            fallback_attributor: GasAttributor::new(AttributionMode::Declared),
            config,
            stats,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn state(&self) -> ScanState {
        self.checkpoints.state()
    }

    pub fn stats(&self) -> &OpcodeStats {
        &self.stats
    }

    /// Ask the node for its head block; fails if it cannot be reached
    pub fn check_node(&self) -> Result<u64, ScanError> {
        let head = self
            .source
            .latest_block()
            .map_err(ScanError::NodeUnreachable)?;
        if head < self.config.end_block {
            warn!(
                "Node head is block {}, before the end of the scan range ({})",
                head, self.config.end_block
            );
        }
        Ok(head)
    }

    /// Process every block from the start (or checkpoint) through the end block
    ///
    /// **Public** - main entry point
    ///
    /// # Errors
    /// Any error other than a transient bulk fetch failure ends the scan.
    /// Statistics are only ever folded in for whole blocks, and the last
    /// snapshot written remains a valid resume point.
    pub fn run(mut self) -> Result<ScanReport, ScanError> {
        let started = Instant::now();
        let first_block = self.checkpoints.first_block();
        let mut progress = Progress::default();

        info!(
            "Scanning {} blocks {}..={} ({:?}, attribution {:?})",
            self.config.chain,
            first_block,
            self.config.end_block,
            self.checkpoints.state(),
            self.attributor.mode()
        );

        for block in first_block..=self.config.end_block {
            if self.checkpoints.is_due(block) {
                self.checkpoints.save(block, &mut self.stats)?;
            }

            info!("Processing block {}", block);
            self.process_block(block, &mut progress)?;
            progress.blocks_processed += 1;
        }

        let final_snapshot = self.checkpoints.save_final(&mut self.stats)?;
        let elapsed = started.elapsed();

        info!(
            "Scan completed in {:.2}s: {} blocks ({} via fallback), {} transactions",
            elapsed.as_secs_f64(),
            progress.blocks_processed,
            progress.fallback_blocks,
            progress.transactions
        );

        Ok(ScanReport {
            blocks_processed: progress.blocks_processed,
            bulk_blocks: progress.bulk_blocks,
            fallback_blocks: progress.fallback_blocks,
            transactions: progress.transactions,
            unresolved_calls: progress.unresolved_calls,
            checkpoints_written: self.checkpoints.snapshots_written(),
            final_snapshot,
            stats: self.stats,
            elapsed,
        })
    }

    fn process_block(&mut self, block: u64, progress: &mut Progress) -> Result<(), ScanError> {
        let attributions = match self.fetch_bulk(block) {
            FetchOutcome::Bulk(traces) => {
                progress.bulk_blocks += 1;
                self.attribute_bulk(block, traces)?
            }
            FetchOutcome::Fallback { last_error } => {
                warn!(
                    "{}; falling back to per-transaction traces",
                    last_error
                );
                progress.fallback_blocks += 1;
                self.attribute_fallback(block)?
            }
        };

        for attribution in &attributions {
            if !attribution.unresolved.is_empty() {
                warn!(
                    "Block {}: {} call(s) unresolved at end of transaction ({})",
                    block,
                    attribution.unresolved.len(),
                    attribution
                        .unresolved
                        .iter()
                        .map(|call| call.operation.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            progress.unresolved_calls += attribution.unresolved.len() as u64;
            self.stats.record_attribution(attribution);
        }
        progress.transactions += attributions.len() as u64;

        Ok(())
    }

    /// `Attempting(n) -> Bulk` on success, `Attempting(0) -> Fallback` once exhausted.
    /// At least one attempt is always made.
    fn fetch_bulk(&self, block: u64) -> FetchOutcome {
        let retry = self.config.retry;
        let mut tries_left = retry.attempts.max(1);

        loop {
            tries_left -= 1;
            match self.source.trace_block(block) {
                Ok(traces) => return FetchOutcome::Bulk(traces),
                Err(source) => {
                    let error = ScanError::BulkFetch { block, source };
                    if tries_left == 0 {
                        return FetchOutcome::Fallback { last_error: error };
                    }
                    warn!("{} ({} tries left)", error, tries_left);
                    std::thread::sleep(retry.delay);
                }
            }
        }
    }

    fn attribute_bulk(
        &self,
        block: u64,
        traces: Vec<TransactionTrace>,
    ) -> Result<Vec<Attribution>, ScanError> {
        if traces.len() > BULK_TRACE_TX_CAP {
            debug!(
                "Block {} has {} transactions, processing the first {}",
                block,
                traces.len(),
                BULK_TRACE_TX_CAP
            );
        }

        traces
            .iter()
            .take(BULK_TRACE_TX_CAP)
            .map(|trace| {
                self.attributor
                    .attribute(&trace.struct_logs)
                    .map_err(|source| ScanError::Attribution { block, source })
            })
            .collect()
    }

    fn attribute_fallback(&self, block: u64) -> Result<Vec<Attribution>, ScanError> {
        let fallback = |source| ScanError::FallbackFailed { block, source };

        let hashes = self.source.block_transactions(block).map_err(fallback)?;
        debug!("Block {}: tracing {} transactions individually", block, hashes.len());

        let mut attributions = Vec::with_capacity(hashes.len());
        for hash in &hashes {
            let trace = self.source.trace_transaction(hash).map_err(fallback)?;
            let attribution = self
                .fallback_attributor
                .attribute(&trace.struct_logs)
                .map_err(|source| ScanError::Attribution { block, source })?;
            attributions.push(attribution);
        }
        Ok(attributions)
    }
}
