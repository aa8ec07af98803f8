//! Snapshots of aggregated statistics, enabling resumable scans.

pub mod manager;
pub mod sink;
pub mod snapshot;

pub use manager::{CheckpointManager, ScanState};
pub use sink::{read_manifest, read_snapshot_dir, write_snapshot_dir, JsonDirectorySink, ResultSink};
pub use snapshot::{Snapshot, SnapshotKey, SnapshotManifest};
