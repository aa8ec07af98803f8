//! Snapshot persistence.
//!
//! Each snapshot is a directory holding one pretty-printed JSON object per
//! map, plus an optional manifest.

use super::snapshot::{Snapshot, SnapshotKey, SnapshotManifest};
use crate::utils::config::{
    AVERAGE_FILE, COUNT_FILE, MANIFEST_FILE, MAX_FILE, MIN_FILE, SCHEMA_VERSION, TOTAL_FILE,
};
use crate::utils::error::SnapshotError;
use chrono::Utc;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

/// Where snapshots are persisted and read back from
pub trait ResultSink {
    fn write_snapshot(&self, key: &SnapshotKey, snapshot: &Snapshot) -> Result<(), SnapshotError>;

    fn read_snapshot(&self, key: &SnapshotKey) -> Result<Snapshot, SnapshotError>;
}

/// Snapshots as JSON files under a results root directory
#[derive(Debug, Clone)]
pub struct JsonDirectorySink {
    root: PathBuf,
}

impl JsonDirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a snapshot with `key` lives in
    pub fn snapshot_dir(&self, key: &SnapshotKey) -> PathBuf {
        self.root.join(key.relative_dir())
    }
}

impl ResultSink for JsonDirectorySink {
    fn write_snapshot(&self, key: &SnapshotKey, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let manifest = SnapshotManifest {
            version: SCHEMA_VERSION.to_string(),
            chain: key.chain,
            start_block: key.start_block,
            end_block: key.end_block,
            checkpoint_block: key.checkpoint,
            opcode_count: snapshot.counts.len(),
            generated_at: Utc::now().to_rfc3339(),
        };
        write_snapshot_dir(&self.snapshot_dir(key), snapshot, Some(&manifest))
    }

    fn read_snapshot(&self, key: &SnapshotKey) -> Result<Snapshot, SnapshotError> {
        read_snapshot_dir(&self.snapshot_dir(key))
    }
}

/// Write the five maps (and the manifest, if given) into `dir`
///
/// **Public** - used by the directory sink and by tests
///
/// # Errors
/// * `SnapshotError::InvalidPath` - `dir` exists and is not a directory, or cannot be created
/// * `SnapshotError::Io` - a file cannot be written
/// * `SnapshotError::Serialization` - a map cannot be encoded
pub fn write_snapshot_dir(
    dir: &Path,
    snapshot: &Snapshot,
    manifest: Option<&SnapshotManifest>,
) -> Result<(), SnapshotError> {
    if dir.as_os_str().is_empty() {
        return Err(SnapshotError::InvalidPath("Path is empty".to_string()));
    }

    if dir.exists() && !dir.is_dir() {
        return Err(SnapshotError::InvalidPath(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    std::fs::create_dir_all(dir).map_err(|e| {
        SnapshotError::InvalidPath(format!("Cannot create directory {}: {}", dir.display(), e))
    })?;

    write_json(&dir.join(COUNT_FILE), &snapshot.counts)?;
    write_json(&dir.join(AVERAGE_FILE), &snapshot.averages)?;
    write_json(&dir.join(MAX_FILE), &snapshot.max)?;
    write_json(&dir.join(MIN_FILE), &snapshot.min)?;
    write_json(&dir.join(TOTAL_FILE), &snapshot.totals)?;

    if let Some(manifest) = manifest {
        write_json(&dir.join(MANIFEST_FILE), manifest)?;
    }

    info!(
        "Snapshot written to {} ({} opcodes)",
        dir.display(),
        snapshot.counts.len()
    );

    Ok(())
}

/// Read the five maps from `dir`
///
/// # Errors
/// * `SnapshotError::NotFound` - `dir` or one of the map files does not exist
/// * `SnapshotError::Corrupt` - a map file is not a valid JSON object of the expected type
pub fn read_snapshot_dir(dir: &Path) -> Result<Snapshot, SnapshotError> {
    debug!("Reading snapshot from: {}", dir.display());

    if !dir.is_dir() {
        return Err(SnapshotError::NotFound(dir.to_path_buf()));
    }

    Ok(Snapshot {
        counts: read_json(&dir.join(COUNT_FILE))?,
        averages: read_json(&dir.join(AVERAGE_FILE))?,
        max: read_json(&dir.join(MAX_FILE))?,
        min: read_json(&dir.join(MIN_FILE))?,
        totals: read_json(&dir.join(TOTAL_FILE))?,
    })
}

/// Read the manifest of a snapshot, if it has one
pub fn read_manifest(dir: &Path) -> Result<Option<SnapshotManifest>, SnapshotError> {
    let path = dir.join(MANIFEST_FILE);
    if !path.exists() {
        return Ok(None);
    }
    read_json(&path).map(Some)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SnapshotError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SnapshotError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SnapshotError::NotFound(path.to_path_buf()),
        _ => SnapshotError::Io(e),
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| SnapshotError::Corrupt {
        file: path.to_path_buf(),
        source,
    })
}
