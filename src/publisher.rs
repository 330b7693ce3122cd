//! Writes the latest snapshot to disk for the browser visualizer
//!
//! Runs on its own thread, reading the snapshot cell the simulation writes.
//! A failed write is logged and skipped; the next snapshot supersedes it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::simulation::{Snapshot, SnapshotCell};

pub struct SnapshotPublisher {
    cell: Arc<SnapshotCell>,
    path: PathBuf,
    last_written: Option<Arc<Snapshot>>,
    /// Snapshots successfully written so far
    pub writes: usize,
}

impl SnapshotPublisher {
    pub fn new(cell: Arc<SnapshotCell>, path: impl Into<PathBuf>) -> Self {
        Self {
            cell,
            path: path.into(),
            last_written: None,
            writes: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the latest snapshot if it differs from the last one written.
    /// Returns whether a file was written.
    pub fn publish_latest(&mut self) -> Result<bool> {
        let latest = self.cell.latest();
        if let Some(last) = &self.last_written {
            if Arc::ptr_eq(last, &latest) {
                return Ok(false);
            }
        }

        let json = latest.to_json().context("Failed to serialize snapshot")?;

        // Write beside the target then rename so readers never see a partial file
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, json)
            .with_context(|| format!("Failed to write {}", staging.display()))?;
        std::fs::rename(&staging, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        self.last_written = Some(latest);
        self.writes += 1;
        Ok(true)
    }

    /// Poll the cell every `interval` until `finished` reports true, then
    /// publish one last time so the final state is on disk.
    pub fn run_until<F: Fn() -> bool>(&mut self, finished: F, interval: Duration) {
        loop {
            let done = finished();
            if let Err(e) = self.publish_latest() {
                warn!("Snapshot not published: {e:#}");
            }
            if done {
                break;
            }
            std::thread::sleep(interval);
        }
        debug!(
            "Snapshot publisher stopped after {} writes to {}",
            self.writes,
            self.path.display()
        );
    }
}
