//! Simulation event log
//!
//! Events are formatted as `[HH:MM:SS] [LEVEL] message`, kept in a bounded
//! in-memory buffer for snapshots, forwarded to the `log` facade, and
//! optionally appended to a file.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{LineWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{error, info, warn};

/// How many lines the in-memory buffer keeps by default
pub const DEFAULT_LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Cycle,
    Priority,
    System,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Cycle => "CYCLE",
            LogLevel::Priority => "PRIORITY",
            LogLevel::System => "SYSTEM",
            LogLevel::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for simulation events.
///
/// Owned by the orchestrator and lent to the signal, sensor and decision
/// algorithm for the duration of a call.
pub trait EventSink {
    fn record(&mut self, level: LogLevel, message: &str);

    fn info(&mut self, message: &str) {
        self.record(LogLevel::Info, message);
    }
}

pub struct EventLog {
    entries: VecDeque<String>,
    capacity: usize,
    file: Option<LineWriter<File>>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
            capacity: capacity.max(1),
            file: None,
        }
    }

    /// Also append every line to `path`, truncating whatever a previous run left there
    pub fn with_file(mut self, path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        self.file = Some(LineWriter::new(file));
        Ok(self)
    }

    /// The `count` most recent lines, oldest first
    pub fn recent(&self, count: usize) -> Vec<String> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any buffered line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|line| line.contains(needle))
    }
}

impl EventSink for EventLog {
    fn record(&mut self, level: LogLevel, message: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let line = format!("[{timestamp}] [{level}] {message}");

        match level {
            LogLevel::Error => error!("[{level}] {message}"),
            _ => info!("[{level}] {message}"),
        }

        if let Some(file) = &mut self.file {
            if let Err(e) = writeln!(file, "{line}") {
                warn!("Disabling event log file after write failure: {e}");
                self.file = None;
            }
        }

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line);
    }
}
