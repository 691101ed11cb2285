//! Append-only audit log
//!
//! Every copy, directory creation, deletion, dry-run notice and per-item
//! failure becomes one timestamped line. The sink serializes writes itself,
//! so workers share it through an `Arc` and never coordinate directly.

use crate::types::SyncError;
use chrono::Local;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// Timestamp layout of each line, e.g. `2024/03/01 14:05:09`
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Something worth an audit line
#[derive(Debug)]
pub enum AuditEvent<'a> {
    RunStarted { source: &'a Path, target: &'a Path },
    Copied { source: &'a Path, target: &'a Path },
    DirectoryCreated(&'a Path),
    Deleted(&'a Path),
    WouldCopy { source: &'a Path, target: &'a Path },
    WouldCreateDirectory(&'a Path),
    UpToDate(&'a Path),
    Failed(&'a SyncError),
    RunCompleted,
    RunFailed(&'a SyncError),
}

impl AuditEvent<'_> {
    /// Whether the line is also echoed to stdout
    ///
    /// Up-to-date notices would drown everything else on large trees.
    fn is_echoed(&self) -> bool {
        !matches!(self, AuditEvent::UpToDate(_))
    }
}

impl fmt::Display for AuditEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEvent::RunStarted { source, target } => write!(
                f,
                "Backup started: {} -> {}",
                source.display(),
                target.display()
            ),
            AuditEvent::Copied { source, target } => {
                write!(f, "Copied: {} -> {}", source.display(), target.display())
            }
            AuditEvent::DirectoryCreated(path) => {
                write!(f, "Created directory: {}", path.display())
            }
            AuditEvent::Deleted(path) => write!(f, "Deleted: {}", path.display()),
            AuditEvent::WouldCopy { source, target } => write!(
                f,
                "[Dry Run] File would be copied: {} -> {}",
                source.display(),
                target.display()
            ),
            AuditEvent::WouldCreateDirectory(path) => {
                write!(f, "[Dry Run] Would create directory: {}", path.display())
            }
            AuditEvent::UpToDate(path) => {
                write!(f, "File is already up-to-date: {}", path.display())
            }
            AuditEvent::Failed(error) => write!(f, "{}", error),
            AuditEvent::RunCompleted => f.write_str("Backup completed."),
            AuditEvent::RunFailed(error) => write!(f, "Error: {}", error),
        }
    }
}

enum Sink {
    File(BufWriter<File>),
    Memory(Vec<String>),
}

/// Thread-safe append-only line sink
pub struct AuditLog {
    sink: Mutex<Sink>,
    echo: bool,
}

impl AuditLog {
    /// Open (or create) an audit file in append mode
    pub fn open(path: &Path) -> Result<Self, SyncError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| {
                SyncError::Config(format!(
                    "Error opening log file {}: {}",
                    path.display(),
                    source
                ))
            })?;
        Ok(Self {
            sink: Mutex::new(Sink::File(BufWriter::new(file))),
            echo: true,
        })
    }

    /// Keep lines in memory (used by tests and library callers that
    /// only want the summary)
    pub fn memory() -> Self {
        Self {
            sink: Mutex::new(Sink::Memory(Vec::new())),
            echo: false,
        }
    }

    /// Enable or disable mirroring lines to stdout
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Append one event as a timestamped line
    ///
    /// Write failures go to `tracing` and are otherwise ignored.
    pub fn record(&self, event: AuditEvent<'_>) {
        let message = event.to_string();
        if self.echo && event.is_echoed() {
            println!("{}", message);
        }

        let line = format!("{} {}", Local::now().format(TIMESTAMP_FORMAT), message);
        let mut sink = match self.sink.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match &mut *sink {
            Sink::File(writer) => {
                if let Err(e) = writeln!(writer, "{}", line) {
                    tracing::warn!(error = %e, "failed to write audit line");
                }
            }
            Sink::Memory(lines) => lines.push(line),
        }
    }

    /// Flush buffered lines to disk
    pub fn flush(&self) {
        let mut sink = match self.sink.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Sink::File(writer) = &mut *sink {
            if let Err(e) = writer.flush() {
                tracing::warn!(error = %e, "failed to flush audit log");
            }
        }
    }

    /// Snapshot of the recorded lines (memory sink only)
    pub fn lines(&self) -> Vec<String> {
        let sink = match self.sink.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match &*sink {
            Sink::Memory(lines) => lines.clone(),
            Sink::File(_) => Vec::new(),
        }
    }

    /// Recorded lines whose message starts with `prefix`, timestamps stripped
    pub fn messages_starting_with(&self, prefix: &str) -> Vec<String> {
        self.lines()
            .iter()
            .map(|line| strip_timestamp(line).to_string())
            .filter(|message| message.starts_with(prefix))
            .collect()
    }
}

impl Drop for AuditLog {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Drop the `YYYY/MM/DD HH:MM:SS ` prefix from an audit line
pub fn strip_timestamp(line: &str) -> &str {
    // date and time are the first two space-separated fields
    line.splitn(3, ' ').nth(2).unwrap_or(line)
}
