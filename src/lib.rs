//! # dirbackup - incremental one-way directory backup
//!
//! Mirrors a source tree into a target tree, copying only files whose size
//! or modification time changed, optionally pruning target entries that no
//! longer exist in the source, and optionally running as a pure preview.
//!
//! ```no_run
//! use dirbackup::{run, AuditLog, SyncJob};
//! use std::sync::Arc;
//!
//! let job = SyncJob::new("/data/photos", "/backup/photos")
//!     .with_delete_extraneous(true);
//! let log = Arc::new(AuditLog::open("backup.log".as_ref())?);
//! let stats = run(job, log)?;
//! println!("copied {} file(s)", stats.copied);
//! # Ok::<(), dirbackup::SyncError>(())
//! ```

// Module declarations
pub mod audit;
pub mod commands;
pub mod config;
pub mod diff;
pub mod executor;
pub mod logging;
pub mod scanner;
pub mod service;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use audit::{AuditEvent, AuditLog};
pub use commands::sync::run;
pub use config::SyncJob;
pub use types::{CopyDecision, Entry, RunStats, SyncError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
